//! Per-trial regional totals
//!
//! Each trial sums its cell outcomes into a province tally and exactly one subregion tally.
//! A day's trials are kept together in a [`TrialDistribution`] until the confidence band is
//! extracted, then dropped.

use crate::region::Subregion;
use serde::{Deserialize, Serialize};

/// Query-day result of one cell in one trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellOutcome {
    /// New ignitions on the query day
    pub ignitions: u64,
    /// Holdover plus same-day arrivals on the query day
    pub arrivals: u64,
    /// Undetected fires left after the query day's update
    pub holdovers: u64,
}

/// Counted quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Ignitions,
    Arrivals,
    Holdovers,
}

/// Area a total covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionScope {
    Province,
    Subregion(Subregion),
}

impl RegionScope {
    /// Province first, then subregions in report order.
    pub const ALL: [RegionScope; 4] = [
        Self::Province,
        Self::Subregion(Subregion::Slopes),
        Self::Subregion(Subregion::WestBoreal),
        Self::Subregion(Subregion::EastBoreal),
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::Subregion(sub) => sub.label(),
        }
    }
}

/// Fire counts summed over a set of cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionTally {
    pub ignitions: u64,
    pub arrivals: u64,
    pub holdovers: u64,
}

impl RegionTally {
    pub fn add(&mut self, outcome: &CellOutcome) {
        self.ignitions += outcome.ignitions;
        self.arrivals += outcome.arrivals;
        self.holdovers += outcome.holdovers;
    }

    pub fn get(&self, metric: Metric) -> u64 {
        match metric {
            Metric::Ignitions => self.ignitions,
            Metric::Arrivals => self.arrivals,
            Metric::Holdovers => self.holdovers,
        }
    }
}

/// Totals of a single trial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialTotals {
    pub province: RegionTally,
    pub subregions: [RegionTally; 3],
    /// Query-day strikes summed over cells (diagnostic)
    pub lightning: u64,
    /// Query-day observed fires summed over cells (diagnostic)
    pub observed_fires: u64,
}

impl TrialTotals {
    /// Add one cell's outcome to the province and its subregion.
    pub fn record(&mut self, subregion: Subregion, outcome: &CellOutcome) {
        self.province.add(outcome);
        self.subregions[subregion.index()].add(outcome);
    }

    pub fn tally(&self, scope: RegionScope) -> &RegionTally {
        match scope {
            RegionScope::Province => &self.province,
            RegionScope::Subregion(sub) => &self.subregions[sub.index()],
        }
    }
}

/// Ascending trial values for one metric and region, used for rank lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedSample(Vec<u64>);

impl SortedSample {
    pub fn new(mut values: Vec<u64>) -> Self {
        values.sort_unstable();
        Self(values)
    }

    /// Value at a 1-based rank. `None` outside `1..=len`.
    pub fn rank(&self, rank: usize) -> Option<u64> {
        rank.checked_sub(1).and_then(|i| self.0.get(i)).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

}

/// All trial totals of one query day, in trial order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialDistribution {
    trials: Vec<TrialTotals>,
}

impl TrialDistribution {
    pub fn with_capacity(trials: usize) -> Self {
        Self {
            trials: Vec::with_capacity(trials),
        }
    }

    pub fn push(&mut self, totals: TrialTotals) {
        self.trials.push(totals);
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn trials(&self) -> &[TrialTotals] {
        &self.trials
    }

    /// Trial reported for diagnostics: the second trial, or the first when only one ran.
    pub fn representative(&self) -> Option<&TrialTotals> {
        self.trials.get(1).or_else(|| self.trials.first())
    }

    /// Mean of a metric over trials, 0 when empty.
    pub fn mean(&self, scope: RegionScope, metric: Metric) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let sum: u64 = self
            .trials
            .iter()
            .map(|t| t.tally(scope).get(metric))
            .sum();
        sum as f64 / self.trials.len() as f64
    }

    /// Sorted per-trial values of a metric over a region.
    pub fn sorted(&self, scope: RegionScope, metric: Metric) -> SortedSample {
        SortedSample::new(
            self.trials
                .iter()
                .map(|t| t.tally(scope).get(metric))
                .collect(),
        )
    }
}
