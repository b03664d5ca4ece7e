//! Daily Monte Carlo simulation
//!
//! For each query day the simulator runs independent trials over a loaded season. A trial
//! replays every cell's holdover window (see [`trial`]) and adds the query-day outcome to
//! regional totals. The day result keeps every trial's totals for percentile extraction and
//! per-cell sums for mean predictions.
//!
//! # Execution modes
//!
//! - `Sequential`: one caller-owned stream consumed in trial → cell → day order. A fixed seed
//!   reproduces the output byte for byte. This is the reference mode.
//! - `Parallel`: trials are spread over a rayon pool, each with its own derived stream.
//!   Output is reproducible for a seed and independent of thread count, but it is a different
//!   sample from the sequential mode (same distribution, different bits).

pub mod streams;
pub mod trial;

pub use trial::{CellSums, PERIOD_ARRIVAL_WEIGHTS};

use crate::aggregate::{Metric, RegionScope, TrialDistribution, TrialTotals};
use crate::calendar::{month_day, season_offset};
use crate::error::SimError;
use crate::holdover::HoldoverWindowResolver;
use crate::percentile::{ConfidenceBand, PercentileRanks};
use crate::risk::RiskCounts;
use crate::season::{CellId, SeasonTable};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of trials per query day.
pub const DEFAULT_TRIALS: usize = 1000;

/// How trials are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Single thread, single stream
    #[default]
    Sequential,
    /// Rayon pool with per-trial streams
    Parallel {
        /// Worker count; `None` uses rayon's default
        threads: Option<usize>,
    },
}

/// Trial-mean prediction for one cell on one query day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMean {
    pub cell_id: CellId,
    pub lat: f64,
    pub lon: f64,
    /// Whether the cell has real coordinates and belongs in the per-cell report
    pub reportable: bool,
    pub arrivals: f64,
    pub holdovers: f64,
    pub ignitions: f64,
}

/// Everything one query day produced.
#[derive(Debug, Clone)]
pub struct DayOutcome {
    pub year: i32,
    pub julian_day: u16,
    pub month: u8,
    pub day: u8,
    pub distribution: TrialDistribution,
    pub cell_means: Vec<CellMean>,
}

impl DayOutcome {
    pub fn trials(&self) -> usize {
        self.distribution.len()
    }

    /// Mean province ignitions over trials.
    pub fn mean_ignitions(&self) -> f64 {
        self.distribution.mean(RegionScope::Province, Metric::Ignitions)
    }

    /// Query-day strike total taken from the representative trial. A cross-check only.
    pub fn diagnostic_lightning(&self) -> u64 {
        self.distribution
            .representative()
            .map_or(0, |t| t.lightning)
    }

    /// Query-day observed fires taken from the representative trial. Never compared
    /// against the simulation.
    pub fn diagnostic_observed_fires(&self) -> u64 {
        self.distribution
            .representative()
            .map_or(0, |t| t.observed_fires)
    }

    pub fn band(&self, scope: RegionScope, metric: Metric, ranks: &PercentileRanks) -> ConfidenceBand {
        ranks.band(&self.distribution.sorted(scope, metric))
    }

    /// Risk-class counts over reportable cells.
    pub fn risk_counts(&self) -> RiskCounts {
        let mut counts = RiskCounts::default();
        for cell in self.cell_means.iter().filter(|c| c.reportable) {
            counts.add(cell.arrivals, cell.holdovers);
        }
        counts
    }
}

/// Runs the trials of a query day over one season.
pub struct DailyMonteCarloSimulator<'a> {
    table: &'a SeasonTable,
    resolver: HoldoverWindowResolver,
    trials: usize,
}

impl<'a> DailyMonteCarloSimulator<'a> {
    pub fn new(table: &'a SeasonTable, resolver: HoldoverWindowResolver, trials: usize) -> Self {
        Self {
            table,
            resolver,
            trials,
        }
    }

    /// Run all trials of a day from one shared stream, in trial order.
    pub fn simulate_day<R: Rng + ?Sized>(
        &self,
        julian_day: u16,
        rng: &mut R,
    ) -> Result<DayOutcome, SimError> {
        let today_offset = query_day_offset(julian_day)?;
        let mut sums = vec![CellSums::default(); self.table.len()];
        let mut distribution = TrialDistribution::with_capacity(self.trials);

        for _ in 0..self.trials {
            let totals =
                trial::run_trial(rng, self.table, &self.resolver, today_offset, &mut sums);
            distribution.push(totals);
        }

        Ok(self.finish_day(julian_day, distribution, &sums))
    }

    /// Run all trials of a day on the current rayon pool, one derived stream per trial.
    pub fn simulate_day_parallel(
        &self,
        julian_day: u16,
        seed: u64,
    ) -> Result<DayOutcome, SimError> {
        let today_offset = query_day_offset(julian_day)?;
        let cells = self.table.len();
        let year = self.table.year();

        let (sums, mut indexed) = (0..self.trials)
            .into_par_iter()
            .fold(
                || (vec![CellSums::default(); cells], Vec::new()),
                |(mut sums, mut totals): (Vec<CellSums>, Vec<(usize, TrialTotals)>), trial| {
                    let mut rng = streams::trial_rng(seed, year, julian_day, trial);
                    let t = trial::run_trial(
                        &mut rng,
                        self.table,
                        &self.resolver,
                        today_offset,
                        &mut sums,
                    );
                    totals.push((trial, t));
                    (sums, totals)
                },
            )
            .reduce(
                || (vec![CellSums::default(); cells], Vec::new()),
                |(mut sums, mut totals), (other_sums, other_totals)| {
                    for (acc, other) in sums.iter_mut().zip(&other_sums) {
                        acc.merge(other);
                    }
                    totals.extend(other_totals);
                    (sums, totals)
                },
            );

        indexed.sort_unstable_by_key(|(trial, _)| *trial);
        let mut distribution = TrialDistribution::with_capacity(self.trials);
        for (_, totals) in indexed {
            distribution.push(totals);
        }

        Ok(self.finish_day(julian_day, distribution, &sums))
    }

    fn finish_day(
        &self,
        julian_day: u16,
        distribution: TrialDistribution,
        sums: &[CellSums],
    ) -> DayOutcome {
        let year = self.table.year();
        let (month, day) = month_day(year, julian_day);
        let trials = self.trials.max(1) as f64;

        let cell_means = self
            .table
            .cells()
            .iter()
            .zip(sums)
            .map(|(cell, sums)| CellMean {
                cell_id: cell.id(),
                lat: cell.lat(),
                lon: cell.lon(),
                reportable: cell.has_coordinates(),
                arrivals: sums.arrivals as f64 / trials,
                holdovers: sums.holdovers as f64 / trials,
                ignitions: sums.ignitions as f64 / trials,
            })
            .collect();

        let outcome = DayOutcome {
            year,
            julian_day,
            month,
            day,
            distribution,
            cell_means,
        };
        debug!(
            "Day {}-{:03}: {} trials over {} cells, representative lightning={}, observed fires={}",
            year,
            julian_day,
            outcome.trials(),
            self.table.len(),
            outcome.diagnostic_lightning(),
            outcome.diagnostic_observed_fires()
        );
        outcome
    }
}

fn query_day_offset(julian_day: u16) -> Result<usize, SimError> {
    season_offset(i64::from(julian_day)).ok_or_else(|| {
        SimError::invalid_config(format!("query day {julian_day} is outside the fire season"))
    })
}
