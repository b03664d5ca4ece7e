//! Per-cell risk classes for mapped predictions
//!
//! Mean arrivals and holdovers per cell are binned into five classes. Holdovers use wider
//! lower bins since a pool of undetected fires builds up over several days.

use serde::{Deserialize, Serialize};

/// Thresholds (exclusive lower bounds) for Moderate, High, Very High and Extreme arrivals.
const ARRIVAL_THRESHOLDS: [f64; 4] = [0.003, 0.01, 0.03, 0.10];

/// Thresholds (exclusive lower bounds) for Moderate, High, Very High and Extreme holdovers.
const HOLDOVER_THRESHOLDS: [f64; 4] = [0.005, 0.02, 0.05, 0.10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskClass {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl RiskClass {
    /// All classes, lowest first.
    pub const ALL: [RiskClass; 5] = [
        Self::Low,
        Self::Moderate,
        Self::High,
        Self::VeryHigh,
        Self::Extreme,
    ];

    pub fn for_arrivals(mean: f64) -> Self {
        Self::bin(mean, &ARRIVAL_THRESHOLDS)
    }

    pub fn for_holdovers(mean: f64) -> Self {
        Self::bin(mean, &HOLDOVER_THRESHOLDS)
    }

    fn bin(mean: f64, thresholds: &[f64; 4]) -> Self {
        let above = thresholds.iter().filter(|&&t| mean > t).count();
        Self::ALL[above]
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very-high",
            Self::Extreme => "extreme",
        }
    }
}

/// Number of cells in each class for one query day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskCounts {
    pub arrivals: [usize; 5],
    pub holdovers: [usize; 5],
}

impl RiskCounts {
    pub fn add(&mut self, mean_arrivals: f64, mean_holdovers: f64) {
        self.arrivals[RiskClass::for_arrivals(mean_arrivals).index()] += 1;
        self.holdovers[RiskClass::for_holdovers(mean_holdovers).index()] += 1;
    }
}
