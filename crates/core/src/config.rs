//! Run configuration
//!
//! [`RunConfig`] gathers every setting of a run. [`RunConfig::validate`] is called once,
//! before any input is read, and returns the percentile ranks the run will use so that a bad
//! confidence level fails at startup rather than on the first reported day.

use crate::calendar::{SEASON_END_JULIAN, SEASON_START_JULIAN};
use crate::error::SimError;
use crate::holdover::HoldoverMode;
use crate::percentile::PercentileRanks;
use crate::report::ReportFormat;
use crate::season::InvalidRowPolicy;
use crate::simulation::{ExecutionMode, DEFAULT_TRIALS};
use serde::{Deserialize, Serialize};

/// Default confidence level in percent.
pub const DEFAULT_CONFIDENCE_PERCENT: f64 = 95.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed of the pseudorandom stream(s)
    pub seed: u64,
    /// First query day (julian, inclusive)
    pub start_julian_day: u16,
    /// Last query day (julian, inclusive)
    pub end_julian_day: u16,
    pub holdover: HoldoverMode,
    pub confidence_percent: f64,
    /// Trials per query day
    pub trials: usize,
    pub execution: ExecutionMode,
    pub invalid_rows: InvalidRowPolicy,
    pub format: ReportFormat,
}

impl RunConfig {
    /// Config for a day range with every other setting at its default.
    pub fn new(seed: u64, start_julian_day: u16, end_julian_day: u16) -> Self {
        Self {
            seed,
            start_julian_day,
            end_julian_day,
            holdover: HoldoverMode::Automatic,
            confidence_percent: DEFAULT_CONFIDENCE_PERCENT,
            trials: DEFAULT_TRIALS,
            execution: ExecutionMode::Sequential,
            invalid_rows: InvalidRowPolicy::Reject,
            format: ReportFormat::Fixed,
        }
    }

    /// Check every setting and compute the percentile ranks.
    pub fn validate(&self) -> Result<PercentileRanks, SimError> {
        let season = SEASON_START_JULIAN..=SEASON_END_JULIAN;
        for (name, day) in [
            ("start day", self.start_julian_day),
            ("end day", self.end_julian_day),
        ] {
            if !season.contains(&day) {
                return Err(SimError::invalid_config(format!(
                    "{name} {day} is outside the fire season ({SEASON_START_JULIAN}..={SEASON_END_JULIAN})"
                )));
            }
        }
        if self.start_julian_day > self.end_julian_day {
            return Err(SimError::invalid_config(format!(
                "start day {} is after end day {}",
                self.start_julian_day, self.end_julian_day
            )));
        }
        if let ExecutionMode::Parallel { threads: Some(0) } = self.execution {
            return Err(SimError::invalid_config("thread count must be at least 1"));
        }
        PercentileRanks::new(self.trials, self.confidence_percent)
    }
}
