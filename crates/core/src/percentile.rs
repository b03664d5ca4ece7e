//! Empirical confidence bands from Monte Carlo trials
//!
//! For `n` trials and confidence level `C` percent the band is read at 1-based ranks
//!
//! ```text
//! low  = floor(n * (1 - C/100) / 2)
//! high = n - low
//! ```
//!
//! of the ascending trial values. Both ranks must fall in `[1, n]`; the check happens when
//! the ranks are built, so a run can never reach a day with an unusable band.

use crate::aggregate::SortedSample;
use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Slack absorbed before flooring, so `10 * (1 - 0.8) / 2` lands on 1, not 0.999...
const RANK_EPSILON: f64 = 1e-9;

/// Low/high values of a confidence band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub low: u64,
    pub high: u64,
}

/// Validated rank pair for a trial count and confidence level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileRanks {
    trials: usize,
    confidence_percent: f64,
    low: usize,
    high: usize,
}

impl PercentileRanks {
    /// Compute and validate ranks.
    pub fn new(trials: usize, confidence_percent: f64) -> Result<Self, SimError> {
        if trials == 0 {
            return Err(SimError::invalid_config("trial count must be at least 1"));
        }
        if !confidence_percent.is_finite() || confidence_percent <= 0.0 || confidence_percent >= 100.0
        {
            return Err(SimError::invalid_config(format!(
                "confidence level must lie strictly between 0 and 100 percent, got {confidence_percent}"
            )));
        }

        let tail = trials as f64 * (1.0 - confidence_percent / 100.0) / 2.0;
        let low = (tail + RANK_EPSILON).floor() as usize;
        let high = trials - low.min(trials);

        let valid = 1..=trials;
        if !valid.contains(&low) || !valid.contains(&high) || low > high {
            return Err(SimError::invalid_config(format!(
                "{confidence_percent}% confidence with {trials} trials gives percentile ranks \
                 ({low}, {high}) outside [1, {trials}]; use more trials or a lower confidence level"
            )));
        }

        Ok(Self {
            trials,
            confidence_percent,
            low,
            high,
        })
    }

    /// 1-based low rank.
    pub fn low(&self) -> usize {
        self.low
    }

    /// 1-based high rank.
    pub fn high(&self) -> usize {
        self.high
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    pub fn confidence_percent(&self) -> f64 {
        self.confidence_percent
    }

    /// Read the band from a sorted sample of this run's trial count.
    ///
    /// A sample of a different length is read at the same ranks, clamped to its ends.
    pub fn band(&self, sample: &SortedSample) -> ConfidenceBand {
        if sample.is_empty() {
            return ConfidenceBand::default();
        }
        let len = sample.len();
        let value_at = |rank: usize| sample.rank(rank.min(len)).unwrap_or_default();
        ConfidenceBand {
            low: value_at(self.low),
            high: value_at(self.high),
        }
    }
}
