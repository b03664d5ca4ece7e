//! Per-cell-day input rows and validated records

use crate::error::DataQualityIssue;
use serde::{Deserialize, Serialize};

/// Number of diurnal lightning periods: 00-06, 06-12, 12-18, 18-21 and 21-24 h.
pub const LIGHTNING_PERIODS: usize = 5;

/// Grid cell identifier.
pub type CellId = u32;

/// One parsed input row, before validation.
///
/// Field order follows the input layout. Counts are kept signed so that negative values
/// survive parsing and can be reported as data-quality errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRow {
    pub cell_id: i64,
    pub lat: f64,
    pub lon: f64,
    pub year: i32,
    pub julian_day: i64,
    pub ignition_prob: f64,
    pub arrival0_prob: f64,
    pub arrival1_prob: f64,
    pub lightning_total: i64,
    pub observed_fire_count: i64,
    pub region_code: i32,
    pub lightning_by_period: [i64; LIGHTNING_PERIODS],
    pub dmc: i64,
    pub dc: i64,
}

/// Validated, immutable state of one cell on one season day.
///
/// The default record (all zeros) stands in for days a cell has no row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CellDayRecord {
    /// Natural subregion code
    pub region_code: i32,
    /// Probability that a single strike ignites a fire
    pub ignition_prob: f64,
    /// Probability a new ignition is detected the day it starts
    pub arrival0_prob: f64,
    /// Probability a holdover fire is detected on a later day
    pub arrival1_prob: f64,
    /// Duff Moisture Code
    pub dmc: u32,
    /// Drought Code
    pub dc: u32,
    /// Strikes in the cell for the day
    pub lightning_total: u32,
    /// Strikes per diurnal period, summing to `lightning_total`
    pub lightning_by_period: [u32; LIGHTNING_PERIODS],
    /// Fires actually reported (diagnostic only)
    pub observed_fire_count: u32,
    pub lat: f64,
    pub lon: f64,
}

impl SeasonRow {
    /// Check every record invariant and build the stored record.
    pub fn validate(&self) -> Result<CellDayRecord, DataQualityIssue> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(DataQualityIssue::NonFiniteCoordinate);
        }
        count("cell_id", self.cell_id)?;

        let ignition_prob = probability("ignition_prob", self.ignition_prob)?;
        let arrival0_prob = probability("arrival0_prob", self.arrival0_prob)?;
        let arrival1_prob = probability("arrival1_prob", self.arrival1_prob)?;

        let lightning_total = count("lightning_total", self.lightning_total)?;
        let observed_fire_count = count("observed_fire_count", self.observed_fire_count)?;

        const PERIOD_FIELDS: [&str; LIGHTNING_PERIODS] = [
            "lightning_period0",
            "lightning_period1",
            "lightning_period2",
            "lightning_period3",
            "lightning_period4",
        ];
        let mut lightning_by_period = [0u32; LIGHTNING_PERIODS];
        for (slot, (&raw, field)) in lightning_by_period
            .iter_mut()
            .zip(self.lightning_by_period.iter().zip(PERIOD_FIELDS))
        {
            *slot = count(field, raw)?;
        }
        let period_sum: i64 = self.lightning_by_period.iter().sum();
        if period_sum != self.lightning_total {
            return Err(DataQualityIssue::PeriodSumMismatch {
                total: self.lightning_total,
                period_sum,
            });
        }

        Ok(CellDayRecord {
            region_code: self.region_code,
            ignition_prob,
            arrival0_prob,
            arrival1_prob,
            dmc: fuel_code("dmc", self.dmc)?,
            dc: fuel_code("dc", self.dc)?,
            lightning_total,
            lightning_by_period,
            observed_fire_count,
            lat: self.lat,
            lon: self.lon,
        })
    }
}

fn probability(field: &'static str, value: f64) -> Result<f64, DataQualityIssue> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DataQualityIssue::ProbabilityOutOfRange { field, value })
    }
}

fn count(field: &'static str, value: i64) -> Result<u32, DataQualityIssue> {
    u32::try_from(value).map_err(|_| DataQualityIssue::CountOutOfRange { field, value })
}

fn fuel_code(field: &'static str, value: i64) -> Result<u32, DataQualityIssue> {
    u32::try_from(value).map_err(|_| DataQualityIssue::FuelCodeOutOfRange { field, value })
}
