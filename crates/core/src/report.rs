//! Day summaries and per-cell predictions
//!
//! Two streams per run: one summary line per query day with province and subregion bands,
//! and one line per reportable cell per query day with trial means. Both are written either
//! as fixed-width text or as JSON lines, and flushed at the end of each day.

use crate::aggregate::{Metric, RegionScope};
use crate::error::SimError;
use crate::percentile::{ConfidenceBand, PercentileRanks};
use crate::region::Subregion;
use crate::risk::RiskClass;
use crate::season::CellId;
use crate::simulation::DayOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Fixed-width whitespace-separated columns
    #[default]
    Fixed,
    /// One JSON object per line
    JsonLines,
}

/// Holdover and arrival bands of one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBands {
    pub holdovers: ConfidenceBand,
    pub arrivals: ConfidenceBand,
}

/// One query day's regional summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub year: i32,
    pub julian_day: u16,
    pub month: u8,
    pub day: u8,
    pub mean_ignitions: f64,
    /// Strike total from the representative trial
    pub lightning_total: u64,
    pub province: RegionBands,
    pub slopes: RegionBands,
    pub west_boreal: RegionBands,
    pub east_boreal: RegionBands,
}

impl SummaryRecord {
    pub fn from_outcome(outcome: &DayOutcome, ranks: &PercentileRanks) -> Self {
        let bands = |scope| RegionBands {
            holdovers: outcome.band(scope, Metric::Holdovers, ranks),
            arrivals: outcome.band(scope, Metric::Arrivals, ranks),
        };
        Self {
            year: outcome.year,
            julian_day: outcome.julian_day,
            month: outcome.month,
            day: outcome.day,
            mean_ignitions: outcome.mean_ignitions(),
            lightning_total: outcome.diagnostic_lightning(),
            province: bands(RegionScope::Province),
            slopes: bands(RegionScope::Subregion(Subregion::Slopes)),
            west_boreal: bands(RegionScope::Subregion(Subregion::WestBoreal)),
            east_boreal: bands(RegionScope::Subregion(Subregion::EastBoreal)),
        }
    }

    /// Fixed-width line, without the trailing newline.
    pub fn fixed_width(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SummaryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:4} {:3} {:2} {:2} {:6.4}  {:7}    {:3} {:3}  {:3} {:3}",
            self.year,
            self.julian_day,
            self.month,
            self.day,
            self.mean_ignitions,
            self.lightning_total,
            self.province.holdovers.low,
            self.province.holdovers.high,
            self.province.arrivals.low,
            self.province.arrivals.high,
        )?;
        for bands in [&self.slopes, &self.west_boreal, &self.east_boreal] {
            write!(
                f,
                "    {:3} {:3}  {:3} {:3}",
                bands.holdovers.low, bands.holdovers.high, bands.arrivals.low, bands.arrivals.high
            )?;
        }
        Ok(())
    }
}

/// Trial-mean prediction for one cell on one query day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellPrediction {
    pub cell_id: CellId,
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub lat: f64,
    pub lon: f64,
    pub mean_arrivals: f64,
    pub mean_holdovers: f64,
    pub mean_ignitions: f64,
    pub arrival_risk: RiskClass,
    pub holdover_risk: RiskClass,
}

impl CellPrediction {
    /// Predictions for every reportable cell of a day, in cell id order.
    pub fn from_outcome(outcome: &DayOutcome) -> Vec<Self> {
        outcome
            .cell_means
            .iter()
            .filter(|cell| cell.reportable)
            .map(|cell| Self {
                cell_id: cell.cell_id,
                year: outcome.year,
                month: outcome.month,
                day: outcome.day,
                lat: cell.lat,
                lon: cell.lon,
                mean_arrivals: cell.arrivals,
                mean_holdovers: cell.holdovers,
                mean_ignitions: cell.ignitions,
                arrival_risk: RiskClass::for_arrivals(cell.arrivals),
                holdover_risk: RiskClass::for_holdovers(cell.holdovers),
            })
            .collect()
    }

    /// Fixed-width line, without the trailing newline.
    pub fn fixed_width(&self) -> String {
        format!(
            "{:5} {:4} {:2} {:2} {:9.3} {:9.3} {:7.5} {:7.5} {:7.5}",
            self.cell_id,
            self.year,
            self.month,
            self.day,
            self.lat,
            self.lon,
            self.mean_arrivals,
            self.mean_holdovers,
            self.mean_ignitions
        )
    }
}

/// Writes summary and per-cell reports.
pub struct ReportWriter<S: Write, C: Write> {
    summary: S,
    cells: C,
    format: ReportFormat,
}

impl<S: Write, C: Write> ReportWriter<S, C> {
    pub fn new(summary: S, cells: C, format: ReportFormat) -> Self {
        Self {
            summary,
            cells,
            format,
        }
    }

    /// Write one day to both streams and flush them. Returns the number of cell lines.
    pub fn write_day(
        &mut self,
        outcome: &DayOutcome,
        ranks: &PercentileRanks,
    ) -> Result<usize, SimError> {
        let summary = SummaryRecord::from_outcome(outcome, ranks);
        let predictions = CellPrediction::from_outcome(outcome);

        match self.format {
            ReportFormat::Fixed => {
                writeln!(self.summary, "{}", summary.fixed_width())
                    .map_err(|e| SimError::io("<summary>", e))?;
                for prediction in &predictions {
                    writeln!(self.cells, "{}", prediction.fixed_width())
                        .map_err(|e| SimError::io("<cells>", e))?;
                }
            }
            ReportFormat::JsonLines => {
                write_json_line(&mut self.summary, &summary, "<summary>")?;
                for prediction in &predictions {
                    write_json_line(&mut self.cells, prediction, "<cells>")?;
                }
            }
        }

        self.summary
            .flush()
            .map_err(|e| SimError::io("<summary>", e))?;
        self.cells.flush().map_err(|e| SimError::io("<cells>", e))?;
        Ok(predictions.len())
    }
}

fn write_json_line<W: Write, T: Serialize>(
    out: &mut W,
    value: &T,
    label: &str,
) -> Result<(), SimError> {
    serde_json::to_writer(&mut *out, value).map_err(|e| SimError::io(label, e.into()))?;
    out.write_all(b"\n").map_err(|e| SimError::io(label, e))
}
