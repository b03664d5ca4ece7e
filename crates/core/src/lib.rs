//! Lightning Fire Holdover Simulation Core Library
//!
//! Estimates, per grid cell and day of a fire season, the expected number of new lightning
//! ignitions, newly detected ("arrived") fires and still-smouldering holdover fires.
//! Pre-calibrated per-cell-day ignition and arrival probabilities and observed strike counts
//! drive a Monte Carlo replay of each cell's recent days.
//!
//! ## Pipeline
//!
//! - [`season`] loads one year of per-cell-day rows into a [`SeasonTable`]
//! - [`holdover`] picks how many days back each cell is replayed, from its Drought Code
//! - [`simulation`] runs the trials of a query day
//! - [`aggregate`] sums trial outcomes into province and subregion totals
//! - [`percentile`] turns trial totals into a confidence band
//! - [`report`] writes day summaries and per-cell mean predictions
//!
//! [`run()`] ties these together for a whole input file.

// Input and calendar
pub mod calendar;
pub mod season;

// Monte Carlo engine
pub mod holdover;
pub mod region;
pub mod simulation;

// Reduction and output
pub mod aggregate;
pub mod percentile;
pub mod report;
pub mod risk;

// Run setup
pub mod config;
pub mod error;
pub mod run;

// Re-export the types most callers need
pub use aggregate::{CellOutcome, Metric, RegionScope, SortedSample, TrialDistribution, TrialTotals};
pub use config::RunConfig;
pub use error::{DataQualityIssue, SimError};
pub use holdover::{HoldoverMode, HoldoverWindowResolver};
pub use percentile::{ConfidenceBand, PercentileRanks};
pub use region::Subregion;
pub use report::{CellPrediction, ReportFormat, ReportWriter, SummaryRecord};
pub use risk::RiskClass;
pub use run::{run, RunStats};
pub use season::{CellDayRecord, InvalidRowPolicy, SeasonEnd, SeasonLoader, SeasonRow, SeasonTable};
pub use simulation::{DailyMonteCarloSimulator, DayOutcome, ExecutionMode};
