//! Error types for season loading, configuration and report output
//!
//! All fallible library entry points return [`SimError`]. The variants keep the three failure
//! families apart so callers can tell a missing file from a bad record from a bad setting:
//! - `Io` - a file could not be opened, read or written
//! - `DataQuality` - a loaded row violates a record invariant
//! - `InvalidConfig` - a run setting was rejected before simulation started

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Reason a season row was rejected by the loader.
#[derive(Debug, Clone, PartialEq)]
pub enum DataQualityIssue {
    /// A probability field is outside `[0, 1]` or not finite.
    ProbabilityOutOfRange {
        /// Field name as it appears in the input layout
        field: &'static str,
        /// Offending value
        value: f64,
    },
    /// A count field (cell id, strikes, fires) is negative or too large.
    CountOutOfRange {
        /// Field name as it appears in the input layout
        field: &'static str,
        /// Offending value
        value: i64,
    },
    /// A fuel moisture code (DMC or DC) is negative or too large.
    FuelCodeOutOfRange {
        /// Field name as it appears in the input layout
        field: &'static str,
        /// Offending value
        value: i64,
    },
    /// The five diurnal period counts do not add up to the daily strike total.
    PeriodSumMismatch {
        /// Daily strike total
        total: i64,
        /// Sum of the period counts
        period_sum: i64,
    },
    /// Latitude or longitude is not a finite number.
    NonFiniteCoordinate,
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbabilityOutOfRange { field, value } => {
                write!(f, "{field} must lie in [0, 1], got {value}")
            }
            Self::CountOutOfRange { field, value } => {
                write!(f, "{field} must lie in [0, {}], got {value}", u32::MAX)
            }
            Self::FuelCodeOutOfRange { field, value } => {
                write!(f, "fuel code {field} must lie in [0, {}], got {value}", u32::MAX)
            }
            Self::PeriodSumMismatch { total, period_sum } => write!(
                f,
                "lightning periods sum to {period_sum} but the daily total is {total}"
            ),
            Self::NonFiniteCoordinate => write!(f, "latitude/longitude must be finite"),
        }
    }
}

/// Library error type.
#[derive(Debug)]
pub enum SimError {
    /// File could not be opened, read or written.
    Io {
        /// Path involved, or a stream label such as `<input>`
        path: PathBuf,
        /// Underlying I/O error
        source: io::Error,
    },
    /// A season row failed record validation.
    DataQuality {
        /// 1-based line number in the input stream
        line: usize,
        /// Cell id of the row
        cell_id: i64,
        /// Julian day of the row
        julian_day: i64,
        /// What was wrong
        issue: DataQualityIssue,
    },
    /// A run setting was rejected at startup.
    InvalidConfig(String),
}

impl SimError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error with a message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "I/O error on {}: {source}", path.display()),
            Self::DataQuality {
                line,
                cell_id,
                julian_day,
                issue,
            } => write!(
                f,
                "data quality error at line {line} (cell {cell_id}, julian day {julian_day}): {issue}"
            ),
            Self::InvalidConfig(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
