//! Season input: row parsing, record validation and the per-season table
//!
//! The input is a stream of per-cell-day rows grouped by year. [`SeasonLoader`] turns it into
//! one [`SeasonTable`] per year; simulation code only ever reads the table.

pub mod reader;
pub mod record;
pub mod store;

pub use reader::RowReader;
pub use record::{CellDayRecord, CellId, SeasonRow, LIGHTNING_PERIODS};
pub use store::{CellSeries, InvalidRowPolicy, SeasonEnd, SeasonLoader, SeasonTable};
