//! Season table and the loader that fills it
//!
//! A [`SeasonTable`] holds every recorded cell-day of one year. Cells are stored densely,
//! sorted by id, with an `FxHashMap` index for id lookups; each cell carries one default
//! record per season day so day lookups never miss. Tables are built fresh for each season,
//! so nothing from a previous year can leak into the next.

use super::reader::RowReader;
use super::record::{CellDayRecord, CellId, SeasonRow, LIGHTNING_PERIODS};
use crate::calendar::{season_offset, SEASON_DAYS};
use crate::error::{DataQualityIssue, SimError};
use crate::region::Subregion;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, info, warn};

/// What to do with a row that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidRowPolicy {
    /// Abort loading with a data-quality error
    #[default]
    Reject,
    /// Log the row at `warn` and drop it
    Skip,
}

/// How the input stream ended a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonEnd {
    /// A row for a different year was reached; it starts the next season.
    YearChange {
        /// Year of the first row of the next season
        next_year: i32,
    },
    /// Input ran out.
    EndOfStream,
    /// A malformed line ended the input.
    Malformed {
        /// 1-based line number of the malformed line
        line: usize,
    },
}

/// All season-day records of one grid cell.
#[derive(Debug, Clone)]
pub struct CellSeries {
    id: CellId,
    lat: f64,
    lon: f64,
    region_code: i32,
    days: Vec<CellDayRecord>,
}

impl CellSeries {
    fn new(id: CellId) -> Self {
        Self {
            id,
            lat: 0.0,
            lon: 0.0,
            region_code: 0,
            days: vec![CellDayRecord::default(); SEASON_DAYS],
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    /// Last latitude seen for the cell this season.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Last longitude seen for the cell this season.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    pub fn subregion(&self) -> Subregion {
        Subregion::classify(self.region_code, self.lon)
    }

    /// Whether the cell has real coordinates, not the zero default.
    pub fn has_coordinates(&self) -> bool {
        self.lat != 0.0 || self.lon != 0.0
    }

    /// Record for a season day offset. Offsets past the season return the default record.
    pub fn day(&self, offset: usize) -> &CellDayRecord {
        static EMPTY: CellDayRecord = CellDayRecord {
            region_code: 0,
            ignition_prob: 0.0,
            arrival0_prob: 0.0,
            arrival1_prob: 0.0,
            dmc: 0,
            dc: 0,
            lightning_total: 0,
            lightning_by_period: [0; LIGHTNING_PERIODS],
            observed_fire_count: 0,
            lat: 0.0,
            lon: 0.0,
        };
        self.days.get(offset).unwrap_or(&EMPTY)
    }
}

/// One season of cell-day records.
#[derive(Debug, Clone)]
pub struct SeasonTable {
    year: i32,
    cells: Vec<CellSeries>,
    index: FxHashMap<CellId, usize>,
    recorded_rows: usize,
    skipped_rows: usize,
    out_of_season_rows: usize,
    end: SeasonEnd,
}

impl SeasonTable {
    /// Empty table for a year.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            cells: Vec::new(),
            index: FxHashMap::default(),
            recorded_rows: 0,
            skipped_rows: 0,
            out_of_season_rows: 0,
            end: SeasonEnd::EndOfStream,
        }
    }

    /// Validate a row and store it.
    ///
    /// Rows whose julian day falls outside the season are accepted but not stored.
    /// Returns `Ok(false)` for such rows.
    pub fn insert(&mut self, row: &SeasonRow) -> Result<bool, DataQualityIssue> {
        let Some(offset) = season_offset(row.julian_day) else {
            self.out_of_season_rows += 1;
            return Ok(false);
        };
        let record = row.validate()?;
        // validate() has already range-checked the id
        let id = row.cell_id as CellId;

        let cells = &mut self.cells;
        let slot = *self.index.entry(id).or_insert_with(|| {
            cells.push(CellSeries::new(id));
            cells.len() - 1
        });
        let cell = &mut self.cells[slot];
        cell.lat = record.lat;
        cell.lon = record.lon;
        cell.region_code = record.region_code;
        cell.days[offset] = record;
        self.recorded_rows += 1;
        Ok(true)
    }

    /// Sort cells by id and rebuild the index. Called once loading is done.
    fn finish(&mut self, end: SeasonEnd) {
        self.cells.sort_unstable_by_key(CellSeries::id);
        self.index = self
            .cells
            .iter()
            .enumerate()
            .map(|(slot, cell)| (cell.id, slot))
            .collect();
        self.end = end;
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Cells in ascending id order.
    pub fn cells(&self) -> &[CellSeries] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Rows stored in the table.
    pub fn recorded_rows(&self) -> usize {
        self.recorded_rows
    }

    /// Rows dropped by [`InvalidRowPolicy::Skip`].
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Rows read whose julian day was outside the season.
    pub fn out_of_season_rows(&self) -> usize {
        self.out_of_season_rows
    }

    pub fn end(&self) -> SeasonEnd {
        self.end
    }

    /// Total strikes across every cell and day of the season.
    pub fn lightning_total(&self) -> u64 {
        self.cells
            .iter()
            .flat_map(|cell| cell.days.iter())
            .map(|day| u64::from(day.lightning_total))
            .sum()
    }
}

/// Loads consecutive seasons from a year-grouped row stream.
pub struct SeasonLoader<R: BufRead> {
    reader: RowReader<R>,
    /// Row read ahead past a season boundary, with its line number
    pending: Option<(SeasonRow, usize)>,
    policy: InvalidRowPolicy,
}

impl<R: BufRead> SeasonLoader<R> {
    pub fn new(input: R, policy: InvalidRowPolicy) -> Self {
        Self {
            reader: RowReader::new(input),
            pending: None,
            policy,
        }
    }

    fn next_row(&mut self) -> Result<Option<(SeasonRow, usize)>, SimError> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }
        match self.reader.next() {
            Some(Ok(row)) => Ok(Some((row, self.reader.line_number()))),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    /// Load the next season, or `None` once the stream is exhausted.
    ///
    /// Consumes rows while the year stays the same. The first row of the following year is
    /// held back and starts the next call.
    pub fn next_season(&mut self) -> Result<Option<SeasonTable>, SimError> {
        let Some(first) = self.next_row()? else {
            return Ok(None);
        };
        let year = first.0.year;
        let mut table = SeasonTable::new(year);
        let mut next = Some(first);

        let end = loop {
            let Some((row, line)) = next.take() else {
                break match self.reader.malformed_line() {
                    Some(line) => SeasonEnd::Malformed { line },
                    None => SeasonEnd::EndOfStream,
                };
            };
            if row.year != year {
                let next_year = row.year;
                self.pending = Some((row, line));
                break SeasonEnd::YearChange { next_year };
            }

            if let Err(issue) = table.insert(&row) {
                match self.policy {
                    InvalidRowPolicy::Reject => {
                        return Err(SimError::DataQuality {
                            line,
                            cell_id: row.cell_id,
                            julian_day: row.julian_day,
                            issue,
                        });
                    }
                    InvalidRowPolicy::Skip => {
                        warn!(
                            "Skipping invalid row at line {} (cell {}, day {}): {}",
                            line, row.cell_id, row.julian_day, issue
                        );
                        table.skipped_rows += 1;
                    }
                }
            }
            next = self.next_row()?;
        };

        if let SeasonEnd::Malformed { line } = end {
            warn!("Input ended on malformed line {}; treating as end of data", line);
        }
        table.finish(end);

        info!(
            "Loaded season {}: {} cells, {} rows recorded, {} out of season, {} skipped, {} strikes",
            table.year,
            table.len(),
            table.recorded_rows,
            table.out_of_season_rows,
            table.skipped_rows,
            table.lightning_total()
        );
        debug!("Season {} ended with {:?}", table.year, table.end);

        Ok(Some(table))
    }
}
