//! Typed reader over the whitespace-delimited season input
//!
//! Each non-blank line holds the 18 fields of a [`SeasonRow`]. A line that does not parse
//! ends the stream the same way running out of input does; the reader remembers which line
//! it stopped on so the loader can say so. Invalid UTF-8 counts as a malformed line; only
//! a failing read is an error.

use super::record::{SeasonRow, LIGHTNING_PERIODS};
use crate::error::SimError;
use std::io::BufRead;
use std::str::FromStr;

/// Iterator of parsed season rows.
pub struct RowReader<R> {
    input: R,
    line_buf: Vec<u8>,
    line_number: usize,
    malformed_line: Option<usize>,
    finished: bool,
}

impl<R: BufRead> RowReader<R> {
    /// Wrap a buffered input stream.
    pub fn new(input: R) -> Self {
        Self {
            input,
            line_buf: Vec::new(),
            line_number: 0,
            malformed_line: None,
            finished: false,
        }
    }

    /// Line number that stopped the stream, if it stopped on a malformed row.
    pub fn malformed_line(&self) -> Option<usize> {
        self.malformed_line
    }

    /// Number of the most recently read line (1-based).
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for RowReader<R> {
    type Item = Result<SeasonRow, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            self.line_buf.clear();
            match self.input.read_until(b'\n', &mut self.line_buf) {
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(_) => {}
                Err(source) => {
                    self.finished = true;
                    return Some(Err(SimError::io("<input>", source)));
                }
            }
            self.line_number += 1;

            // Bytes that are not text are a malformed line like any other
            if let Ok(line) = std::str::from_utf8(&self.line_buf) {
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(row) = parse_row(line) {
                    return Some(Ok(row));
                }
            }
            self.malformed_line = Some(self.line_number);
            self.finished = true;
            return None;
        }
    }
}

/// Parse one input line into a row. Returns `None` on any tokenisation or number error.
pub fn parse_row(line: &str) -> Option<SeasonRow> {
    let mut fields = line.split_whitespace();

    let cell_id = next_field(&mut fields)?;
    let lat = next_field(&mut fields)?;
    let lon = next_field(&mut fields)?;
    let year = next_field(&mut fields)?;
    let julian_day = next_field(&mut fields)?;
    let ignition_prob = next_field(&mut fields)?;
    let arrival0_prob = next_field(&mut fields)?;
    let arrival1_prob = next_field(&mut fields)?;
    let lightning_total = next_field(&mut fields)?;
    let observed_fire_count = next_field(&mut fields)?;
    let region_code = next_field(&mut fields)?;
    let mut lightning_by_period = [0i64; LIGHTNING_PERIODS];
    for slot in &mut lightning_by_period {
        *slot = next_field(&mut fields)?;
    }
    let dmc = next_field(&mut fields)?;
    let dc = next_field(&mut fields)?;

    if fields.next().is_some() {
        return None;
    }

    Some(SeasonRow {
        cell_id,
        lat,
        lon,
        year,
        julian_day,
        ignition_prob,
        arrival0_prob,
        arrival1_prob,
        lightning_total,
        observed_fire_count,
        region_code,
        lightning_by_period,
        dmc,
        dc,
    })
}

fn next_field<'a, T: FromStr>(fields: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    fields.next()?.parse().ok()
}
