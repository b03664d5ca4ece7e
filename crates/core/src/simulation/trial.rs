//! Per-cell holdover state machine
//!
//! A trial replays every cell's lookback window one day at a time. Each day:
//!
//! 1. fires carried in the holdover pool may arrive (`arrival1_prob` each), except on the
//!    window's first day, which starts with an empty pool
//! 2. each strike may ignite (`ignition_prob` each)
//! 3. each new ignition is placed in a diurnal period in proportion to that period's strikes
//!    and may arrive the same day with `arrival0_prob` scaled by the period weight
//! 4. `holdover = holdover - carried arrivals + ignitions - same-day arrivals`
//!
//! Only the last (query) day of the window feeds the trial's output.

use crate::aggregate::{CellOutcome, TrialTotals};
use crate::holdover::HoldoverWindowResolver;
use crate::season::{CellDayRecord, CellSeries, SeasonTable, LIGHTNING_PERIODS};
use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Same-day detection weight per diurnal period. Late strikes leave less daylight to be seen.
pub const PERIOD_ARRIVAL_WEIGHTS: [f64; LIGHTNING_PERIODS] = [1.0, 1.0, 1.0, 0.8, 0.2];

/// Per-cell sums of query-day outcomes over trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellSums {
    pub ignitions: u64,
    pub arrivals: u64,
    pub holdovers: u64,
}

impl CellSums {
    pub fn add(&mut self, outcome: &CellOutcome) {
        self.ignitions += outcome.ignitions;
        self.arrivals += outcome.arrivals;
        self.holdovers += outcome.holdovers;
    }

    pub fn merge(&mut self, other: &CellSums) {
        self.ignitions += other.ignitions;
        self.arrivals += other.arrivals;
        self.holdovers += other.holdovers;
    }
}

/// Binomial(n, p) draw. Degenerate cases return without touching the stream.
pub fn binomial<R: Rng + ?Sized>(rng: &mut R, n: u64, p: f64) -> u64 {
    if n == 0 || p <= 0.0 {
        return 0;
    }
    if p >= 1.0 {
        return n;
    }
    match Binomial::new(n, p) {
        Ok(dist) => dist.sample(rng),
        // Only reachable for NaN, which record validation rules out
        Err(_) => 0,
    }
}

/// Diurnal period a strike position falls in, given cumulative period counts.
fn diurnal_period(counts: &[u32; LIGHTNING_PERIODS], position: f64) -> usize {
    let mut cumulative = 0.0;
    for (period, &count) in counts.iter().enumerate() {
        cumulative += f64::from(count);
        if position < cumulative {
            return period;
        }
    }
    LIGHTNING_PERIODS - 1
}

/// How many of today's new ignitions are detected today.
pub fn same_day_arrivals<R: Rng + ?Sized>(
    rng: &mut R,
    record: &CellDayRecord,
    ignitions: u64,
) -> u64 {
    if ignitions == 0 || record.arrival0_prob <= 0.0 {
        return 0;
    }
    let period_total: u32 = record.lightning_by_period.iter().sum();
    let mut arrivals = 0;
    for _ in 0..ignitions {
        let position = rng.random::<f64>() * f64::from(period_total);
        let period = diurnal_period(&record.lightning_by_period, position);
        let arrival_prob = record.arrival0_prob * PERIOD_ARRIVAL_WEIGHTS[period];
        if rng.random::<f64>() < arrival_prob {
            arrivals += 1;
        }
    }
    arrivals
}

/// Replay one cell over `window` days ending on `today_offset`.
pub fn replay_cell<R: Rng + ?Sized>(
    rng: &mut R,
    cell: &CellSeries,
    today_offset: usize,
    window: usize,
) -> CellOutcome {
    let start = today_offset.saturating_sub(window);
    let mut holdovers = 0u64;
    let mut outcome = CellOutcome::default();

    for offset in start..=today_offset {
        let record = cell.day(offset);
        let carried_arrivals = if offset > start {
            binomial(rng, holdovers, record.arrival1_prob)
        } else {
            0
        };
        let ignitions = binomial(rng, u64::from(record.lightning_total), record.ignition_prob);
        let new_arrivals = same_day_arrivals(rng, record, ignitions);

        holdovers = (holdovers - carried_arrivals) + (ignitions - new_arrivals);
        outcome = CellOutcome {
            ignitions,
            arrivals: carried_arrivals + new_arrivals,
            holdovers,
        };
    }
    outcome
}

/// Run one trial over every cell of the table.
///
/// `cell_sums` is indexed like `table.cells()` and receives each cell's outcome.
pub fn run_trial<R: Rng + ?Sized>(
    rng: &mut R,
    table: &SeasonTable,
    resolver: &HoldoverWindowResolver,
    today_offset: usize,
    cell_sums: &mut [CellSums],
) -> TrialTotals {
    let mut totals = TrialTotals::default();
    for (cell, sums) in table.cells().iter().zip(cell_sums.iter_mut()) {
        let today = cell.day(today_offset);
        let window = resolver.resolve(today.dc, today_offset);
        let outcome = replay_cell(rng, cell, today_offset, window);

        sums.add(&outcome);
        totals.record(cell.subregion(), &outcome);
        totals.lightning += u64::from(today.lightning_total);
        totals.observed_fires += u64::from(today.observed_fire_count);
    }
    totals
}
