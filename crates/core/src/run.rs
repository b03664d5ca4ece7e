//! Whole-run orchestration: seasons → query days → reports

use crate::aggregate::{Metric, RegionScope};
use crate::config::RunConfig;
use crate::error::SimError;
use crate::holdover::HoldoverWindowResolver;
use crate::report::ReportWriter;
use crate::risk::RiskClass;
use crate::season::SeasonLoader;
use crate::simulation::{streams, DailyMonteCarloSimulator, ExecutionMode};
use rayon::ThreadPoolBuilder;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub seasons: usize,
    pub days: usize,
    pub cell_records: usize,
    /// Input rows stored across all seasons
    pub rows_recorded: usize,
    /// Rows outside the fire season or dropped as invalid
    pub rows_ignored: usize,
}

/// Simulate every season in `input` over the configured day range.
///
/// The configuration is validated before the first row is read.
pub fn run<R, S, C>(config: &RunConfig, input: R, summary: S, cells: C) -> Result<RunStats, SimError>
where
    R: BufRead,
    S: Write,
    C: Write,
{
    let ranks = config.validate()?;
    info!(
        "Run: seed={}, days {}..={}, {} trials, {}% band (ranks {}/{}), holdover {:?}, {:?}",
        config.seed,
        config.start_julian_day,
        config.end_julian_day,
        ranks.trials(),
        ranks.confidence_percent(),
        ranks.low(),
        ranks.high(),
        config.holdover,
        config.execution
    );

    let pool = match config.execution {
        ExecutionMode::Sequential => None,
        ExecutionMode::Parallel { threads } => {
            let mut builder = ThreadPoolBuilder::new();
            if let Some(threads) = threads {
                builder = builder.num_threads(threads);
            }
            Some(builder.build().map_err(|e| {
                SimError::invalid_config(format!("could not start worker pool: {e}"))
            })?)
        }
    };

    let mut rng = streams::sequential_rng(config.seed);
    let mut loader = SeasonLoader::new(input, config.invalid_rows);
    let mut writer = ReportWriter::new(summary, cells, config.format);
    let resolver = HoldoverWindowResolver::new(config.holdover);
    let mut stats = RunStats::default();

    while let Some(table) = loader.next_season()? {
        stats.seasons += 1;
        stats.rows_recorded += table.recorded_rows();
        stats.rows_ignored += table.out_of_season_rows() + table.skipped_rows();
        if table.is_empty() {
            warn!("Season {} has no in-season rows; every day reports zero", table.year());
        }
        let simulator = DailyMonteCarloSimulator::new(&table, resolver, config.trials);
        let mut season_lightning = 0u64;

        for julian_day in config.start_julian_day..=config.end_julian_day {
            let outcome = match &pool {
                Some(pool) => {
                    pool.install(|| simulator.simulate_day_parallel(julian_day, config.seed))?
                }
                None => simulator.simulate_day(julian_day, &mut rng)?,
            };

            let written = writer.write_day(&outcome, &ranks)?;
            stats.days += 1;
            stats.cell_records += written;
            season_lightning += outcome.diagnostic_lightning();

            let hold = outcome.band(RegionScope::Province, Metric::Holdovers, &ranks);
            let arr = outcome.band(RegionScope::Province, Metric::Arrivals, &ranks);
            info!(
                "{}-{:02}-{:02} (day {}): mean ignitions {:.3}, holdovers [{}, {}], arrivals [{}, {}]",
                outcome.year,
                outcome.month,
                outcome.day,
                julian_day,
                outcome.mean_ignitions(),
                hold.low,
                hold.high,
                arr.low,
                arr.high
            );
            for scope in RegionScope::ALL.into_iter().skip(1) {
                let hold = outcome.band(scope, Metric::Holdovers, &ranks);
                let arr = outcome.band(scope, Metric::Arrivals, &ranks);
                debug!(
                    "  {}: holdovers [{}, {}], arrivals [{}, {}]",
                    scope.label(),
                    hold.low,
                    hold.high,
                    arr.low,
                    arr.high
                );
            }
            let risk = outcome.risk_counts();
            for class in RiskClass::ALL {
                debug!(
                    "  {} risk: {} cells by arrivals, {} by holdovers",
                    class.label(),
                    risk.arrivals[class.index()],
                    risk.holdovers[class.index()]
                );
            }
        }

        info!(
            "Finished season {}: {} query-day strikes, input ended by {:?}",
            table.year(),
            season_lightning,
            table.end()
        );
    }

    info!(
        "Run complete: {} seasons, {} days, {} cell records ({} rows used, {} ignored)",
        stats.seasons, stats.days, stats.cell_records, stats.rows_recorded, stats.rows_ignored
    );
    Ok(stats)
}
