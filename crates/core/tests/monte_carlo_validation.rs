//! End-to-end validation of the holdover Monte Carlo engine
//!
//! Drives whole runs through in-memory inputs and outputs:
//! - deterministic single-cell scenario with certain ignition and no detection
//! - byte-identical reruns for a fixed seed
//! - shrinking error of the mean ignition estimate as trials grow
//! - startup rejection of unusable settings

use approx::assert_relative_eq;
use ltg_holdover_core::{
    run, simulation::streams::sequential_rng, DailyMonteCarloSimulator, ExecutionMode,
    HoldoverMode, HoldoverWindowResolver, InvalidRowPolicy, Metric, RegionScope, ReportFormat,
    RunConfig, SeasonLoader, SeasonTable, SimError, Subregion,
};
use std::io::Cursor;

/// One input line: cell lat lon year jd pign parr0 parr1 ltg fires region p0..p4 dmc dc
#[allow(clippy::too_many_arguments)]
fn row(
    cell: u32,
    lon: f64,
    year: i32,
    jd: u16,
    ignition: f64,
    arrival0: f64,
    arrival1: f64,
    periods: [u32; 5],
    region: i32,
    dc: u32,
) -> String {
    let total: u32 = periods.iter().sum();
    format!(
        "{cell} 55.500 {lon:.3} {year} {jd} {ignition} {arrival0} {arrival1} {total} 0 {region} {} {} {} {} {} 40 {dc}\n",
        periods[0], periods[1], periods[2], periods[3], periods[4]
    )
}

/// A small multi-cell, two-season input with a mix of regions and dryness.
fn mixed_input() -> String {
    let mut input = String::new();
    for year in [2018, 2019] {
        for jd in 150..=175u16 {
            let strikes = u32::from(jd % 7) * 3;
            input.push_str(&row(11, -118.2, year, jd, 0.05, 0.4, 0.2, [0, strikes, strikes, 1, 0], 3, 150));
            input.push_str(&row(12, -111.0, year, jd, 0.08, 0.3, 0.15, [strikes, 0, 2, 0, strikes], 5, 420));
            input.push_str(&row(13, -116.5, year, jd, 0.03, 0.5, 0.25, [1, 2, 3, 4, 5], 9, 260));
        }
    }
    input
}

fn run_to_strings(config: &RunConfig, input: &str) -> (String, String) {
    let mut summary = Vec::new();
    let mut cells = Vec::new();
    run(config, Cursor::new(input), &mut summary, &mut cells).unwrap();
    (
        String::from_utf8(summary).unwrap(),
        String::from_utf8(cells).unwrap(),
    )
}

#[test]
fn certain_ignition_without_detection_is_exact() {
    let input = row(1, -113.0, 2019, 200, 1.0, 0.0, 0.0, [2, 3, 2, 2, 1], 3, 300);

    for seed in [0u64, 7, 123_456_789] {
        let mut config = RunConfig::new(seed, 200, 200);
        config.trials = 50;
        config.confidence_percent = 80.0;
        let (summary, cells) = run_to_strings(&config, &input);

        let fields: Vec<&str> = summary.split_whitespace().collect();
        assert_eq!(fields[4], "10.0000", "mean ignitions: {summary}");
        assert_eq!(fields[5], "10", "diagnostic lightning: {summary}");
        // Province holdover band, then arrival band
        assert_eq!(&fields[6..10], &["10", "10", "0", "0"]);

        let cell: Vec<&str> = cells.split_whitespace().collect();
        assert_eq!(cell[0], "1");
        assert_eq!(&cell[6..9], &["0.00000", "10.00000", "10.00000"]);
    }
}

#[test]
fn every_trial_matches_the_certain_scenario() {
    let input = row(1, -113.0, 2019, 200, 1.0, 0.0, 0.0, [10, 0, 0, 0, 0], 3, 0);
    let table = SeasonLoader::new(Cursor::new(input), InvalidRowPolicy::Reject)
        .next_season()
        .unwrap()
        .unwrap();
    let sim = DailyMonteCarloSimulator::new(&table, HoldoverWindowResolver::default(), 40);
    let outcome = sim.simulate_day(200, &mut sequential_rng(31)).unwrap();

    for totals in outcome.distribution.trials() {
        assert_eq!(totals.province.ignitions, 10);
        assert_eq!(totals.province.arrivals, 0);
        assert_eq!(totals.province.holdovers, 10);
        // Longitude -113 is east of the boreal split
        assert_eq!(
            totals.tally(RegionScope::Subregion(Subregion::EastBoreal)).holdovers,
            10
        );
    }
    assert_eq!(outcome.mean_ignitions(), 10.0);
}

#[test]
fn fixed_seed_reruns_are_byte_identical() {
    let input = mixed_input();
    let mut config = RunConfig::new(2024, 160, 175);
    config.trials = 200;

    let first = run_to_strings(&config, &input);
    let second = run_to_strings(&config, &input);
    assert_eq!(first, second);

    // Two seasons x 16 days
    assert_eq!(first.0.lines().count(), 32);
    assert_eq!(first.1.lines().count(), 32 * 3);

    config.seed = 2025;
    let other = run_to_strings(&config, &input);
    assert_ne!(first.0, other.0, "a different seed should change the sample");
}

#[test]
fn parallel_runs_are_reproducible_across_thread_counts() {
    let input = mixed_input();
    let mut config = RunConfig::new(77, 165, 170);
    config.trials = 120;
    config.execution = ExecutionMode::Parallel { threads: Some(1) };
    let single = run_to_strings(&config, &input);

    config.execution = ExecutionMode::Parallel { threads: Some(4) };
    let many = run_to_strings(&config, &input);
    assert_eq!(single, many);
}

#[test]
fn parallel_and_sequential_agree_statistically() {
    // 40 strikes at p = 0.25 on the query day only: mean 10 ignitions
    let input = row(4, -119.0, 2019, 190, 0.25, 0.2, 0.1, [8, 8, 8, 8, 8], 2, 100);
    let table = SeasonLoader::new(Cursor::new(input), InvalidRowPolicy::Reject)
        .next_season()
        .unwrap()
        .unwrap();
    let sim = DailyMonteCarloSimulator::new(&table, HoldoverWindowResolver::default(), 4000);

    let sequential = sim.simulate_day(190, &mut sequential_rng(5)).unwrap();
    let parallel = sim.simulate_day_parallel(190, 5).unwrap();

    // Standard error of each mean is about 0.043
    assert_relative_eq!(sequential.mean_ignitions(), 10.0, epsilon = 0.25);
    assert_relative_eq!(parallel.mean_ignitions(), 10.0, epsilon = 0.25);
}

#[test]
fn more_trials_tighten_the_mean_estimate() {
    // 100 strikes at p = 0.3: Binomial mean 30, sd ~4.6
    let input = row(9, -117.0, 2019, 210, 0.3, 0.0, 0.0, [20, 20, 20, 20, 20], 1, 50);
    let table = SeasonLoader::new(Cursor::new(input), InvalidRowPolicy::Reject)
        .next_season()
        .unwrap()
        .unwrap();

    let mean_abs_error = |trials: usize| -> f64 {
        let sim = DailyMonteCarloSimulator::new(&table, HoldoverWindowResolver::default(), trials);
        let seeds = 0..12u64;
        let total: f64 = seeds
            .clone()
            .map(|seed| {
                let outcome = sim.simulate_day(210, &mut sequential_rng(seed)).unwrap();
                (outcome.mean_ignitions() - 30.0).abs()
            })
            .sum();
        total / seeds.count() as f64
    };

    let coarse = mean_abs_error(20);
    let fine = mean_abs_error(2000);
    assert!(fine < coarse, "fine={fine} coarse={coarse}");
    assert!(fine < 0.5, "fine={fine}");
}

#[test]
fn holdovers_build_up_over_the_window() {
    // Ignitions every day, never detected: the pool grows with the window
    let mut input = String::new();
    for jd in 190..=200u16 {
        input.push_str(&row(3, -120.0, 2019, jd, 1.0, 0.0, 0.0, [2, 0, 0, 0, 0], 4, 0));
    }
    let mut config = RunConfig::new(1, 200, 200);
    config.trials = 20;
    config.confidence_percent = 80.0;

    config.holdover = HoldoverMode::Fixed(0);
    let (none, _) = run_to_strings(&config, &input);
    config.holdover = HoldoverMode::Fixed(5);
    let (five, _) = run_to_strings(&config, &input);
    // DC 0 gives a 4 day automatic window
    config.holdover = HoldoverMode::Automatic;
    let (auto, _) = run_to_strings(&config, &input);

    let province_holdovers = |summary: &str| -> String {
        summary.split_whitespace().nth(6).unwrap().to_string()
    };
    assert_eq!(province_holdovers(&none), "2");
    assert_eq!(province_holdovers(&five), "12");
    assert_eq!(province_holdovers(&auto), "10");
}

#[test]
fn holdover_pool_feeds_later_arrivals() {
    // Day 1: 6 certain ignitions, never seen that day; day 2: every carried fire is seen
    let input = [
        row(5, -112.0, 2019, 220, 1.0, 0.0, 1.0, [6, 0, 0, 0, 0], 3, 0),
        row(5, -112.0, 2019, 221, 0.0, 0.0, 1.0, [0, 0, 0, 0, 0], 3, 0),
    ]
    .concat();
    let table = SeasonLoader::new(Cursor::new(input), InvalidRowPolicy::Reject)
        .next_season()
        .unwrap()
        .unwrap();
    let sim = DailyMonteCarloSimulator::new(
        &table,
        HoldoverWindowResolver::new(HoldoverMode::Fixed(1)),
        10,
    );
    let outcome = sim.simulate_day(221, &mut sequential_rng(8)).unwrap();
    let ranks = ltg_holdover_core::PercentileRanks::new(10, 80.0).unwrap();
    let arrivals = outcome.band(RegionScope::Province, Metric::Arrivals, &ranks);
    assert_eq!((arrivals.low, arrivals.high), (6, 6));
    assert_eq!(outcome.mean_ignitions(), 0.0);
}

#[test]
fn first_season_day_starts_with_an_empty_pool() {
    // Strikes before the query day cannot carry into julian day 121
    let input = row(2, -115.0, 2019, 121, 1.0, 0.0, 0.0, [3, 0, 0, 0, 0], 3, 800);
    let mut config = RunConfig::new(4, 121, 121);
    config.trials = 10;
    config.confidence_percent = 80.0;
    let (summary, _) = run_to_strings(&config, &input);
    let fields: Vec<&str> = summary.split_whitespace().collect();
    assert_eq!(fields[6], "3");
}

#[test]
fn cells_without_coordinates_are_not_reported() {
    let input = [
        "7 0.0 0.0 2019 180 0.1 0.1 0.1 0 0 3 0 0 0 0 0 10 100\n".to_string(),
        row(8, -115.0, 2019, 180, 0.1, 0.1, 0.1, [0, 0, 0, 0, 0], 3, 100),
    ]
    .concat();
    let mut config = RunConfig::new(4, 180, 180);
    config.trials = 10;
    config.confidence_percent = 80.0;
    let (_, cells) = run_to_strings(&config, &input);
    assert_eq!(cells.lines().count(), 1);
    assert!(cells.trim_start().starts_with('8'));
}

#[test]
fn json_lines_output() {
    let mut config = RunConfig::new(3, 160, 161);
    config.trials = 50;
    config.format = ReportFormat::JsonLines;
    let (summary, cells) = run_to_strings(&config, &mixed_input());

    assert_eq!(summary.lines().count(), 4);
    for line in summary.lines() {
        let record: ltg_holdover_core::SummaryRecord = serde_json::from_str(line).unwrap();
        assert!(record.province.holdovers.low <= record.province.holdovers.high);
    }
    let first: ltg_holdover_core::CellPrediction =
        serde_json::from_str(cells.lines().next().unwrap()).unwrap();
    assert_eq!(first.cell_id, 11);
}

#[test]
fn bad_settings_fail_before_reading_input() {
    let mut config = RunConfig::new(1, 150, 160);
    config.trials = 10; // 95% of 10 trials leaves no low rank
    let err = run(&config, Cursor::new("not even a row\n"), Vec::new(), Vec::new()).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfig(_)), "{err}");
}

#[test]
fn data_quality_errors_stop_the_run() {
    let input = row(1, -113.0, 2019, 200, 0.5, 0.5, 0.5, [1, 1, 1, 1, 1], 3, 100)
        .replace(" 5 0 3 ", " 6 0 3 ");
    let config = RunConfig::new(1, 200, 200);
    let err = run(&config, Cursor::new(input), Vec::new(), Vec::new()).unwrap_err();
    assert!(matches!(err, SimError::DataQuality { line: 1, .. }), "{err}");
}

#[test]
fn malformed_tail_is_end_of_data() {
    let input = format!(
        "{}this line is broken\n{}",
        row(1, -113.0, 2019, 200, 0.5, 0.5, 0.5, [1, 1, 1, 1, 1], 3, 100),
        row(2, -113.0, 2020, 200, 0.5, 0.5, 0.5, [1, 1, 1, 1, 1], 3, 100)
    );
    let mut config = RunConfig::new(1, 200, 200);
    config.trials = 20;
    config.confidence_percent = 80.0;
    let mut summary = Vec::new();
    let stats = run(&config, Cursor::new(input), &mut summary, Vec::new()).unwrap();
    assert_eq!(stats.seasons, 1);
    assert_eq!(stats.days, 1);
    assert_eq!(stats.rows_recorded, 1);
}

#[test]
fn undecodable_tail_is_end_of_data() {
    let mut input = row(1, -113.0, 2019, 200, 0.5, 0.5, 0.5, [1, 1, 1, 1, 1], 3, 100).into_bytes();
    input.extend_from_slice(b"\xff\xfe garbage\n");
    let mut config = RunConfig::new(1, 200, 200);
    config.trials = 20;
    config.confidence_percent = 80.0;
    let mut summary = Vec::new();
    let stats = run(&config, Cursor::new(input), &mut summary, Vec::new()).unwrap();
    assert_eq!(stats.seasons, 1);
    assert_eq!(String::from_utf8(summary).unwrap().lines().count(), 1);
}

#[test]
fn strike_counts_beyond_u32_accumulate_exactly() {
    // Two days of 3e9 certain ignitions: 6e9 holdovers on the second day
    let input = [
        row(6, -113.0, 2019, 199, 1.0, 0.0, 0.0, [3_000_000_000, 0, 0, 0, 0], 3, 0),
        row(6, -113.0, 2019, 200, 1.0, 0.0, 0.0, [3_000_000_000, 0, 0, 0, 0], 3, 0),
    ]
    .concat();
    let mut config = RunConfig::new(9, 200, 200);
    config.trials = 10;
    config.confidence_percent = 80.0;
    config.holdover = HoldoverMode::Fixed(1);
    let (summary, cells) = run_to_strings(&config, &input);

    let fields: Vec<&str> = summary.split_whitespace().collect();
    assert_eq!(fields[4], "3000000000.0000");
    assert_eq!(&fields[6..10], &["6000000000", "6000000000", "0", "0"]);
    let cell: Vec<&str> = cells.split_whitespace().collect();
    assert_eq!(cell[7], "6000000000.00000");
}

#[test]
fn seasons_are_independent() {
    // Cell 1 only exists in 2018; 2019's per-cell output must not mention it
    let input = [
        row(1, -113.0, 2018, 200, 0.5, 0.5, 0.5, [1, 1, 1, 1, 1], 3, 100),
        row(2, -113.0, 2019, 200, 0.5, 0.5, 0.5, [1, 1, 1, 1, 1], 3, 100),
    ]
    .concat();
    let mut config = RunConfig::new(1, 200, 200);
    config.trials = 20;
    config.confidence_percent = 80.0;
    let (_, cells) = run_to_strings(&config, &input);
    let lines: Vec<&str> = cells.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("2018") && lines[0].trim_start().starts_with('1'));
    assert!(lines[1].contains("2019") && lines[1].trim_start().starts_with('2'));
}

#[test]
fn empty_table_still_reports_days() {
    let table = SeasonTable::new(2019);
    let sim = DailyMonteCarloSimulator::new(&table, HoldoverWindowResolver::default(), 10);
    let outcome = sim.simulate_day(150, &mut sequential_rng(0)).unwrap();
    assert_eq!(outcome.trials(), 10);
    assert_eq!(outcome.mean_ignitions(), 0.0);
    assert!(outcome.cell_means.is_empty());
}
