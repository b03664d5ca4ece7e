use clap::{Parser, ValueEnum};
use ltg_holdover_core::{
    run, ExecutionMode, HoldoverMode, InvalidRowPolicy, ReportFormat, RunConfig, SimError,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Monte Carlo lightning fire holdover and arrival prediction
#[derive(Parser, Debug)]
#[command(name = "ltg-simulate")]
#[command(about = "Predict lightning fire ignitions, arrivals and holdovers per grid cell", long_about = None)]
struct Args {
    /// Random number seed
    #[arg(short, long)]
    seed: u64,

    /// Season input table (whitespace-delimited cell-day rows, grouped by year)
    #[arg(short, long)]
    input: PathBuf,

    /// Output path for the per-day regional summary
    #[arg(long)]
    summary: PathBuf,

    /// Output path for the per-cell predictions
    #[arg(long)]
    cells: PathBuf,

    /// First julian day to predict (121-273)
    #[arg(long)]
    start_day: u16,

    /// Last julian day to predict (121-273)
    #[arg(long)]
    end_day: u16,

    /// Holdover lookback in days (negative = derive from Drought Code)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    holdover_days: i64,

    /// Confidence level of the reported bands, in percent
    #[arg(short, long, default_value_t = 95.0)]
    confidence: f64,

    /// Monte Carlo trials per query day
    #[arg(short, long, default_value_t = 1000)]
    trials: usize,

    /// Run trials in parallel (reproducible, but a different sample from sequential runs)
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel (default: all cores)
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,

    /// Log and drop invalid rows instead of stopping
    #[arg(long)]
    skip_invalid_rows: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Fixed)]
    format: Format,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Fixed,
    JsonLines,
}

impl Args {
    fn run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(self.seed, self.start_day, self.end_day);
        config.holdover = HoldoverMode::from_lookback_days(self.holdover_days);
        config.confidence_percent = self.confidence;
        config.trials = self.trials;
        config.execution = if self.parallel {
            ExecutionMode::Parallel {
                threads: self.threads,
            }
        } else {
            ExecutionMode::Sequential
        };
        config.invalid_rows = if self.skip_invalid_rows {
            InvalidRowPolicy::Skip
        } else {
            InvalidRowPolicy::Reject
        };
        config.format = match self.format {
            Format::Fixed => ReportFormat::Fixed,
            Format::JsonLines => ReportFormat::JsonLines,
        };
        config
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn simulate(args: &Args) -> Result<(), SimError> {
    let config = args.run_config();
    // Reject bad settings before touching any file
    config.validate()?;

    let input = File::open(&args.input).map_err(|e| SimError::io(&args.input, e))?;
    let summary = File::create(&args.summary).map_err(|e| SimError::io(&args.summary, e))?;
    let cells = File::create(&args.cells).map_err(|e| SimError::io(&args.cells, e))?;

    run(
        &config,
        BufReader::new(input),
        BufWriter::new(summary),
        BufWriter::new(cells),
    )?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match simulate(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
