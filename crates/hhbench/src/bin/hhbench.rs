//! Run heavy-hitter sketch benchmark sweeps.
//!
//! # Usage
//!
//! ```bash
//! # Threshold sweep on the CAIDA trace, 8 replicates
//! hhbench threshold --dataset CAIDA
//!
//! # Decay sweep at phi = 2^-12, pinned to core 2
//! hhbench --launcher "taskset -c 2" decay --dataset UCLA-TCP --phindex 12
//!
//! # Skew sweeps at the default decay and at gamma = 0.5
//! hhbench --runs 4 skew --comparison-decay 0.5 --output plots/
//! ```

use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use hhbench::output::{to_markdown, write_series_csv};
use hhbench::{Dataset, Experiment, ExperimentConfig, ProcessInvoker, SweepOutcome, SweepRequest};
use hhbench_core::constants::{DEFAULT_FIXED_THRESHOLD_INDEX, DEFAULT_REPLICATES};
use hhbench_core::SweepFamily;

/// Heavy-hitter sketch throughput sweeps
#[derive(Parser, Debug)]
#[command(name = "hhbench")]
#[command(about = "Sweep heavy-hitter sketches over threshold, decay or skew and average their throughput")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Sweep,

    /// Benchmark executable
    #[arg(long, global = true, default_value = "hh-zipf")]
    executable: PathBuf,

    /// Command to prefix every invocation with (whitespace separated)
    #[arg(long, global = true)]
    launcher: Option<String>,

    /// Replicates per sweep
    #[arg(long, global = true, default_value_t = DEFAULT_REPLICATES)]
    runs: usize,

    /// Directory for cached replicate sets
    #[arg(long, global = true, default_value = "results")]
    cache_dir: PathBuf,

    /// Directory holding the trace files
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for exported CSV files and the report
    #[arg(short, long, global = true, default_value = ".")]
    output: PathBuf,

    /// Log every invocation
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Sweep {
    /// Vary phi from 2^-10 to 2^-20
    Threshold {
        /// Input stream; prompted for when omitted
        #[arg(long)]
        dataset: Option<String>,
    },
    /// Vary gamma from 2^-4 to 2^4 at a fixed phi
    Decay {
        #[arg(long)]
        dataset: Option<String>,

        /// Fixed phi = 2^-phindex
        #[arg(long, default_value_t = DEFAULT_FIXED_THRESHOLD_INDEX)]
        phindex: i32,
    },
    /// Vary Zipf skew from 0.1 to 2.0, at the default decay and at a comparison decay
    Skew {
        /// Fixed phi = 2^-phindex
        #[arg(long, default_value_t = DEFAULT_FIXED_THRESHOLD_INDEX)]
        phindex: i32,

        #[arg(long, default_value_t = 1.0)]
        comparison_decay: f64,
    },
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = ExperimentConfig {
        executable: args.executable,
        launcher: args
            .launcher
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(Into::into)
            .collect(),
        replicates: args.runs,
        cache_dir: args.cache_dir,
        data_dir: args.data_dir,
        ..Default::default()
    };

    // `None` runs the two-decay skew comparison.
    let request = match args.command {
        Sweep::Threshold { dataset } => Some(SweepRequest::Threshold {
            dataset: resolve_dataset(dataset)?,
        }),
        Sweep::Decay { dataset, phindex } => {
            config.fixed_threshold_index = phindex;
            Some(SweepRequest::Decay {
                dataset: resolve_dataset(dataset)?,
            })
        }
        Sweep::Skew {
            phindex,
            comparison_decay,
        } => {
            config.skew_threshold_index = phindex;
            config.comparison_decay = comparison_decay;
            None
        }
    };

    let invoker = ProcessInvoker::from_config(&config);
    let experiment = Experiment::new(config, invoker)?;

    let (family, sweeps) = match &request {
        Some(request) => (request.family(), 1),
        None => (SweepFamily::Skew, 2),
    };
    let total_work = experiment
        .config()
        .replicates
        .saturating_mul(family.points() * sweeps) as u64;

    // Note: indicatif's {eta} is unreliable at position 0, so it is left out.
    let progress_bar = ProgressBar::new(total_work);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} | {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    progress_bar.set_style(style);
    progress_bar.enable_steady_tick(std::time::Duration::from_millis(100));

    let report_progress = |fraction: f64, task: &str| {
        progress_bar.set_position((fraction * total_work as f64) as u64);
        progress_bar.set_message(task.to_string());
    };
    let outcomes: Vec<SweepOutcome> = match request {
        Some(request) => vec![experiment.run(&request, report_progress)?],
        None => Vec::from(experiment.run_skew_comparison(report_progress)?),
    };
    progress_bar.finish_with_message("Complete!");

    fs::create_dir_all(&args.output)?;
    for outcome in &outcomes {
        let csv_path = args.output.join(format!("{}.csv", outcome.key.stem()));
        write_series_csv(outcome, &csv_path)?;
        println!("Wrote series to: {}", csv_path.display());
    }

    let report = to_markdown(&outcomes);
    let md_path = args.output.join("report.md");
    fs::write(&md_path, &report)?;
    println!("Wrote report to: {}", md_path.display());
    println!("\n{report}");
    Ok(())
}

/// Use the `--dataset` value, or ask on stdin.
fn resolve_dataset(dataset: Option<String>) -> io::Result<Dataset> {
    if let Some(name) = dataset {
        return Ok(Dataset::select(&name));
    }

    let names: Vec<&str> = Dataset::ALL.iter().map(Dataset::name).collect();
    print!("Dataset ({}): ", names.join(", "));
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(Dataset::select(line.trim()))
}
