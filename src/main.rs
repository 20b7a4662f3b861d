use std::path::PathBuf;

use benchviz::error::{MetricLabel, SettingsError};
use benchviz::phases::{self, thread_log};
use benchviz::settings::{get_settings, LatencySettings, Settings, ThreadLogSettings};
use benchviz::tracing::{get_subscriber, init_subscriber};
use benchviz::BenchvizResult;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(version, about = "Summarize benchmark results into CSV tables and SVG charts")]
struct CliOptions {
    /// configuration file layered over the built-in defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a thread-scaling log, write its summary table and chart it.
    Threads(ThreadsArgs),

    /// Merge benchmark result CSV files and chart latency and throughput.
    Latency(LatencyArgs),
}

#[derive(Debug, Args)]
struct ThreadsArgs {
    /// thread-scaling log to parse; the bundled k-NN search sample is used when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[arg(long)]
    iterations: Option<u32>,

    #[arg(long)]
    physical_cores: Option<u32>,

    #[arg(long)]
    logical_threads: Option<u32>,

    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct LatencyArgs {
    /// CSV files to process (wildcards supported, e.g., "*.csv")
    #[arg(long = "csv_files", num_args = 1..)]
    csv_files: Vec<String>,

    /// directory to save charts
    #[arg(long = "output_dir")]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("benchviz", "info", std::io::stderr);
    init_subscriber(subscriber);

    let opts = CliOptions::parse();
    let settings = get_settings(opts.config.as_deref())?;

    let outcome = match opts.command {
        Command::Threads(args) => run_threads(args, settings),
        Command::Latency(args) => run_latency(args, settings),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err) if err.is_empty_input() => {
            tracing::warn!(error=?err, label=%err.label(), "nothing to process.");
            eprintln!("{}", err);
            Ok(())
        },
        Err(err) => {
            tracing::error!(error=?err, label=%err.label(), "benchviz failed.");
            Err(err.into())
        },
    }
}

impl ThreadsArgs {
    /// Layers command line values over loaded settings, then validates the result.
    fn apply_to(&self, settings: &mut ThreadLogSettings) -> Result<(), SettingsError> {
        if let Some(iterations) = self.iterations {
            settings.iterations = iterations;
        }
        if let Some(physical_cores) = self.physical_cores {
            settings.cpu.physical_cores = physical_cores;
        }
        if let Some(logical_threads) = self.logical_threads {
            settings.cpu.logical_threads = logical_threads;
        }
        if let Some(output_dir) = self.output_dir.as_ref() {
            settings.output_dir = output_dir.clone();
        }
        settings.validate()
    }
}

impl LatencyArgs {
    fn apply_to(&self, settings: &mut LatencySettings) {
        if !self.csv_files.is_empty() {
            settings.patterns = self.csv_files.clone();
        }
        if let Some(output_dir) = self.output_dir.as_ref() {
            settings.output_dir = output_dir.clone();
        }
    }
}

fn run_threads(args: ThreadsArgs, mut settings: Settings) -> BenchvizResult<()> {
    args.apply_to(&mut settings.thread_log)?;

    let log_text = match args.input {
        Some(path) => thread_log::load_thread_log(path)?,
        None => thread_log::SAMPLE_LOG.to_string(),
    };

    let report = phases::run_thread_scaling(&log_text, &settings.thread_log)?;
    for sample in report.samples.iter() {
        println!("{}", sample);
    }
    println!("Data saved to {}", report.summary_path.display());
    for chart in report.charts.iter() {
        println!("Plot saved: {}", chart.display());
    }
    Ok(())
}

fn run_latency(args: LatencyArgs, mut settings: Settings) -> BenchvizResult<()> {
    args.apply_to(&mut settings.latency);

    let working_dir = std::env::current_dir().map_err(SettingsError::IO)?;

    let report = phases::run_latency_report(&working_dir, &settings.latency)?;
    println!("Combined data has {} rows", report.rows.len());
    for chart in report.charts.iter() {
        println!("Saved chart to {}", chart.display());
    }
    println!(
        "Chart generation complete! All charts saved to the '{}' directory.",
        report.output_dir.display()
    );
    Ok(())
}
