use std::path::{Path, PathBuf};

use crate::charts::{render_latency_charts, render_thread_charts};
use crate::elements::{BenchmarkRow, ThreadSample};
use crate::error::{ChartError, ThreadLogError};
use crate::settings::{LatencySettings, ThreadLogSettings};
use crate::BenchvizResult;

pub mod collection;
pub mod thread_log;

use thread_log::Diagnostic;

/// Outputs of a thread-scaling run.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadScalingReport {
    pub samples: Vec<ThreadSample>,
    pub diagnostics: Vec<Diagnostic>,
    pub summary_path: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Outputs of a latency report run.
#[derive(Debug, Clone, PartialEq)]
pub struct LatencyReport {
    pub rows: Vec<BenchmarkRow>,
    pub output_dir: PathBuf,
    pub charts: Vec<PathBuf>,
}

/// Parses a thread-scaling log, writes the summary table and renders its charts.
///
/// Nothing is written when the log yields no valid thread/time pairs.
#[tracing::instrument(level = "info", skip(log_text))]
pub fn run_thread_scaling(log_text: &str, settings: &ThreadLogSettings) -> BenchvizResult<ThreadScalingReport> {
    let scan = thread_log::parse_thread_log(log_text);
    let diagnostics = scan.diagnostics().to_vec();
    let samples = thread_log::summarize(scan, settings.iterations)?;

    std::fs::create_dir_all(&settings.output_dir).map_err(ThreadLogError::IO)?;
    let summary_path = settings.summary_path();
    thread_log::write_summary_csv(&samples, &summary_path)?;

    let charts = render_thread_charts(&samples, settings.cpu, &settings.output_dir)?;

    Ok(ThreadScalingReport { samples, diagnostics, summary_path, charts })
}

/// Merges the benchmark CSV files matched under `working_dir` and renders latency and
/// throughput charts into the configured output directory.
///
/// The output directory, resolved against `working_dir` when relative, is created before any
/// input is read.
#[tracing::instrument(level = "info")]
pub fn run_latency_report(working_dir: &Path, settings: &LatencySettings) -> BenchvizResult<LatencyReport> {
    let output_dir = working_dir.join(&settings.output_dir);
    std::fs::create_dir_all(&output_dir).map_err(ChartError::IO)?;

    let rows = collection::collect_benchmarks(working_dir, &settings.patterns)?;
    let charts = render_latency_charts(&rows, &output_dir)?;
    tracing::info!(
        nr_charts=%charts.len(),
        "chart generation complete - all charts saved to {:?}", output_dir
    );

    Ok(LatencyReport { rows, output_dir, charts })
}
