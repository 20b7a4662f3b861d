use std::path::{Path, PathBuf};

use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use super::LineChart;
use crate::elements::ThreadSample;
use crate::error::ChartError;

pub const TOTAL_TIME_CHART: &str = "total_time_vs_threads.svg";
pub const TIME_PER_ITERATION_CHART: &str = "time_per_iteration_vs_threads.svg";

/// Core counts of the benchmarked machine, drawn as vertical reference lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuTopology {
    pub physical_cores: u32,
    pub logical_threads: u32,
}

impl Default for CpuTopology {
    fn default() -> Self {
        Self { physical_cores: 24, logical_threads: 32 }
    }
}

/// Renders total time and time per iteration against thread count.
#[tracing::instrument(level = "info", skip(samples, output_dir), fields(nr_samples=%samples.len()))]
pub fn render_thread_charts(
    samples: &[ThreadSample], topology: CpuTopology, output_dir: &Path,
) -> Result<Vec<PathBuf>, ChartError> {
    let fastest = samples
        .iter()
        .min_by_key(|s| s.total_time_ms)
        .ok_or_else(|| ChartError::EmptySeries("thread samples".to_string()))?;

    let total_time = with_topology(
        LineChart::new(
            "Total Execution Time vs. Number of Threads",
            "Number of Threads",
            "Total Time (milliseconds)",
        ),
        topology,
    )
    .with_series(
        "Total Time (ms)",
        samples.iter().map(|s| (f64::from(s.threads), s.total_time_ms as f64)).collect(),
        BLUE.to_rgba(),
    )
    .with_annotation(
        format!("Min: {}ms ({}T)", fastest.total_time_ms, fastest.threads),
        (f64::from(fastest.threads), fastest.total_time_ms as f64),
    );

    let fastest_per_iteration = samples
        .iter()
        .min_by(|lhs, rhs| lhs.time_per_iteration_ms.total_cmp(&rhs.time_per_iteration_ms))
        .unwrap_or(fastest);

    let per_iteration = with_topology(
        LineChart::new(
            "Average Time Per Iteration vs. Number of Threads",
            "Number of Threads",
            "Time Per Iteration (milliseconds)",
        ),
        topology,
    )
    .with_series(
        "Time Per Iteration (ms)",
        samples.iter().map(|s| (f64::from(s.threads), s.time_per_iteration_ms)).collect(),
        RGBColor(128, 0, 128).to_rgba(),
    )
    .with_annotation(
        format!(
            "Min: {:.2}ms ({}T)",
            fastest_per_iteration.time_per_iteration_ms, fastest_per_iteration.threads
        ),
        (
            f64::from(fastest_per_iteration.threads),
            fastest_per_iteration.time_per_iteration_ms,
        ),
    );

    let total_time_path = output_dir.join(TOTAL_TIME_CHART);
    total_time.render(&total_time_path)?;

    let per_iteration_path = output_dir.join(TIME_PER_ITERATION_CHART);
    per_iteration.render(&per_iteration_path)?;

    Ok(vec![total_time_path, per_iteration_path])
}

fn with_topology(chart: LineChart, topology: CpuTopology) -> LineChart {
    chart
        .with_marker(
            format!("Physical Cores ({})", topology.physical_cores),
            f64::from(topology.physical_cores),
            RED.to_rgba(),
        )
        .with_marker(
            format!("Logical Threads ({})", topology.logical_threads),
            f64::from(topology.logical_threads),
            GREEN.to_rgba(),
        )
}
