use std::collections::HashSet;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use plotters::prelude::*;

use super::{render_bar_chart, unique_file_stem, use_log_scale, AxisScale, LineChart};
use crate::elements::{BenchmarkRow, Point};
use crate::error::ChartError;

pub const AVG_LATENCY_CHART: &str = "avg_latency_by_data_size.svg";
pub const THROUGHPUT_CHART: &str = "throughput_by_data_size.svg";

const DATA_SIZE_DESC: &str = "Data Size (number of operations)";

/// Groups rows by operation, keeping operations in first-seen order.
pub fn group_by_operation(rows: &[BenchmarkRow]) -> Vec<(&str, Vec<&BenchmarkRow>)> {
    let mut groups: Vec<(&str, Vec<&BenchmarkRow>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(operation, _)| *operation == row.operation) {
            Some((_, group)) => group.push(row),
            None => groups.push((row.operation.as_str(), vec![row])),
        }
    }
    groups
}

/// Groups rows by data size in ascending order.
pub fn group_by_data_size(rows: &[BenchmarkRow]) -> Vec<(u64, Vec<&BenchmarkRow>)> {
    rows.iter()
        .map(|row| (row.data_size, row))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(data_size, _)| *data_size)
        .collect()
}

/// Renders every latency and throughput chart for merged benchmark rows.
///
/// Returns the paths written. Rows are expected ordered by operation then data size, as
/// produced by `merge_rows`.
#[tracing::instrument(level = "info", skip(rows, output_dir), fields(nr_rows=%rows.len()))]
pub fn render_latency_charts(rows: &[BenchmarkRow], output_dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
    if rows.is_empty() {
        tracing::warn!("no benchmark rows to chart.");
        return Ok(Vec::new());
    }

    let x_scale = if use_log_scale(rows.iter().map(|r| r.data_size)) {
        AxisScale::Log10
    } else {
        AxisScale::Linear
    };

    let mut written = render_latency_line_charts(rows, x_scale, output_dir)?;
    written.push(render_throughput_chart(rows, x_scale, output_dir)?);
    written.extend(render_comparison_charts(rows, output_dir)?);
    Ok(written)
}

fn render_latency_line_charts(
    rows: &[BenchmarkRow], x_scale: AxisScale, output_dir: &Path,
) -> Result<Vec<PathBuf>, ChartError> {
    let groups = group_by_operation(rows);
    let mut written = Vec::with_capacity(groups.len() + 1);

    let mut avg_latency = LineChart::new(
        "Average Latency vs Data Size by Operation Type",
        DATA_SIZE_DESC,
        "Average Latency (microseconds)",
    )
    .with_x_scale(x_scale);
    for (idx, (operation, group)) in groups.iter().enumerate() {
        avg_latency = avg_latency.with_series(
            *operation,
            group.iter().map(|r| (r.data_size as f64, r.avg_latency)).collect(),
            Palette99::pick(idx).to_rgba(),
        );
    }
    let path = output_dir.join(AVG_LATENCY_CHART);
    avg_latency.render(&path)?;
    written.push(path);

    let mut used_stems = HashSet::new();
    for (operation, group) in groups.iter() {
        let percentile = |f: fn(&BenchmarkRow) -> f64| -> Vec<Point> {
            group.iter().map(|r| (r.data_size as f64, f(r))).collect()
        };
        let chart = LineChart::new(
            format!("{} Latency Percentiles vs Data Size", operation),
            DATA_SIZE_DESC,
            "Latency (microseconds)",
        )
        .with_x_scale(x_scale)
        .with_series("P50", percentile(|r| r.p50_latency), BLUE.to_rgba())
        .with_series("P95", percentile(|r| r.p95_latency), RGBColor(255, 140, 0).to_rgba())
        .with_series("P99", percentile(|r| r.p99_latency), RED.to_rgba());

        let path = output_dir.join(format!("{}_percentiles.svg", unique_file_stem(operation, &mut used_stems)));
        chart.render(&path)?;
        written.push(path);
    }

    Ok(written)
}

fn render_throughput_chart(rows: &[BenchmarkRow], x_scale: AxisScale, output_dir: &Path) -> Result<PathBuf, ChartError> {
    let mut chart = LineChart::new(
        "Throughput vs Data Size by Operation Type",
        DATA_SIZE_DESC,
        "Throughput (operations/second)",
    )
    .with_x_scale(x_scale);

    for (idx, (operation, group)) in group_by_operation(rows).into_iter().enumerate() {
        chart = chart.with_series(
            operation,
            group.iter().map(|r| (r.data_size as f64, r.throughput)).collect(),
            Palette99::pick(idx).to_rgba(),
        );
    }

    let path = output_dir.join(THROUGHPUT_CHART);
    chart.render(&path)?;
    Ok(path)
}

/// Bar comparisons across operations for each data size measured by at least two operations.
fn render_comparison_charts(rows: &[BenchmarkRow], output_dir: &Path) -> Result<Vec<PathBuf>, ChartError> {
    let mut written = Vec::new();

    for (data_size, group) in group_by_data_size(rows) {
        if group.len() < 2 {
            tracing::debug!(%data_size, "fewer than two operations - skipping comparison.");
            continue;
        }

        let latencies: Vec<(String, f64)> = group.iter().map(|r| (r.operation.clone(), r.avg_latency)).collect();
        let path = output_dir.join(format!("latency_comparison_{}.svg", data_size));
        render_bar_chart(
            &path,
            &format!("Average Latency by Operation (Data Size: {})", data_size),
            "Average Latency (microseconds)",
            &latencies,
        )?;
        written.push(path);

        let throughputs: Vec<(String, f64)> = group.iter().map(|r| (r.operation.clone(), r.throughput)).collect();
        let path = output_dir.join(format!("throughput_comparison_{}.svg", data_size));
        render_bar_chart(
            &path,
            &format!("Throughput by Operation (Data Size: {})", data_size),
            "Throughput (operations/second)",
            &throughputs,
        )?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(operation: &str, data_size: u64) -> BenchmarkRow {
        BenchmarkRow {
            operation: operation.to_string(),
            data_size,
            avg_latency: 1.0,
            p50_latency: 1.0,
            p95_latency: 2.0,
            p99_latency: 3.0,
            throughput: 1000.0,
            source_file: "test.csv".to_string(),
        }
    }

    #[test]
    fn test_group_by_operation_keeps_first_seen_order() {
        let rows = vec![row("PUT", 10), row("GET", 10), row("PUT", 100)];
        let groups: Vec<(&str, usize)> = group_by_operation(&rows)
            .into_iter()
            .map(|(op, group)| (op, group.len()))
            .collect();
        assert_eq!(groups, vec![("PUT", 2), ("GET", 1)]);
    }

    #[test]
    fn test_group_by_data_size_is_ascending() {
        let rows = vec![row("PUT", 1000), row("GET", 10), row("PUT", 10)];
        let groups: Vec<(u64, Vec<&str>)> = group_by_data_size(&rows)
            .into_iter()
            .map(|(size, group)| (size, group.iter().map(|r| r.operation.as_str()).collect()))
            .collect();
        assert_eq!(groups, vec![(10, vec!["GET", "PUT"]), (1000, vec!["PUT"])]);
    }

    #[test]
    fn test_colliding_operation_labels_keep_separate_percentile_charts() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let rows = vec![row("a b", 10), row("a b", 100), row("a_b", 10), row("a_b", 100)];

        let written = render_latency_charts(&rows, dir.path())?;
        assert!(written.contains(&dir.path().join("a_b_percentiles.svg")));
        assert!(written.contains(&dir.path().join("a_b_2_percentiles.svg")));

        let percentile_charts = written
            .iter()
            .filter(|p| p.to_string_lossy().ends_with("_percentiles.svg"))
            .count();
        assert_eq!(percentile_charts, 2);
        assert!(written.iter().all(|p| p.is_file()));
        Ok(())
    }
}
