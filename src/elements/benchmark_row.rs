use std::fmt;

use serde::{Deserialize, Serialize};

/// CSV columns every benchmark result file must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Operation",
    "DataSize",
    "AvgLatency",
    "P50Latency",
    "P95Latency",
    "P99Latency",
    "Throughput",
];

/// A single benchmarked operation at a given data size. Latencies are in microseconds and
/// throughput in operations per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    #[serde(rename = "Operation")]
    pub operation: String,

    #[serde(rename = "DataSize")]
    pub data_size: u64,

    #[serde(rename = "AvgLatency")]
    pub avg_latency: f64,

    #[serde(rename = "P50Latency")]
    pub p50_latency: f64,

    #[serde(rename = "P95Latency")]
    pub p95_latency: f64,

    #[serde(rename = "P99Latency")]
    pub p99_latency: f64,

    #[serde(rename = "Throughput")]
    pub throughput: f64,

    /// Name of the file the row was loaded from. Not a column of the input files; it is
    /// tagged on at load time.
    #[serde(default)]
    pub source_file: String,
}

/// Identity of a row for merging: operation label plus data size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey<'a> {
    pub operation: &'a str,
    pub data_size: u64,
}

impl BenchmarkRow {
    pub fn key(&self) -> RowKey<'_> {
        RowKey {
            operation: self.operation.as_str(),
            data_size: self.data_size,
        }
    }

    pub fn with_source_file(self, source_file: impl Into<String>) -> Self {
        Self { source_file: source_file.into(), ..self }
    }
}

impl fmt::Display for BenchmarkRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] avg:{:.2}us p50:{:.2}us p95:{:.2}us p99:{:.2}us {:.2}ops/s",
            self.operation,
            self.data_size,
            self.avg_latency,
            self.p50_latency,
            self.p95_latency,
            self.p99_latency,
            self.throughput
        )
    }
}
