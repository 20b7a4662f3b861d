use std::fmt;

use approx::{AbsDiffEq, RelativeEq};
use serde::{Deserialize, Serialize};

/// Default number of repetitions each thread-scaling run performs.
pub const DEFAULT_ITERATIONS: u32 = 128;

/// One measured run of the thread-scaling benchmark.
///
/// Field names serialize to the summary table columns `Threads`, `Total_Time_ms` and
/// `Time_Per_Iteration_ms`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSample {
    #[serde(rename = "Threads")]
    pub threads: u32,

    #[serde(rename = "Total_Time_ms")]
    pub total_time_ms: u64,

    #[serde(rename = "Time_Per_Iteration_ms")]
    pub time_per_iteration_ms: f64,
}

impl ThreadSample {
    /// `iterations` must be positive; callers validate it before summarizing.
    pub fn new(threads: u32, total_time_ms: u64, iterations: u32) -> Self {
        Self {
            threads,
            total_time_ms,
            time_per_iteration_ms: total_time_ms as f64 / f64::from(iterations),
        }
    }
}

impl fmt::Display for ThreadSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}T: {}ms ({:.2}ms/iter)",
            self.threads, self.total_time_ms, self.time_per_iteration_ms
        )
    }
}

impl AbsDiffEq for ThreadSample {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.threads == other.threads
            && self.total_time_ms == other.total_time_ms
            && f64::abs_diff_eq(&self.time_per_iteration_ms, &other.time_per_iteration_ms, epsilon)
    }
}

impl RelativeEq for ThreadSample {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: Self::Epsilon, max_relative: Self::Epsilon) -> bool {
        self.threads == other.threads
            && self.total_time_ms == other.total_time_ms
            && f64::relative_eq(
                &self.time_per_iteration_ms,
                &other.time_per_iteration_ms,
                epsilon,
                max_relative,
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_time_per_iteration_is_exact_division() {
        let sample = ThreadSample::new(4, 2642, DEFAULT_ITERATIONS);
        assert_eq!(sample.time_per_iteration_ms, 20.640625);

        let sample = ThreadSample::new(1, 9772, DEFAULT_ITERATIONS);
        assert_eq!(sample.time_per_iteration_ms, 76.34375);

        let sample = ThreadSample::new(3, 1000, 3);
        approx::assert_relative_eq!(sample.time_per_iteration_ms, 1000.0 / 3.0);
    }

    #[test]
    fn test_approx_equality_compares_counts_exactly() {
        let sample = ThreadSample::new(3, 1000, 3);
        let close = ThreadSample { time_per_iteration_ms: 333.333_333_333_333_4, ..sample };
        approx::assert_relative_eq!(sample, close);
        approx::assert_abs_diff_eq!(sample, close, epsilon = 1e-9);

        let other_threads = ThreadSample { threads: 4, ..sample };
        approx::assert_relative_ne!(sample, other_threads);
        approx::assert_abs_diff_ne!(sample, ThreadSample { total_time_ms: 1001, ..sample });
    }

    #[test]
    fn test_display() {
        let sample = ThreadSample::new(28, 1016, DEFAULT_ITERATIONS);
        assert_eq!(sample.to_string(), "28T: 1016ms (7.94ms/iter)");
    }
}
