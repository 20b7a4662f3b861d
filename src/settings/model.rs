use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::charts::CpuTopology;
use crate::elements::DEFAULT_ITERATIONS;
use crate::error::SettingsError;
use crate::phases::collection::DEFAULT_CSV_PATTERN;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub thread_log: ThreadLogSettings,

    #[serde(default)]
    pub latency: LatencySettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.thread_log.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadLogSettings {
    /// Repetitions per run; total time is divided by this to get per-iteration time.
    #[serde(default = "ThreadLogSettings::default_iterations")]
    pub iterations: u32,

    #[serde(default)]
    pub cpu: CpuTopology,

    #[serde(default = "ThreadLogSettings::default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "ThreadLogSettings::default_summary_file")]
    pub summary_file: String,
}

impl ThreadLogSettings {
    pub fn default_iterations() -> u32 {
        DEFAULT_ITERATIONS
    }

    pub fn default_output_dir() -> PathBuf {
        PathBuf::from(".")
    }

    pub fn default_summary_file() -> String {
        "thread_performance_summary.csv".to_string()
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_file)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.iterations == 0 {
            return Err(SettingsError::Invalid {
                setting: "thread_log.iterations".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.summary_file.trim().is_empty() {
            return Err(SettingsError::Invalid {
                setting: "thread_log.summary_file".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for ThreadLogSettings {
    fn default() -> Self {
        Self {
            iterations: Self::default_iterations(),
            cpu: CpuTopology::default(),
            output_dir: Self::default_output_dir(),
            summary_file: Self::default_summary_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySettings {
    /// File patterns, relative to the working directory, naming benchmark CSV files.
    #[serde(default = "LatencySettings::default_patterns")]
    pub patterns: Vec<String>,

    #[serde(default = "LatencySettings::default_output_dir")]
    pub output_dir: PathBuf,
}

impl LatencySettings {
    pub fn default_patterns() -> Vec<String> {
        vec![DEFAULT_CSV_PATTERN.to_string()]
    }

    pub fn default_output_dir() -> PathBuf {
        PathBuf::from("performance_charts")
    }
}

impl Default for LatencySettings {
    fn default() -> Self {
        Self {
            patterns: Self::default_patterns(),
            output_dir: Self::default_output_dir(),
        }
    }
}
