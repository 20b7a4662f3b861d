use std::path::PathBuf;

use either::{Either, Left};
use thiserror::Error;

use super::MetricLabel;
use crate::SharedString;

/// Set of errors occurring while discovering and loading benchmark CSV files
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("No CSV files found for patterns {patterns:?}. Please specify CSV files with --csv_files option.")]
    NoFilesFound { patterns: Vec<String> },

    #[error("No valid CSV files found among {candidates} candidates.")]
    NoValidFiles { candidates: usize },

    #[error("file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("{path:?} is missing required columns: {missing:?}")]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    /// An error related to reading a benchmark CSV file.
    #[error("Could not properly load CSV source: {0}")]
    CSV(#[from] csv::Error),
}

impl MetricLabel for CollectionError {
    fn slug(&self) -> SharedString {
        "collection".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::NoFilesFound { .. } => Left("no_files_found".into()),
            Self::NoValidFiles { .. } => Left("no_valid_files".into()),
            Self::NotFound(_) => Left("not_found".into()),
            Self::MissingColumns { .. } => Left("missing_columns".into()),
            Self::CSV(_) => Left("csv".into()),
        }
    }
}
