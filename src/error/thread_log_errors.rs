use std::path::PathBuf;

use either::{Either, Left};
use thiserror::Error;

use super::MetricLabel;
use crate::SharedString;

/// Set of errors occurring while parsing and summarizing a thread-scaling log
#[derive(Debug, Error)]
pub enum ThreadLogError {
    #[error("No valid thread/time pairs parsed from log.")]
    NoSamples,

    #[error("iterations must be positive to derive per-iteration time, but was {0}")]
    ZeroIterations(u32),

    #[error("could not read thread log from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write thread summary: {0}")]
    CSV(#[from] csv::Error),

    #[error("{0}")]
    IO(#[from] std::io::Error),
}

impl MetricLabel for ThreadLogError {
    fn slug(&self) -> SharedString {
        "thread_log".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::NoSamples => Left("no_samples".into()),
            Self::ZeroIterations(_) => Left("zero_iterations".into()),
            Self::Read { .. } => Left("read".into()),
            Self::CSV(_) => Left("csv".into()),
            Self::IO(_) => Left("io".into()),
        }
    }
}
