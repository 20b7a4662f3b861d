use either::{Either, Right};
use thiserror::Error;

use crate::SharedString;

mod chart_errors;
mod collection_errors;
mod settings_errors;
mod thread_log_errors;

pub use chart_errors::ChartError;
pub use collection_errors::CollectionError;
pub use settings_errors::SettingsError;
pub use thread_log_errors::ThreadLogError;

pub trait MetricLabel {
    fn label(&self) -> SharedString {
        match self.next() {
            Either::Right(n) => format!("{}::{}", self.slug(), n.label()).into(),
            Either::Left(ls) => format!("{}::{}", self.slug(), ls).into(),
        }
    }

    fn slug(&self) -> SharedString;
    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>>;
}

#[derive(Debug, Error)]
pub enum BenchvizError {
    #[error("{0}")]
    ThreadLog(#[from] ThreadLogError),

    #[error("{0}")]
    Collection(#[from] CollectionError),

    #[error("{0}")]
    Chart(#[from] ChartError),

    #[error("{0}")]
    Settings(#[from] SettingsError),
}

impl BenchvizError {
    /// True when the run ended because there was nothing to process rather than because
    /// something failed.
    pub fn is_empty_input(&self) -> bool {
        matches!(
            self,
            Self::ThreadLog(ThreadLogError::NoSamples)
                | Self::Collection(CollectionError::NoFilesFound { .. })
                | Self::Collection(CollectionError::NoValidFiles { .. })
        )
    }
}

impl MetricLabel for BenchvizError {
    fn slug(&self) -> SharedString {
        "benchviz".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::ThreadLog(e) => Right(Box::new(e)),
            Self::Collection(e) => Right(Box::new(e)),
            Self::Chart(e) => Right(Box::new(e)),
            Self::Settings(e) => Right(Box::new(e)),
        }
    }
}
