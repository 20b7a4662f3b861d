use either::{Either, Left};
use thiserror::Error;

use super::MetricLabel;
use crate::SharedString;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("invalid setting {setting}: {message}")]
    Invalid { setting: String, message: String },
}

impl MetricLabel for SettingsError {
    fn slug(&self) -> SharedString {
        "settings".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::Config(_) => Left("config".into()),
            Self::IO(_) => Left("io".into()),
            Self::Invalid { .. } => Left("invalid".into()),
        }
    }
}
