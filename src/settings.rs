pub use model::*;

mod model;

use std::path::Path;

use config::{Config, Environment, File};

use crate::error::SettingsError;

pub const ENV_PREFIX: &str = "BENCHVIZ";

/// Loads settings from built-in defaults, an optional configuration file, then environment.
/// Values are not validated here; each pipeline validates its own section once command line
/// overrides are applied.
///
/// Environment variables use the `BENCHVIZ` prefix and `__` as separator; e.g.
/// `BENCHVIZ__THREAD_LOG__ITERATIONS=64` sets `Settings.thread_log.iterations`.
#[tracing::instrument(level = "info")]
pub fn get_settings(config_path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let settings: Settings = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;

    tracing::info!(?settings, "settings loaded");
    Ok(settings)
}
