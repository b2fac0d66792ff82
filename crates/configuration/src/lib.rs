use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalysisConfig, AppConfig, CorrelationConfig, MovingAverageConfig, OutputFormat, ReportConfig,
};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix of the environment variables that override file settings,
/// e.g. `ARKANSAS__ANALYSIS__CORRELATION__TOP_COUNT=5`.
pub const ENV_PREFIX: &str = "ARKANSAS";

/// Loads the application configuration.
///
/// An explicit `path` must exist. Without one, `config.toml` is read if present and
/// every setting falls back to its default otherwise. Environment variables are
/// layered on top, then the merged result is validated.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Parses configuration from TOML text, without file or environment lookup.
pub fn parse_config(toml: &str) -> Result<AppConfig, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<AppConfig, ConfigError> {
    // Attempt to deserialize the entire configuration into our `AppConfig` struct
    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;

    tracing::debug!(
        "Configuration: {} moving average windows, top {} correlations, {:?} output.",
        config.analysis.moving_average.windows.len(),
        config.analysis.correlation.top_count,
        config.report.format
    );
    Ok(config)
}
