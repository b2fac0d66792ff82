use crate::error::ConfigError;
use core_types::MovingAverageWindow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; a missing section takes the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub report: ReportConfig,
}

/// Parameters handed to the analytics engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub correlation: CorrelationConfig,
    pub moving_average: MovingAverageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// How many strongest (and weakest) counterparts each per-asset report lists.
    pub top_count: usize,
    /// Correlate log prices instead of raw prices for the overview matrix.
    pub log_series: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverageConfig {
    /// Fraction of a window's hourly observations required before a value is emitted.
    pub min_period_buffer: f64,
    /// Windows in output order, e.g. `{ label = "Weekly", span = "7d" }`.
    pub windows: Vec<MovingAverageWindow>,
}

/// Settings of the report writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub format: OutputFormat,
    /// Restricts the per-asset reports to these assets. All assets when absent.
    pub assets: Option<Vec<String>>,
}

/// File format of the written tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            top_count: 10,
            log_series: true,
        }
    }
}

impl Default for MovingAverageConfig {
    fn default() -> Self {
        Self {
            min_period_buffer: 0.8,
            windows: MovingAverageWindow::defaults(),
        }
    }
}

impl AppConfig {
    /// Checks the values serde cannot: ranges, uniqueness, non-empty lists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ma = &self.analysis.moving_average;
        if !ma.min_period_buffer.is_finite() || !(0.0..=1.0).contains(&ma.min_period_buffer) {
            return Err(ConfigError::ValidationError(format!(
                "analysis.moving_average.min_period_buffer must be within [0, 1], got {}",
                ma.min_period_buffer
            )));
        }
        if ma.windows.is_empty() {
            return Err(ConfigError::ValidationError(
                "analysis.moving_average.windows must list at least one window".to_string(),
            ));
        }
        let mut labels = HashSet::new();
        for window in &ma.windows {
            if window.span.is_zero() {
                return Err(ConfigError::ValidationError(format!(
                    "moving average window '{}' has a zero span",
                    window.label
                )));
            }
            if !labels.insert(window.label.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "moving average window '{}' is listed twice",
                    window.label
                )));
            }
        }
        if self.analysis.correlation.top_count == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.correlation.top_count must be at least 1".to_string(),
            ));
        }
        if matches!(&self.report.assets, Some(assets) if assets.is_empty()) {
            return Err(ConfigError::ValidationError(
                "report.assets must not be an empty list; omit it to report every asset".to_string(),
            ));
        }
        Ok(())
    }
}
