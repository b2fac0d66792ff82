use crate::error::ReportError;
use crate::writer::TableWriter;
use analytics::correlation::rank_correlations;
use analytics::{AnalyticsEngine, AnalyticsError, CorrelationMatrix, Table};
use configuration::AnalysisConfig;
use serde::Serialize;
use std::path::PathBuf;

pub const ASSETS: &str = "assets";
pub const MOVEMENT_BY_HOUR: &str = "movement_by_hour";
pub const ABSOLUTE_MOVEMENT_BY_HOUR: &str = "absolute_movement_by_hour";
pub const MARKET_STRENGTH_BY_HOUR: &str = "market_strength_by_hour";
pub const CORRELATION_MATRIX: &str = "correlation_matrix";
pub const UNSTACKED_CORRELATION_MATRIX: &str = "unstacked_correlation_matrix";
pub const POSITIVE_NEGATIVE_DAYS: &str = "positive_negative_days";
pub const PRICE_AND_STD_MA: &str = "price_and_std_ma";
pub const HIGHEST_CORRELATED: &str = "highest_correlated";
pub const LOWEST_CORRELATED: &str = "lowest_correlated";

#[derive(Debug, Serialize)]
struct AssetEntry<'a> {
    #[serde(rename = "Asset")]
    asset: &'a str,
}

/// The per-asset tables of one target.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetReport {
    pub highest_correlated: Table,
    pub lowest_correlated: Table,
    pub positive_negative_days: Table,
    pub movement_by_hour: Table,
}

/// Turns engine results into report tables and hands them to a [`TableWriter`].
///
/// The correlation matrix, the day statistics and the hourly movement table feed
/// every per-asset report, so they are computed once here and sliced per target.
/// Per-asset correlation tables are always sub-matrices of the overview matrix.
pub struct ReportGenerator<'a> {
    engine: &'a AnalyticsEngine,
    config: AnalysisConfig,
    correlation: CorrelationMatrix,
    day_stats: Table,
    movement_and_strength: Table,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(engine: &'a AnalyticsEngine, config: &AnalysisConfig) -> Self {
        tracing::info!(
            "ReportGenerator: Preparing shared statistics for {} assets.",
            engine.assets().len()
        );
        let correlation = if config.correlation.log_series {
            engine.correlation_matrix().clone()
        } else {
            engine.estimate_correlation_matrix(false)
        };
        Self {
            engine,
            config: config.clone(),
            correlation,
            day_stats: engine.estimate_positive_negative_days_statistics().to_table(),
            movement_and_strength: engine.estimate_mean_movement_and_strength_by_hour().to_table(),
        }
    }

    pub fn assets(&self) -> &[String] {
        self.engine.assets()
    }

    /// The matrix written to the overview, on log or raw prices as configured.
    pub fn correlation_matrix(&self) -> &CorrelationMatrix {
        &self.correlation
    }

    /// Writes the market-wide tables into the writer's destination.
    pub fn generate_overview(&self, writer: &TableWriter) -> Result<Vec<PathBuf>, ReportError> {
        let engine = self.engine;
        let correlation = &self.correlation;
        let moving_averages = engine.estimate_price_and_std_ma(
            &self.config.moving_average.windows,
            self.config.moving_average.min_period_buffer,
        )?;
        let assets: Vec<AssetEntry> = engine
            .assets()
            .iter()
            .map(|asset| AssetEntry { asset })
            .collect();

        let written = vec![
            writer.write_records(ASSETS, &assets)?,
            writer.write_table(
                MOVEMENT_BY_HOUR,
                &engine.estimate_normalized_mean_movement_by_hour().to_table(),
            )?,
            writer.write_table(
                ABSOLUTE_MOVEMENT_BY_HOUR,
                &engine.estimate_normalized_absolute_mean_movement_by_hour().to_table(),
            )?,
            writer.write_table(
                MARKET_STRENGTH_BY_HOUR,
                &engine.estimate_market_strength_profile().to_table(),
            )?,
            writer.write_table(CORRELATION_MATRIX, &correlation.to_table())?,
            writer.write_records(UNSTACKED_CORRELATION_MATRIX, &correlation.unstack())?,
            writer.write_table(POSITIVE_NEGATIVE_DAYS, &self.day_stats)?,
            writer.write_table(PRICE_AND_STD_MA, &moving_averages.to_table())?,
        ];
        tracing::info!(
            "ReportGenerator: Overview saved in {}.",
            writer.destination().display()
        );
        Ok(written)
    }

    /// Builds the per-asset tables of `target` without writing them.
    pub fn asset_report(&self, target: &str) -> Result<AssetReport, ReportError> {
        let ranked = rank_correlations(&self.correlation, target, self.config.correlation.top_count)?;
        let unknown = || ReportError::Analytics(AnalyticsError::UnknownAsset(target.to_string()));

        Ok(AssetReport {
            highest_correlated: ranked.highest.to_table(),
            lowest_correlated: ranked.lowest.to_table(),
            positive_negative_days: self.day_stats.select(target).ok_or_else(unknown)?,
            movement_by_hour: self.movement_and_strength.select(target).ok_or_else(unknown)?,
        })
    }

    /// Writes the per-asset tables of `target` into `<destination>/<target>/`.
    pub fn generate_asset_report(&self, writer: &TableWriter, target: &str) -> Result<Vec<PathBuf>, ReportError> {
        let report = self.asset_report(target)?;
        let folder = writer.subfolder(target);
        let written = vec![
            folder.write_table(HIGHEST_CORRELATED, &report.highest_correlated)?,
            folder.write_table(LOWEST_CORRELATED, &report.lowest_correlated)?,
            folder.write_table(POSITIVE_NEGATIVE_DAYS, &report.positive_negative_days)?,
            folder.write_table(MOVEMENT_BY_HOUR, &report.movement_by_hour)?,
        ];
        tracing::debug!(
            "ReportGenerator: Report for {} saved in {}.",
            target,
            folder.destination().display()
        );
        Ok(written)
    }
}
