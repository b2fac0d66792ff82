use crate::correlation::{self, CorrelationMatrix, RankedCorrelations};
use crate::day_stats::{self, DayStatTable};
use crate::error::AnalyticsError;
use crate::hourly::{self, HourlyMovementTable, HourlyProfile, MovementStrengthTable};
use crate::moving_average::{self, MovingAverageTable};
use crate::resample;
use chrono::NaiveDateTime;
use core_types::{DailyPanel, MovingAverageWindow, PricePanel, Series};

/// Default number of strongest / weakest counterparts in a correlation ranking.
pub const DEFAULT_CORRELATION_COUNT: usize = 10;

/// Default fraction of a window's nominal observation count required before a
/// rolling value is emitted.
pub const DEFAULT_MIN_PERIOD_BUFFER: f64 = 0.8;

/// Derives correlation, day, hourly and moving-average statistics from an hourly
/// price panel.
///
/// Everything the methods share (daily resampling, daily changes, the correlation
/// matrix) is computed once in [`AnalyticsEngine::new`]; afterwards the engine is
/// read-only and every method is a pure function of that state and its arguments.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    hourly: PricePanel,
    daily: DailyPanel,
    daily_pct_change: DailyPanel,
    daily_first_diff: DailyPanel,
    correlation: CorrelationMatrix,
}

impl AnalyticsEngine {
    pub fn new(hourly: PricePanel) -> Result<Self, AnalyticsError> {
        tracing::info!(
            "AnalyticsEngine: Processing data of {} assets over {} hourly rows.",
            hourly.asset_count(),
            hourly.len()
        );
        let daily = resample::resample_daily_last(&hourly)?;
        let daily_pct_change = resample::pct_change(&daily)?;
        let daily_first_diff = resample::first_diff(&daily)?;
        let correlation = correlation::estimate_correlation_matrix(&hourly, true);

        Ok(Self {
            hourly,
            daily,
            daily_pct_change,
            daily_first_diff,
            correlation,
        })
    }

    /// Builds the input panel from raw parts and the engine on top of it.
    pub fn from_columns(
        index: Vec<NaiveDateTime>,
        assets: Vec<String>,
        columns: Vec<Series>,
    ) -> Result<Self, AnalyticsError> {
        Self::new(PricePanel::new(index, assets, columns)?)
    }

    /// The canonical, sorted asset list shared by every output.
    pub fn assets(&self) -> &[String] {
        self.hourly.assets()
    }

    pub fn hourly_panel(&self) -> &PricePanel {
        &self.hourly
    }

    pub fn daily_panel(&self) -> &DailyPanel {
        &self.daily
    }

    pub fn daily_pct_change(&self) -> &DailyPanel {
        &self.daily_pct_change
    }

    pub fn daily_first_diff(&self) -> &DailyPanel {
        &self.daily_first_diff
    }

    /// The log-price correlation matrix computed at construction.
    pub fn correlation_matrix(&self) -> &CorrelationMatrix {
        &self.correlation
    }

    /// Recomputes the correlation matrix, optionally on raw instead of log prices.
    pub fn estimate_correlation_matrix(&self, log_series: bool) -> CorrelationMatrix {
        correlation::estimate_correlation_matrix(&self.hourly, log_series)
    }

    /// The correlation matrices of `target` with its `count` strongest and `count`
    /// weakest correlated assets, sliced from the cached matrix.
    ///
    /// Fails with [`AnalyticsError::UnknownAsset`] for an asset outside the panel.
    pub fn correlation_matrices_respect_to(
        &self,
        target: &str,
        count: usize,
    ) -> Result<RankedCorrelations, AnalyticsError> {
        correlation::rank_correlations(&self.correlation, target, count)
    }

    pub fn estimate_positive_negative_days_statistics(&self) -> DayStatTable {
        day_stats::estimate_positive_negative_days(&self.daily_pct_change, &self.daily_first_diff)
    }

    pub fn estimate_normalized_mean_movement_by_hour(&self) -> HourlyMovementTable {
        hourly::mean_movement_by_hour(&self.hourly, true, false)
    }

    /// How strongly prices move in each hour, on z-scored prices.
    pub fn estimate_normalized_absolute_mean_movement_by_hour(&self) -> HourlyMovementTable {
        hourly::mean_movement_by_hour(&self.hourly, true, true)
    }

    /// Mean movement in quote currency by hour and the movement strength index:
    /// mean absolute movement relative to its own average over the 24 hours.
    pub fn estimate_mean_movement_and_strength_by_hour(&self) -> MovementStrengthTable {
        let movement = hourly::mean_movement_by_hour(&self.hourly, false, false);
        let absolute = hourly::mean_movement_by_hour(&self.hourly, false, true);
        MovementStrengthTable {
            assets: movement.assets,
            mean_movement: movement.columns,
            strength: hourly::relative_to_daily_mean(&absolute.columns),
        }
    }

    /// Strength of the whole market by hour: the normalized absolute movement summed
    /// over assets, relative to its 24-hour mean.
    pub fn estimate_market_strength_profile(&self) -> HourlyProfile {
        hourly::market_strength_profile(&self.estimate_normalized_absolute_mean_movement_by_hour())
    }

    pub fn estimate_price_and_std_ma(
        &self,
        periods: &[MovingAverageWindow],
        min_period_buffer: f64,
    ) -> Result<MovingAverageTable, AnalyticsError> {
        moving_average::estimate_price_and_std_ma(&self.hourly, periods, min_period_buffer)
    }

    /// Moving averages over Monthly, Weekly and Daily windows with the default buffer.
    pub fn estimate_default_price_and_std_ma(&self) -> Result<MovingAverageTable, AnalyticsError> {
        self.estimate_price_and_std_ma(&MovingAverageWindow::defaults(), DEFAULT_MIN_PERIOD_BUFFER)
    }
}
