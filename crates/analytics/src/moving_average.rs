use crate::error::AnalyticsError;
use crate::report::Table;
use chrono::{NaiveDateTime, TimeDelta};
use core_types::{MovingAverageWindow, PricePanel, Series};
use serde::Serialize;
use std::collections::HashSet;

pub const TIMESTAMP_INDEX_NAME: &str = "Timestamp";

/// The two rolling statistics computed per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovingAverageStat {
    Price,
    Std,
}

impl MovingAverageStat {
    pub const ALL: [MovingAverageStat; 2] = [MovingAverageStat::Price, MovingAverageStat::Std];

    pub fn label(self) -> &'static str {
        match self {
            MovingAverageStat::Price => "Prices",
            MovingAverageStat::Std => "STD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageSeries {
    pub asset: String,
    pub stat: MovingAverageStat,
    pub window: String,
    pub values: Series,
}

/// Rolling price means and standard deviations for every (asset, statistic, window).
///
/// Series are ordered asset first, then statistic, then window in the order the
/// windows were requested. Rows where every series is missing are dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageTable {
    pub index: Vec<NaiveDateTime>,
    pub series: Vec<MovingAverageSeries>,
}

impl MovingAverageTable {
    pub fn get(&self, asset: &str, stat: MovingAverageStat, window: &str) -> Option<&[Option<f64>]> {
        self.series
            .iter()
            .find(|s| s.asset == asset && s.stat == stat && s.window == window)
            .map(|s| s.values.as_slice())
    }

    pub fn to_table(&self) -> Table {
        Table::new(
            TIMESTAMP_INDEX_NAME,
            vec!["Asset".to_string(), "Statistic".to_string(), "Window".to_string()],
            self.index
                .iter()
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .collect(),
            self.series
                .iter()
                .map(|s| vec![s.asset.clone(), s.stat.label().to_string(), s.window.clone()])
                .collect(),
            self.series.iter().map(|s| s.values.clone()).collect(),
        )
    }
}

/// Minimum number of present observations a window must hold before a value is
/// emitted: the span in hours times the buffer, rounded down.
pub fn min_periods(window: &MovingAverageWindow, min_period_buffer: f64) -> usize {
    (window.span_hours() * min_period_buffer).floor() as usize
}

pub fn validate_windows(windows: &[MovingAverageWindow], min_period_buffer: f64) -> Result<(), AnalyticsError> {
    if !min_period_buffer.is_finite() || min_period_buffer < 0.0 {
        return Err(AnalyticsError::invalid_parameter(
            "min_period_buffer",
            format!("must be a non-negative number, got {}", min_period_buffer),
        ));
    }
    let mut labels = HashSet::with_capacity(windows.len());
    for window in windows {
        if window.label.trim().is_empty() {
            return Err(AnalyticsError::invalid_parameter("periods", "window labels must not be empty"));
        }
        if !labels.insert(window.label.as_str()) {
            return Err(AnalyticsError::invalid_parameter(
                "periods",
                format!("duplicated window label '{}'", window.label),
            ));
        }
        if window.span.is_zero() {
            return Err(AnalyticsError::invalid_parameter(
                "periods",
                format!("window '{}' has a zero span", window.label),
            ));
        }
    }
    Ok(())
}

/// Rolling mean (Price) and sample standard deviation (STD) of every asset over each
/// trailing calendar-time window `(t - span, t]`.
pub fn estimate_price_and_std_ma(
    panel: &PricePanel,
    windows: &[MovingAverageWindow],
    min_period_buffer: f64,
) -> Result<MovingAverageTable, AnalyticsError> {
    validate_windows(windows, min_period_buffer)?;

    let mut per_window = Vec::with_capacity(windows.len());
    for window in windows {
        let span = TimeDelta::from_std(window.span).map_err(|e| {
            AnalyticsError::invalid_parameter("periods", format!("window '{}': {}", window.label, e))
        })?;
        let min_obs = min_periods(window, min_period_buffer);
        tracing::debug!(
            "MovingAverageEngine: window {} spans {} hours, requires {} observations.",
            window.label,
            window.span_hours(),
            min_obs
        );
        let rolled: Vec<(Series, Series)> = panel
            .columns()
            .iter()
            .map(|column| rolling_mean_std(panel.index(), column, span, min_obs))
            .collect();
        per_window.push(rolled);
    }

    let mut series = Vec::with_capacity(panel.asset_count() * windows.len() * 2);
    for (pos, asset) in panel.assets().iter().enumerate() {
        for stat in MovingAverageStat::ALL {
            for (w, window) in windows.iter().enumerate() {
                let (means, stds) = &per_window[w][pos];
                series.push(MovingAverageSeries {
                    asset: asset.clone(),
                    stat,
                    window: window.label.clone(),
                    values: match stat {
                        MovingAverageStat::Price => means.clone(),
                        MovingAverageStat::Std => stds.clone(),
                    },
                });
            }
        }
    }

    let keep: Vec<bool> = (0..panel.len())
        .map(|row| series.iter().any(|s| s.values[row].is_some()))
        .collect();
    let index = panel
        .index()
        .iter()
        .zip(&keep)
        .filter_map(|(ts, &k)| k.then_some(*ts))
        .collect();
    for s in &mut series {
        s.values = s.values.iter().zip(&keep).filter_map(|(v, &k)| k.then_some(*v)).collect();
    }

    Ok(MovingAverageTable { index, series })
}

/// Running count, mean and sum of squared deviations supporting removal.
///
/// `run` counts the identical values at the newest end of the window. Once it
/// covers the whole window the moments are reset to the exact `last` value and a
/// zero spread, so add/remove rounding cannot leave a flat window with a nonzero STD.
#[derive(Debug, Default)]
struct RollingMoments {
    count: usize,
    mean: f64,
    m2: f64,
    last: f64,
    run: usize,
}

impl RollingMoments {
    fn push(&mut self, x: f64) {
        if self.run > 0 && x == self.last {
            self.run += 1;
        } else {
            self.last = x;
            self.run = 1;
        }
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.settle();
    }

    /// Removes the oldest value of the window.
    fn pop(&mut self, x: f64) {
        self.count -= 1;
        if self.count == 0 {
            *self = Self::default();
            return;
        }
        let delta = x - self.mean;
        self.mean -= delta / self.count as f64;
        self.m2 -= delta * (x - self.mean);
        if self.m2 < 0.0 {
            self.m2 = 0.0;
        }
        self.run = self.run.min(self.count);
        self.settle();
    }

    fn settle(&mut self) {
        if self.run >= self.count {
            self.mean = self.last;
            self.m2 = 0.0;
        }
    }

    fn std(&self) -> Option<f64> {
        (self.count >= 2).then(|| (self.m2 / (self.count - 1) as f64).sqrt())
    }
}

fn rolling_mean_std(
    index: &[NaiveDateTime],
    column: &[Option<f64>],
    span: TimeDelta,
    min_periods: usize,
) -> (Series, Series) {
    let mut means = Vec::with_capacity(column.len());
    let mut stds = Vec::with_capacity(column.len());
    let mut moments = RollingMoments::default();
    let mut start = 0;

    for end in 0..column.len() {
        if let Some(x) = column[end] {
            moments.push(x);
        }
        if let Some(lower) = index[end].checked_sub_signed(span) {
            while index[start] <= lower {
                if let Some(x) = column[start] {
                    moments.pop(x);
                }
                start += 1;
            }
        }

        let enough = moments.count > 0 && moments.count >= min_periods;
        means.push(enough.then_some(moments.mean));
        stds.push(if enough { moments.std() } else { None });
    }
    (means, stds)
}
