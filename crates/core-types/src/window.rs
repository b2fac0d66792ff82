use serde::{Deserialize, Serialize};
use std::time::Duration;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: u64 = 86_400;

/// A named calendar-time span for the rolling price/STD averages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovingAverageWindow {
    /// Column label used in the output table (e.g. "Monthly").
    pub label: String,
    /// Trailing span of the window, written as "30d", "7d", "12h", ... in config files.
    #[serde(with = "humantime_serde")]
    pub span: Duration,
}

impl MovingAverageWindow {
    pub fn new(label: impl Into<String>, span: Duration) -> Self {
        Self {
            label: label.into(),
            span,
        }
    }

    pub fn days(label: impl Into<String>, days: u64) -> Self {
        Self::new(label, Duration::from_secs(days * SECONDS_PER_DAY))
    }

    /// Monthly (30 days), Weekly (7 days) and Daily (1 day), in that order.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::days("Monthly", 30),
            Self::days("Weekly", 7),
            Self::days("Daily", 1),
        ]
    }

    /// The span expressed as a number of hourly observations.
    pub fn span_hours(&self) -> f64 {
        self.span.as_secs_f64() / SECONDS_PER_HOUR
    }
}
