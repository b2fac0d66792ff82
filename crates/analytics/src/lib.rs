//! # Arkansas Analytics Engine
//!
//! This crate derives the statistical summaries of a multi-asset hourly price panel:
//! a correlation matrix, positive/negative day statistics, hourly movement and
//! seasonality profiles, and multi-horizon moving averages of price and dispersion.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files,
//!   terminals or configuration. It depends only on `core-types` (Layer 0).
//! - **Derive Once:** `AnalyticsEngine::new` resamples the panel and computes the
//!   correlation matrix a single time; every method afterwards is read-only.
//! - **Missing, Not Zero:** insufficient data always yields a missing cell, never an error.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The entry point holding the derived state.
//! - `Table`: The labeled shape every result converts to for consumers.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod correlation;
pub mod day_stats;
pub mod engine;
pub mod error;
pub mod hourly;
pub mod moving_average;
pub mod report;
pub mod resample;
mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use correlation::{CorrelationMatrix, CorrelationPair, RankedCorrelations};
pub use day_stats::{AssetDayStats, DayBucketStats, DayStatTable};
pub use engine::{AnalyticsEngine, DEFAULT_CORRELATION_COUNT, DEFAULT_MIN_PERIOD_BUFFER};
pub use error::AnalyticsError;
pub use hourly::{HourlyMovementTable, HourlyProfile, MovementStrengthTable};
pub use moving_average::{MovingAverageStat, MovingAverageTable};
pub use report::Table;
