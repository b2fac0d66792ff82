//! # Arkansas Core Types
//!
//! Layer 0 of the workspace: the data structures every other crate agrees on.
//!
//! - `Panel`: a timestamp (or calendar-day) indexed table of prices with a fixed,
//!   sorted asset list. `PricePanel` is the hourly input, `DailyPanel` the resampled one.
//! - `MovingAverageWindow`: a labeled calendar span for the rolling statistics.
//! - `CoreError`: construction failures for malformed panels.

pub mod error;
pub mod panel;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use panel::{DailyPanel, Panel, PricePanel, Series};
pub use window::MovingAverageWindow;
