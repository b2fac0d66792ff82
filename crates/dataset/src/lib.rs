//! # Arkansas Dataset Crate
//!
//! This crate turns price files on disk into the `PricePanel` the analytics engine
//! consumes, and writes panels back out.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Adapter:** All file formats live here. The rest of the system only
//!   ever sees a validated `PricePanel`.
//! - **Fail Loudly, Point Precisely:** Parse failures carry the line number and the
//!   offending text instead of silently dropping rows.
//!
//! ## Public API
//!
//! - `read_price_panel` / `write_price_panel`: The wide CSV layout (timestamp column,
//!   then one column per asset).
//! - `read_legacy_panel`: The raw per-pair export, converted into the same panel.
//! - `DataError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod csv_panel;
pub mod error;
pub mod fields;
pub mod legacy;

// Re-export the key components to create a clean, public-facing API.
pub use csv_panel::{
    read_price_panel, read_price_panel_file, write_price_panel, write_price_panel_file,
};
pub use error::DataError;
pub use fields::parse_timestamp;
pub use legacy::{read_legacy_panel, read_legacy_panel_file};
