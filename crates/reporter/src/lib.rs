//! # Arkansas Reporter Crate
//!
//! This crate writes the analytics results to disk and renders them for the terminal.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Consumer:** It only reads from an `AnalyticsEngine`; all numbers are
//!   computed there. This crate decides names, layout and file format.
//! - **One File per Table:** Every result lands in its own CSV or JSON file, so the
//!   output can be loaded by any spreadsheet or notebook.
//!
//! ## Public API
//!
//! - `ReportGenerator`: Produces the overview and the per-asset reports.
//! - `TableWriter`: Writes a `Table` (or flat records) in the configured format.
//! - `render_table`: Converts a `Table` into a printable terminal table.
//! - `ReportError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod generator;
pub mod render;
pub mod writer;

// Re-export the key components to create a clean, public-facing API.
pub use error::ReportError;
pub use generator::{AssetReport, ReportGenerator};
pub use render::render_table;
pub use writer::TableWriter;
