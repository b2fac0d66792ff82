use crate::error::CoreError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Debug;

/// A single asset column. `None` marks a missing observation.
pub type Series = Vec<Option<f64>>;

/// A two-dimensional table of prices: one row per index entry, one column per asset.
///
/// The asset list is sorted lexicographically when the panel is built and every panel
/// derived from it keeps that exact order, so a column position means the same asset
/// everywhere in the system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel<I> {
    index: Vec<I>,
    assets: Vec<String>,
    columns: Vec<Series>,
}

/// The hourly input panel.
pub type PricePanel = Panel<NaiveDateTime>;

/// One row per calendar day.
pub type DailyPanel = Panel<NaiveDate>;

impl<I: Ord + Debug> Panel<I> {
    /// Validates the raw parts and builds a panel with its assets in canonical (sorted) order.
    pub fn new(index: Vec<I>, assets: Vec<String>, columns: Vec<Series>) -> Result<Self, CoreError> {
        if assets.is_empty() {
            return Err(invalid("assets", "the panel has no asset columns"));
        }
        if assets.len() != columns.len() {
            return Err(invalid(
                "columns",
                format!("{} asset identifiers but {} columns", assets.len(), columns.len()),
            ));
        }

        let mut seen = HashSet::with_capacity(assets.len());
        for asset in &assets {
            if asset.trim().is_empty() {
                return Err(invalid("assets", "asset identifiers must not be empty"));
            }
            if !seen.insert(asset.as_str()) {
                return Err(invalid("assets", format!("duplicated asset identifier '{}'", asset)));
            }
        }

        let mut paired: Vec<(String, Series)> = assets.into_iter().zip(columns).collect();
        paired.sort_by(|a, b| a.0.cmp(&b.0));
        let (assets, columns): (Vec<String>, Vec<Series>) = paired.into_iter().unzip();

        Self::build(index, assets, columns)
    }

    /// Builds a new panel over the same canonical asset list with a different index.
    pub fn derive<J: Ord + Debug>(
        &self,
        index: Vec<J>,
        columns: Vec<Series>,
    ) -> Result<Panel<J>, CoreError> {
        if columns.len() != self.assets.len() {
            return Err(invalid(
                "columns",
                format!("{} assets but {} columns", self.assets.len(), columns.len()),
            ));
        }
        Panel::<J>::build(index, self.assets.clone(), columns)
    }

    fn build(index: Vec<I>, assets: Vec<String>, mut columns: Vec<Series>) -> Result<Self, CoreError> {
        if index.is_empty() {
            return Err(invalid("index", "the panel has no rows"));
        }
        if let Some(pos) = index.windows(2).position(|w| w[0] >= w[1]) {
            return Err(invalid(
                "index",
                format!(
                    "index must be strictly increasing, found {:?} followed by {:?}",
                    index[pos],
                    index[pos + 1]
                ),
            ));
        }
        for (asset, column) in assets.iter().zip(&columns) {
            if column.len() != index.len() {
                return Err(invalid(
                    "columns",
                    format!("column '{}' has {} rows, index has {}", asset, column.len(), index.len()),
                ));
            }
        }

        // NaN is never a price; store it as a missing observation.
        for column in &mut columns {
            for cell in column.iter_mut() {
                if matches!(cell, Some(v) if v.is_nan()) {
                    *cell = None;
                }
            }
        }

        Ok(Self { index, assets, columns })
    }
}

impl<I> Panel<I> {
    pub fn index(&self) -> &[I] {
        &self.index
    }

    /// The canonical, sorted asset list.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    /// The column at `position` in the canonical asset list.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of bounds.
    pub fn column(&self, position: usize) -> &[Option<f64>] {
        &self.columns[position]
    }

    pub fn column_by_asset(&self, asset: &str) -> Option<&[Option<f64>]> {
        self.asset_position(asset).map(|pos| self.column(pos))
    }

    pub fn asset_position(&self, asset: &str) -> Option<usize> {
        self.assets.binary_search_by(|a| a.as_str().cmp(asset)).ok()
    }

    pub fn value(&self, row: usize, asset: usize) -> Option<f64> {
        self.columns.get(asset)?.get(row).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Applies `f` to every present cell. Missing cells stay missing and `f` may
    /// turn a value into a missing one (e.g. the log of a non-positive price).
    pub fn map_values<F>(&self, f: F) -> Self
    where
        I: Clone,
        F: Fn(f64) -> Option<f64>,
    {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .map(|cell| cell.and_then(&f).filter(|v| !v.is_nan()))
                    .collect()
            })
            .collect();
        Self {
            index: self.index.clone(),
            assets: self.assets.clone(),
            columns,
        }
    }
}

fn invalid(field: &str, message: impl Into<String>) -> CoreError {
    CoreError::InvalidInput(field.to_string(), message.into())
}
