use core_types::Series;
use serde::{Deserialize, Serialize};

/// A labeled two-dimensional result, the common shape every engine output is
/// converted into before it is handed to a consumer (file writer, terminal, ...).
///
/// Column keys are hierarchical: `columns[c]` has one part per entry of
/// `column_levels`, e.g. `["BTCUSDT", "Positive days"]`. The cell data is stored
/// column-major, `data[c][r]` being the value of column `c` at row `r`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub index_name: String,
    pub column_levels: Vec<String>,
    pub index: Vec<String>,
    pub columns: Vec<Vec<String>>,
    pub data: Vec<Series>,
}

impl Table {
    pub fn new(
        index_name: impl Into<String>,
        column_levels: Vec<String>,
        index: Vec<String>,
        columns: Vec<Vec<String>>,
        data: Vec<Series>,
    ) -> Self {
        debug_assert_eq!(columns.len(), data.len());
        debug_assert!(columns.iter().all(|key| key.len() == column_levels.len()));
        debug_assert!(data.iter().all(|column| column.len() == index.len()));
        Self {
            index_name: index_name.into(),
            column_levels,
            index,
            columns,
            data,
        }
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The column whose key matches `key` exactly.
    pub fn column(&self, key: &[&str]) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|candidate| candidate.iter().map(String::as_str).eq(key.iter().copied()))
            .map(|pos| self.data[pos].as_slice())
    }

    /// The cell at row `row_label`, column `key`. `None` when absent or missing.
    pub fn get(&self, row_label: &str, key: &[&str]) -> Option<f64> {
        let row = self.index.iter().position(|label| label == row_label)?;
        self.column(key)?.get(row).copied().flatten()
    }

    /// The sub-table of the columns whose first key part equals `first`, with that
    /// level dropped. This is how a single asset's slice is taken out of a
    /// multi-asset table.
    pub fn select(&self, first: &str) -> Option<Table> {
        if self.column_levels.len() < 2 {
            return None;
        }
        let (columns, data): (Vec<Vec<String>>, Vec<Series>) = self
            .columns
            .iter()
            .zip(&self.data)
            .filter(|(key, _)| key[0] == first)
            .map(|(key, column)| (key[1..].to_vec(), column.clone()))
            .unzip();
        if columns.is_empty() {
            return None;
        }
        Some(Table::new(
            self.index_name.clone(),
            self.column_levels[1..].to_vec(),
            self.index.clone(),
            columns,
            data,
        ))
    }

    /// Row-major view of the cells, convenient for writers.
    pub fn rows(&self) -> impl Iterator<Item = (&str, Vec<Option<f64>>)> + '_ {
        self.index.iter().enumerate().map(move |(r, label)| {
            (
                label.as_str(),
                self.data.iter().map(|column| column[r]).collect(),
            )
        })
    }
}
