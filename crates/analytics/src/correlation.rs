use crate::error::AnalyticsError;
use crate::report::Table;
use crate::stats::pearson;
use core_types::PricePanel;
use serde::Serialize;
use std::cmp::Ordering;

pub const HIGHEST_CORRELATED: &str = "HighestCorrelated";
pub const LOWEST_CORRELATED: &str = "LowestCorrelated";

/// Square, symmetric matrix of pairwise correlations with a unit diagonal.
///
/// An off-diagonal cell is `None` when the pair does not have enough overlapping,
/// non-constant observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    assets: Vec<String>,
    values: Vec<Vec<Option<f64>>>,
}

/// One cell of the matrix in long format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    #[serde(rename = "THIS")]
    pub this: String,
    #[serde(rename = "OTHER")]
    pub other: String,
    #[serde(rename = "Correlation")]
    pub correlation: Option<f64>,
}

/// The correlation matrices of a target and its strongest / weakest counterparts.
/// Both are indexed target first, followed by the ranked counterparts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCorrelations {
    pub highest: CorrelationMatrix,
    pub lowest: CorrelationMatrix,
}

impl CorrelationMatrix {
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn position(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get(row)?.get(col).copied().flatten()
    }

    pub fn get_by_asset(&self, this: &str, other: &str) -> Option<f64> {
        self.get(self.position(this)?, self.position(other)?)
    }

    pub fn row(&self, row: usize) -> &[Option<f64>] {
        &self.values[row]
    }

    /// The square slice of the matrix over `positions`, in that order.
    pub fn select(&self, positions: &[usize]) -> Self {
        Self {
            assets: positions.iter().map(|&p| self.assets[p].clone()).collect(),
            values: positions
                .iter()
                .map(|&r| positions.iter().map(|&c| self.values[r][c]).collect())
                .collect(),
        }
    }

    /// Every cell as a (this, other, correlation) triple, row by row.
    pub fn unstack(&self) -> Vec<CorrelationPair> {
        self.assets
            .iter()
            .enumerate()
            .flat_map(|(r, this)| {
                self.assets.iter().enumerate().map(move |(c, other)| CorrelationPair {
                    this: this.clone(),
                    other: other.clone(),
                    correlation: self.values[r][c],
                })
            })
            .collect()
    }

    pub fn to_table(&self) -> Table {
        Table::new(
            "",
            vec![String::new()],
            self.assets.clone(),
            self.assets.iter().map(|a| vec![a.clone()]).collect(),
            (0..self.len())
                .map(|c| self.values.iter().map(|row| row[c]).collect())
                .collect(),
        )
    }
}

/// Pairwise Pearson correlation of every asset pair over their mutually present rows.
///
/// With `log_series` the prices are log-transformed first; the log of a
/// non-positive price is treated as a missing observation.
pub fn estimate_correlation_matrix(panel: &PricePanel, log_series: bool) -> CorrelationMatrix {
    let logged;
    let series = if log_series {
        logged = panel.map_values(|v| (v > 0.0).then(|| v.ln()));
        &logged
    } else {
        panel
    };

    let n = series.asset_count();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        values[i][i] = Some(1.0);
        for j in (i + 1)..n {
            let r = pearson(series.column(i), series.column(j));
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    let missing = values.iter().flatten().filter(|v| v.is_none()).count() / 2;
    if missing > 0 {
        tracing::warn!(
            "CorrelationEngine: {} asset pairs lack enough overlapping observations.",
            missing
        );
    }

    CorrelationMatrix {
        assets: series.assets().to_vec(),
        values,
    }
}

/// Ranks the other assets by absolute correlation with `target` and slices out the
/// matrices of the `count` strongest and `count` weakest counterparts.
///
/// `count` is clamped to the number of other assets. The ranking is a stable
/// ascending sort on |correlation| over the matrix order, with missing correlations
/// ranked weakest; the strongest list is its tail in reverse.
pub fn rank_correlations(
    matrix: &CorrelationMatrix,
    target: &str,
    count: usize,
) -> Result<RankedCorrelations, AnalyticsError> {
    let target_pos = matrix
        .position(target)
        .ok_or_else(|| AnalyticsError::UnknownAsset(target.to_string()))?;
    let count = count.min(matrix.len() - 1);

    let mut ranked: Vec<(usize, Option<f64>)> = matrix
        .row(target_pos)
        .iter()
        .enumerate()
        .filter(|(pos, _)| *pos != target_pos)
        .map(|(pos, corr)| (pos, corr.map(f64::abs)))
        .collect();
    ranked.sort_by(|a, b| ascending_strength(a.1, b.1));

    let strongest: Vec<usize> = ranked.iter().rev().take(count).map(|(pos, _)| *pos).collect();
    let weakest: Vec<usize> = ranked.iter().take(count).map(|(pos, _)| *pos).collect();

    let compose = |picked: Vec<usize>| {
        let positions: Vec<usize> = std::iter::once(target_pos).chain(picked).collect();
        matrix.select(&positions)
    };
    let highest = compose(strongest);
    let lowest = compose(weakest);

    tracing::debug!(
        "CorrelationEngine: ranked {} counterparts of {} (count = {}).",
        ranked.len(),
        target,
        count
    );
    Ok(RankedCorrelations { highest, lowest })
}

fn ascending_strength(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
