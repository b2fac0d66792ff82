use crate::report::Table;
use crate::stats::mean;
use core_types::DailyPanel;
use serde::Serialize;

pub const POSITIVE_DAYS: &str = "Positive days";
pub const NEGATIVE_DAYS: &str = "Negative days";

/// Row labels of the day statistics table, in output order.
pub const DAY_STAT_ROWS: [&str; 4] = [
    "Days count",
    "Days count (%)",
    "Days changes mean (%)",
    "Days changes mean (USDT)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DaySign {
    Positive,
    Negative,
}

impl DaySign {
    /// Zero-change days match neither sign.
    fn matches(self, change: f64) -> bool {
        match self {
            DaySign::Positive => change > 0.0,
            DaySign::Negative => change < 0.0,
        }
    }
}

/// Statistics of the days of one sign for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBucketStats {
    pub count: usize,
    /// `count` over the number of days with a known, non-zero change. Zero-change
    /// days belong to neither bucket and are left out of the denominator too.
    pub count_share: Option<f64>,
    pub mean_pct_change: Option<f64>,
    /// Mean first difference, in quote currency.
    pub mean_change: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetDayStats {
    pub asset: String,
    /// Days with a known change, zero changes included.
    pub observed_days: usize,
    /// Days with a known, non-zero change: the share denominator.
    pub signed_days: usize,
    pub positive: DayBucketStats,
    pub negative: DayBucketStats,
}

/// Per-asset positive/negative day statistics, in canonical asset order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStatTable {
    pub stats: Vec<AssetDayStats>,
}

impl DayStatTable {
    pub fn get(&self, asset: &str) -> Option<&AssetDayStats> {
        self.stats.iter().find(|s| s.asset == asset)
    }

    /// Rows are `DAY_STAT_ROWS`, columns are (asset, Positive days | Negative days).
    pub fn to_table(&self) -> Table {
        let mut columns = Vec::with_capacity(self.stats.len() * 2);
        let mut data = Vec::with_capacity(self.stats.len() * 2);
        for stat in &self.stats {
            for (label, bucket) in [(POSITIVE_DAYS, &stat.positive), (NEGATIVE_DAYS, &stat.negative)] {
                columns.push(vec![stat.asset.clone(), label.to_string()]);
                data.push(vec![
                    Some(bucket.count as f64),
                    bucket.count_share,
                    bucket.mean_pct_change,
                    bucket.mean_change,
                ]);
            }
        }
        Table::new(
            "",
            vec!["Asset".to_string(), "Days".to_string()],
            DAY_STAT_ROWS.iter().map(|r| r.to_string()).collect(),
            columns,
            data,
        )
    }
}

/// Splits the daily changes of every asset into positive and negative days.
///
/// The relative mean comes from the percentage-change panel and the absolute mean
/// from the first-difference panel, each filtered by its own sign.
pub fn estimate_positive_negative_days(pct_change: &DailyPanel, first_diff: &DailyPanel) -> DayStatTable {
    let stats = pct_change
        .assets()
        .iter()
        .enumerate()
        .map(|(pos, asset)| {
            let changes: Vec<f64> = pct_change.column(pos).iter().flatten().copied().collect();
            let diffs: Vec<f64> = first_diff.column(pos).iter().flatten().copied().collect();
            let signed_days = changes.iter().filter(|c| **c != 0.0).count();
            AssetDayStats {
                asset: asset.clone(),
                observed_days: changes.len(),
                signed_days,
                positive: bucket(&changes, &diffs, signed_days, DaySign::Positive),
                negative: bucket(&changes, &diffs, signed_days, DaySign::Negative),
            }
        })
        .collect();
    DayStatTable { stats }
}

fn bucket(changes: &[f64], diffs: &[f64], signed_days: usize, sign: DaySign) -> DayBucketStats {
    let selected: Vec<f64> = changes.iter().copied().filter(|c| sign.matches(*c)).collect();
    let count = selected.len();
    DayBucketStats {
        count,
        count_share: (signed_days > 0).then(|| count as f64 / signed_days as f64),
        mean_pct_change: mean(selected),
        mean_change: mean(diffs.iter().copied().filter(|d| sign.matches(*d))),
    }
}
