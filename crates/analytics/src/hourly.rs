use crate::report::Table;
use crate::stats::{lagged, mean, sample_std};
use chrono::Timelike;
use core_types::{PricePanel, Series};
use serde::Serialize;

pub const HOURS_PER_DAY: usize = 24;
pub const HOUR_INDEX_NAME: &str = "Hour";
pub const MEAN_MOVEMENT: &str = "Mean Movement (USDT)";
pub const MOVEMENT_STRENGTH: &str = "Movement Strength";

/// Mean first difference by hour of day: one column per asset, always 24 rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyMovementTable {
    pub assets: Vec<String>,
    pub columns: Vec<Series>,
}

/// Unnormalized mean movement next to its strength index, per asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovementStrengthTable {
    pub assets: Vec<String>,
    pub mean_movement: Vec<Series>,
    pub strength: Vec<Series>,
}

/// A single 24-hour profile aggregated over all assets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyProfile {
    pub label: String,
    pub values: Series,
}

impl HourlyMovementTable {
    pub fn column(&self, asset: &str) -> Option<&[Option<f64>]> {
        let pos = self.assets.iter().position(|a| a == asset)?;
        Some(&self.columns[pos])
    }

    pub fn get(&self, hour: usize, asset: &str) -> Option<f64> {
        self.column(asset)?.get(hour).copied().flatten()
    }

    pub fn to_table(&self) -> Table {
        Table::new(
            HOUR_INDEX_NAME,
            vec![String::new()],
            hour_labels(),
            self.assets.iter().map(|a| vec![a.clone()]).collect(),
            self.columns.clone(),
        )
    }
}

impl MovementStrengthTable {
    /// Columns are (asset, Mean Movement (USDT) | Movement Strength).
    pub fn to_table(&self) -> Table {
        let mut columns = Vec::with_capacity(self.assets.len() * 2);
        let mut data = Vec::with_capacity(self.assets.len() * 2);
        for (pos, asset) in self.assets.iter().enumerate() {
            columns.push(vec![asset.clone(), MEAN_MOVEMENT.to_string()]);
            data.push(self.mean_movement[pos].clone());
            columns.push(vec![asset.clone(), MOVEMENT_STRENGTH.to_string()]);
            data.push(self.strength[pos].clone());
        }
        Table::new(
            HOUR_INDEX_NAME,
            vec!["Asset".to_string(), String::new()],
            hour_labels(),
            columns,
            data,
        )
    }
}

impl HourlyProfile {
    pub fn to_table(&self) -> Table {
        Table::new(
            HOUR_INDEX_NAME,
            vec![String::new()],
            hour_labels(),
            vec![vec![self.label.clone()]],
            vec![self.values.clone()],
        )
    }
}

fn hour_labels() -> Vec<String> {
    (0..HOURS_PER_DAY).map(|h| h.to_string()).collect()
}

/// Averages the first differences of every asset by the hour of day of each row.
///
/// * `normalize` - z-score each asset over the whole sample first, so assets with
///   very different price levels become comparable.
/// * `absolute_value` - average |first difference| instead, a measure of how strongly
///   the price moves in that hour regardless of direction.
///
/// First differences are positional: each row is compared with the previous row.
pub fn mean_movement_by_hour(panel: &PricePanel, normalize: bool, absolute_value: bool) -> HourlyMovementTable {
    let hours: Vec<usize> = panel.index().iter().map(|ts| ts.hour() as usize).collect();

    let columns = panel
        .assets()
        .iter()
        .enumerate()
        .map(|(pos, asset)| {
            let prices = if normalize {
                standardize(asset, panel.column(pos))
            } else {
                panel.column(pos).to_vec()
            };
            let mut moves = lagged(&prices, |prev, cur| cur - prev);
            if absolute_value {
                moves.iter_mut().for_each(|m| *m = m.map(f64::abs));
            }
            group_mean_by_hour(&hours, &moves)
        })
        .collect();

    HourlyMovementTable {
        assets: panel.assets().to_vec(),
        columns,
    }
}

/// Divides every hour of each column by the column's mean across hours, so the
/// resulting index averages 1 over the day.
pub fn relative_to_daily_mean(columns: &[Series]) -> Vec<Series> {
    columns.iter().map(|column| relative_to_mean(column)).collect()
}

/// Sums the normalized absolute movement of all assets per hour and expresses each
/// hour relative to the mean of these sums.
/// Hours a column does not cover count as no movement for that asset.
pub fn market_strength_profile(normalized_absolute: &HourlyMovementTable) -> HourlyProfile {
    let sums: Series = (0..HOURS_PER_DAY)
        .map(|hour| {
            Some(
                normalized_absolute
                    .columns
                    .iter()
                    .filter_map(|column| column.get(hour).copied().flatten())
                    .sum::<f64>(),
            )
        })
        .collect();
    HourlyProfile {
        label: MOVEMENT_STRENGTH.to_string(),
        values: relative_to_mean(&sums),
    }
}

fn relative_to_mean(column: &[Option<f64>]) -> Series {
    match mean(column.iter().flatten().copied()) {
        Some(m) if m != 0.0 && m.is_finite() => column.iter().map(|v| v.map(|v| v / m)).collect(),
        _ => vec![None; column.len()],
    }
}

fn standardize(asset: &str, column: &[Option<f64>]) -> Series {
    let present: Vec<f64> = column.iter().flatten().copied().collect();
    match (mean(present.iter().copied()), sample_std(&present)) {
        (Some(mu), Some(sigma)) if sigma > 0.0 => column.iter().map(|v| v.map(|v| (v - mu) / sigma)).collect(),
        _ => {
            tracing::warn!(
                "HourlyMovementEngine: {} has no price dispersion, its normalized movement is missing.",
                asset
            );
            vec![None; column.len()]
        }
    }
}

fn group_mean_by_hour(hours: &[usize], moves: &[Option<f64>]) -> Series {
    let mut sums = [0.0; HOURS_PER_DAY];
    let mut counts = [0usize; HOURS_PER_DAY];
    for (&hour, movement) in hours.iter().zip(moves) {
        if let Some(m) = movement {
            sums[hour] += m;
            counts[hour] += 1;
        }
    }
    sums.iter()
        .zip(counts)
        .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, NaiveDateTime};

    fn hourly(start_hour: u32, prices: Vec<Vec<Option<f64>>>, assets: &[&str]) -> PricePanel {
        let start: NaiveDateTime = NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(start_hour, 0, 0)
            .unwrap();
        let rows = prices[0].len();
        let index = (0..rows)
            .map(|r| start + chrono::TimeDelta::hours(r as i64))
            .collect();
        PricePanel::new(index, assets.iter().map(|a| a.to_string()).collect(), prices).unwrap()
    }

    #[test]
    fn movement_is_grouped_by_hour_of_day() {
        // 48 rows starting at midnight: each hour appears twice.
        let prices: Vec<Option<f64>> = (0..48).map(|i| Some((i * i) as f64)).collect();
        let table = mean_movement_by_hour(&hourly(0, vec![prices], &["A"]), false, false);

        assert_eq!(table.columns[0].len(), HOURS_PER_DAY);
        // Hour 0: only row 24 has a previous row (24^2 - 23^2 = 47).
        assert_relative_eq!(table.get(0, "A").unwrap(), 47.0);
        // Hour 5: (25 - 16) and (29^2 - 28^2) = 9 and 57.
        assert_relative_eq!(table.get(5, "A").unwrap(), 33.0);
    }

    #[test]
    fn absolute_movement_ignores_direction() {
        let prices = vec![Some(1.0), Some(3.0), Some(2.0), Some(4.0)];
        let raw = mean_movement_by_hour(&hourly(22, vec![prices.clone()], &["A"]), false, false);
        let abs = mean_movement_by_hour(&hourly(22, vec![prices], &["A"]), false, true);

        assert_eq!(raw.get(22, "A"), None);
        assert_eq!(raw.get(23, "A"), Some(2.0));
        assert_eq!(raw.get(0, "A"), Some(-1.0));
        assert_eq!(abs.get(0, "A"), Some(1.0));
        assert_eq!(abs.get(1, "A"), Some(2.0));
        assert_eq!(abs.get(12, "A"), None);
    }

    #[test]
    fn normalized_movement_is_scale_free() {
        let base: Vec<Option<f64>> = (0..30).map(|i| Some(10.0 + (i as f64).sin())).collect();
        let scaled: Vec<Option<f64>> = base.iter().map(|v| v.map(|v| v * 1000.0 + 5.0)).collect();
        let table = mean_movement_by_hour(&hourly(0, vec![base, scaled], &["A", "B"]), true, false);
        for hour in 0..HOURS_PER_DAY {
            match (table.get(hour, "A"), table.get(hour, "B")) {
                (Some(a), Some(b)) => assert_relative_eq!(a, b, epsilon = 1e-9),
                (a, b) => assert_eq!(a, b),
            }
        }
    }

    #[test]
    fn flat_series_normalize_to_missing() {
        let flat = vec![Some(5.0); 6];
        let table = mean_movement_by_hour(&hourly(0, vec![flat], &["A"]), true, true);
        assert!(table.columns[0].iter().all(Option::is_none));
    }

    #[test]
    fn relative_index_averages_one() {
        let column: Series = (0..HOURS_PER_DAY).map(|h| if h == 3 { None } else { Some(h as f64 + 1.0) }).collect();
        let relative = relative_to_daily_mean(&[column]);
        let values: Vec<f64> = relative[0].iter().flatten().copied().collect();
        assert_eq!(values.len(), HOURS_PER_DAY - 1);
        assert_relative_eq!(values.iter().sum::<f64>() / values.len() as f64, 1.0, epsilon = 1e-12);
        assert_eq!(relative[0][3], None);

        let zeros = relative_to_daily_mean(&[vec![Some(0.0); HOURS_PER_DAY]]);
        assert!(zeros[0].iter().all(Option::is_none));
    }

    #[test]
    fn market_profile_sums_over_assets() {
        let mut a = vec![Some(1.0); HOURS_PER_DAY];
        let mut b = vec![Some(1.0); HOURS_PER_DAY];
        a[0] = Some(3.0);
        b[0] = None;
        b[1] = Some(3.0);
        let table = HourlyMovementTable {
            assets: vec!["A".to_string(), "B".to_string()],
            columns: vec![a, b],
        };
        let profile = market_strength_profile(&table);
        // Sums: hour 0 -> 3, hour 1 -> 4, the 22 others -> 2; mean = 51 / 24.
        let m = 51.0 / 24.0;
        assert_relative_eq!(profile.values[0].unwrap(), 3.0 / m);
        assert_relative_eq!(profile.values[1].unwrap(), 4.0 / m);
        assert_relative_eq!(profile.values[7].unwrap(), 2.0 / m);
        assert_eq!(profile.to_table().row_count(), HOURS_PER_DAY);
    }

    #[test]
    fn market_profile_accepts_short_columns() {
        let table = HourlyMovementTable {
            assets: vec!["A".to_string(), "B".to_string()],
            columns: vec![vec![Some(2.0); HOURS_PER_DAY], vec![Some(2.0); 12]],
        };
        let profile = market_strength_profile(&table);
        // Sums: hours 0..12 -> 4, hours 12..24 -> 2; mean = 3.
        assert_eq!(profile.values.len(), HOURS_PER_DAY);
        assert_relative_eq!(profile.values[0].unwrap(), 4.0 / 3.0);
        assert_relative_eq!(profile.values[23].unwrap(), 2.0 / 3.0);

        let empty = HourlyMovementTable { assets: Vec::new(), columns: Vec::new() };
        assert!(market_strength_profile(&empty).values.iter().all(Option::is_none));
    }
}
