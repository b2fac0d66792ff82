use crate::error::AnalyticsError;
use crate::stats::lagged;
use chrono::NaiveDate;
use core_types::{DailyPanel, Panel, PricePanel, Series};
use std::fmt::Debug;

/// Resamples the hourly panel to one row per calendar day, keeping the last
/// present observation of each asset within the day.
///
/// Every calendar day between the first and last timestamp gets a row, so a day
/// without any observation for an asset is missing rather than skipped.
pub fn resample_daily_last(panel: &PricePanel) -> Result<DailyPanel, AnalyticsError> {
    let (Some(first), Some(last)) = (panel.index().first(), panel.index().last()) else {
        return Err(AnalyticsError::invalid_parameter("panel", "the panel has no rows"));
    };
    let first_day = first.date();
    let days: Vec<NaiveDate> = first_day
        .iter_days()
        .take_while(|day| *day <= last.date())
        .collect();

    let day_positions: Vec<usize> = panel
        .index()
        .iter()
        .map(|ts| (ts.date() - first_day).num_days() as usize)
        .collect();

    let columns: Vec<Series> = panel
        .columns()
        .iter()
        .map(|column| {
            let mut daily = vec![None; days.len()];
            for (value, &day) in column.iter().zip(&day_positions) {
                if value.is_some() {
                    daily[day] = *value;
                }
            }
            daily
        })
        .collect();

    tracing::debug!(
        "ResamplingStage: {} hourly rows resampled into {} days.",
        panel.len(),
        days.len()
    );
    Ok(panel.derive(days, columns)?)
}

/// `value[t] / value[t-1] - 1`, row-aligned with the input; the first row is missing.
pub fn pct_change<I>(panel: &Panel<I>) -> Result<Panel<I>, AnalyticsError>
where
    I: Ord + Clone + Debug,
{
    // A missing day yields no change on either side; it is not filled forward.
    transform_lagged(panel, |prev, cur| cur / prev - 1.0)
}

/// `value[t] - value[t-1]`, row-aligned with the input; the first row is missing.
pub fn first_diff<I>(panel: &Panel<I>) -> Result<Panel<I>, AnalyticsError>
where
    I: Ord + Clone + Debug,
{
    transform_lagged(panel, |prev, cur| cur - prev)
}

fn transform_lagged<I, F>(panel: &Panel<I>, f: F) -> Result<Panel<I>, AnalyticsError>
where
    I: Ord + Clone + Debug,
    F: Fn(f64, f64) -> f64,
{
    let columns = panel.columns().iter().map(|column| lagged(column, &f)).collect();
    Ok(panel.derive(panel.index().to_vec(), columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn daily_takes_the_last_present_value_of_each_day() {
        let panel = PricePanel::new(
            vec![ts(1, 0), ts(1, 23), ts(2, 5), ts(4, 1)],
            vec!["A".to_string(), "B".to_string()],
            vec![
                vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
                vec![Some(10.0), None, None, Some(40.0)],
            ],
        )
        .unwrap();

        let daily = resample_daily_last(&panel).unwrap();
        assert_eq!(daily.index(), [day(1), day(2), day(3), day(4)]);
        assert_eq!(daily.column(0), [Some(2.0), Some(3.0), None, Some(4.0)]);
        assert_eq!(daily.column(1), [Some(10.0), None, None, Some(40.0)]);
    }

    #[test]
    fn changes_have_a_missing_first_row() {
        let daily = DailyPanel::new(
            vec![day(1), day(2), day(3), day(4)],
            vec!["A".to_string()],
            vec![vec![Some(100.0), Some(110.0), None, Some(99.0)]],
        )
        .unwrap();

        let pct = pct_change(&daily).unwrap();
        assert_eq!(pct.column(0)[0], None);
        assert!((pct.column(0)[1].unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(pct.column(0)[2], None);
        assert_eq!(pct.column(0)[3], None);

        let diff = first_diff(&daily).unwrap();
        assert_eq!(diff.column(0), [None, Some(10.0), None, None]);
        assert_eq!(diff.assets(), daily.assets());
    }

    #[test]
    fn missing_days_are_not_filled_forward() {
        let daily = DailyPanel::new(
            vec![day(1), day(2), day(3), day(4)],
            vec!["A".to_string()],
            vec![vec![Some(100.0), None, Some(120.0), Some(60.0)]],
        )
        .unwrap();

        let pct = pct_change(&daily).unwrap();
        // Day 3 is not measured against day 1, and the gap itself is no 0.0 change.
        assert_eq!(pct.column(0)[1], None);
        assert_eq!(pct.column(0)[2], None);
        assert_eq!(pct.column(0)[3], Some(-0.5));
    }
}
