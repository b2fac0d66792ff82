use crate::error::DataError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Timestamp layout used when writing panels.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%z",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a cell of the timestamp column.
///
/// Timestamps carrying a UTC offset are converted to UTC; a bare date means midnight.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in NAIVE_FORMATS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(text, format) {
            return Some(stamp);
        }
    }
    for format in OFFSET_FORMATS {
        if let Ok(stamp) = DateTime::parse_from_str(text, format) {
            return Some(stamp.naive_utc());
        }
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.naive_utc());
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

pub(crate) fn timestamp_at(line: usize, text: &str) -> Result<NaiveDateTime, DataError> {
    parse_timestamp(text).ok_or_else(|| DataError::BadTimestamp {
        line,
        value: text.to_string(),
    })
}

/// An empty cell is a missing price. `NaN` parses and is stored as missing by the panel.
pub(crate) fn price_at(line: usize, asset: &str, text: &str) -> Result<Option<f64>, DataError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::BadNumber {
            line,
            asset: asset.to_string(),
            value: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn accepts_the_supported_layouts() {
        assert_eq!(parse_timestamp("2023-03-01 05:00:00"), Some(at(2023, 3, 1, 5)));
        assert_eq!(parse_timestamp(" 2023-03-01T05:00:00 "), Some(at(2023, 3, 1, 5)));
        assert_eq!(parse_timestamp("2023-03-01"), Some(at(2023, 3, 1, 0)));
    }

    #[test]
    fn offsets_are_converted_to_utc() {
        assert_eq!(parse_timestamp("2023-03-01 05:00:00+02:00"), Some(at(2023, 3, 1, 3)));
        assert_eq!(parse_timestamp("2023-03-01T00:00:00Z"), Some(at(2023, 3, 1, 0)));
        assert_eq!(parse_timestamp("2023-03-01 23:00:00-01:00"), Some(at(2023, 3, 2, 0)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2023-13-01"), None);
        assert!(matches!(
            timestamp_at(7, "noon"),
            Err(DataError::BadTimestamp { line: 7, .. })
        ));
    }

    #[test]
    fn prices_allow_blank_cells() {
        assert_eq!(price_at(1, "X", "  ").unwrap(), None);
        assert_eq!(price_at(1, "X", "1.5e3").unwrap(), Some(1500.0));
        assert!(matches!(
            price_at(3, "BTCUSDT", "1,5"),
            Err(DataError::BadNumber { line: 3, ref asset, .. }) if asset == "BTCUSDT"
        ));
    }
}
