use crate::error::DataError;
use crate::fields::{TIMESTAMP_FORMAT, price_at, timestamp_at};
use chrono::NaiveDateTime;
use core_types::{PricePanel, Series};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Header of the timestamp column in written files.
pub const INDEX_HEADER: &str = "Timestamp";

/// Reads a wide price CSV: a timestamp column followed by one column per asset.
///
/// Rows may come in any order; they are sorted by timestamp before the panel is
/// built, and a repeated timestamp is rejected by the panel.
pub fn read_price_panel<R: Read>(reader: R) -> Result<PricePanel, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(DataError::Malformed {
            line: 1,
            reason: "expected a timestamp column followed by at least one asset column".to_string(),
        });
    }
    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut rows: Vec<(NaiveDateTime, Vec<Option<f64>>)> = Vec::new();
    for (number, record) in rdr.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = number + 2;
        let stamp = timestamp_at(line, record.get(0).unwrap_or_default())?;
        let prices = record
            .iter()
            .skip(1)
            .zip(&assets)
            .map(|(cell, asset)| price_at(line, asset, cell))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push((stamp, prices));
    }
    rows.sort_by_key(|(stamp, _)| *stamp);

    let mut index = Vec::with_capacity(rows.len());
    let mut columns: Vec<Series> = vec![Vec::with_capacity(rows.len()); assets.len()];
    for (stamp, prices) in rows {
        index.push(stamp);
        for (column, price) in columns.iter_mut().zip(prices) {
            column.push(price);
        }
    }

    let panel = PricePanel::new(index, assets, columns)?;
    tracing::debug!(
        "Dataset: Read {} rows of {} assets.",
        panel.len(),
        panel.asset_count()
    );
    Ok(panel)
}

pub fn read_price_panel_file(path: &Path) -> Result<PricePanel, DataError> {
    let file = File::open(path).map_err(|source| DataError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Dataset: Reading hourly prices from {}", path.display());
    read_price_panel(BufReader::new(file))
}

/// Writes `panel` in the layout [`read_price_panel`] reads, missing cells left empty.
pub fn write_price_panel<W: Write>(writer: W, panel: &PricePanel) -> Result<(), DataError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = Vec::with_capacity(panel.asset_count() + 1);
    header.push(INDEX_HEADER.to_string());
    header.extend(panel.assets().iter().cloned());
    wtr.write_record(&header)?;

    for (row, stamp) in panel.index().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(stamp.format(TIMESTAMP_FORMAT).to_string());
        for asset in 0..panel.asset_count() {
            record.push(panel.value(row, asset).map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_price_panel_file(path: &Path, panel: &PricePanel) -> Result<(), DataError> {
    let file = File::create(path).map_err(|source| DataError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    write_price_panel(BufWriter::new(file), panel)?;
    tracing::info!(
        "Dataset: Saved {} rows of {} assets to {}",
        panel.len(),
        panel.asset_count(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn reads_unsorted_rows_with_gaps() {
        let input = "\
Timestamp,ETHUSDT,BTCUSDT
2023-01-01 02:00:00,1202.5,16500
2023-01-01 00:00:00,1200,
2023-01-01 01:00:00,,16490.5
";
        let panel = read_price_panel(input.as_bytes()).unwrap();

        assert_eq!(panel.index(), [at(1, 0), at(1, 1), at(1, 2)]);
        assert_eq!(panel.assets(), ["BTCUSDT", "ETHUSDT"]);
        assert_eq!(
            panel.column_by_asset("BTCUSDT").unwrap(),
            [None, Some(16490.5), Some(16500.0)]
        );
        assert_eq!(
            panel.column_by_asset("ETHUSDT").unwrap(),
            [Some(1200.0), None, Some(1202.5)]
        );
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let input = "t,A\n2023-01-01 00:00:00,1\n2023-01-01 00:00:00,2\n";
        assert!(matches!(read_price_panel(input.as_bytes()), Err(DataError::Panel(_))));
    }

    #[test]
    fn reports_the_offending_line() {
        let input = "t,A,B\n2023-01-01 00:00:00,1,2\n2023-01-01 01:00:00,1,abc\n";
        match read_price_panel(input.as_bytes()) {
            Err(DataError::BadNumber { line, asset, value }) => {
                assert_eq!(line, 3);
                assert_eq!(asset, "B");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let input = "t,A\nlater,1\n";
        assert!(matches!(
            read_price_panel(input.as_bytes()),
            Err(DataError::BadTimestamp { line: 2, .. })
        ));
    }

    #[test]
    fn rejects_files_without_asset_columns() {
        assert!(matches!(
            read_price_panel("Timestamp\n2023-01-01 00:00:00\n".as_bytes()),
            Err(DataError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            read_price_panel("t,A,B\n2023-01-01 00:00:00,1\n".as_bytes()),
            Err(DataError::Csv(_))
        ));
    }

    #[test]
    fn written_panel_reads_back_identically() {
        let panel = PricePanel::new(
            vec![at(1, 0), at(1, 1)],
            vec!["B".to_string(), "A".to_string()],
            vec![vec![Some(2.5), None], vec![Some(1.0), Some(0.125)]],
        )
        .unwrap();

        let mut buffer = Vec::new();
        write_price_panel(&mut buffer, &panel).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert_eq!(
            text,
            "Timestamp,A,B\n2023-01-01 00:00:00,1,2.5\n2023-01-01 01:00:00,0.125,\n"
        );
        assert_eq!(read_price_panel(buffer.as_slice()).unwrap(), panel);
    }
}
