use crate::error::ReportError;
use analytics::Table;
use configuration::OutputFormat;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes named tables into a destination folder, one file per table.
#[derive(Debug, Clone)]
pub struct TableWriter {
    destination: PathBuf,
    format: OutputFormat,
}

impl TableWriter {
    pub fn new(destination: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            destination: destination.into(),
            format,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// A writer for `<destination>/<name>/` in the same format.
    pub fn subfolder(&self, name: &str) -> TableWriter {
        TableWriter::new(self.destination.join(name), self.format)
    }

    /// Writes `table` to `<destination>/<name>.<ext>` and returns the path.
    pub fn write_table(&self, name: &str, table: &Table) -> Result<PathBuf, ReportError> {
        self.write_with(name, |file, format| match format {
            OutputFormat::Csv => write_table_csv(file, table),
            OutputFormat::Json => write_json(file, table),
        })
    }

    /// Writes flat records, one row (or JSON array element) per record.
    pub fn write_records<T: Serialize>(&self, name: &str, records: &[T]) -> Result<PathBuf, ReportError> {
        self.write_with(name, |file, format| match format {
            OutputFormat::Csv => write_records_csv(file, records),
            OutputFormat::Json => write_json(file, records),
        })
    }

    fn write_with<F>(&self, name: &str, write: F) -> Result<PathBuf, ReportError>
    where
        F: FnOnce(&mut BufWriter<File>, OutputFormat) -> Result<(), ReportError>,
    {
        fs::create_dir_all(&self.destination).map_err(|source| ReportError::Io {
            path: self.destination.clone(),
            source,
        })?;
        let path = self
            .destination
            .join(format!("{}.{}", name, self.format.extension()));
        let io_error = |source| ReportError::Io {
            path: path.clone(),
            source,
        };

        let mut file = BufWriter::new(File::create(&path).map_err(io_error)?);
        write(&mut file, self.format)?;
        file.flush().map_err(io_error)?;

        tracing::debug!("TableWriter: Saved {}", path.display());
        Ok(path)
    }
}

/// Writes `table` the way a spreadsheet export of a labeled frame looks.
///
/// A single column level gives one header row led by the index name. With several
/// levels there is one header row per level, each led by the level name, followed
/// by a row holding only the index name.
pub fn write_table_csv<W: Write>(writer: W, table: &Table) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    if table.column_levels.len() == 1 {
        let mut header = Vec::with_capacity(table.column_count() + 1);
        header.push(table.index_name.as_str());
        header.extend(table.columns.iter().map(|key| key[0].as_str()));
        wtr.write_record(&header)?;
    } else {
        for (level, level_name) in table.column_levels.iter().enumerate() {
            let mut header = Vec::with_capacity(table.column_count() + 1);
            header.push(level_name.as_str());
            header.extend(table.columns.iter().map(|key| key[level].as_str()));
            wtr.write_record(&header)?;
        }
        let mut index_row = vec![""; table.column_count() + 1];
        index_row[0] = table.index_name.as_str();
        wtr.write_record(&index_row)?;
    }

    for (label, cells) in table.rows() {
        let mut record = Vec::with_capacity(cells.len() + 1);
        record.push(label.to_string());
        record.extend(cells.iter().map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()));
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_records_csv<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: W, value: &T) -> Result<(), ReportError> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level() -> Table {
        Table::new(
            "",
            vec!["Asset".to_string(), "Days".to_string()],
            vec!["Days count".to_string(), "Days count (%)".to_string()],
            vec![
                vec!["BTCUSDT".to_string(), "Positive days".to_string()],
                vec!["BTCUSDT".to_string(), "Negative days".to_string()],
            ],
            vec![vec![Some(6.0), Some(0.6)], vec![Some(4.0), None]],
        )
    }

    fn csv_text(table: &Table) -> String {
        let mut buffer = Vec::new();
        write_table_csv(&mut buffer, table).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn multi_level_columns_get_one_header_row_per_level() {
        assert_eq!(
            csv_text(&two_level()),
            "\
Asset,BTCUSDT,BTCUSDT
Days,Positive days,Negative days
,,
Days count,6,4
Days count (%),0.6,
"
        );
    }

    #[test]
    fn single_level_header_is_led_by_the_index_name() {
        let table = Table::new(
            "Hour",
            vec![String::new()],
            vec!["0".to_string(), "1".to_string()],
            vec![vec!["A".to_string()], vec!["B".to_string()]],
            vec![vec![Some(-0.5), Some(1.25)], vec![None, Some(2.0)]],
        );
        assert_eq!(csv_text(&table), "Hour,A,B\n0,-0.5,\n1,1.25,2\n");
    }

    #[test]
    fn records_use_their_field_names_as_header() {
        #[derive(Serialize)]
        struct Pair {
            #[serde(rename = "THIS")]
            this: &'static str,
            correlation: Option<f64>,
        }
        let mut buffer = Vec::new();
        write_records_csv(
            &mut buffer,
            &[
                Pair { this: "A", correlation: Some(1.0) },
                Pair { this: "B", correlation: None },
            ],
        )
        .unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "THIS,correlation\nA,1.0\nB,\n");
    }

    #[test]
    fn json_keeps_missing_cells_as_null() {
        let mut buffer = Vec::new();
        write_json(&mut buffer, &two_level()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["column_levels"], serde_json::json!(["Asset", "Days"]));
        assert_eq!(value["data"][1], serde_json::json!([4.0, null]));
    }
}
