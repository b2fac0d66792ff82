use crate::error::DataError;
use crate::fields::{price_at, timestamp_at};
use chrono::NaiveDateTime;
use core_types::{PricePanel, Series};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lines at the top of an export that carry no data.
const PREAMBLE_LINES: usize = 2;
const OBSERVATION_MARK: char = '\'';
const SERIES_END: &str = ",";

/// One pair's observations while it is being read.
struct OpenSeries {
    pair: String,
    header_line: usize,
    observations: BTreeMap<NaiveDateTime, Option<f64>>,
}

/// Reads the raw per-pair export into an hourly panel.
///
/// Layout after the preamble, repeated once per pair:
///
/// ```text
/// BTCUSDT,<ignored>
/// '2023-01-01 00:00:00,16500.5
/// '2023-01-01 01:00:00,16510
/// ,
/// ```
///
/// A header line names the pair in its first field, quoted lines are observations,
/// and a lone comma closes the series. The pairs are outer-joined on timestamp.
pub fn read_legacy_panel<R: BufRead>(reader: R) -> Result<PricePanel, DataError> {
    let mut finished: Vec<(String, BTreeMap<NaiveDateTime, Option<f64>>)> = Vec::new();
    let mut current: Option<OpenSeries> = None;

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = number + 1;
        if number < PREAMBLE_LINES {
            continue;
        }

        if let Some(observation) = line.strip_prefix(OBSERVATION_MARK) {
            let Some(series) = current.as_mut() else {
                return Err(DataError::Malformed {
                    line: line_no,
                    reason: "observation found before any pair header".to_string(),
                });
            };
            let cleaned = observation.trim().replace(OBSERVATION_MARK, "");
            let mut parts = cleaned.split(',');
            let stamp = timestamp_at(line_no, parts.next().unwrap_or_default())?;
            let Some(price) = parts.next() else {
                return Err(DataError::Malformed {
                    line: line_no,
                    reason: "observation has no price field".to_string(),
                });
            };
            // A repeated timestamp keeps the later price.
            series
                .observations
                .insert(stamp, price_at(line_no, &series.pair, price)?);
        } else if line.trim_end() == SERIES_END {
            match current.take() {
                Some(series) => close(series, &mut finished),
                None => {
                    return Err(DataError::Malformed {
                        line: line_no,
                        reason: "series terminator without an open series".to_string(),
                    });
                }
            }
        } else if line.trim().is_empty() {
            continue;
        } else {
            if let Some(series) = current.take() {
                tracing::warn!(
                    "Dataset: Series {} opened at line {} was not terminated; closing it at line {}.",
                    series.pair,
                    series.header_line,
                    line_no
                );
                close(series, &mut finished);
            }
            let pair = line.split(',').next().unwrap_or_default().trim().to_string();
            current = Some(OpenSeries {
                pair,
                header_line: line_no,
                observations: BTreeMap::new(),
            });
        }
    }
    if let Some(series) = current.take() {
        tracing::warn!(
            "Dataset: Series {} opened at line {} was not terminated before the end of input.",
            series.pair,
            series.header_line
        );
        close(series, &mut finished);
    }

    outer_join(finished)
}

pub fn read_legacy_panel_file(path: &Path) -> Result<PricePanel, DataError> {
    let file = File::open(path).map_err(|source| DataError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Dataset: Reading raw pair export from {}", path.display());
    read_legacy_panel(BufReader::new(file))
}

fn close(series: OpenSeries, finished: &mut Vec<(String, BTreeMap<NaiveDateTime, Option<f64>>)>) {
    if series.observations.is_empty() {
        tracing::info!("Dataset: Pair {} has no data, skipping.", series.pair);
        return;
    }
    tracing::info!(
        "Dataset: Loaded {} observations from {}. {} pairs read so far.",
        series.observations.len(),
        series.pair,
        finished.len() + 1
    );
    finished.push((series.pair, series.observations));
}

fn outer_join(series: Vec<(String, BTreeMap<NaiveDateTime, Option<f64>>)>) -> Result<PricePanel, DataError> {
    let index: Vec<NaiveDateTime> = series
        .iter()
        .flat_map(|(_, observations)| observations.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let (assets, columns): (Vec<String>, Vec<Series>) = series
        .into_iter()
        .map(|(pair, observations)| {
            let column = index
                .iter()
                .map(|stamp| observations.get(stamp).copied().flatten())
                .collect();
            (pair, column)
        })
        .unzip();

    Ok(PricePanel::new(index, assets, columns)?)
}
