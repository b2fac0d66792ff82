use analytics::AnalyticsEngine;
use chrono::{NaiveDate, NaiveDateTime};
use configuration::{AnalysisConfig, OutputFormat};
use reporter::{ReportGenerator, TableWriter};
use std::fs;
use std::path::PathBuf;

fn engine() -> AnalyticsEngine {
    let start: NaiveDateTime = NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let rows = 96;
    let index = (0..rows)
        .map(|i| start + chrono::Duration::hours(i as i64))
        .collect();
    let wave = |i: usize, phase: f64| (i as f64 / 5.0 + phase).sin();
    let columns = vec![
        (0..rows).map(|i| Some(100.0 + i as f64 * 0.5 + wave(i, 0.0))).collect(),
        (0..rows).map(|i| Some(50.0 - i as f64 * 0.2 + wave(i, 1.0))).collect(),
        (0..rows).map(|i| Some(10.0 + wave(i, 2.0))).collect(),
    ];
    AnalyticsEngine::from_columns(
        index,
        vec!["SOLUSDT".to_string(), "BTCUSDT".to_string(), "ETHUSDT".to_string()],
        columns,
    )
    .unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("arkansas-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn file_names(dir: &PathBuf) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn overview_and_asset_reports_are_written_as_csv() {
    let engine = engine();
    let config = AnalysisConfig::default();
    let generator = ReportGenerator::new(&engine, &config);
    let dir = scratch_dir("csv");
    let writer = TableWriter::new(&dir, OutputFormat::Csv);

    let overview = generator.generate_overview(&writer).unwrap();
    assert_eq!(overview.len(), 8);
    for asset in generator.assets() {
        generator.generate_asset_report(&writer, asset).unwrap();
    }

    assert_eq!(
        file_names(&dir),
        [
            "BTCUSDT",
            "ETHUSDT",
            "SOLUSDT",
            "absolute_movement_by_hour.csv",
            "assets.csv",
            "correlation_matrix.csv",
            "market_strength_by_hour.csv",
            "movement_by_hour.csv",
            "positive_negative_days.csv",
            "price_and_std_ma.csv",
            "unstacked_correlation_matrix.csv",
        ]
    );
    assert_eq!(
        file_names(&dir.join("ETHUSDT")),
        [
            "highest_correlated.csv",
            "lowest_correlated.csv",
            "movement_by_hour.csv",
            "positive_negative_days.csv",
        ]
    );

    let assets = fs::read_to_string(dir.join("assets.csv")).unwrap();
    assert_eq!(assets, "Asset\nBTCUSDT\nETHUSDT\nSOLUSDT\n");

    let unstacked = fs::read_to_string(dir.join("unstacked_correlation_matrix.csv")).unwrap();
    let mut lines = unstacked.lines();
    assert_eq!(lines.next(), Some("THIS,OTHER,Correlation"));
    assert_eq!(lines.next(), Some("BTCUSDT,BTCUSDT,1.0"));
    assert_eq!(unstacked.lines().count(), 1 + 9);

    let movement = fs::read_to_string(dir.join("ETHUSDT").join("movement_by_hour.csv")).unwrap();
    assert!(movement.starts_with("Hour,Mean Movement (USDT),Movement Strength\n"));
    assert_eq!(movement.lines().count(), 1 + 24);

    let highest = fs::read_to_string(dir.join("ETHUSDT").join("highest_correlated.csv")).unwrap();
    assert!(highest.starts_with(",ETHUSDT,"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn json_output_round_trips_into_tables() {
    let engine = engine();
    let generator = ReportGenerator::new(&engine, &AnalysisConfig::default());
    let dir = scratch_dir("json");
    let writer = TableWriter::new(&dir, OutputFormat::Json);

    let written = generator.generate_asset_report(&writer, "BTCUSDT").unwrap();
    assert!(written.iter().all(|path| path.extension().is_some_and(|ext| ext == "json")));

    let text = fs::read_to_string(dir.join("BTCUSDT").join("positive_negative_days.json")).unwrap();
    let table: analytics::Table = serde_json::from_str(&text).unwrap();
    let expected = generator.asset_report("BTCUSDT").unwrap().positive_negative_days;
    assert_eq!(table.column_levels, ["Days"]);
    assert_eq!(table.index, expected.index);
    assert_eq!(table.columns, expected.columns);
    assert_eq!(
        table.get("Days count", &["Positive days"]),
        expected.get("Days count", &["Positive days"])
    );

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unknown_target_is_reported_not_written() {
    let engine = engine();
    let generator = ReportGenerator::new(&engine, &AnalysisConfig::default());
    let dir = scratch_dir("unknown");
    let writer = TableWriter::new(&dir, OutputFormat::Csv);

    assert!(generator.generate_asset_report(&writer, "DOGEUSDT").is_err());
    assert!(!dir.join("DOGEUSDT").exists());
}

#[test]
fn raw_price_correlation_reaches_the_asset_reports() {
    let engine = engine();
    let mut config = AnalysisConfig::default();
    config.correlation.log_series = false;
    config.correlation.top_count = 2;
    let generator = ReportGenerator::new(&engine, &config);

    let raw = engine.estimate_correlation_matrix(false);
    assert_eq!(generator.correlation_matrix(), &raw);
    assert_ne!(generator.correlation_matrix(), engine.correlation_matrix());

    let report = generator.asset_report("ETHUSDT").unwrap();
    for table in [&report.highest_correlated, &report.lowest_correlated] {
        assert_eq!(table.index[0], "ETHUSDT");
        for row in &table.index {
            for col in &table.index {
                assert_eq!(table.get(row, &[col.as_str()]), raw.get_by_asset(row, col));
            }
        }
    }

    let dir = scratch_dir("raw-correlation");
    let writer = TableWriter::new(&dir, OutputFormat::Json);
    generator.generate_overview(&writer).unwrap();
    let text = fs::read_to_string(dir.join("correlation_matrix.json")).unwrap();
    let written: analytics::Table = serde_json::from_str(&text).unwrap();
    assert_eq!(written.index, raw.assets());
    assert_eq!(written.columns, raw.to_table().columns);

    fs::remove_dir_all(&dir).unwrap();
}
