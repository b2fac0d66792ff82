use analytics::AnalyticsEngine;
use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use configuration::{AppConfig, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use reporter::{ReportGenerator, TableWriter, render_table};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Log file written next to the report output.
const LOG_FILE: &str = "arkansas.log";

/// The main entry point for the Arkansas price analysis tool.
fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(cli.command.log_folder())?;

    // Execute the appropriate command
    match cli.command {
        Commands::Report(args) => handle_report(args),
        Commands::ConvertRaw(args) => handle_convert_raw(args),
        Commands::Show(args) => handle_show(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Correlation, seasonality and moving-average reports for hourly crypto price series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a price CSV and write the overview and per-asset reports.
    Report(ReportArgs),
    /// Convert a raw per-pair export into the wide price CSV.
    ConvertRaw(ConvertRawArgs),
    /// Print the correlation, day and hourly tables of one asset.
    Show(ShowArgs),
}

impl Commands {
    fn log_folder(&self) -> Option<&Path> {
        match self {
            Commands::Report(args) => Some(args.destination_folder.as_path()),
            _ => None,
        }
    }
}

#[derive(Parser)]
struct ReportArgs {
    /// Path to the CSV file with all the hourly price series.
    price_series_path: PathBuf,

    /// Folder where all output files will be stored. Created if missing.
    destination_folder: PathBuf,

    /// Configuration file. Defaults to `config.toml` in the working directory, if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file format, overriding the configuration.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Only write per-asset reports for these assets (e.g. "BTCUSDT,ETHUSDT").
    #[arg(long, value_delimiter = ',')]
    assets: Option<Vec<String>>,
}

#[derive(Parser)]
struct ConvertRawArgs {
    /// The raw export to read.
    raw_path: PathBuf,

    /// Where to write the wide price CSV.
    output_csv: PathBuf,
}

#[derive(Parser)]
struct ShowArgs {
    /// Path to the CSV file with all the hourly price series.
    price_series_path: PathBuf,

    /// The asset to inspect (e.g., "BTCUSDT").
    target: String,

    /// Number of strongest and weakest correlated assets to list.
    #[arg(long)]
    count: Option<usize>,

    /// Configuration file. Defaults to `config.toml` in the working directory, if present.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ==============================================================================
// Logging
// ==============================================================================

/// Logs go to stderr, filtered by `RUST_LOG` (default `info`). With a folder, a plain
/// copy is also written to `<folder>/arkansas.log`.
fn init_tracing(log_folder: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match log_folder {
        Some(folder) => {
            std::fs::create_dir_all(folder)
                .with_context(|| format!("Failed to create folder {}", folder.display()))?;
            let appender = tracing_appender::rolling::never(folder, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(args: ReportArgs) -> anyhow::Result<()> {
    ensure_exists(&args.price_series_path)?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(format) = args.format {
        config.report.format = format;
    }
    if let Some(assets) = args.assets {
        config.report.assets = Some(assets);
    }
    config.validate().context("Invalid report options")?;

    let engine = load_engine(&args.price_series_path)?;
    let generator = ReportGenerator::new(&engine, &config.analysis);
    let writer = TableWriter::new(&args.destination_folder, config.report.format);
    tracing::info!(
        "Arkansas: Output data will be saved in {}",
        args.destination_folder.display()
    );

    generator
        .generate_overview(&writer)
        .context("Failed to write the overview tables")?;

    let targets = match &config.report.assets {
        Some(selected) => {
            if let Some(unknown) = selected.iter().find(|a| !engine.assets().contains(a)) {
                bail!("Asset {} is not in {}", unknown, args.price_series_path.display());
            }
            selected.clone()
        }
        None => engine.assets().to_vec(),
    };

    // Set up the progress bar
    let progress_bar = ProgressBar::new(targets.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );
    for target in &targets {
        progress_bar.set_message(format!("Writing {}...", target));
        generator
            .generate_asset_report(&writer, target)
            .with_context(|| format!("Failed to write the report for {}", target))?;
        progress_bar.inc(1);
    }
    progress_bar.finish_with_message("Reports complete!");

    tracing::info!("Arkansas: Done!");
    Ok(())
}

fn handle_convert_raw(args: ConvertRawArgs) -> anyhow::Result<()> {
    ensure_exists(&args.raw_path)?;
    let panel = dataset::read_legacy_panel_file(&args.raw_path)
        .with_context(|| format!("Failed to read raw export {}", args.raw_path.display()))?;
    dataset::write_price_panel_file(&args.output_csv, &panel)
        .with_context(|| format!("Failed to write {}", args.output_csv.display()))?;
    println!("Data saved as {}", args.output_csv.display());
    Ok(())
}

fn handle_show(args: ShowArgs) -> anyhow::Result<()> {
    ensure_exists(&args.price_series_path)?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(count) = args.count {
        config.analysis.correlation.top_count = count;
    }

    let engine = load_engine(&args.price_series_path)?;
    let generator = ReportGenerator::new(&engine, &config.analysis);
    let report = generator
        .asset_report(&args.target)
        .with_context(|| format!("Cannot build the tables of {}", args.target))?;

    let sections = [
        (format!("Strongest correlations with {}", args.target), &report.highest_correlated),
        (format!("Weakest correlations with {}", args.target), &report.lowest_correlated),
        ("Positive and Negative days statistics".to_string(), &report.positive_negative_days),
        ("Mean Movement by Hour".to_string(), &report.movement_by_hour),
    ];
    for (title, table) in sections {
        println!("\n{}", title);
        println!("{}", render_table(table));
    }
    Ok(())
}

fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        bail!(
            "File {} does not exist, please check the path is correct.",
            path.display()
        );
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    configuration::load_config(path).context("Failed to load configuration")
}

fn load_engine(path: &Path) -> anyhow::Result<AnalyticsEngine> {
    let panel = dataset::read_price_panel_file(path)
        .with_context(|| format!("Failed to read hourly prices from {}", path.display()))?;
    AnalyticsEngine::new(panel).context("Failed to process the price panel")
}
