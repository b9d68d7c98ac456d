//! RCM Daily Production CLI
//!
//! Loads a survey configuration, simulates a date range and prints a report.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use rcm_domain::DailyRecord;
use rcm_simulator::{range_feature_collection, RangeReport, SimulationEngine};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rcm-simulator")]
#[command(about = "Simulate daily seismic crew production")]
struct Args {
    /// Survey configuration document (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// First simulated day (YYYY-MM-DD), defaults to today
    #[arg(short, long)]
    start: Option<NaiveDate>,

    /// Number of days to simulate
    #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=365))]
    days: u32,

    /// Base random seed; drawn once when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Project id stamped on daily records
    #[arg(long, default_value = "1")]
    project_id: i64,

    /// Write all shot points as a GeoJSON feature collection
    #[arg(long)]
    geojson: Option<PathBuf>,

    /// Write flat daily records as JSON
    #[arg(long)]
    records: Option<PathBuf>,

    /// Report printed to stdout
    #[arg(long, value_enum, default_value_t = ReportFormat::Summary)]
    report: ReportFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReportFormat {
    Summary,
    Json,
    Markdown,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so reports can be piped
    let default_filter =
        std::env::var("LOG_LEVEL").unwrap_or_else(|_| "rcm_simulator=info,rcm_domain=warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = File::open(&args.config)
        .with_context(|| format!("Failed to open config {}", args.config.display()))?;
    let engine = SimulationEngine::from_reader(BufReader::new(file), args.seed)
        .with_context(|| format!("Invalid config {}", args.config.display()))?;

    let start = args.start.unwrap_or_else(|| Local::now().date_naive());
    info!(
        "Simulating {} day(s) from {} (seed {})",
        args.days,
        start,
        engine.seed()
    );

    let results = engine.simulate_range(start, args.days);
    if results.is_empty() {
        info!("No results generated");
        return Ok(());
    }

    if let Some(path) = &args.geojson {
        write_json(path, &range_feature_collection(&results))?;
        info!("Shot points written to {}", path.display());
    }

    if let Some(path) = &args.records {
        let records: Vec<DailyRecord> = results
            .iter()
            .map(|r| r.to_daily_record(args.project_id))
            .collect();
        write_json(path, &records)?;
        info!("Daily records written to {}", path.display());
    }

    let report = RangeReport::from_results(&engine.config().project().name, engine.seed(), &results);
    match args.report {
        ReportFormat::Summary => println!("{}", report.summary_line()),
        ReportFormat::Json => println!("{}", report.to_json()?),
        ReportFormat::Markdown => print!("{}", report.to_markdown()),
    }

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
