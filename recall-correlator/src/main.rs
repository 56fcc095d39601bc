use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use recall_correlator::display::render_report;
use recall_correlator::{
    Correlator, EnforcementFileSource, FeedFileSource, MatchConfig, RecordSource, TimeWindow,
};
use tracing::{error, info};

/// Merge enforcement records and syndicated alerts into one timeline and
/// link entries that describe the same event.
#[derive(Parser, Debug)]
#[command(name = "recall-correlator")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    /// Enforcement JSON export, optionally suffixed with `:ENDPOINT`
    #[arg(short, long = "enforcement", value_name = "FILE[:ENDPOINT]")]
    enforcement: Vec<String>,

    /// Saved RSS or Atom document
    #[arg(short, long = "feed", value_name = "FILE")]
    feeds: Vec<PathBuf>,

    /// Lookback window in days: 7, 30 or 90
    #[arg(short, long, default_value = "30")]
    window: TimeWindow,

    /// End of the window as YYYY-MM-DD (defaults to now)
    #[arg(long, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Matching configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Maximum rows per section in text output
    #[arg(short, long, default_value_t = 25)]
    limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => MatchConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MatchConfig::default(),
    };

    let now = match cli.as_of {
        Some(date) => date
            .and_hms_opt(23, 59, 59)
            .context("invalid --as-of date")?
            .and_utc(),
        None => Utc::now(),
    };
    let (start, end) = cli.window.bounds(now);
    info!("Correlating window {} ({} to {})", cli.window, start, end);

    let mut records = Vec::new();
    for arg in &cli.enforcement {
        let source = EnforcementFileSource::from_arg(arg);
        match source.load(cli.window, now).await {
            Ok(loaded) => records.extend(loaded),
            Err(e) => error!("Failed to load {}: {}", source.source_name(), e),
        }
    }

    let mut items = Vec::new();
    for path in &cli.feeds {
        let source = FeedFileSource::new(path);
        match source.load(cli.window, now).await {
            Ok(loaded) => items.extend(loaded),
            Err(e) => error!("Failed to load {}: {}", source.source_name(), e),
        }
    }

    let correlator = Correlator::new(config);
    let report = correlator.correlate_concurrent(records, items).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report, cli.limit));
    }
    Ok(())
}
