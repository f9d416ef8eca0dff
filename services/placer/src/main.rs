//! Placer - derives place events from a recorded finish log
//!
//! Reads a JSON-lines event log, derives places from its finish events and
//! writes the place events as JSON lines, to a file or stdout.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_stream::{JsonLinesLog, JsonLinesWriter};
use placer::PlaceDeriver;
use race_types::{CompetitorLookup, RaceConfig};

/// Command-line arguments for placer
#[derive(Parser, Debug)]
#[command(name = "placer")]
#[command(about = "Derives finishing places from multi-source finish events")]
#[command(version)]
struct Args {
    /// JSON-lines event log to read
    #[arg(short, long, env = "RACE_EVENTS")]
    events: PathBuf,

    /// Race configuration (source ranks, placer source name)
    #[arg(short, long, env = "RACE_CONFIG")]
    config: Option<PathBuf>,

    /// Only place bibs present in this competitor file
    #[arg(long, env = "RACE_COMPETITORS")]
    competitors: Option<PathBuf>,

    /// Output file for place events; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "placer=info,event_stream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RaceConfig::load(path).context("Failed to load race configuration")?,
        None => RaceConfig::default(),
    };
    info!(ranks = config.source_ranks.len(), source = %config.placer_source, "Configuration loaded");

    let mut deriver = PlaceDeriver::from_config(&config);
    if let Some(path) = &args.competitors {
        let lookup = CompetitorLookup::load(path).context("Failed to load competitors")?;
        info!(competitors = lookup.len(), "Competitor filter enabled");
        deriver = deriver.with_competitors(lookup);
    }

    let log = JsonLinesLog::load(&args.events)
        .with_context(|| format!("Failed to load event log {}", args.events.display()))?;
    let mut cursor = log.cursor();

    let stats = match &args.output {
        Some(path) => {
            let mut writer = JsonLinesWriter::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            deriver.run(&mut cursor, &mut writer, Duration::ZERO)?
        }
        None => {
            let mut writer = JsonLinesWriter::new(io::stdout().lock());
            deriver.run(&mut cursor, &mut writer, Duration::ZERO)?
        }
    };

    info!(
        events_read = stats.events_read,
        ignored = stats.finishes_ignored,
        rejected = stats.finishes_rejected_by_rank,
        places = stats.places_emitted,
        "Done"
    );
    Ok(())
}
