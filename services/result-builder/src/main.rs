//! Result Builder - aggregates a recorded event log into race results
//!
//! Reads one or more JSON-lines event logs (for example raw timing events
//! and the placer's output), folds them in order and writes every
//! published result as a JSON line.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_stream::{read_all_pages, JsonLinesLog, JsonLinesWriter, MemoryLog};
use race_types::{CompetitorLookup, RaceConfig};
use result_builder::{ReplayVerifier, ResultAggregator};

/// Command-line arguments for result-builder
#[derive(Parser, Debug)]
#[command(name = "result-builder")]
#[command(about = "Builds race results from start, finish and place events")]
#[command(version)]
struct Args {
    /// JSON-lines event logs, read one after another
    #[arg(short, long, env = "RACE_EVENTS", required = true, num_args = 1..)]
    events: Vec<PathBuf>,

    /// Competitor file (bib -> athlete)
    #[arg(long, env = "RACE_COMPETITORS")]
    competitors: PathBuf,

    /// Race configuration (source ranks)
    #[arg(short, long, env = "RACE_CONFIG")]
    config: Option<PathBuf>,

    /// Output file for results; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replay the logs twice and compare digests instead of writing results
    #[arg(long)]
    verify: bool,

    /// Page size for reading history in verify mode
    #[arg(long, default_value = "256")]
    page_size: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "result_builder=info,event_stream=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RaceConfig::load(path).context("Failed to load race configuration")?,
        None => RaceConfig::default(),
    };
    let athletes = CompetitorLookup::load(&args.competitors).context("Failed to load competitors")?;
    info!(race = %config.race_name, athletes = athletes.len(), "Inputs loaded");

    let logs = args
        .events
        .iter()
        .map(|path| JsonLinesLog::load(path).with_context(|| format!("Failed to load event log {}", path.display())))
        .collect::<Result<Vec<MemoryLog>>>()?;

    if args.verify {
        let mut events = Vec::new();
        for log in &logs {
            events.extend(read_all_pages(&log.cursor(), args.page_size)?);
        }
        let report = ReplayVerifier::verify_double_replay(&events, &config.source_ranks, &athletes)?;
        println!("{}", report.digest_a);
        anyhow::ensure!(report.is_match(), "replay diverged: {} != {}", report.digest_a, report.digest_b);
        return Ok(());
    }

    let mut aggregator = ResultAggregator::new(config.source_ranks.clone(), athletes);
    match &args.output {
        Some(path) => {
            let mut sink = JsonLinesWriter::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            for log in &logs {
                aggregator.run(&mut log.cursor(), &mut sink, Duration::ZERO)?;
            }
        }
        None => {
            let mut sink = JsonLinesWriter::new(io::stdout().lock());
            for log in &logs {
                aggregator.run(&mut log.cursor(), &mut sink, Duration::ZERO)?;
            }
        }
    }

    let stats = aggregator.stats();
    info!(
        events_read = stats.events_read,
        results_emitted = stats.results_emitted,
        unknown_bibs = stats.unknown_bibs,
        invalid_places = stats.invalid_places,
        "Done"
    );
    Ok(())
}
