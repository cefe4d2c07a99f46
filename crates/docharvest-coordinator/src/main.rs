//! Docharvest CLI
//!
//! Tracks PaperHive documents and prints every new annotation and reply as
//! one JSON object per line on stdout. Logs go to stderr.

use anyhow::Context;
use clap::Parser;
use docharvest_client::PaperhiveClient;
use docharvest_coordinator::{Coordinator, HarvestConfig, HarvestWorker, MemoryStore};
use docharvest_domain::traits::EventSink;
use docharvest_domain::HarvestEvent;
use docharvest_source::Adapter;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Harvest annotations and replies from PaperHive documents.
#[derive(Debug, Parser)]
#[command(name = "docharvest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults to the public paperhive.org instance
    #[arg(short, long, env = "DOCHARVEST_CONFIG")]
    config: Option<PathBuf>,

    /// Document URL or item id to track (repeatable)
    #[arg(short, long = "track", value_name = "INPUT")]
    track: Vec<String>,

    /// Run a single pass and exit
    #[arg(long)]
    once: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Writes each event as a JSON line on stdout
struct StdoutSink;

impl EventSink for StdoutSink {
    fn deliver(&self, event: HarvestEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(item_id = %event.item_id(), "Failed to encode event: {}", e);
                return;
            }
        };

        let mut stdout = std::io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", line) {
            tracing::warn!("Failed to write event: {}", e);
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,docharvest={level},docharvest_coordinator={level},docharvest_source={level},docharvest_client={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => HarvestConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            tracing::warn!("No config file specified, using paperhive.org defaults");
            HarvestConfig::paperhive()
        }
    };

    let client = PaperhiveClient::new(config.api.clone()).context("building HTTP client")?;
    let adapter = Arc::new(Adapter::new(config.adapter.clone(), Arc::new(client)));
    let coordinator = Coordinator::new(
        adapter,
        MemoryStore::new(),
        Arc::new(StdoutSink),
        config.coordinator.clone(),
    );

    for input in &cli.track {
        let record = coordinator
            .track(&Value::String(input.clone()))
            .await
            .with_context(|| format!("tracking {}", input))?;
        tracing::info!(
            source_id = %record.id,
            document_id = %record.identifier.document_id,
            title = %record.decoration.title,
            "Tracking document"
        );
    }

    if cli.track.is_empty() {
        tracing::warn!("Nothing to track; pass --track <INPUT>");
    }

    if cli.once {
        let report = coordinator.on_schedule().await?;
        eprintln!("{}", coordinator.metrics().summary());
        if !report.is_clean() {
            let total = report.failed.len() + report.scanned.len();
            anyhow::bail!("{} of {} sources failed", report.failed.len(), total);
        }
        return Ok(());
    }

    // No host link machinery here; keep the sender so the worker keeps listening
    let (_lifecycle_tx, lifecycle_rx) = tokio::sync::mpsc::unbounded_channel();
    let mut worker = HarvestWorker::new(coordinator, &config.coordinator);
    worker.run(lifecycle_rx).await?;

    Ok(())
}
