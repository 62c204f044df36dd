//! CLI entry point for the discovery tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use discovery_core::{
    Database, DedupStore, DiscoveryPipeline, FilterConfig, HttpPageSource, HttpSourceOptions,
    MemoryDedupStore, PipelineOptions, Settings, SqliteDedupStore,
};
use tracing::{debug, info, warn};

mod cli;
mod output;

use cli::Args;
use output::StdoutSink;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Identifiers own stdout; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");
    info!("Discovery starting");

    let config = match &args.settings {
        Some(path) => Settings::from_path(path)
            .and_then(|settings| settings.to_filter_config())
            .with_context(|| format!("Failed to load settings from '{}'", path.display()))?,
        None => FilterConfig::default(),
    };
    debug!(?config, "filter configuration ready");

    let source = HttpPageSource::with_options(
        &args.endpoint,
        HttpSourceOptions {
            page_size: args.page_size,
            connect_timeout: Duration::from_secs(args.connect_timeout_secs),
            read_timeout: Duration::from_secs(args.read_timeout_secs),
        },
    )
    .context("Failed to set up listing source")?;

    let history = match &args.history {
        Some(path) => {
            let db = Database::new(path).await.with_context(|| {
                format!("Failed to open history database '{}'", path.display())
            })?;
            let store = Arc::new(SqliteDedupStore::new(db));
            info!(recorded = store.count().await?, "History loaded");
            Some(store)
        }
        None => None,
    };
    let dedup: Arc<dyn DedupStore> = match &history {
        Some(store) => Arc::clone(store) as Arc<dyn DedupStore>,
        None => Arc::new(MemoryDedupStore::new()),
    };

    let pipeline = DiscoveryPipeline::new(Arc::new(source), Arc::new(config), dedup)
        .with_options(PipelineOptions {
            page_limit: args.page_limit,
            page_delay: Duration::from_millis(args.page_delay),
            max_page_attempts: args.max_attempts,
        });

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_signal = Arc::clone(&interrupted);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupted_signal.store(true, Ordering::SeqCst);
        }
    });

    let use_spinner = output::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        output::is_dumb_terminal(),
    );
    let mut sink = StdoutSink::new(use_spinner);
    let outcome = pipeline.run(&mut sink, &interrupted).await;
    sink.finish();
    let report = outcome.context("Discovery run aborted")?;

    if args.record
        && let Some(store) = &history
    {
        let recorded = store
            .record_processed(&report.ids)
            .await
            .context("Failed to record discovered works")?;
        info!(recorded, "Recorded discovered works in history");
    }

    info!(
        reason = %report.reason,
        pages = report.pages_completed,
        discovered = report.ids.len(),
        written = sink.written(),
        raw = report.counts.raw_seen,
        filtered_out = report.counts.filtered_out,
        deduped_out = report.counts.deduped_out,
        "Discovery complete"
    );

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        if interrupted.load(Ordering::SeqCst) {
            warn!("Interrupted. Partial results were written.");
        }
        Ok(ExitCode::FAILURE)
    }
}
