use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use poller_core::{CycleOutcome, HttpDataSource, MemoryTable, PollEvent, Poller};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, validate, DEFAULT_CONFIG_PATH};
use render::format_table;

/// Polls a device's data endpoint and mirrors it into a console table.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    path: Option<String>,
    #[arg(long)]
    period_ms: Option<u64>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Run a single cycle, print the table, and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(v) = args.server_url {
        settings.server_url = v;
    }
    if let Some(v) = args.path {
        settings.data_path = v;
    }
    if let Some(v) = args.period_ms {
        settings.period_ms = v;
    }
    if let Some(v) = args.timeout_ms {
        settings.request_timeout_ms = v;
    }
    validate(&settings)?;

    let source = HttpDataSource::new(
        &settings.server_url,
        &settings.data_path,
        settings.request_timeout(),
    )?;
    info!(url = %source.url(), period_ms = settings.period_ms, "monitoring data endpoint");
    let poller = Arc::new(
        Poller::new(Arc::new(source), MemoryTable::new()).with_period(settings.period()),
    );

    if args.once {
        if let CycleOutcome::Applied(report) = poller.fetch_cycle().await? {
            info!(rows = report.appended, "fetched data once");
        }
        print!("{}", format_table(&poller.rows().await, Utc::now()));
        return Ok(());
    }

    let mut events = poller.subscribe();
    let handle = Arc::clone(&poller).start_polling();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(PollEvent::Applied { report, rows }) => {
                    if report.first_render || report.updated > 0 {
                        print!("{}", format_table(&rows, Utc::now()));
                    }
                }
                Ok(PollEvent::Failed { message }) => {
                    warn!(%message, "data refresh failed; keeping previous values");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "console fell behind poll events");
                }
                Err(RecvError::Closed) => {
                    error!("poll event channel closed");
                    break;
                }
            },
            _ = &mut interrupt => {
                info!("interrupt received");
                break;
            }
        }
    }

    handle.shutdown();
    let stats = poller.stats().await;
    info!(
        started = stats.started,
        skipped = stats.skipped,
        applied = stats.applied,
        failed = stats.failed,
        "monitor exiting"
    );
    Ok(())
}
