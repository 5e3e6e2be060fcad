mod args;
mod duration;
mod error;
mod version;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use loader_core::{Orchestrator, StopReason};
use loader_observe::logger_init;
use loader_spanner::{SpannerClient, SpannerConfig};

use crate::args::{Args, Settings};
use crate::version::VERSION;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::load();
    if args.version {
        println!("{VERSION}");
        return Ok(());
    }

    // 1) Logger
    logger_init(&args.logger_config()?)?;

    // 2) Configuration; nothing touches the database until this succeeds
    let settings = args.resolve().context("invalid configuration")?;

    // 3) Load
    run(settings).await
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let spanner = SpannerConfig::new(settings.database.clone(), settings.run.workers())
        .with_endpoint(settings.endpoint.clone())
        .with_access_token(settings.access_token.clone());

    info!(
        version = VERSION,
        database = %settings.database,
        endpoint = %settings.endpoint,
        "connecting"
    );
    let client = SpannerClient::connect(spanner)
        .await
        .with_context(|| format!("failed to connect to {}", settings.database))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(interrupt(shutdown.clone()));

    let report = Orchestrator::new(settings.run, Arc::new(client))
        .with_shutdown(shutdown)
        .run()
        .await
        .context("load run failed")?;

    if report.stop == StopReason::Interrupted {
        warn!(workers = report.outcomes.len(), "run interrupted before the deadline");
    }
    Ok(())
}

async fn interrupt(shutdown: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupt received; stopping workers");
        shutdown.cancel();
    }
}
