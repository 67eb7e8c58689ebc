// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use pipe_transforming::config::{load_and_validate_config, RuntimeBuilder, StageConfig};
use pipe_transforming::observability::init_tracing;
use pipe_transforming::observability::messages::config::{StageStarted, StageStopped};
use pipe_transforming::observability::messages::StructuredLog;
use pipe_transforming::transport::{NdjsonSink, NdjsonSource};

/// Transformation stage reading work items from stdin and writing results to stdout.
///
/// Usage: `pipe-transforming [config.yaml]`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => load_and_validate_config(&path)
            .with_context(|| format!("Failed to load stage configuration from {}", path))?,
        None => StageConfig::default(),
    };

    let runtime = RuntimeBuilder::from_config(&config, Arc::new(NdjsonSink::new(tokio::io::stdout())))
        .context("Invalid stage configuration")?;
    let cancel = CancellationToken::new();
    let watcher = runtime.spawn_branch_watcher(cancel.clone());

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, draining work items");
            interrupt.cancel();
        }
    });

    let default_branch = runtime.default_branch.current();
    StageStarted {
        workers: config.workers,
        cache_capacity: config.cache.capacity,
        cache_idle: config.cache.idle_timeout(),
        scripts_root: &config.scripts_root,
        default_branch: &default_branch,
    }
    .log();

    let pool = runtime.spawn_pool();
    let mut source = NdjsonSource::new(BufReader::new(tokio::io::stdin()));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = source.next_item() => match next {
                Ok(Some(item)) => {
                    if let Err(e) = pool.submit(item).await {
                        tracing::error!("Work item rejected: {}", e);
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Reading work items failed: {}", e);
                    break;
                }
            },
        }
    }

    cancel.cancel();
    pool.shutdown().await;
    if let Some(watcher) = watcher {
        watcher.await.context("Default branch watcher failed")?;
    }

    let stats = runtime.dispatcher.stats();
    StageStopped {
        received: stats.received,
        transformed: stats.transformed,
        passed: stats.passed,
        dropped: stats.dropped,
        engines_built: stats.engines_built,
    }
    .log();
    if source.malformed() > 0 {
        tracing::warn!(malformed = source.malformed(), "Skipped malformed input lines");
    }

    Ok(())
}
