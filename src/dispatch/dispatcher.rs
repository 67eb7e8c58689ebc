// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Level;

use crate::config::{RhaiConfig, TransformationConfig};
use crate::dispatch::payload::parse_lenient;
use crate::dispatch::{TransformedItem, WorkItem};
use crate::engine::{CacheLookup, EngineCache, ScriptEngine};
use crate::errors::TransformError;
use crate::loader::ScriptLoader;
use crate::observability::messages::dispatch::{
    ForwardFailed, PassingWorkItem, WorkItemDropped, WorkItemTransformed,
};
use crate::observability::messages::engine::{EngineBuilt, EngineCacheHit};
use crate::observability::messages::StructuredLog;
use crate::traits::{Downstream, RunLog};

/// Counters describing what the dispatcher has done since startup.
#[derive(Debug, Default)]
pub struct DispatchStats {
    received: AtomicU64,
    passed: AtomicU64,
    transformed: AtomicU64,
    dropped: AtomicU64,
    engines_built: AtomicU64,
    cache_hits: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub passed: u64,
    pub transformed: u64,
    pub dropped: u64,
    pub engines_built: u64,
    pub cache_hits: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            passed: self.passed.load(Ordering::Relaxed),
            transformed: self.transformed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            engines_built: self.engines_built.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Routes work items through the transformation path or past it.
///
/// For each transformable item the dispatcher:
/// 1. reuses the engine cached for the item's run, or
/// 2. loads the script, builds an engine and caches it when `single` is set,
/// 3. parses the payload leniently and runs the engine's entry point,
/// 4. forwards the result tagged with the configured output format.
///
/// Any failure along the way is written to the process log and the run log and
/// the item is dropped. Nothing is retried and no error reaches the transport.
///
/// Script construction and invocation run on the blocking thread pool. Invocations
/// are bounded by the optional invocation timeout; construction only by the
/// engine's operation limit. A timed-out script keeps its thread until that limit
/// stops it.
pub struct Dispatcher {
    loader: ScriptLoader,
    cache: EngineCache<ScriptEngine>,
    downstream: Arc<dyn Downstream>,
    run_log: Arc<dyn RunLog>,
    limits: RhaiConfig,
    invocation_timeout: Option<Duration>,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(
        loader: ScriptLoader,
        cache: EngineCache<ScriptEngine>,
        downstream: Arc<dyn Downstream>,
        run_log: Arc<dyn RunLog>,
    ) -> Self {
        Self {
            loader,
            cache,
            downstream,
            run_log,
            limits: RhaiConfig::default(),
            invocation_timeout: None,
            stats: DispatchStats::default(),
        }
    }

    pub fn with_limits(mut self, limits: RhaiConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_invocation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.invocation_timeout = timeout;
        self
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache(&self) -> &EngineCache<ScriptEngine> {
        &self.cache
    }

    /// Handle one work item to completion: forwarded, passed through or dropped.
    pub async fn handle(&self, item: WorkItem) {
        DispatchStats::bump(&self.stats.received);
        self.run_log
            .record(&item.run_id, Level::TRACE, "Incoming work item");

        if !item.is_transformable() {
            self.pass(item).await;
            return;
        }

        let started = Instant::now();
        match self.transform(&item).await {
            Ok(result) => {
                DispatchStats::bump(&self.stats.transformed);
                WorkItemTransformed {
                    run_id: &result.run_id,
                    mime_type: &result.mime_type,
                    output_size: result.payload.len(),
                    duration: started.elapsed(),
                }
                .log();
                let info = item
                    .data_info
                    .as_ref()
                    .map(|info| info.to_string())
                    .unwrap_or_default();
                self.run_log.record(
                    &item.run_id,
                    Level::INFO,
                    &format!("Data transformed: {}", info),
                );

                if let Err(e) = self.downstream.forward(result).await {
                    ForwardFailed {
                        run_id: &item.run_id,
                        error: &e,
                    }
                    .log();
                }
            }
            Err(e) => {
                DispatchStats::bump(&self.stats.dropped);
                WorkItemDropped {
                    run_id: &item.run_id,
                    error: &e,
                }
                .log();
                self.run_log.record(
                    &item.run_id,
                    Level::ERROR,
                    &format!("{}: {}", e.kind(), e),
                );
            }
        }
    }

    async fn pass(&self, item: WorkItem) {
        DispatchStats::bump(&self.stats.passed);
        let content = item.content_label();
        PassingWorkItem {
            run_id: &item.run_id,
            content: &content,
        }
        .log();
        self.run_log
            .record(&item.run_id, Level::TRACE, "Passing work item");

        let run_id = item.run_id.clone();
        if let Err(e) = self.downstream.pass(item).await {
            ForwardFailed {
                run_id: &run_id,
                error: &e,
            }
            .log();
        }
    }

    async fn transform(&self, item: &WorkItem) -> Result<TransformedItem, TransformError> {
        let config = TransformationConfig::from_value(&item.config)?;
        let engine = self.engine_for(&item.run_id, &config).await?;

        let input = parse_lenient(&item.payload)?;
        if let Ok(pretty) = serde_json::to_string_pretty(&input) {
            self.run_log.record(
                &item.run_id,
                Level::DEBUG,
                &format!("Transformation input:\n{}", pretty),
            );
        }
        let input = serde_json::to_string(&input)
            .map_err(|e| TransformError::Invocation(format!("payload serialization failed: {e}")))?;

        let output = self
            .run_blocking(
                "invocation",
                self.invocation_timeout,
                move || engine.execute_transformation(&input),
                TransformError::Invocation,
            )
            .await?;
        self.run_log.record(
            &item.run_id,
            Level::DEBUG,
            &format!("Transformation result:\n{}", output),
        );

        Ok(TransformedItem {
            run_id: item.run_id.clone(),
            payload: output,
            mime_type: config.output_format().to_string(),
            data_info: item.data_info.clone(),
            extra: item.extra.clone(),
        })
    }

    async fn engine_for(
        &self,
        run_id: &str,
        config: &TransformationConfig,
    ) -> Result<Arc<ScriptEngine>, TransformError> {
        if let Some(engine) = self.cache.get(run_id).await {
            self.cache_hit(run_id);
            return Ok(engine);
        }

        if !config.single {
            return Ok(Arc::new(self.build_engine(run_id, config, false).await?));
        }

        let lookup = self
            .cache
            .get_or_try_insert_with(run_id, || self.build_engine(run_id, config, true))
            .await?;
        if let CacheLookup::Hit(_) = &lookup {
            self.cache_hit(run_id);
        }
        Ok(lookup.into_inner())
    }

    fn cache_hit(&self, run_id: &str) {
        DispatchStats::bump(&self.stats.cache_hits);
        EngineCacheHit { run_id }.log();
    }

    async fn build_engine(
        &self,
        run_id: &str,
        config: &TransformationConfig,
        cached: bool,
    ) -> Result<ScriptEngine, TransformError> {
        let script = self.loader.load(config).await?;
        let params = config.params.clone();
        let limits = self.limits.clone();

        let started = Instant::now();
        let engine = self
            .run_blocking(
                "construction",
                None,
                move || ScriptEngine::build(&script, params.as_ref(), &limits),
                TransformError::ScriptEvaluation,
            )
            .await?;

        DispatchStats::bump(&self.stats.engines_built);
        EngineBuilt {
            run_id,
            cached,
            duration: started.elapsed(),
        }
        .log();
        Ok(engine)
    }

    /// Run script work off the async workers, optionally bounded in wall-clock time.
    async fn run_blocking<T, F>(
        &self,
        stage: &str,
        timeout: Option<Duration>,
        work: F,
        fail: fn(String) -> TransformError,
    ) -> Result<T, TransformError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TransformError> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(work);
        let joined = match timeout {
            Some(limit) => tokio::time::timeout(limit, task)
                .await
                .map_err(|_| fail(format!("script {stage} timed out after {limit:?}")))?,
            None => task.await,
        };
        joined.map_err(|e| fail(format!("script {stage} aborted: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = DispatchStats::default();
        DispatchStats::bump(&stats.received);
        DispatchStats::bump(&stats.received);
        DispatchStats::bump(&stats.dropped);

        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                received: 2,
                dropped: 1,
                ..StatsSnapshot::default()
            }
        );
    }
}
