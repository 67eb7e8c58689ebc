// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::consts::ENV_REPOSITORY_DEFAULT_BRANCH;
use crate::config::{DefaultBranch, StageConfig};
use crate::dispatch::{Dispatcher, WorkerPool};
use crate::engine::EngineCache;
use crate::errors::ConfigError;
use crate::loader::ScriptLoader;
use crate::observability::run_log::TracingRunLog;
use crate::repository::{GitCli, RepositoryResolver};
use crate::traits::{Downstream, RunLog, VersionControl};

/// A fully wired transformation stage.
pub struct StageRuntime {
    pub dispatcher: Arc<Dispatcher>,
    pub default_branch: DefaultBranch,
    follows_env: bool,
    config: StageConfig,
}

impl StageRuntime {
    /// Start re-reading `REPOSITORY_DEFAULT_BRANCH` until `cancel` fires.
    ///
    /// Returns `None` when the configuration pins `default_branch`, which then
    /// takes precedence over the environment.
    pub fn spawn_branch_watcher(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        self.follows_env.then(|| {
            self.default_branch.spawn_env_watcher(
                ENV_REPOSITORY_DEFAULT_BRANCH,
                self.config.branch_reload_interval(),
                cancel,
            )
        })
    }

    /// Start the worker pool sized from the configuration.
    pub fn spawn_pool(&self) -> WorkerPool {
        WorkerPool::spawn(
            self.dispatcher.clone(),
            self.config.workers,
            self.config.queue_depth(),
        )
    }
}

/// Stage runtime builder - wires resolver, loader, cache and dispatcher from configuration.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pipe_transforming::config::{RuntimeBuilder, StageConfig};
/// use pipe_transforming::transport::NdjsonSink;
///
/// let config = StageConfig::default();
/// let runtime = RuntimeBuilder::from_config(&config, Arc::new(NdjsonSink::new(tokio::io::sink())))
///     .expect("default configuration is valid");
///
/// assert_eq!(runtime.dispatcher.cache().capacity(), 50);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build with the production collaborators: the `git` command line and the
    /// tracing-backed run log.
    pub fn from_config(
        cfg: &StageConfig,
        downstream: Arc<dyn Downstream>,
    ) -> Result<StageRuntime, ConfigError> {
        Self::with_collaborators(
            cfg,
            downstream,
            Arc::new(TracingRunLog),
            Arc::new(GitCli::new()),
        )
    }

    pub fn with_collaborators(
        cfg: &StageConfig,
        downstream: Arc<dyn Downstream>,
        run_log: Arc<dyn RunLog>,
        vcs: Arc<dyn VersionControl>,
    ) -> Result<StageRuntime, ConfigError> {
        cfg.validate()?;

        let (default_branch, follows_env) = match &cfg.default_branch {
            Some(branch) => (DefaultBranch::new(branch.trim()), false),
            None => (DefaultBranch::from_env(), true),
        };

        let resolver = Arc::new(RepositoryResolver::new(cfg.repositories_root.clone(), vcs));
        let loader = ScriptLoader::new(cfg.scripts_root.clone(), resolver, default_branch.clone());
        let dispatcher = Dispatcher::new(
            loader,
            EngineCache::from_config(&cfg.cache),
            downstream,
            run_log,
        )
        .with_limits(cfg.rhai.clone())
        .with_invocation_timeout(cfg.invocation_timeout());

        Ok(StageRuntime {
            dispatcher: Arc::new(dispatcher),
            default_branch,
            follows_env,
            config: cfg.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::stub::{FakeVcs, MemoryRunLog, RecordingDownstream};
    use std::time::Duration;

    fn try_build(cfg: &StageConfig) -> Result<StageRuntime, ConfigError> {
        RuntimeBuilder::with_collaborators(
            cfg,
            Arc::new(RecordingDownstream::new()),
            Arc::new(MemoryRunLog::new()),
            Arc::new(FakeVcs::with_files(&[])),
        )
    }

    fn build(cfg: &StageConfig) -> StageRuntime {
        try_build(cfg).unwrap()
    }

    #[test]
    fn test_cache_bounds_come_from_config() {
        let cfg = StageConfig {
            cache: CacheConfig {
                capacity: 7,
                idle_seconds: 60,
            },
            ..StageConfig::default()
        };

        let runtime = build(&cfg);
        assert_eq!(runtime.dispatcher.cache().capacity(), 7);
        assert_eq!(runtime.dispatcher.cache().idle_timeout(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_configured_branch_is_pinned() {
        let cfg = StageConfig {
            default_branch: Some("develop".to_string()),
            ..StageConfig::default()
        };

        let runtime = build(&cfg);
        assert_eq!(runtime.default_branch.current(), "develop");
        assert!(runtime
            .spawn_branch_watcher(CancellationToken::new())
            .is_none());
    }

    #[tokio::test]
    async fn test_unpinned_branch_follows_environment() {
        let runtime = build(&StageConfig::default());
        let cancel = CancellationToken::new();

        let watcher = runtime.spawn_branch_watcher(cancel.clone());
        assert!(watcher.is_some());

        cancel.cancel();
        watcher.unwrap().await.unwrap();
    }

    #[tokio::test]
    async fn test_pool_is_sized_from_config() {
        let cfg = StageConfig {
            workers: 3,
            ..StageConfig::default()
        };

        let pool = build(&cfg).spawn_pool();
        assert_eq!(pool.workers(), 3);
        pool.shutdown().await;
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let zero_interval = StageConfig {
            branch_reload_interval_seconds: 0,
            ..StageConfig::default()
        };
        assert!(matches!(try_build(&zero_interval), Err(ConfigError::Invalid(_))));

        let zero_workers = StageConfig {
            workers: 0,
            ..StageConfig::default()
        };
        assert!(matches!(try_build(&zero_workers), Err(ConfigError::Invalid(_))));
    }
}
