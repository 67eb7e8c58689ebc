// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BRANCH_RELOAD_INTERVAL, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_IDLE,
    DEFAULT_INVOCATION_TIMEOUT, DEFAULT_REPOSITORIES_ROOT, DEFAULT_SCRIPTS_ROOT, DEFAULT_WORKERS,
};
use crate::config::RhaiConfig;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Process-wide configuration for the transformation stage.
///
/// Loaded once at startup from an optional YAML file. Every field has a default,
/// so an empty file (or no file at all) yields a working stage.
///
/// # Fields
/// * `workers` - Number of work items handled concurrently
/// * `queue_depth` - Capacity of the channel feeding the workers (defaults to `workers * 2`)
/// * `scripts_root` - Directory `localFile` scripts are resolved against
/// * `repositories_root` - Directory holding repository working copies
/// * `default_branch` - Branch for repository scripts without one; overrides the environment
/// * `branch_reload_interval_seconds` - How often the environment is re-read for the default branch
/// * `invocation_timeout_seconds` - Wall-clock bound per transformation, `0` disables it
/// * `cache` - Engine cache bounds
/// * `rhai` - Script engine resource limits
///
/// # Example
/// ```yaml
/// workers: 10
/// scripts_root: /opt/transforming/scripts
/// cache:
///   capacity: 50
///   idle_seconds: 43200
/// rhai:
///   max_operations: 1000000
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StageConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    pub queue_depth: Option<usize>,
    #[serde(default = "default_scripts_root")]
    pub scripts_root: PathBuf,
    #[serde(default = "default_repositories_root")]
    pub repositories_root: PathBuf,
    pub default_branch: Option<String>,
    #[serde(default = "default_branch_reload_interval_seconds")]
    pub branch_reload_interval_seconds: u64,
    #[serde(default = "default_invocation_timeout_seconds")]
    pub invocation_timeout_seconds: u64,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rhai: RhaiConfig,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_depth: None,
            scripts_root: default_scripts_root(),
            repositories_root: default_repositories_root(),
            default_branch: None,
            branch_reload_interval_seconds: default_branch_reload_interval_seconds(),
            invocation_timeout_seconds: default_invocation_timeout_seconds(),
            cache: CacheConfig::default(),
            rhai: RhaiConfig::default(),
        }
    }
}

impl StageConfig {
    /// Channel capacity between the transport reader and the workers.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth.unwrap_or(self.workers * 2)
    }

    pub fn branch_reload_interval(&self) -> Duration {
        Duration::from_secs(self.branch_reload_interval_seconds)
    }

    /// `None` when invocations run unbounded.
    pub fn invocation_timeout(&self) -> Option<Duration> {
        match self.invocation_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Reject values that would leave the stage unable to make progress.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".to_string()));
        }
        if self.queue_depth == Some(0) {
            return Err(ConfigError::Invalid("queue_depth must be at least 1".to_string()));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.cache.idle_seconds == 0 {
            return Err(ConfigError::Invalid(
                "cache.idle_seconds must be at least 1".to_string(),
            ));
        }
        if self.branch_reload_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "branch_reload_interval_seconds must be at least 1".to_string(),
            ));
        }
        if let Some(branch) = &self.default_branch {
            if branch.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "default_branch must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Bounds for the engine cache.
///
/// # Example
/// ```yaml
/// cache:
///   capacity: 50         # entries
///   idle_seconds: 43200  # 12 hours
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_cache_idle_seconds")]
    pub idle_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            idle_seconds: default_cache_idle_seconds(),
        }
    }
}

impl CacheConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_seconds)
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_scripts_root() -> PathBuf {
    PathBuf::from(DEFAULT_SCRIPTS_ROOT)
}

fn default_repositories_root() -> PathBuf {
    PathBuf::from(DEFAULT_REPOSITORIES_ROOT)
}

fn default_branch_reload_interval_seconds() -> u64 {
    DEFAULT_BRANCH_RELOAD_INTERVAL.as_secs()
}

fn default_invocation_timeout_seconds() -> u64 {
    DEFAULT_INVOCATION_TIMEOUT.as_secs()
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_cache_idle_seconds() -> u64 {
    DEFAULT_CACHE_IDLE.as_secs()
}

/// Load a stage config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StageConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: StageConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a stage config and check that its values are usable
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<StageConfig, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
