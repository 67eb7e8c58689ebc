// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stage lifecycle and configuration events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

/// Stage started and is accepting work items.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StageStarted<'a> {
    pub workers: usize,
    pub cache_capacity: usize,
    pub cache_idle: Duration,
    pub scripts_root: &'a Path,
    pub default_branch: &'a str,
}

impl Display for StageStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transformation stage started: workers={}, cache_capacity={}, cache_idle={:?}, scripts_root={}, default_branch={}",
            self.workers,
            self.cache_capacity,
            self.cache_idle,
            self.scripts_root.display(),
            self.default_branch
        )
    }
}

impl StructuredLog for StageStarted<'_> {
    fn log(&self) {
        tracing::info!(
            workers = self.workers,
            cache_capacity = self.cache_capacity,
            default_branch = self.default_branch,
            "{}", self
        );
    }
}

/// Stage drained its workers and stopped.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StageStopped {
    pub received: u64,
    pub transformed: u64,
    pub passed: u64,
    pub dropped: u64,
    pub engines_built: u64,
}

impl Display for StageStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transformation stage stopped: received={}, transformed={}, passed={}, dropped={}, engines_built={}",
            self.received, self.transformed, self.passed, self.dropped, self.engines_built
        )
    }
}

impl StructuredLog for StageStopped {
    fn log(&self) {
        tracing::info!(
            received = self.received,
            transformed = self.transformed,
            passed = self.passed,
            dropped = self.dropped,
            engines_built = self.engines_built,
            "{}", self
        );
    }
}

/// The default repository branch changed at runtime.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipe_transforming::observability::messages::config::DefaultBranchChanged;
///
/// let msg = DefaultBranchChanged { previous: "master", current: "main" };
/// assert_eq!(msg.to_string(), "Default repository branch changed from 'master' to 'main'");
/// ```
pub struct DefaultBranchChanged<'a> {
    pub previous: &'a str,
    pub current: &'a str,
}

impl Display for DefaultBranchChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Default repository branch changed from '{}' to '{}'",
            self.previous, self.current
        )
    }
}

impl StructuredLog for DefaultBranchChanged<'_> {
    fn log(&self) {
        tracing::info!(previous = self.previous, current = self.current, "{}", self);
    }
}
