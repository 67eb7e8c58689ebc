// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for script engine construction and cache events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// A script engine was constructed.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct EngineBuilt<'a> {
    pub run_id: &'a str,
    pub cached: bool,
    pub duration: Duration,
}

impl Display for EngineBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let scope = if self.cached { "cached for run" } else { "single use" };
        write!(
            f,
            "Built script engine for run '{}' ({}) in {:?}",
            self.run_id, scope, self.duration
        )
    }
}

impl StructuredLog for EngineBuilt<'_> {
    fn log(&self) {
        tracing::debug!(
            run_id = self.run_id,
            cached = self.cached,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A cached engine was reused.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct EngineCacheHit<'a> {
    pub run_id: &'a str,
}

impl Display for EngineCacheHit<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reusing cached engine for run '{}'", self.run_id)
    }
}

impl StructuredLog for EngineCacheHit<'_> {
    fn log(&self) {
        tracing::debug!(run_id = self.run_id, "{}", self);
    }
}

/// Why a cache entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// Unused for longer than the idle timeout
    Expired,
    /// Least recently used entry removed to respect capacity
    Capacity,
}

impl Display for EvictionReason {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            EvictionReason::Expired => write!(f, "idle timeout"),
            EvictionReason::Capacity => write!(f, "capacity"),
        }
    }
}

/// A cached engine was evicted.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct EngineEvicted<'a> {
    pub run_id: &'a str,
    pub reason: EvictionReason,
}

impl Display for EngineEvicted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evicted cached engine for run '{}' ({})",
            self.run_id, self.reason
        )
    }
}

impl StructuredLog for EngineEvicted<'_> {
    fn log(&self) {
        tracing::debug!(run_id = self.run_id, reason = %self.reason, "{}", self);
    }
}

/// Output of a script's `print` or `debug` call.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct ScriptOutput<'a> {
    pub message: &'a str,
}

impl Display for ScriptOutput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "script: {}", self.message)
    }
}

impl StructuredLog for ScriptOutput<'_> {
    fn log(&self) {
        tracing::debug!(target: "script", "{}", self);
    }
}
