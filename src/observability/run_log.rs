// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Default per-run log sink.

use crate::traits::RunLog;
use tracing::Level;

/// Writes per-run log entries as `tracing` events on the `run_log` target.
///
/// Operators route these separately from the process log with a filter such as
/// `RUST_LOG=info,run_log=debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunLog;

impl RunLog for TracingRunLog {
    fn record(&self, run_id: &str, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!(target: "run_log", run_id, "{}", message),
            Level::WARN => tracing::warn!(target: "run_log", run_id, "{}", message),
            Level::INFO => tracing::info!(target: "run_log", run_id, "{}", message),
            Level::DEBUG => tracing::debug!(target: "run_log", run_id, "{}", message),
            Level::TRACE => tracing::trace!(target: "run_log", run_id, "{}", message),
        }
    }
}
