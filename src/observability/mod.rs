// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Log lines are produced from message types grouped by subsystem, each implementing
//! `Display` for the human-readable text and [`messages::StructuredLog`] for the
//! level and structured fields. Call sites never format ad-hoc strings.
//!
//! The per-run log required by the pipeline is a separate sink, see
//! [`run_log::TracingRunLog`].
//!
//! # Usage
//!
//! ```rust
//! use pipe_transforming::observability::messages::StructuredLog;
//! use pipe_transforming::observability::messages::script::ScriptMissing;
//!
//! ScriptMissing { path: "scripts/absent.rhai" }.log();
//! ```

pub mod messages;
pub mod run_log;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Logs go to stderr so stdout stays reserved for forwarded work items. The filter
/// is taken from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
