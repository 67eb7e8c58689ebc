// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `config` - Stage startup, shutdown and live configuration changes
//! * `dispatch` - Work item classification, forwarding and dropping
//! * `engine` - Script engine construction and cache activity
//! * `repository` - Working copy clone/pull events
//! * `script` - Script loading
//!
//! # Usage Pattern
//!
//! ```rust
//! use pipe_transforming::observability::messages::StructuredLog;
//! use pipe_transforming::observability::messages::engine::EngineCacheHit;
//!
//! let msg = EngineCacheHit { run_id: "run-42" };
//! msg.log();
//! assert_eq!(msg.to_string(), "Reusing cached engine for run 'run-42'");
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod repository;
pub mod script;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message through `tracing` at its designated level.
    fn log(&self);
}
