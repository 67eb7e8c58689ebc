// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for work item dispatch events.
//!
//! This module contains message types for logging events related to:
//! * Classification of incoming work items (transform vs. passthrough)
//! * Successful transformations and their forwarding
//! * Dropped work items and transport failures

use crate::errors::TransformError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Work item passed downstream without transformation.
///
/// # Log Level
/// `trace!` - High-volume routing detail
pub struct PassingWorkItem<'a> {
    pub run_id: &'a str,
    pub content: &'a str,
}

impl Display for PassingWorkItem<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Passing work item of run '{}' (content: {})",
            self.run_id, self.content
        )
    }
}

impl StructuredLog for PassingWorkItem<'_> {
    fn log(&self) {
        tracing::trace!(run_id = self.run_id, content = self.content, "{}", self);
    }
}

/// Work item transformed and forwarded.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipe_transforming::observability::messages::dispatch::WorkItemTransformed;
/// use std::time::Duration;
///
/// let msg = WorkItemTransformed {
///     run_id: "run-1",
///     mime_type: "application/ld+json",
///     output_size: 512,
///     duration: Duration::from_millis(3),
/// };
/// assert!(msg.to_string().contains("run-1"));
/// ```
pub struct WorkItemTransformed<'a> {
    pub run_id: &'a str,
    pub mime_type: &'a str,
    pub output_size: usize,
    pub duration: Duration,
}

impl Display for WorkItemTransformed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Data transformed for run '{}': {} bytes as {} in {:?}",
            self.run_id, self.output_size, self.mime_type, self.duration
        )
    }
}

impl StructuredLog for WorkItemTransformed<'_> {
    fn log(&self) {
        tracing::info!(
            run_id = self.run_id,
            mime_type = self.mime_type,
            output_size = self.output_size,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Work item dropped because its transformation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use pipe_transforming::errors::TransformError;
/// use pipe_transforming::observability::messages::dispatch::WorkItemDropped;
///
/// let error = TransformError::Invocation("boom".to_string());
/// let msg = WorkItemDropped { run_id: "run-1", error: &error };
/// assert_eq!(
///     msg.to_string(),
///     "Dropping work item of run 'run-1' (InvocationFailure): Transformation failed: boom"
/// );
/// ```
pub struct WorkItemDropped<'a> {
    pub run_id: &'a str,
    pub error: &'a TransformError,
}

impl Display for WorkItemDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropping work item of run '{}' ({}): {}",
            self.run_id,
            self.error.kind(),
            self.error
        )
    }
}

impl StructuredLog for WorkItemDropped<'_> {
    fn log(&self) {
        tracing::error!(
            run_id = self.run_id,
            kind = self.error.kind(),
            "{}", self
        );
    }
}

/// The downstream collaborator rejected a result or passthrough.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ForwardFailed<'a> {
    pub run_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ForwardFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to hand work item of run '{}' downstream: {}",
            self.run_id, self.error
        )
    }
}

impl StructuredLog for ForwardFailed<'_> {
    fn log(&self) {
        tracing::error!(run_id = self.run_id, "{}", self);
    }
}

/// An inbound line could not be decoded into a work item.
///
/// # Log Level
/// `warn!` - Input problem, stage keeps running
pub struct MalformedWorkItem<'a> {
    pub line: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for MalformedWorkItem<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Skipping malformed work item on line {}: {}", self.line, self.error)
    }
}

impl StructuredLog for MalformedWorkItem<'_> {
    fn log(&self) {
        tracing::warn!(line = self.line, "{}", self);
    }
}
