// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy for the transformation path.
//!
//! Every variant is caught at the dispatcher boundary: the failure is written to
//! the process log and the per-run log and the work item is dropped. None of them
//! is ever reported back to the transport.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    /// A `localFile` (or repository) script path does not exist.
    #[error("Script {} not found", .0.display())]
    ScriptNotFound(PathBuf),

    /// The script failed to compile or run its top level, or lacks the
    /// `transforming` entry function.
    #[error("Script evaluation failed: {0}")]
    ScriptEvaluation(String),

    /// The payload could not be parsed, or the transformation function failed
    /// or returned something that is not structured data.
    #[error("Transformation failed: {0}")]
    Invocation(String),

    /// The script repository could not be materialized and the script is missing.
    #[error("Repository sync failed for {uri}: {reason}")]
    RepositorySync { uri: String, reason: String },

    /// The work item's transformation configuration is unusable.
    #[error("Invalid transformation configuration: {0}")]
    InvalidConfiguration(String),

    /// Any other I/O error while reading a script.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransformError {
    /// Stable label for the failure class, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::ScriptNotFound(_) => "ScriptNotFound",
            TransformError::ScriptEvaluation(_) => "ScriptEvaluationFailure",
            TransformError::Invocation(_) => "InvocationFailure",
            TransformError::RepositorySync { .. } => "RepositorySyncFailure",
            TransformError::InvalidConfiguration(_) => "InvalidConfiguration",
            TransformError::Io(_) => "IoFailure",
        }
    }
}
