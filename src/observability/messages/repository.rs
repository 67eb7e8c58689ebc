// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for repository working copy events.
//!
//! Messages carry the remote URI as configured. Credentials are never part of
//! that value, they travel separately and are not logged.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A working copy is being cloned.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct CloningRepository<'a> {
    pub uri: &'a str,
    pub branch: &'a str,
    pub path: &'a Path,
}

impl Display for CloningRepository<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cloning remote repo {} ({}) to {}",
            self.uri,
            self.branch,
            self.path.display()
        )
    }
}

impl StructuredLog for CloningRepository<'_> {
    fn log(&self) {
        tracing::debug!(uri = self.uri, branch = self.branch, "{}", self);
    }
}

/// An existing working copy is being updated.
///
/// # Log Level
/// `debug!` - Diagnostic detail
pub struct PullingRepository<'a> {
    pub uri: &'a str,
    pub path: &'a Path,
}

impl Display for PullingRepository<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pulling remote repo {} into {}",
            self.uri,
            self.path.display()
        )
    }
}

impl StructuredLog for PullingRepository<'_> {
    fn log(&self) {
        tracing::debug!(uri = self.uri, "{}", self);
    }
}

/// A pull could not be merged; the working copy is kept as-is.
///
/// # Log Level
/// `warn!` - Degraded but usable
pub struct RepositoryMergeConflict<'a> {
    pub uri: &'a str,
    pub detail: &'a str,
}

impl Display for RepositoryMergeConflict<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not merge repository {}: {}", self.uri, self.detail)
    }
}

impl StructuredLog for RepositoryMergeConflict<'_> {
    fn log(&self) {
        tracing::warn!(uri = self.uri, "{}", self);
    }
}

/// A clone or pull command failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use pipe_transforming::observability::messages::repository::RepositorySyncFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::NotFound, "git not installed");
/// let msg = RepositorySyncFailed {
///     uri: "https://git.example.org/scripts.git",
///     operation: "clone",
///     error: &error,
/// };
/// assert!(msg.to_string().starts_with("Calling clone command"));
/// ```
pub struct RepositorySyncFailed<'a> {
    pub uri: &'a str,
    pub operation: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for RepositorySyncFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Calling {} command for {} failed: {}",
            self.operation, self.uri, self.error
        )
    }
}

impl StructuredLog for RepositorySyncFailed<'_> {
    fn log(&self) {
        tracing::error!(uri = self.uri, operation = self.operation, "{}", self);
    }
}

/// A failed clone left a working copy that could not be removed.
///
/// # Log Level
/// `error!` - The next resolve of this copy pulls instead of cloning
pub struct WorkingCopyCleanupFailed<'a> {
    pub path: &'a Path,
    pub error: &'a std::io::Error,
}

impl Display for WorkingCopyCleanupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Removing partial working copy {} failed: {}",
            self.path.display(),
            self.error
        )
    }
}

impl StructuredLog for WorkingCopyCleanupFailed<'_> {
    fn log(&self) {
        tracing::error!(path = %self.path.display(), "{}", self);
    }
}
