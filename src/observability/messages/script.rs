// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for script loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Script text obtained.
///
/// # Log Level
/// `debug!` - Diagnostic detail
///
/// # Example
/// ```
/// use pipe_transforming::observability::messages::script::ScriptLoaded;
///
/// let msg = ScriptLoaded { source: "localFile", location: "scripts/dcat.rhai", size_bytes: 120 };
/// assert_eq!(msg.to_string(), "Loaded localFile script scripts/dcat.rhai (120 bytes)");
/// ```
pub struct ScriptLoaded<'a> {
    pub source: &'a str,
    pub location: &'a str,
    pub size_bytes: usize,
}

impl Display for ScriptLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} script {} ({} bytes)",
            self.source, self.location, self.size_bytes
        )
    }
}

impl StructuredLog for ScriptLoaded<'_> {
    fn log(&self) {
        tracing::debug!(
            source = self.source,
            location = self.location,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }
}

/// Script file does not exist.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ScriptMissing<'a> {
    pub path: &'a str,
}

impl Display for ScriptMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Script {} not found", self.path)
    }
}

impl StructuredLog for ScriptMissing<'_> {
    fn log(&self) {
        tracing::error!(path = self.path, "{}", self);
    }
}

/// A repository script was read from a working copy that could not be refreshed.
///
/// # Log Level
/// `warn!` - Degraded but continuing
///
/// # Example
/// ```
/// use pipe_transforming::observability::messages::script::StaleScriptLoaded;
///
/// let msg = StaleScriptLoaded {
///     uri: "https://git.example.org/scripts.git",
///     script: "dcat.rhai",
///     outcome: "stale (merge conflict)",
/// };
/// assert_eq!(
///     msg.to_string(),
///     "Using dcat.rhai from https://git.example.org/scripts.git without refresh: stale (merge conflict)"
/// );
/// ```
pub struct StaleScriptLoaded<'a> {
    pub uri: &'a str,
    pub script: &'a str,
    pub outcome: &'a str,
}

impl Display for StaleScriptLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Using {} from {} without refresh: {}",
            self.script, self.uri, self.outcome
        )
    }
}

impl StructuredLog for StaleScriptLoaded<'_> {
    fn log(&self) {
        tracing::warn!(uri = self.uri, script = self.script, "{}", self);
    }
}
