// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-work-item transformation configuration.
//!
//! Each work item carries its own configuration object describing where the
//! transformation script lives and how its result is labelled:
//!
//! ```json
//! {
//!   "scriptType": "repository",
//!   "repository": {
//!     "uri": "https://git.example.org/scripts.git",
//!     "branch": "main",
//!     "username": "bot",
//!     "token": "secret",
//!     "script": "dcat/transform.rhai"
//!   },
//!   "params": { "catalogue": "demo" },
//!   "outputFormat": "text/turtle",
//!   "single": true
//! }
//! ```

use crate::config::consts::DEFAULT_OUTPUT_FORMAT;
use crate::errors::TransformError;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Where the transformation script comes from.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum ScriptType {
    /// Script text is inline in the configuration
    #[default]
    Embedded,
    /// Script is a file below the scripts root
    LocalFile,
    /// Script is a file inside a remote version-controlled repository
    Repository,
}

/// Repository coordinates for [`ScriptType::Repository`].
#[derive(Deserialize, Clone, PartialEq)]
pub struct RepositorySource {
    pub uri: String,
    pub branch: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    /// Script path relative to the working copy root
    pub script: String,
}

impl std::fmt::Debug for RepositorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositorySource")
            .field("uri", &self.uri)
            .field("branch", &self.branch)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("script", &self.script)
            .finish()
    }
}

impl RepositorySource {
    /// The configured branch, treating a blank value as unspecified.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref().filter(|b| !b.trim().is_empty())
    }
}

/// Transformation configuration attached to a work item.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransformationConfig {
    #[serde(default)]
    pub script_type: ScriptType,
    /// Inline script (embedded)
    pub script: Option<String>,
    /// Path relative to the scripts root (localFile)
    pub path: Option<String>,
    pub repository: Option<RepositorySource>,
    /// Bound into the engine scope as `params`
    pub params: Option<Value>,
    pub output_format: Option<String>,
    /// Cache the engine for the rest of the run
    #[serde(default)]
    pub single: bool,
}

/// A resolved view of the script location, one variant per [`ScriptType`].
#[derive(Debug, Clone, Copy)]
pub enum ScriptSource<'a> {
    Embedded(&'a str),
    LocalFile(&'a Path),
    Repository(&'a RepositorySource),
}

impl TransformationConfig {
    /// Parse the configuration object carried by a work item. A missing (`null`)
    /// configuration is the default, an empty embedded script.
    pub fn from_value(value: &Value) -> Result<Self, TransformError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value).map_err(|e| TransformError::InvalidConfiguration(e.to_string()))
    }

    pub fn output_format(&self) -> &str {
        self.output_format
            .as_deref()
            .unwrap_or(DEFAULT_OUTPUT_FORMAT)
    }

    /// Pick the source-specific fields for the configured script type.
    ///
    /// An embedded config without `script` resolves to an empty script, which then
    /// fails engine construction for lacking an entry function.
    pub fn source(&self) -> Result<ScriptSource<'_>, TransformError> {
        match self.script_type {
            ScriptType::Embedded => Ok(ScriptSource::Embedded(
                self.script.as_deref().unwrap_or_default(),
            )),
            ScriptType::LocalFile => self
                .path
                .as_deref()
                .map(|p| ScriptSource::LocalFile(Path::new(p)))
                .ok_or_else(|| {
                    TransformError::InvalidConfiguration(
                        "scriptType 'localFile' requires 'path'".to_string(),
                    )
                }),
            ScriptType::Repository => self
                .repository
                .as_ref()
                .map(ScriptSource::Repository)
                .ok_or_else(|| {
                    TransformError::InvalidConfiguration(
                        "scriptType 'repository' requires a 'repository' object".to_string(),
                    )
                }),
        }
    }
}
