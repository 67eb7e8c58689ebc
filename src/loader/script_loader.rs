// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{DefaultBranch, RepositorySource, ScriptSource, TransformationConfig};
use crate::errors::TransformError;
use crate::observability::messages::script::{ScriptLoaded, ScriptMissing, StaleScriptLoaded};
use crate::observability::messages::StructuredLog;
use crate::repository::{RepositoryResolver, SyncOutcome};

/// Produces script text for a transformation configuration.
///
/// * `embedded` - the inline script, verbatim
/// * `localFile` - the file at `scripts_root/<path>`
/// * `repository` - the file at `<working copy>/<script>` after cloning or pulling
///
/// Paths are joined as given; they are not confined to their root.
pub struct ScriptLoader {
    scripts_root: PathBuf,
    resolver: Arc<RepositoryResolver>,
    default_branch: DefaultBranch,
}

impl ScriptLoader {
    pub fn new(
        scripts_root: impl Into<PathBuf>,
        resolver: Arc<RepositoryResolver>,
        default_branch: DefaultBranch,
    ) -> Self {
        Self {
            scripts_root: scripts_root.into(),
            resolver,
            default_branch,
        }
    }

    pub async fn load(&self, config: &TransformationConfig) -> Result<String, TransformError> {
        match config.source()? {
            ScriptSource::Embedded(script) => {
                ScriptLoaded {
                    source: "embedded",
                    location: "inline",
                    size_bytes: script.len(),
                }
                .log();
                Ok(script.to_string())
            }
            ScriptSource::LocalFile(path) => {
                let path = self.scripts_root.join(path);
                read_script("localFile", &path).await
            }
            ScriptSource::Repository(repo) => self.load_from_repository(repo).await,
        }
    }

    async fn load_from_repository(&self, repo: &RepositorySource) -> Result<String, TransformError> {
        let branch = repo
            .branch()
            .map(str::to_string)
            .unwrap_or_else(|| self.default_branch.current());

        let copy = self
            .resolver
            .resolve(
                &repo.uri,
                repo.username.as_deref(),
                repo.token.as_deref(),
                &branch,
            )
            .await;

        let path = copy.resolve(&repo.script);
        match read_script("repository", &path).await {
            Err(TransformError::ScriptNotFound(path)) => match copy.outcome {
                SyncOutcome::Failed { reason } => Err(TransformError::RepositorySync {
                    uri: repo.uri.clone(),
                    reason,
                }),
                _ => Err(TransformError::ScriptNotFound(path)),
            },
            Ok(script) => {
                if !copy.outcome.is_fresh() {
                    StaleScriptLoaded {
                        uri: &repo.uri,
                        script: &repo.script,
                        outcome: &copy.outcome.to_string(),
                    }
                    .log();
                }
                Ok(script)
            }
            other => other,
        }
    }
}

async fn read_script(source: &str, path: &Path) -> Result<String, TransformError> {
    match tokio::fs::read_to_string(path).await {
        Ok(script) => {
            ScriptLoaded {
                source,
                location: &path.to_string_lossy(),
                size_bytes: script.len(),
            }
            .log();
            Ok(script)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            ScriptMissing {
                path: &path.to_string_lossy(),
            }
            .log();
            Err(TransformError::ScriptNotFound(path.to_path_buf()))
        }
        Err(e) => Err(TransformError::Io(e)),
    }
}
