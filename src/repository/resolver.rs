// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::observability::messages::repository::{
    CloningRepository, PullingRepository, RepositoryMergeConflict, RepositorySyncFailed,
    WorkingCopyCleanupFailed,
};
use crate::observability::messages::StructuredLog;
use crate::repository::{working_copy_path, Credentials, SyncOutcome, WorkingCopy};
use crate::traits::{PullStatus, VersionControl};

/// Materializes and refreshes working copies of script repositories.
///
/// Clone and pull for the same working copy are serialized through a per-path
/// async mutex; different working copies sync concurrently. Sync failures never
/// surface as errors, they are reported through [`SyncOutcome`] and logged.
pub struct RepositoryResolver {
    root: PathBuf,
    vcs: Arc<dyn VersionControl>,
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl RepositoryResolver {
    pub fn new(root: impl Into<PathBuf>, vcs: Arc<dyn VersionControl>) -> Self {
        Self {
            root: root.into(),
            vcs,
            locks: DashMap::new(),
        }
    }

    /// Guarantee a working copy of `uri` at `branch` exists, cloning or pulling as needed.
    pub async fn resolve(
        &self,
        uri: &str,
        username: Option<&str>,
        token: Option<&str>,
        branch: &str,
    ) -> WorkingCopy {
        let path = working_copy_path(&self.root, uri, branch);
        let credentials = Credentials::from_parts(username, token);

        let lock = self
            .locks
            .entry(path.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let outcome = {
            let _guard = lock.lock().await;
            if tokio::fs::metadata(&path).await.is_ok() {
                self.pull_existing(uri, credentials.as_ref(), &path).await
            } else {
                self.clone_fresh(uri, branch, credentials.as_ref(), &path).await
            }
        };

        // Only the map and this call hold the lock when nobody else is waiting.
        self.locks
            .remove_if(&path, |_, lock| Arc::strong_count(lock) <= 2);

        WorkingCopy { path, outcome }
    }

    async fn clone_fresh(
        &self,
        uri: &str,
        branch: &str,
        credentials: Option<&Credentials>,
        path: &Path,
    ) -> SyncOutcome {
        CloningRepository { uri, branch, path }.log();

        match self.vcs.clone_branch(uri, branch, credentials, path).await {
            Ok(()) => SyncOutcome::Cloned,
            Err(e) => {
                RepositorySyncFailed {
                    uri,
                    operation: "clone",
                    error: &e,
                }
                .log();
                // A partial tree would be pulled instead of cloned on the next resolve.
                if let Err(error) = discard_partial_copy(path).await {
                    WorkingCopyCleanupFailed { path, error: &error }.log();
                }
                SyncOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn pull_existing(
        &self,
        uri: &str,
        credentials: Option<&Credentials>,
        path: &Path,
    ) -> SyncOutcome {
        PullingRepository { uri, path }.log();

        match self.vcs.pull(uri, credentials, path).await {
            Ok(PullStatus::Merged) => SyncOutcome::Updated,
            Ok(PullStatus::Conflict(detail)) => {
                RepositoryMergeConflict {
                    uri,
                    detail: &detail,
                }
                .log();
                SyncOutcome::Stale { reason: detail }
            }
            Err(e) => {
                RepositorySyncFailed {
                    uri,
                    operation: "pull",
                    error: &e,
                }
                .log();
                SyncOutcome::Stale {
                    reason: e.to_string(),
                }
            }
        }
    }
}

async fn discard_partial_copy(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
