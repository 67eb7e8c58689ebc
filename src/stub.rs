// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles for the stage's collaborators.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;

use crate::dispatch::{TransformedItem, WorkItem};
use crate::errors::{RepositoryError, TransportError};
use crate::repository::Credentials;
use crate::traits::{Downstream, PullStatus, RunLog, VersionControl};

/// Downstream that keeps everything it is handed.
#[derive(Default)]
pub struct RecordingDownstream {
    forwarded: Mutex<Vec<TransformedItem>>,
    passed: Mutex<Vec<WorkItem>>,
    failing: bool,
}

impl RecordingDownstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// A downstream whose every call fails with [`TransportError::Closed`].
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn forwarded(&self) -> Vec<TransformedItem> {
        self.forwarded.lock().unwrap().clone()
    }

    pub fn passed(&self) -> Vec<WorkItem> {
        self.passed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downstream for RecordingDownstream {
    async fn forward(&self, item: TransformedItem) -> Result<(), TransportError> {
        if self.failing {
            return Err(TransportError::Closed);
        }
        self.forwarded.lock().unwrap().push(item);
        Ok(())
    }

    async fn pass(&self, item: WorkItem) -> Result<(), TransportError> {
        if self.failing {
            return Err(TransportError::Closed);
        }
        self.passed.lock().unwrap().push(item);
        Ok(())
    }
}

/// Run log kept in memory.
#[derive(Default)]
pub struct MemoryRunLog {
    entries: Mutex<Vec<(String, Level, String)>>,
}

impl MemoryRunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, Level, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn messages_for(&self, run_id: &str) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| id == run_id)
            .map(|(_, _, message)| message.clone())
            .collect()
    }
}

impl RunLog for MemoryRunLog {
    fn record(&self, run_id: &str, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((run_id.to_string(), level, message.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VcsCall {
    Clone {
        uri: String,
        branch: String,
        target: PathBuf,
        authenticated: bool,
    },
    Pull {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakePull {
    Merged,
    Conflict,
    Fail,
}

/// Version control that "clones" by writing a fixed set of files.
pub struct FakeVcs {
    files: Vec<(String, String)>,
    clone_fails: bool,
    pull: FakePull,
    calls: Mutex<Vec<VcsCall>>,
}

impl FakeVcs {
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            clone_fails: false,
            pull: FakePull::Merged,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_clone(mut self) -> Self {
        self.clone_fails = true;
        self
    }

    pub fn pull_result(mut self, pull: FakePull) -> Self {
        self.pull = pull;
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clone_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VcsCall::Clone { .. }))
            .count()
    }

    pub fn pull_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VcsCall::Pull { .. }))
            .count()
    }
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn clone_branch(
        &self,
        uri: &str,
        branch: &str,
        credentials: Option<&Credentials>,
        target: &Path,
    ) -> Result<(), RepositoryError> {
        self.calls.lock().unwrap().push(VcsCall::Clone {
            uri: uri.to_string(),
            branch: branch.to_string(),
            target: target.to_path_buf(),
            authenticated: credentials.is_some(),
        });
        // Give concurrent resolvers a chance to interleave.
        tokio::task::yield_now().await;

        if self.clone_fails {
            return Err(RepositoryError::CommandFailed {
                command: "git clone".to_string(),
                status: "exit status: 128".to_string(),
                stderr: "fatal: repository not found".to_string(),
            });
        }
        for (relative, content) in &self.files {
            let path = target.join(relative);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, content).await?;
        }
        tokio::fs::create_dir_all(target).await?;
        Ok(())
    }

    async fn pull(
        &self,
        _uri: &str,
        _credentials: Option<&Credentials>,
        path: &Path,
    ) -> Result<PullStatus, RepositoryError> {
        self.calls.lock().unwrap().push(VcsCall::Pull {
            path: path.to_path_buf(),
        });
        match self.pull {
            FakePull::Merged => Ok(PullStatus::Merged),
            FakePull::Conflict => Ok(PullStatus::Conflict(
                "CONFLICT (content): Merge conflict in transform.rhai".to_string(),
            )),
            FakePull::Fail => Err(RepositoryError::CommandFailed {
                command: "git pull".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "fatal: unable to access remote".to_string(),
            }),
        }
    }
}
