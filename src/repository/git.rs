// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! [`VersionControl`] backed by the `git` command line.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::errors::RepositoryError;
use crate::repository::Credentials;
use crate::traits::{PullStatus, VersionControl};

const CONFLICT_MARKERS: &[&str] = &[
    "CONFLICT",
    "Automatic merge failed",
    "unmerged files",
    "would be overwritten by merge",
];

/// Runs `git` as a child process with terminal prompts disabled.
///
/// Authenticated remotes get their credentials embedded in the URL passed on the
/// command line; the URL stored in the working copy's config never contains them.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

struct CommandOutput {
    success: bool,
    status: String,
    stdout: String,
    stderr: String,
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        credentials: Option<&Credentials>,
    ) -> Result<CommandOutput, RepositoryError> {
        let label = format!("git {}", args.first().copied().unwrap_or_default());

        let mut command = Command::new(&self.program);
        if let Some(dir) = cwd {
            command.arg("-C").arg(dir);
        }
        let output = command
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| RepositoryError::Spawn {
                command: label,
                source,
            })?;

        let scrub = |bytes: &[u8]| {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            match credentials {
                Some(creds) => creds.redact(&text),
                None => text,
            }
        };

        Ok(CommandOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: scrub(&output.stdout),
            stderr: scrub(&output.stderr),
        })
    }

    async fn run_checked(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        credentials: Option<&Credentials>,
    ) -> Result<String, RepositoryError> {
        let output = self.run(args, cwd, credentials).await?;
        if output.success {
            Ok(output.stdout)
        } else {
            Err(RepositoryError::CommandFailed {
                command: format!("git {}", args.first().copied().unwrap_or_default()),
                status: output.status,
                stderr: output.stderr,
            })
        }
    }

    async fn current_branch(&self, path: &Path) -> Result<String, RepositoryError> {
        self.run_checked(&["symbolic-ref", "--short", "HEAD"], Some(path), None)
            .await
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn clone_branch(
        &self,
        uri: &str,
        branch: &str,
        credentials: Option<&Credentials>,
        target: &Path,
    ) -> Result<(), RepositoryError> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let remote = credentials
            .map(|c| c.authenticated_uri(uri))
            .unwrap_or_else(|| uri.to_string());
        let target_str = target.to_string_lossy();

        self.run_checked(
            &[
                "clone",
                "--branch",
                branch,
                "--single-branch",
                "--",
                &remote,
                &target_str,
            ],
            None,
            credentials,
        )
        .await?;

        if credentials.is_some() {
            self.run_checked(
                &["remote", "set-url", "origin", uri],
                Some(target),
                credentials,
            )
            .await?;
        }
        Ok(())
    }

    async fn pull(
        &self,
        uri: &str,
        credentials: Option<&Credentials>,
        path: &Path,
    ) -> Result<PullStatus, RepositoryError> {
        let branch = self.current_branch(path).await?;
        let remote = credentials
            .map(|c| c.authenticated_uri(uri))
            .unwrap_or_else(|| uri.to_string());

        let output = self
            .run(
                &["pull", "--no-rebase", "--no-edit", &remote, &branch],
                Some(path),
                credentials,
            )
            .await?;

        if output.success {
            return Ok(PullStatus::Merged);
        }

        let combined = format!("{}\n{}", output.stdout, output.stderr);
        if CONFLICT_MARKERS.iter().any(|marker| combined.contains(marker)) {
            return Ok(PullStatus::Conflict(combined.trim().to_string()));
        }

        Err(RepositoryError::CommandFailed {
            command: "git pull".to_string(),
            status: output.status,
            stderr: output.stderr,
        })
    }
}
