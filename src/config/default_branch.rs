// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Live-reloadable default branch for repository-sourced scripts.
//!
//! The value is process-wide state with one owner: a `tokio::sync::watch` channel.
//! Readers call [`DefaultBranch::current`] per work item; the environment watcher
//! (or any other caller) pushes changes through [`DefaultBranch::update`], and
//! interested tasks can [`DefaultBranch::subscribe`] to be woken on change.

use crate::config::consts::{DEFAULT_BRANCH, ENV_REPOSITORY_DEFAULT_BRANCH};
use crate::observability::messages::config::DefaultBranchChanged;
use crate::observability::messages::StructuredLog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct DefaultBranch {
    sender: Arc<watch::Sender<String>>,
}

impl DefaultBranch {
    pub fn new(initial: impl Into<String>) -> Self {
        let (sender, _) = watch::channel(initial.into());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Initialize from `REPOSITORY_DEFAULT_BRANCH`, falling back to `master`.
    pub fn from_env() -> Self {
        Self::new(read_branch_from_env(ENV_REPOSITORY_DEFAULT_BRANCH))
    }

    pub fn current(&self) -> String {
        self.sender.borrow().clone()
    }

    /// Replace the default branch. Returns `true` when the value actually changed.
    pub fn update(&self, branch: impl Into<String>) -> bool {
        let branch = branch.into();
        let mut previous = None;
        let changed = self.sender.send_if_modified(|current| {
            if *current == branch {
                return false;
            }
            previous = Some(std::mem::replace(current, branch.clone()));
            true
        });

        if let Some(previous) = previous {
            DefaultBranchChanged {
                previous: &previous,
                current: &branch,
            }
            .log();
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }

    /// Re-read environment variable `key` every `interval` and apply changes until
    /// `cancel` fires.
    pub fn spawn_env_watcher(
        &self,
        key: &'static str,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let branch = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        branch.update(read_branch_from_env(key));
                    }
                }
            }
        })
    }
}

impl Default for DefaultBranch {
    fn default() -> Self {
        Self::new(DEFAULT_BRANCH)
    }
}

fn read_branch_from_env(key: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_master() {
        assert_eq!(DefaultBranch::default().current(), "master");
    }

    #[test]
    fn test_update_reports_change() {
        let branch = DefaultBranch::new("master");

        assert!(branch.update("main"));
        assert_eq!(branch.current(), "main");
        assert!(!branch.update("main"));
    }

    #[test]
    fn test_clones_share_state() {
        let branch = DefaultBranch::new("master");
        let reader = branch.clone();

        branch.update("develop");
        assert_eq!(reader.current(), "develop");
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let branch = DefaultBranch::new("master");
        let mut receiver = branch.subscribe();

        branch.update("release");
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), "release");
    }

    #[test]
    fn test_blank_env_value_falls_back_to_master() {
        std::env::set_var("PIPE_TRANSFORMING_TEST_BLANK_BRANCH", "   ");
        assert_eq!(
            read_branch_from_env("PIPE_TRANSFORMING_TEST_BLANK_BRANCH"),
            "master"
        );
        assert_eq!(
            read_branch_from_env("PIPE_TRANSFORMING_TEST_UNSET_BRANCH"),
            "master"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_env_watcher_applies_changes() {
        const KEY: &str = "PIPE_TRANSFORMING_TEST_WATCHED_BRANCH";
        std::env::set_var(KEY, "main");

        let branch = DefaultBranch::new("master");
        let cancel = CancellationToken::new();
        let handle = branch.spawn_env_watcher(KEY, Duration::from_secs(5), cancel.clone());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(branch.current(), "main");

        std::env::set_var(KEY, "gh-pages");
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(branch.current(), "gh-pages");

        cancel.cancel();
        handle.await.unwrap();
    }
}
