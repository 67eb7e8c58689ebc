// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::path::Path;

use crate::errors::RepositoryError;
use crate::repository::Credentials;

/// Result of updating an existing working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullStatus {
    /// Remote changes were applied (or there were none).
    Merged,
    /// The remote could not be merged; the tree is left as the client left it.
    Conflict(String),
}

/// Version-control client used to materialize script repositories.
///
/// Implementations are black boxes to the resolver: it only decides *when* to clone
/// or pull and what to do with the outcome.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Clone `branch` of `uri` into `target`, which does not exist yet.
    async fn clone_branch(
        &self,
        uri: &str,
        branch: &str,
        credentials: Option<&Credentials>,
        target: &Path,
    ) -> Result<(), RepositoryError>;

    /// Fetch and merge the current branch of the working copy at `path`.
    async fn pull(
        &self,
        uri: &str,
        credentials: Option<&Credentials>,
        path: &Path,
    ) -> Result<PullStatus, RepositoryError>;
}
