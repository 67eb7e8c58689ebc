// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors from version-control operations on repository working copies.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The version-control client could not be started at all.
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The version-control client ran and exited unsuccessfully.
    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Filesystem error while preparing a working copy location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
