// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors raised by the collaborators that deliver and accept work items.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed work item: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Work item channel is closed")]
    Closed,
}
