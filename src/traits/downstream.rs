// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::dispatch::{TransformedItem, WorkItem};
use crate::errors::TransportError;

/// The next stage of the pipeline.
///
/// The dispatcher hands every successful result to [`Downstream::forward`] and every
/// passthrough item to [`Downstream::pass`]. Errors are logged by the caller and
/// never retried.
#[async_trait]
pub trait Downstream: Send + Sync {
    async fn forward(&self, item: TransformedItem) -> Result<(), TransportError>;

    async fn pass(&self, item: WorkItem) -> Result<(), TransportError>;
}
