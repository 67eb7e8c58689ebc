// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Work item dispatch: classification, transformation and forwarding.

pub mod dispatcher;
pub mod payload;
pub mod pool;
pub mod work_item;


pub use dispatcher::{DispatchStats, Dispatcher, StatsSnapshot};
pub use pool::WorkerPool;
pub use work_item::{TransformedItem, WorkItem};
