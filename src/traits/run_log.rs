// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tracing::Level;

/// Log sink scoped to one pipeline run, read by whoever monitors that run.
pub trait RunLog: Send + Sync {
    fn record(&self, run_id: &str, level: Level, message: &str);
}
