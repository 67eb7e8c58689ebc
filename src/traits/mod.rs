// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod downstream;
pub mod run_log;
pub mod vcs;

pub use downstream::Downstream;
pub use run_log::RunLog;
pub use vcs::{PullStatus, VersionControl};
