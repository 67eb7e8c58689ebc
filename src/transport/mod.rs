// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Newline-delimited JSON transport used by the stage binary.

pub mod ndjson;

pub use ndjson::{NdjsonSink, NdjsonSource};
