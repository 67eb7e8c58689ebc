// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;        // stage + per-item configuration
pub mod dispatch;      // classification, transformation, worker pool
pub mod engine;        // script engines and the engine cache
pub mod errors;        // error handling
pub mod loader;        // script sources
pub mod observability;
pub mod repository;    // script repository working copies
pub mod traits;        // collaborator seams
pub mod transport;     // NDJSON stdin/stdout

#[cfg(test)]
pub mod stub;
