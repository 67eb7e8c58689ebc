// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

/// Resource limits applied to every script engine.
///
/// Limits are enforced by the Rhai runtime itself, so a script that loops forever
/// or builds an unbounded structure fails its invocation instead of hanging a worker.
///
/// # Example
/// ```yaml
/// rhai:
///   max_operations: 500000
///   max_call_levels: 16
/// ```
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RhaiConfig {
    /// Maximum number of operations a single evaluation may perform
    #[serde(default = "default_max_operations")]
    pub max_operations: u64,

    /// Maximum function call nesting depth
    #[serde(default = "default_max_call_levels")]
    pub max_call_levels: usize,

    /// Maximum expression nesting depth (applies to both global and function bodies)
    #[serde(default = "default_max_expr_depth")]
    pub max_expr_depth: usize,

    /// Maximum length of a string, in bytes
    #[serde(default = "default_max_string_size")]
    pub max_string_size: usize,

    /// Maximum number of array elements
    #[serde(default = "default_max_array_size")]
    pub max_array_size: usize,

    /// Maximum number of object map properties
    #[serde(default = "default_max_map_size")]
    pub max_map_size: usize,
}

impl Default for RhaiConfig {
    fn default() -> Self {
        Self {
            max_operations: default_max_operations(),
            max_call_levels: default_max_call_levels(),
            max_expr_depth: default_max_expr_depth(),
            max_string_size: default_max_string_size(),
            max_array_size: default_max_array_size(),
            max_map_size: default_max_map_size(),
        }
    }
}

fn default_max_operations() -> u64 {
    10_000_000
}

fn default_max_call_levels() -> usize {
    64
}

fn default_max_expr_depth() -> usize {
    128
}

// Payloads are whole documents, so strings get the same 10MB ceiling as inputs.
fn default_max_string_size() -> usize {
    10 * 1024 * 1024
}

fn default_max_array_size() -> usize {
    1_000_000
}

fn default_max_map_size() -> usize {
    100_000
}
