// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
pub mod default_branch;
pub mod loader;
pub mod rhai;
pub mod runtime;
pub mod transformation;

pub use default_branch::DefaultBranch;
pub use loader::{load_and_validate_config, load_config, CacheConfig, StageConfig};
pub use rhai::RhaiConfig;
pub use runtime::{RuntimeBuilder, StageRuntime};
pub use transformation::{RepositorySource, ScriptSource, ScriptType, TransformationConfig};
