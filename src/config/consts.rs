// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

/// Environment variable holding the branch used when a repository script omits `branch`
pub const ENV_REPOSITORY_DEFAULT_BRANCH: &str = "REPOSITORY_DEFAULT_BRANCH";
/// Branch used when neither the config nor the environment names one
pub const DEFAULT_BRANCH: &str = "master";

/// MIME type attached to transformation results when `outputFormat` is absent
pub const DEFAULT_OUTPUT_FORMAT: &str = "application/ld+json";
/// Content descriptor value that marks a work item as a transformation candidate
pub const METADATA_CONTENT: &str = "metadata";

/// Number of concurrent workers handling work items
pub const DEFAULT_WORKERS: usize = 10;
/// Maximum number of cached engines
pub const DEFAULT_CACHE_CAPACITY: usize = 50;
/// Cached engines unused for this long expire (12 hours)
pub const DEFAULT_CACHE_IDLE: Duration = Duration::from_secs(12 * 60 * 60);

/// Root directory for `localFile` scripts
pub const DEFAULT_SCRIPTS_ROOT: &str = "scripts";
/// Root directory for repository working copies
pub const DEFAULT_REPOSITORIES_ROOT: &str = "repositories";

/// How often the default-branch environment variable is re-read
pub const DEFAULT_BRANCH_RELOAD_INTERVAL: Duration = Duration::from_secs(5);
/// Wall-clock bound on a single transformation invocation
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(60);
