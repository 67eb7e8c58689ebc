// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Local working copies of remote script repositories.
//!
//! A working copy is identified by (sanitized URI, branch) and lives at
//! `<repositories_root>/<sanitized uri>/<branch>`. The [`RepositoryResolver`] clones it
//! on first use and pulls it on every later use, reporting what happened as a
//! [`SyncOutcome`] instead of failing.

pub mod git;
pub mod resolver;
pub mod working_copy;

pub use git::GitCli;
pub use resolver::RepositoryResolver;
pub use working_copy::{sanitize_uri, working_copy_path, Credentials, SyncOutcome, WorkingCopy};
