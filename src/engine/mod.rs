// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Script engines and the run-scoped engine cache.
//!
//! A [`ScriptEngine`] holds one compiled and evaluated user script and exposes a
//! single string-in, string-out entry point. Engines built for `single`
//! configurations are kept in an [`EngineCache`] keyed by run identifier.

pub mod cache;
pub mod script_engine;

pub use cache::{CacheLookup, EngineCache};
pub use script_engine::{ScriptEngine, ENTRY_FUNCTION};
