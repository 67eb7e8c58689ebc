// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod script_loader;

pub use script_loader::ScriptLoader;
