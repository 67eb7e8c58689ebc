// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod repository;
mod transform;
mod transport;

pub use config::ConfigError;
pub use repository::RepositoryError;
pub use transform::TransformError;
pub use transport::TransportError;
