// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 iOS Tunnel Manager Contributors

// iOS Tunnel Manager - Common Library
// Shared types, errors, and configuration structures

pub mod config;
pub mod error;
pub mod types;

pub use config::TunnelConfig;
pub use error::{Error, Result};
pub use types::{ProcessRecord, TunnelEndpoint};
