// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Security configuration reloads for GeoGuard server.
//!
//! A [`SecurityRuntime`] owns the brute-force guard, the request pipeline and
//! the catalog filter registry. Every new [`SecurityConfig`] is applied to all
//! three at once.
//!
//! # Usage
//!
//! ```ignore
//! use geoguard_server_security::SecurityRuntime;
//!
//! let runtime = Arc::new(SecurityRuntime::from_config(&config, registry, filters)?);
//! let (updates, rx) = tokio::sync::watch::channel(config);
//! runtime.clone().spawn_reload_listener(rx);
//! ```

pub mod error;
mod runtime;

pub use error::{ReloadError, Result};
pub use geoguard_server_config::SecurityConfig;
pub use runtime::SecurityRuntime;
