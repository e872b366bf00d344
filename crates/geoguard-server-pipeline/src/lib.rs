// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request filter chains for GeoGuard server.
//!
//! This crate provides:
//! - [`PathMatcher`] - Ant-style path patterns
//! - [`compile`] - Turns declared [`RequestFilterChain`]s into a [`PipelineTable`]
//! - [`FilterChainProxy`] - Publishes the table and rebuilds it at runtime
//! - [`AuthenticationCache`] - Authentication results shared by stages
//!
//! # Usage
//!
//! ```ignore
//! use geoguard_server_pipeline::{FilterChainProxy, StageRegistry};
//!
//! let registry = Arc::new(StageRegistry::with_builtins());
//! let proxy = FilterChainProxy::new(registry);
//! proxy.rebuild(&config.filter_chains);
//!
//! if let Some(stages) = proxy.lookup(request.uri().path(), request.method()) {
//!     for stage in stages.iter() {
//!         tracing::trace!(stage = stage.name(), "running stage");
//!     }
//! }
//! ```

pub mod auth_cache;
pub mod error;
pub mod matcher;
pub mod proxy;
pub mod stage;
pub mod table;

pub use auth_cache::{
	AuthenticationCache, CachedAuthentication, InMemoryAuthenticationCache, DEFAULT_IDLE_TIMEOUT,
	DEFAULT_TIME_TO_LIVE,
};
pub use error::{PipelineError, Result};
pub use geoguard_server_config::RequestFilterChain;
pub use matcher::PathMatcher;
pub use proxy::{FilterChainProxy, MatchedPipeline};
pub use stage::{
	SessionContextStage, SslStage, Stage, StageRegistry, StageResolver, NO_SESSION_CONTEXT_STAGE,
	SESSION_CONTEXT_STAGE, SSL_STAGE,
};
pub use table::{compile, stage_names, CompiledChain, PipelineTable};
