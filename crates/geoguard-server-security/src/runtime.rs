// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use geoguard_access_core::CatalogFilterRegistry;
use geoguard_server_auth::BruteForceGuard;
use geoguard_server_config::SecurityConfig;
use geoguard_server_pipeline::{FilterChainProxy, StageResolver};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::error::Result;

/// The reloadable access-control components of one server.
#[derive(Debug)]
pub struct SecurityRuntime {
	guard: Arc<BruteForceGuard>,
	pipeline: Arc<FilterChainProxy>,
	catalog_filters: Arc<CatalogFilterRegistry>,
}

impl SecurityRuntime {
	pub fn new(
		guard: Arc<BruteForceGuard>,
		pipeline: Arc<FilterChainProxy>,
		catalog_filters: Arc<CatalogFilterRegistry>,
	) -> Self {
		Self {
			guard,
			pipeline,
			catalog_filters,
		}
	}

	/// Builds the guard and pipeline from `config` and publishes the first table.
	pub fn from_config(
		config: &SecurityConfig,
		resolver: Arc<dyn StageResolver>,
		catalog_filters: Arc<CatalogFilterRegistry>,
	) -> Result<Self> {
		let guard = Arc::new(BruteForceGuard::from_config(&config.brute_force)?);
		let pipeline = Arc::new(FilterChainProxy::new(resolver));
		pipeline.rebuild(&config.filter_chains);
		Ok(Self::new(guard, pipeline, catalog_filters))
	}

	pub fn guard(&self) -> &Arc<BruteForceGuard> {
		&self.guard
	}

	pub fn pipeline(&self) -> &Arc<FilterChainProxy> {
		&self.pipeline
	}

	pub fn catalog_filters(&self) -> &Arc<CatalogFilterRegistry> {
		&self.catalog_filters
	}

	/// Applies a new configuration.
	///
	/// The guard is reconfigured first. If it rejects the settings the error is
	/// returned and nothing else changes. Otherwise the guard's tracker and
	/// the catalog filter list are reset and the pipeline table is rebuilt.
	#[instrument(level = "debug", skip_all, fields(chains = config.filter_chains.len()))]
	pub fn reload(&self, config: &SecurityConfig) -> Result<()> {
		self.guard.reconfigure(&config.brute_force)?;
		self.guard.reset();
		self.catalog_filters.reset();
		let table = self.pipeline.rebuild(&config.filter_chains);
		info!(chains = table.len(), "security configuration reloaded");
		Ok(())
	}

	/// Reloads on every configuration published to `updates` until the sender
	/// is dropped. Rejected configurations are logged and skipped.
	pub fn spawn_reload_listener(
		self: Arc<Self>,
		mut updates: watch::Receiver<SecurityConfig>,
	) -> JoinHandle<()> {
		tokio::spawn(async move {
			while updates.changed().await.is_ok() {
				let config = updates.borrow_and_update().clone();
				if let Err(e) = self.reload(&config) {
					error!(error = %e, "security reload failed, keeping previous settings");
				}
			}
			debug!("security configuration channel closed, reload listener stopped");
		})
	}

	/// Releases delayed logins and stops throttling.
	pub fn shutdown(&self) {
		self.guard.shutdown();
	}
}
