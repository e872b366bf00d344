// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Security configuration for GeoGuard server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Validation of brute-force settings and request filter chains
//! - Tracing subscriber initialisation from the logging section
//!
//! # Usage
//!
//! ```ignore
//! use geoguard_server_config::{load_config, logging::init_tracing};
//!
//! let config = load_config()?;
//! init_tracing(&config.logging);
//! ```

pub mod error;
pub mod layer;
pub mod logging;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::SecurityConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::collections::HashSet;
use tracing::{debug, info};

/// Fully resolved security configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityConfig {
	pub brute_force: BruteForceConfig,
	pub logging: LoggingConfig,
	pub filter_chains: Vec<RequestFilterChain>,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`GEOGUARD_*`)
/// 2. Config file (`/etc/geoguard/security.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<SecurityConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<SecurityConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Merge the given sources in precedence order and finalize the result.
pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<SecurityConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = SecurityConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: SecurityConfigLayer) -> Result<SecurityConfig, ConfigError> {
	let brute_force = layer.brute_force.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let filter_chains = layer.filter_chains.unwrap_or_default();

	validate_brute_force(&brute_force)?;
	validate_filter_chains(&filter_chains)?;

	info!(
		brute_force_enabled = brute_force.enabled,
		min_delay_ms = brute_force.min_delay_ms,
		max_delay_ms = brute_force.max_delay_ms,
		max_blocked_threads = brute_force.max_blocked_threads,
		whitelist_entries = brute_force.whitelist.len(),
		filter_chains = filter_chains.len(),
		"Security configuration loaded"
	);

	Ok(SecurityConfig {
		brute_force,
		logging,
		filter_chains,
	})
}

fn validate_brute_force(config: &BruteForceConfig) -> Result<(), ConfigError> {
	if config.min_delay_ms > config.max_delay_ms {
		return Err(ConfigError::Validation(format!(
			"brute_force.min_delay_ms ({}) is greater than brute_force.max_delay_ms ({})",
			config.min_delay_ms, config.max_delay_ms
		)));
	}
	Ok(())
}

fn validate_filter_chains(chains: &[RequestFilterChain]) -> Result<(), ConfigError> {
	let mut seen = HashSet::new();
	for chain in chains {
		if chain.name.trim().is_empty() {
			return Err(ConfigError::Validation(
				"filter chain with empty name".to_string(),
			));
		}
		if !seen.insert(chain.name.as_str()) {
			return Err(ConfigError::Validation(format!(
				"duplicate filter chain name '{}'",
				chain.name
			)));
		}
		if !chain.disabled && chain.patterns.iter().all(|p| p.trim().is_empty()) {
			return Err(ConfigError::Validation(format!(
				"filter chain '{}' has no patterns",
				chain.name
			)));
		}
	}
	Ok(())
}
