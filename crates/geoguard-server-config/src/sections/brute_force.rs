// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Brute-force protection configuration section.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;
pub const DEFAULT_MAX_BLOCKED_THREADS: u32 = 100;

/// Addresses that are never delayed unless configured otherwise.
pub fn default_whitelist() -> Vec<String> {
	vec!["127.0.0.1".to_string(), "::1".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BruteForceConfigLayer {
	pub enabled: Option<bool>,
	pub min_delay_ms: Option<u64>,
	pub max_delay_ms: Option<u64>,
	pub max_blocked_threads: Option<u32>,
	pub whitelist: Option<Vec<String>>,
}

impl BruteForceConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.enabled.is_some() {
			self.enabled = other.enabled;
		}
		if other.min_delay_ms.is_some() {
			self.min_delay_ms = other.min_delay_ms;
		}
		if other.max_delay_ms.is_some() {
			self.max_delay_ms = other.max_delay_ms;
		}
		if other.max_blocked_threads.is_some() {
			self.max_blocked_threads = other.max_blocked_threads;
		}
		if other.whitelist.is_some() {
			self.whitelist = other.whitelist;
		}
	}

	pub fn finalize(self) -> BruteForceConfig {
		BruteForceConfig {
			enabled: self.enabled.unwrap_or(true),
			min_delay_ms: self.min_delay_ms.unwrap_or(DEFAULT_MIN_DELAY_MS),
			max_delay_ms: self.max_delay_ms.unwrap_or(DEFAULT_MAX_DELAY_MS),
			max_blocked_threads: self.max_blocked_threads.unwrap_or(DEFAULT_MAX_BLOCKED_THREADS),
			whitelist: self.whitelist.unwrap_or_else(default_whitelist),
		}
	}
}

/// Settings of the failed-login delay.
///
/// `max_blocked_threads = 0` disables the cap on concurrently delayed logins.
/// Whitelist entries are IP addresses or CIDR networks; they are parsed by
/// the consumer so a bad entry is reported where it is used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BruteForceConfig {
	pub enabled: bool,
	pub min_delay_ms: u64,
	pub max_delay_ms: u64,
	pub max_blocked_threads: u32,
	pub whitelist: Vec<String>,
}

impl Default for BruteForceConfig {
	fn default() -> Self {
		BruteForceConfigLayer::default().finalize()
	}
}
