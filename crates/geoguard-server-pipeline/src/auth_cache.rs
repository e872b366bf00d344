// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cache of authentication results produced by pipeline stages.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(600);

/// An authenticated principal as remembered by a stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedAuthentication {
	pub username: String,
	pub roles: Vec<String>,
}

impl CachedAuthentication {
	pub fn new(username: impl Into<String>, roles: Vec<String>) -> Self {
		Self {
			username: username.into(),
			roles,
		}
	}
}

/// Stores authentication results per (stage name, cache key).
pub trait AuthenticationCache: Send + Sync {
	fn get(&self, stage: &str, key: &str) -> Option<CachedAuthentication>;

	/// Caches `value`. `None` timeouts fall back to the cache defaults.
	fn put(
		&self,
		stage: &str,
		key: &str,
		value: CachedAuthentication,
		idle: Option<Duration>,
		live: Option<Duration>,
	);

	fn remove(&self, stage: &str, key: &str);

	fn remove_all_for_stage(&self, stage: &str);

	fn remove_all(&self);
}

#[derive(Debug)]
struct CacheEntry {
	value: CachedAuthentication,
	created: Instant,
	last_access: Instant,
	idle: Duration,
	live: Duration,
}

impl CacheEntry {
	fn is_expired(&self, now: Instant) -> bool {
		now.duration_since(self.created) >= self.live
			|| now.duration_since(self.last_access) >= self.idle
	}
}

#[derive(Debug)]
struct Entries {
	map: HashMap<(String, String), CacheEntry>,
	last_sweep: Instant,
}

impl Entries {
	fn sweep(&mut self, now: Instant) -> usize {
		let before = self.map.len();
		self.map.retain(|_, entry| !entry.is_expired(now));
		self.last_sweep = now;
		let evicted = before - self.map.len();
		if evicted > 0 {
			debug!(evicted, "evicted expired authentication cache entries");
		}
		evicted
	}
}

/// Process-local cache with idle and time-to-live expiry.
///
/// Expired entries are dropped when read, and swept from the whole cache by
/// `put` at most once per default idle timeout.
#[derive(Debug)]
pub struct InMemoryAuthenticationCache {
	entries: Mutex<Entries>,
	default_idle: Duration,
	default_live: Duration,
}

impl InMemoryAuthenticationCache {
	pub fn new(default_idle: Duration, default_live: Duration) -> Self {
		Self {
			entries: Mutex::new(Entries {
				map: HashMap::new(),
				last_sweep: Instant::now(),
			}),
			default_idle,
			default_live,
		}
	}

	pub fn len(&self) -> usize {
		self.entries.lock().map.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().map.is_empty()
	}

	/// Drops every expired entry, returning how many were removed.
	pub fn evict_expired(&self) -> usize {
		self.entries.lock().sweep(Instant::now())
	}
}

impl Default for InMemoryAuthenticationCache {
	fn default() -> Self {
		Self::new(DEFAULT_IDLE_TIMEOUT, DEFAULT_TIME_TO_LIVE)
	}
}

impl AuthenticationCache for InMemoryAuthenticationCache {
	fn get(&self, stage: &str, key: &str) -> Option<CachedAuthentication> {
		let now = Instant::now();
		let cache_key = (stage.to_string(), key.to_string());
		let mut entries = self.entries.lock();
		let entry = entries.map.get_mut(&cache_key)?;
		if !entry.is_expired(now) {
			entry.last_access = now;
			return Some(entry.value.clone());
		}
		entries.map.remove(&cache_key);
		None
	}

	fn put(
		&self,
		stage: &str,
		key: &str,
		value: CachedAuthentication,
		idle: Option<Duration>,
		live: Option<Duration>,
	) {
		let now = Instant::now();
		let entry = CacheEntry {
			value,
			created: now,
			last_access: now,
			idle: idle.unwrap_or(self.default_idle),
			live: live.unwrap_or(self.default_live),
		};
		let mut entries = self.entries.lock();
		if now.duration_since(entries.last_sweep) >= self.default_idle {
			entries.sweep(now);
		}
		entries
			.map
			.insert((stage.to_string(), key.to_string()), entry);
	}

	fn remove(&self, stage: &str, key: &str) {
		self.entries
			.lock()
			.map
			.remove(&(stage.to_string(), key.to_string()));
	}

	fn remove_all_for_stage(&self, stage: &str) {
		self.entries.lock().map.retain(|(s, _), _| s != stage);
	}

	fn remove_all(&self) {
		let mut entries = self.entries.lock();
		let removed = entries.map.len();
		entries.map.clear();
		debug!(removed, "authentication cache cleared");
	}
}
