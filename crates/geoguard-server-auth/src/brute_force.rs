// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Brute-force protection for login attempts.
//!
//! Every credential failure is held back for a random delay before the
//! response is sent. While a username is being delayed, further attempts for
//! the same username are rejected outright, so an attacker cannot run guesses
//! in parallel. The number of usernames delayed at once is capped to keep
//! request workers available.
//!
//! Whitelisted source addresses, successful logins and failures that are not
//! about credentials pass through untouched.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use geoguard_server_config::BruteForceConfig;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::address::AddressWhitelist;
use crate::error::{Result, ThrottleRejection};
use crate::event::AuthEvent;

/// Why an attempt was let through without a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
	Disabled,
	Whitelisted,
	NoUsername,
	NotAFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleOutcome {
	Passed(Bypass),
	/// The attempt was held back for `delay`.
	Delayed { delay: Duration },
}

#[derive(Debug, Clone)]
struct GuardSettings {
	enabled: bool,
	min_delay_ms: u64,
	max_delay_ms: u64,
	max_blocked_threads: u32,
	whitelist: AddressWhitelist,
}

impl GuardSettings {
	fn from_config(config: &BruteForceConfig) -> Result<Self> {
		Ok(Self {
			enabled: config.enabled,
			min_delay_ms: config.min_delay_ms.min(config.max_delay_ms),
			max_delay_ms: config.min_delay_ms.max(config.max_delay_ms),
			max_blocked_threads: config.max_blocked_threads,
			whitelist: AddressWhitelist::parse(&config.whitelist)?,
		})
	}

	fn random_delay(&self) -> Duration {
		Duration::from_millis(fastrand::u64(self.min_delay_ms..=self.max_delay_ms))
	}
}

/// One delayed attempt. `id` tells it apart from later attempts for the
/// same username once the tracker has been cleared.
#[derive(Debug)]
struct TrackerEntry {
	id: u64,
	attempts: AtomicU32,
}

type Tracker = DashMap<String, TrackerEntry>;

/// Removes the username from the tracker however the delay ends, unless the
/// entry now belongs to a newer attempt.
struct TrackedAttempt {
	tracker: Arc<Tracker>,
	username: String,
	id: u64,
}

impl Drop for TrackedAttempt {
	fn drop(&mut self) {
		let removed = self
			.tracker
			.remove_if(&self.username, |_, entry| entry.id == self.id);
		if let Some((_, entry)) = removed {
			let rejected = entry.attempts.into_inner().saturating_sub(1);
			if rejected > 0 {
				debug!(username = %self.username, rejected, "released delayed login");
			}
		}
	}
}

/// Delays failed logins and rejects concurrent attempts per username.
pub struct BruteForceGuard {
	settings: RwLock<Arc<GuardSettings>>,
	tracker: Arc<Tracker>,
	next_id: AtomicU64,
	shutdown: watch::Sender<bool>,
}

impl BruteForceGuard {
	pub fn from_config(config: &BruteForceConfig) -> Result<Self> {
		let settings = GuardSettings::from_config(config)?;
		let (shutdown, _) = watch::channel(false);
		Ok(Self {
			settings: RwLock::new(Arc::new(settings)),
			tracker: Arc::new(DashMap::new()),
			next_id: AtomicU64::new(0),
			shutdown,
		})
	}

	/// Decides what happens to one authentication attempt.
	///
	/// Credential failures sleep on the calling task. Dropping the returned
	/// future ends the delay early and forgets the attempt.
	#[instrument(level = "debug", skip_all, fields(kind = %event.kind))]
	pub async fn throttle(
		&self,
		event: &AuthEvent,
	) -> std::result::Result<ThrottleOutcome, ThrottleRejection> {
		let settings = Arc::clone(&*self.settings.read());
		let mut shutdown = self.shutdown.subscribe();

		if !settings.enabled || *shutdown.borrow_and_update() {
			return Ok(ThrottleOutcome::Passed(Bypass::Disabled));
		}

		if let Some(addr) = event.source_address {
			if settings.whitelist.contains(addr) {
				debug!(source = %addr, "source address is whitelisted");
				return Ok(ThrottleOutcome::Passed(Bypass::Whitelisted));
			}
		}

		let Some(username) = event.principal() else {
			debug!("authentication event without username");
			return Ok(ThrottleOutcome::Passed(Bypass::NoUsername));
		};

		if let Some(entry) = self.tracker.get(username) {
			let count = entry.attempts.fetch_add(1, Ordering::SeqCst);
			return Err(self.reject_concurrent(username, count));
		}

		if !event.kind.is_credential_failure() {
			return Ok(ThrottleOutcome::Passed(Bypass::NotAFailure));
		}

		let max = settings.max_blocked_threads;
		if max > 0 && self.tracker.len() >= max as usize {
			warn!(
				username = %username,
				max,
				"too many failed logins are being delayed, rejecting attempt"
			);
			return Err(ThrottleRejection::MaxBlockedThreads { max });
		}

		let _attempt = match self.tracker.entry(username.to_string()) {
			Entry::Occupied(entry) => {
				let count = entry.get().attempts.fetch_add(1, Ordering::SeqCst);
				drop(entry);
				return Err(self.reject_concurrent(username, count));
			}
			Entry::Vacant(entry) => {
				let id = self.next_id.fetch_add(1, Ordering::Relaxed);
				entry.insert(TrackerEntry {
					id,
					attempts: AtomicU32::new(1),
				});
				TrackedAttempt {
					tracker: Arc::clone(&self.tracker),
					username: username.to_string(),
					id,
				}
			}
		};

		let delay = settings.random_delay();
		info!(
			username = %username,
			delay_ms = delay.as_millis() as u64,
			"delaying failed login"
		);

		let started = Instant::now();
		tokio::select! {
			_ = tokio::time::sleep(delay) => {}
			_ = shutdown.changed() => {
				debug!(username = %username, "guard shut down, releasing delayed login");
			}
		}

		Ok(ThrottleOutcome::Delayed {
			delay: started.elapsed(),
		})
	}

	fn reject_concurrent(&self, username: &str, count: u32) -> ThrottleRejection {
		warn!(
			username = %username,
			count,
			"concurrent login attempt while a failed login is being delayed"
		);
		ThrottleRejection::ConcurrentAuthentication {
			username: username.to_string(),
			count,
		}
	}

	/// Forgets every tracked username. Delays in progress keep running.
	pub fn reset(&self) {
		self.tracker.clear();
	}

	/// Releases all delayed logins and lets every later attempt through.
	pub fn shutdown(&self) {
		self.shutdown.send_replace(true);
		self.tracker.clear();
		info!("brute force guard shut down");
	}

	/// Applies new settings. On error the previous settings stay in place.
	pub fn reconfigure(&self, config: &BruteForceConfig) -> Result<()> {
		let settings = GuardSettings::from_config(config)?;
		info!(
			enabled = settings.enabled,
			min_delay_ms = settings.min_delay_ms,
			max_delay_ms = settings.max_delay_ms,
			max_blocked_threads = settings.max_blocked_threads,
			whitelist_entries = settings.whitelist.len(),
			"brute force guard reconfigured"
		);
		*self.settings.write() = Arc::new(settings);
		Ok(())
	}

	pub fn is_tracked(&self, username: &str) -> bool {
		self.tracker.contains_key(username)
	}

	pub fn tracked_count(&self) -> usize {
		self.tracker.len()
	}
}

impl std::fmt::Debug for BruteForceGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BruteForceGuard")
			.field("settings", &*self.settings.read())
			.field("tracked", &self.tracker.len())
			.field("shut_down", &*self.shutdown.borrow())
			.finish()
	}
}
