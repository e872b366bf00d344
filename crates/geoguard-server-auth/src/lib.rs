// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication hardening for GeoGuard server.
//!
//! This crate provides:
//! - [`AuthEvent`] - The outcome of one login attempt
//! - [`AddressWhitelist`] - Source addresses exempt from throttling
//! - [`BruteForceGuard`] - Per-username delays for failed logins
//!
//! # Usage
//!
//! ```ignore
//! use geoguard_server_auth::{AuthEvent, BruteForceGuard};
//!
//! let guard = BruteForceGuard::from_config(&config.brute_force)?;
//! match guard.throttle(&AuthEvent::failure("alice")).await {
//!     Ok(outcome) => tracing::debug!(?outcome, "login attempt throttled"),
//!     Err(rejection) => return Err(rejection.into()),
//! }
//! ```

pub mod address;
pub mod brute_force;
pub mod error;
pub mod event;

pub use address::AddressWhitelist;
pub use brute_force::{BruteForceGuard, Bypass, ThrottleOutcome};
pub use error::{AuthError, Result, ThrottleRejection};
pub use event::{AuthEvent, AuthEventKind};
