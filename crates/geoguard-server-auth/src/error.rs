// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("invalid whitelist entry '{entry}': expected an IP address or CIDR network")]
	InvalidWhitelistEntry { entry: String },
}

/// Why a login attempt was refused before reaching the authentication providers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleRejection {
	/// Another failed login for the same username is still being delayed.
	#[error("concurrent authentication attempt for user '{username}' ({count} so far)")]
	ConcurrentAuthentication { username: String, count: u32 },

	/// Too many failed logins are being delayed at once.
	#[error("too many failed logins are being delayed (max {max})")]
	MaxBlockedThreads { max: u32 },
}
