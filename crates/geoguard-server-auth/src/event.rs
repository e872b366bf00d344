// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication events as seen by the brute-force guard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventKind {
	Success,
	/// Wrong username or password.
	BadCredentials,
	/// No provider could handle the supplied credentials.
	ProviderNotFound,
	AccountLocked,
	AccountDisabled,
	CredentialsExpired,
	/// The authentication backend itself failed.
	ServiceError,
}

impl AuthEventKind {
	/// Failures caused by guessable credentials. Only these are delayed.
	pub fn is_credential_failure(&self) -> bool {
		matches!(
			self,
			AuthEventKind::BadCredentials | AuthEventKind::ProviderNotFound
		)
	}

	pub fn is_failure(&self) -> bool {
		!matches!(self, AuthEventKind::Success)
	}
}

impl fmt::Display for AuthEventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			AuthEventKind::Success => "success",
			AuthEventKind::BadCredentials => "bad_credentials",
			AuthEventKind::ProviderNotFound => "provider_not_found",
			AuthEventKind::AccountLocked => "account_locked",
			AuthEventKind::AccountDisabled => "account_disabled",
			AuthEventKind::CredentialsExpired => "credentials_expired",
			AuthEventKind::ServiceError => "service_error",
		};
		write!(f, "{name}")
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEvent {
	pub kind: AuthEventKind,
	pub username: Option<String>,
	pub source_address: Option<IpAddr>,
}

impl AuthEvent {
	pub fn new(kind: AuthEventKind) -> Self {
		Self {
			kind,
			username: None,
			source_address: None,
		}
	}

	/// A bad-credentials failure for `username`.
	pub fn failure(username: impl Into<String>) -> Self {
		Self::new(AuthEventKind::BadCredentials).with_username(username)
	}

	pub fn success(username: impl Into<String>) -> Self {
		Self::new(AuthEventKind::Success).with_username(username)
	}

	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());
		self
	}

	pub fn with_source_address(mut self, addr: IpAddr) -> Self {
		self.source_address = Some(addr);
		self
	}

	/// The username, unless absent or blank.
	pub fn principal(&self) -> Option<&str> {
		self.username
			.as_deref()
			.map(str::trim)
			.filter(|u| !u.is_empty())
	}
}
