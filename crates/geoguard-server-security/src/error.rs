// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use geoguard_server_auth::AuthError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReloadError>;

#[derive(Error, Debug)]
pub enum ReloadError {
	/// The new brute-force settings were rejected. Nothing was reloaded.
	#[error("brute force settings rejected: {0}")]
	BruteForce(#[from] AuthError),
}
