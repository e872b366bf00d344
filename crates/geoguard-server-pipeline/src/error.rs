// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
	#[error("invalid path pattern '{pattern}': {reason}")]
	InvalidPattern { pattern: String, reason: String },

	#[error("invalid HTTP method '{method}'")]
	InvalidMethod { method: String },
}
