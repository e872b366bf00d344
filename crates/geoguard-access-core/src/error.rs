// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

use crate::limits::LimitsKind;

pub type AccessResult<T> = Result<T, AccessError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
	/// Two limits of different kinds were combined. This is a caller bug.
	#[error("cannot intersect {left} limits with {right} limits")]
	MismatchedLimits { left: LimitsKind, right: LimitsKind },
}
