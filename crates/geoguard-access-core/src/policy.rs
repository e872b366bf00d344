// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The resolved policy enforced for one request.
//!
//! A [`WrapperPolicy`] couples an [`AccessLevel`] with the [`Response`] to give
//! when the caller oversteps it, plus the [`AccessLimits`] the level was derived
//! from. Policies are totally ordered by restrictiveness so that, when several
//! could apply (a direct layer rule and one inherited through a layer group),
//! the most restrictive one binds.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::limits::AccessLimits;
use crate::mode::CatalogMode;

/// How much of a resource the caller may use. Ordered from least to most access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
	Hidden,
	Metadata,
	ReadOnly,
	ReadWrite,
}

impl fmt::Display for AccessLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AccessLevel::Hidden => write!(f, "HIDDEN"),
			AccessLevel::Metadata => write!(f, "METADATA"),
			AccessLevel::ReadOnly => write!(f, "READ_ONLY"),
			AccessLevel::ReadWrite => write!(f, "READ_WRITE"),
		}
	}
}

/// What the caller experiences when going beyond the access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Response {
	/// Behave as if the resource did not exist.
	Hide,
	/// Ask for (better) credentials.
	Challenge,
}

/// What to do with an unreadable resource whose limits are in MIXED mode.
///
/// MIXED hides resources from listings and challenges direct access; only the
/// caller knows which of the two the current request is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedModeBehavior {
	/// The request lists the catalog (e.g. a capabilities document).
	Hide,
	/// The request addresses the resource directly.
	Challenge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrapperPolicy {
	pub level: AccessLevel,
	pub response: Response,
	pub limits: Option<AccessLimits>,
}

impl WrapperPolicy {
	fn new(level: AccessLevel, response: Response, limits: Option<AccessLimits>) -> Self {
		Self {
			level,
			response,
			limits,
		}
	}

	pub fn hide(limits: Option<AccessLimits>) -> Self {
		Self::new(AccessLevel::Hidden, Response::Hide, limits)
	}

	pub fn metadata(limits: Option<AccessLimits>) -> Self {
		Self::new(AccessLevel::Metadata, Response::Challenge, limits)
	}

	pub fn read_only_challenge(limits: Option<AccessLimits>) -> Self {
		Self::new(AccessLevel::ReadOnly, Response::Challenge, limits)
	}

	pub fn read_only_hide(limits: Option<AccessLimits>) -> Self {
		Self::new(AccessLevel::ReadOnly, Response::Hide, limits)
	}

	/// Full access. The response is HIDE when the limits are absent or in HIDE
	/// mode, CHALLENGE otherwise.
	pub fn read_write(limits: Option<AccessLimits>) -> Self {
		let response = match limits.as_ref().map(AccessLimits::mode) {
			None | Some(CatalogMode::Hide) => Response::Hide,
			Some(_) => Response::Challenge,
		};
		Self::new(AccessLevel::ReadWrite, response, limits)
	}

	/// Builds the policy that enforces `limits`.
	///
	/// Unreadable resources are hidden in HIDE mode, reduced to metadata in
	/// CHALLENGE mode and resolved through `mixed` in MIXED mode. Readable but
	/// not writable resources are read-only.
	pub fn from_limits(limits: Option<AccessLimits>, mixed: MixedModeBehavior) -> Self {
		let (mode, readable, writable) = match &limits {
			Some(current) => (current.mode(), current.can_read(), current.can_write()),
			None => return Self::read_write(None),
		};

		if !readable {
			return match (mode, mixed) {
				(CatalogMode::Hide, _) | (CatalogMode::Mixed, MixedModeBehavior::Hide) => {
					Self::hide(limits)
				}
				(CatalogMode::Challenge, _)
				| (CatalogMode::Mixed, MixedModeBehavior::Challenge) => Self::metadata(limits),
			};
		}

		if !writable {
			return match mode {
				CatalogMode::Hide => Self::read_only_hide(limits),
				CatalogMode::Mixed | CatalogMode::Challenge => Self::read_only_challenge(limits),
			};
		}

		Self::read_write(limits)
	}

	/// Same level and response, different limits.
	pub fn derive(&self, limits: Option<AccessLimits>) -> Self {
		Self::new(self.level, self.response, limits)
	}

	pub fn is_hidden(&self) -> bool {
		self.level == AccessLevel::Hidden
	}

	pub fn can_read(&self) -> bool {
		self.level >= AccessLevel::ReadOnly
	}

	pub fn can_write(&self) -> bool {
		self.level == AccessLevel::ReadWrite
	}

	/// The catalog mode of the limits, if any.
	pub fn mode(&self) -> Option<CatalogMode> {
		self.limits.as_ref().map(AccessLimits::mode)
	}

	/// Restrictiveness order: the more restrictive policy sorts first.
	///
	/// Compares access levels, then catalog modes (HIDE, MIXED, CHALLENGE),
	/// with absent limits sorting after every mode.
	pub fn cmp_restrictiveness(&self, other: &Self) -> Ordering {
		self
			.level
			.cmp(&other.level)
			.then_with(|| mode_rank(self.mode()).cmp(&mode_rank(other.mode())))
	}

	/// Picks the most restrictive of the given policies.
	pub fn most_restrictive<I>(policies: I) -> Option<Self>
	where
		I: IntoIterator<Item = Self>,
	{
		policies
			.into_iter()
			.min_by(|a, b| a.cmp_restrictiveness(b))
	}
}

fn mode_rank(mode: Option<CatalogMode>) -> u8 {
	match mode {
		Some(CatalogMode::Hide) => 0,
		Some(CatalogMode::Mixed) => 1,
		Some(CatalogMode::Challenge) => 2,
		None => 3,
	}
}

impl fmt::Display for WrapperPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.mode() {
			Some(mode) => write!(f, "{}/{:?}/{}", self.level, self.response, mode),
			None => write!(f, "{}/{:?}", self.level, self.response),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::limits::{
		DataAccessLimits, StyleAccessLimits, VectorAccessLimits, WorkspaceAccessLimits,
	};
	use crate::predicate::Predicate;

	fn data(mode: CatalogMode, filter: Predicate) -> Option<AccessLimits> {
		Some(DataAccessLimits::new(mode, filter).into())
	}

	mod factories {
		use super::*;

		#[test]
		fn fixed_pairings() {
			assert_eq!(WrapperPolicy::hide(None).response, Response::Hide);
			assert_eq!(WrapperPolicy::metadata(None).response, Response::Challenge);
			assert_eq!(
				WrapperPolicy::read_only_challenge(None).level,
				AccessLevel::ReadOnly
			);
			assert_eq!(WrapperPolicy::read_only_hide(None).response, Response::Hide);
		}

		#[test]
		fn read_write_response_follows_limits() {
			assert_eq!(WrapperPolicy::read_write(None).response, Response::Hide);
			assert_eq!(
				WrapperPolicy::read_write(data(CatalogMode::Hide, Predicate::Always)).response,
				Response::Hide
			);
			assert_eq!(
				WrapperPolicy::read_write(data(CatalogMode::Challenge, Predicate::Always)).response,
				Response::Challenge
			);
			assert_eq!(
				WrapperPolicy::read_write(data(CatalogMode::Mixed, Predicate::Always)).response,
				Response::Challenge
			);
		}

		#[test]
		fn derive_replaces_only_limits() {
			let policy =
				WrapperPolicy::read_only_challenge(data(CatalogMode::Challenge, Predicate::Always));
			let derived = policy.derive(data(CatalogMode::Hide, Predicate::expr("a = 1")));
			assert_eq!(derived.level, policy.level);
			assert_eq!(derived.response, policy.response);
			assert_eq!(derived.mode(), Some(CatalogMode::Hide));
			assert_eq!(policy.mode(), Some(CatalogMode::Challenge));
		}
	}

	mod ordering {
		use super::*;

		#[test]
		fn levels_order_from_hidden_to_read_write() {
			let hidden = WrapperPolicy::hide(None);
			let metadata = WrapperPolicy::metadata(None);
			let read_only = WrapperPolicy::read_only_hide(None);
			let read_write = WrapperPolicy::read_write(None);

			assert_eq!(hidden.cmp_restrictiveness(&metadata), Ordering::Less);
			assert_eq!(metadata.cmp_restrictiveness(&read_only), Ordering::Less);
			assert_eq!(read_only.cmp_restrictiveness(&read_write), Ordering::Less);
		}

		#[test]
		fn hide_mode_sorts_before_challenge_within_a_level() {
			let hide = WrapperPolicy::read_only_hide(data(CatalogMode::Hide, Predicate::Always));
			let mixed = WrapperPolicy::read_only_hide(data(CatalogMode::Mixed, Predicate::Always));
			let challenge =
				WrapperPolicy::read_only_challenge(data(CatalogMode::Challenge, Predicate::Always));

			assert_eq!(hide.cmp_restrictiveness(&challenge), Ordering::Less);
			assert_eq!(hide.cmp_restrictiveness(&mixed), Ordering::Less);
			assert_eq!(mixed.cmp_restrictiveness(&challenge), Ordering::Less);
		}

		#[test]
		fn absent_limits_are_least_restrictive_within_a_level() {
			let none = WrapperPolicy::read_only_challenge(None);
			let challenge =
				WrapperPolicy::read_only_challenge(data(CatalogMode::Challenge, Predicate::Always));
			assert_eq!(challenge.cmp_restrictiveness(&none), Ordering::Less);
			assert_eq!(none.cmp_restrictiveness(&none.clone()), Ordering::Equal);
		}

		#[test]
		fn most_restrictive_picks_the_minimum() {
			let picked = WrapperPolicy::most_restrictive(vec![
				WrapperPolicy::read_write(None),
				WrapperPolicy::read_only_challenge(data(CatalogMode::Challenge, Predicate::Always)),
				WrapperPolicy::read_only_hide(data(CatalogMode::Hide, Predicate::Always)),
			])
			.unwrap();
			assert_eq!(picked.level, AccessLevel::ReadOnly);
			assert_eq!(picked.mode(), Some(CatalogMode::Hide));
		}

		#[test]
		fn most_restrictive_of_nothing_is_none() {
			assert!(WrapperPolicy::most_restrictive(Vec::new()).is_none());
		}
	}

	mod from_limits {
		use super::*;

		#[test]
		fn absent_limits_grant_read_write() {
			let policy = WrapperPolicy::from_limits(None, MixedModeBehavior::Challenge);
			assert!(policy.can_write());
			assert_eq!(policy.response, Response::Hide);
		}

		#[test]
		fn unreadable_hide_mode_is_hidden() {
			let policy = WrapperPolicy::from_limits(
				data(CatalogMode::Hide, Predicate::Never),
				MixedModeBehavior::Challenge,
			);
			assert!(policy.is_hidden());
		}

		#[test]
		fn unreadable_challenge_mode_exposes_metadata() {
			let policy = WrapperPolicy::from_limits(
				data(CatalogMode::Challenge, Predicate::Never),
				MixedModeBehavior::Hide,
			);
			assert_eq!(policy.level, AccessLevel::Metadata);
			assert_eq!(policy.response, Response::Challenge);
		}

		#[test]
		fn unreadable_mixed_mode_depends_on_request() {
			let listing = WrapperPolicy::from_limits(
				data(CatalogMode::Mixed, Predicate::Never),
				MixedModeBehavior::Hide,
			);
			let direct = WrapperPolicy::from_limits(
				data(CatalogMode::Mixed, Predicate::Never),
				MixedModeBehavior::Challenge,
			);
			assert!(listing.is_hidden());
			assert_eq!(direct.level, AccessLevel::Metadata);
		}

		#[test]
		fn unwritable_vector_is_read_only() {
			let limits: AccessLimits = VectorAccessLimits::new(CatalogMode::Hide)
				.with_write_filter(Predicate::Never)
				.into();
			let policy = WrapperPolicy::from_limits(Some(limits), MixedModeBehavior::Challenge);
			assert_eq!(policy.level, AccessLevel::ReadOnly);
			assert_eq!(policy.response, Response::Hide);

			let limits: AccessLimits = VectorAccessLimits::new(CatalogMode::Challenge)
				.with_write_filter(Predicate::Never)
				.into();
			let policy = WrapperPolicy::from_limits(Some(limits), MixedModeBehavior::Challenge);
			assert_eq!(policy.response, Response::Challenge);
		}

		#[test]
		fn read_only_workspace() {
			let limits: AccessLimits =
				WorkspaceAccessLimits::new(CatalogMode::Challenge, true, false, false).into();
			let policy = WrapperPolicy::from_limits(Some(limits), MixedModeBehavior::Challenge);
			assert!(policy.can_read());
			assert!(!policy.can_write());
		}

		#[test]
		fn restricted_but_readable_filter_keeps_full_access() {
			let policy = WrapperPolicy::from_limits(
				data(CatalogMode::Challenge, Predicate::expr("public = true")),
				MixedModeBehavior::Challenge,
			);
			assert!(policy.can_write());
			assert_eq!(policy.response, Response::Challenge);
		}

		#[test]
		fn style_limits_are_read_write() {
			let limits: AccessLimits = StyleAccessLimits {
				mode: CatalogMode::Hide,
			}
			.into();
			let policy = WrapperPolicy::from_limits(Some(limits), MixedModeBehavior::Hide);
			assert!(policy.can_write());
		}
	}
}
