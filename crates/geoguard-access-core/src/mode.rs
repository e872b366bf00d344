// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog visibility modes.
//!
//! A [`CatalogMode`] controls how a resource the caller cannot fully access is
//! presented:
//!
//! - [`CatalogMode::Hide`]: the resource does not exist as far as the caller can tell
//! - [`CatalogMode::Mixed`]: hidden from listings, challenged on direct access
//! - [`CatalogMode::Challenge`]: visible in listings, access triggers an authentication challenge

use serde::{Deserialize, Serialize};
use std::fmt;

/// How restricted resources are exposed in the catalog.
///
/// The variant order is the restrictiveness ranking used by
/// [`WrapperPolicy`](crate::WrapperPolicy) ordering: `Hide` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CatalogMode {
	Hide,
	Mixed,
	Challenge,
}

impl CatalogMode {
	/// Returns all modes, most restrictive first.
	pub fn all() -> &'static [CatalogMode] {
		&[CatalogMode::Hide, CatalogMode::Mixed, CatalogMode::Challenge]
	}
}

impl fmt::Display for CatalogMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CatalogMode::Hide => write!(f, "HIDE"),
			CatalogMode::Mixed => write!(f, "MIXED"),
			CatalogMode::Challenge => write!(f, "CHALLENGE"),
		}
	}
}

/// Combines two modes, keeping the more restrictive one.
///
/// `Hide` absorbs everything, `Mixed` beats `Challenge`.
pub fn intersect_mode(a: CatalogMode, b: CatalogMode) -> CatalogMode {
	match (a, b) {
		(CatalogMode::Hide, _) | (_, CatalogMode::Hide) => CatalogMode::Hide,
		(CatalogMode::Mixed, _) | (_, CatalogMode::Mixed) => CatalogMode::Mixed,
		_ => CatalogMode::Challenge,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn arb_mode() -> impl Strategy<Value = CatalogMode> {
		prop_oneof![
			Just(CatalogMode::Hide),
			Just(CatalogMode::Mixed),
			Just(CatalogMode::Challenge),
		]
	}

	#[test]
	fn hide_wins_over_everything() {
		for mode in CatalogMode::all() {
			assert_eq!(intersect_mode(CatalogMode::Hide, *mode), CatalogMode::Hide);
		}
	}

	#[test]
	fn mixed_wins_over_challenge() {
		assert_eq!(
			intersect_mode(CatalogMode::Challenge, CatalogMode::Mixed),
			CatalogMode::Mixed
		);
	}

	#[test]
	fn serializes_as_upper_case() {
		let json = serde_json::to_string(&CatalogMode::Challenge).unwrap();
		assert_eq!(json, "\"CHALLENGE\"");
		let parsed: CatalogMode = serde_json::from_str("\"MIXED\"").unwrap();
		assert_eq!(parsed, CatalogMode::Mixed);
	}

	proptest! {
		#[test]
		fn intersection_is_commutative(a in arb_mode(), b in arb_mode()) {
			prop_assert_eq!(intersect_mode(a, b), intersect_mode(b, a));
		}

		#[test]
		fn intersection_is_associative(a in arb_mode(), b in arb_mode(), c in arb_mode()) {
			prop_assert_eq!(
				intersect_mode(intersect_mode(a, b), c),
				intersect_mode(a, intersect_mode(b, c))
			);
		}

		#[test]
		fn intersection_is_idempotent(a in arb_mode()) {
			prop_assert_eq!(intersect_mode(a, a), a);
		}

		#[test]
		fn intersection_picks_the_minimum(a in arb_mode(), b in arb_mode()) {
			prop_assert_eq!(intersect_mode(a, b), a.min(b));
		}
	}
}
