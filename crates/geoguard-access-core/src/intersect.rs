// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Intersection of access limits.
//!
//! When several rules apply to the same request (a direct layer rule, a rule
//! inherited from a containing layer group, a workspace rule...), their limits
//! are intersected into one effective value that is at least as restrictive as
//! each input:
//!
//! ```text
//! mode        HIDE > MIXED > CHALLENGE, the stronger one wins
//! filters     NEVER absorbs, ALWAYS is neutral, otherwise AND
//! attributes  members of both lists, in the first list's order
//! regions     geometric intersection; an empty ROI denies reads
//! params      entries present in both, in the first list's order
//! flags       logical AND
//! ```
//!
//! Absent limits (and absent optional fields) mean "no restriction" and act as
//! the identity. All functions here are pure.

use tracing::instrument;

use crate::error::{AccessError, AccessResult};
use crate::limits::{
	AccessLimits, CoverageAccessLimits, DataAccessLimits, LayerGroupAccessLimits, ReaderParams,
	StyleAccessLimits, VectorAccessLimits, WmsAccessLimits, WmtsAccessLimits, WorkspaceAccessLimits,
};
use crate::mode::intersect_mode;
use crate::predicate::Predicate;
use crate::region::Region;

/// Intersects two optional limits.
///
/// # Errors
///
/// Returns [`AccessError::MismatchedLimits`] when both operands are present but
/// describe different entity kinds.
pub fn intersect(
	a: Option<AccessLimits>,
	b: Option<AccessLimits>,
) -> AccessResult<Option<AccessLimits>> {
	match (a, b) {
		(None, other) | (other, None) => Ok(other),
		(Some(a), Some(b)) => intersect_limits(a, b).map(Some),
	}
}

/// Folds any number of limits into one. Yields `None` for an empty input.
pub fn intersect_all<I>(limits: I) -> AccessResult<Option<AccessLimits>>
where
	I: IntoIterator<Item = AccessLimits>,
{
	limits
		.into_iter()
		.try_fold(None, |acc, next| intersect(acc, Some(next)))
}

/// Intersects two limits of the same kind.
#[instrument(level = "trace", skip_all, fields(left = %a.kind(), right = %b.kind()))]
pub fn intersect_limits(a: AccessLimits, b: AccessLimits) -> AccessResult<AccessLimits> {
	let limits: AccessLimits = match (a, b) {
		(AccessLimits::Data(a), AccessLimits::Data(b)) => intersect_data(a, b).into(),
		(AccessLimits::Vector(a), AccessLimits::Vector(b)) => intersect_vector(a, b).into(),
		(AccessLimits::Coverage(a), AccessLimits::Coverage(b)) => intersect_coverage(a, b).into(),
		(AccessLimits::Wms(a), AccessLimits::Wms(b)) => intersect_wms(a, b).into(),
		(AccessLimits::Wmts(a), AccessLimits::Wmts(b)) => intersect_wmts(a, b).into(),
		(AccessLimits::Workspace(a), AccessLimits::Workspace(b)) => {
			intersect_workspace(a, b).into()
		}
		(AccessLimits::Style(a), AccessLimits::Style(b)) => StyleAccessLimits {
			mode: intersect_mode(a.mode, b.mode),
		}
		.into(),
		(AccessLimits::LayerGroup(a), AccessLimits::LayerGroup(b)) => LayerGroupAccessLimits {
			mode: intersect_mode(a.mode, b.mode),
		}
		.into(),
		(a, b) => {
			return Err(AccessError::MismatchedLimits {
				left: a.kind(),
				right: b.kind(),
			})
		}
	};
	Ok(limits)
}

fn intersect_data(a: DataAccessLimits, b: DataAccessLimits) -> DataAccessLimits {
	DataAccessLimits {
		mode: intersect_mode(a.mode, b.mode),
		read_filter: a.read_filter.and(b.read_filter),
	}
}

fn intersect_vector(a: VectorAccessLimits, b: VectorAccessLimits) -> VectorAccessLimits {
	VectorAccessLimits {
		mode: intersect_mode(a.mode, b.mode),
		read_filter: a.read_filter.and(b.read_filter),
		write_filter: a.write_filter.and(b.write_filter),
		read_attributes: intersect_attributes(a.read_attributes, b.read_attributes),
		write_attributes: intersect_attributes(a.write_attributes, b.write_attributes),
		clip_region: intersect_regions(a.clip_region, b.clip_region),
		intersect_region: intersect_regions(a.intersect_region, b.intersect_region),
	}
}

fn intersect_coverage(a: CoverageAccessLimits, b: CoverageAccessLimits) -> CoverageAccessLimits {
	let roi = intersect_regions(a.roi, b.roi);
	CoverageAccessLimits {
		mode: intersect_mode(a.mode, b.mode),
		read_filter: deny_on_empty_roi(a.read_filter.and(b.read_filter), roi.as_ref()),
		roi,
		reader_params: intersect_reader_params(a.reader_params, b.reader_params),
	}
}

fn intersect_wms(a: WmsAccessLimits, b: WmsAccessLimits) -> WmsAccessLimits {
	let roi = intersect_regions(a.roi, b.roi);
	WmsAccessLimits {
		mode: intersect_mode(a.mode, b.mode),
		read_filter: deny_on_empty_roi(a.read_filter.and(b.read_filter), roi.as_ref()),
		roi,
		allow_feature_info: a.allow_feature_info && b.allow_feature_info,
	}
}

fn intersect_wmts(a: WmtsAccessLimits, b: WmtsAccessLimits) -> WmtsAccessLimits {
	let roi = intersect_regions(a.roi, b.roi);
	WmtsAccessLimits {
		mode: intersect_mode(a.mode, b.mode),
		read_filter: deny_on_empty_roi(a.read_filter.and(b.read_filter), roi.as_ref()),
		roi,
	}
}

fn intersect_workspace(
	a: WorkspaceAccessLimits,
	b: WorkspaceAccessLimits,
) -> WorkspaceAccessLimits {
	WorkspaceAccessLimits {
		mode: intersect_mode(a.mode, b.mode),
		readable: a.readable && b.readable,
		writable: a.writable && b.writable,
		adminable: a.adminable && b.adminable,
	}
}

/// Keeps the names of `a` that also appear in `b`, in `a`'s order.
pub fn intersect_attributes(a: Option<Vec<String>>, b: Option<Vec<String>>) -> Option<Vec<String>> {
	match (a, b) {
		(None, other) | (other, None) => other,
		(Some(a), Some(b)) => Some(a.into_iter().filter(|name| b.contains(name)).collect()),
	}
}

/// Geometric intersection; an absent region does not restrict anything.
pub fn intersect_regions(a: Option<Region>, b: Option<Region>) -> Option<Region> {
	match (a, b) {
		(None, other) | (other, None) => other,
		(Some(a), Some(b)) => Some(a.intersection(&b)),
	}
}

/// Keeps the overrides of `a` whose key and value both appear in `b`.
///
/// When nothing is dropped, `a` is returned as is.
pub fn intersect_reader_params(
	a: Option<ReaderParams>,
	b: Option<ReaderParams>,
) -> Option<ReaderParams> {
	let (a, b) = (a?, b?);
	let keep: Vec<bool> = a.iter().map(|entry| b.contains(entry)).collect();
	if keep.iter().all(|k| *k) {
		return Some(a);
	}
	Some(
		a.into_iter()
			.zip(keep)
			.filter_map(|(entry, k)| k.then_some(entry))
			.collect(),
	)
}

fn deny_on_empty_roi(filter: Predicate, roi: Option<&Region>) -> Predicate {
	match roi {
		Some(roi) if roi.is_empty() => Predicate::Never,
		_ => filter,
	}
}
