// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The access limits family.
//!
//! Every catalog entity kind has its own limits shape. All of them carry a
//! [`CatalogMode`]; data-bearing kinds also carry a read filter, and some add
//! attribute masks, regions of interest or reader parameter overrides.
//!
//! Limits are plain values: built for one access decision, combined with
//! [`intersect`](crate::intersect()), then handed to the enforcement point.
//! For every optional field, `None` means "no restriction".

use crate::mode::CatalogMode;
use crate::predicate::Predicate;
use crate::region::Region;
use std::fmt;

/// Reader parameter overrides applied to a raster read, in declaration order.
pub type ReaderParams = Vec<(String, serde_json::Value)>;

/// Limits for a generic data resource.
#[derive(Debug, Clone, PartialEq)]
pub struct DataAccessLimits {
	pub mode: CatalogMode,
	pub read_filter: Predicate,
}

impl DataAccessLimits {
	pub fn new(mode: CatalogMode, read_filter: Predicate) -> Self {
		Self { mode, read_filter }
	}
}

/// Limits for a vector feature type.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorAccessLimits {
	pub mode: CatalogMode,
	pub read_filter: Predicate,
	pub write_filter: Predicate,
	/// Attributes the caller may read. `None` means all of them.
	pub read_attributes: Option<Vec<String>>,
	/// Attributes the caller may write. `None` means all of them.
	pub write_attributes: Option<Vec<String>>,
	/// Geometries are clipped to this region on read.
	pub clip_region: Option<Region>,
	/// Only features intersecting this region are returned.
	pub intersect_region: Option<Region>,
}

impl VectorAccessLimits {
	/// Unrestricted vector limits with the given mode.
	pub fn new(mode: CatalogMode) -> Self {
		Self {
			mode,
			read_filter: Predicate::Always,
			write_filter: Predicate::Always,
			read_attributes: None,
			write_attributes: None,
			clip_region: None,
			intersect_region: None,
		}
	}

	pub fn with_read_filter(mut self, filter: Predicate) -> Self {
		self.read_filter = filter;
		self
	}

	pub fn with_write_filter(mut self, filter: Predicate) -> Self {
		self.write_filter = filter;
		self
	}

	pub fn with_read_attributes<I, S>(mut self, attributes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.read_attributes = Some(attributes.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_write_attributes<I, S>(mut self, attributes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.write_attributes = Some(attributes.into_iter().map(Into::into).collect());
		self
	}

	pub fn with_clip_region(mut self, region: Region) -> Self {
		self.clip_region = Some(region);
		self
	}

	pub fn with_intersect_region(mut self, region: Region) -> Self {
		self.intersect_region = Some(region);
		self
	}
}

/// Limits for a raster coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageAccessLimits {
	pub mode: CatalogMode,
	pub read_filter: Predicate,
	pub roi: Option<Region>,
	pub reader_params: Option<ReaderParams>,
}

impl CoverageAccessLimits {
	pub fn new(mode: CatalogMode) -> Self {
		Self {
			mode,
			read_filter: Predicate::Always,
			roi: None,
			reader_params: None,
		}
	}

	pub fn with_read_filter(mut self, filter: Predicate) -> Self {
		self.read_filter = filter;
		self
	}

	pub fn with_roi(mut self, roi: Region) -> Self {
		self.roi = Some(roi);
		self
	}

	pub fn with_reader_params(mut self, params: ReaderParams) -> Self {
		self.reader_params = Some(params);
		self
	}
}

/// Limits for a layer cascaded from a remote WMS.
#[derive(Debug, Clone, PartialEq)]
pub struct WmsAccessLimits {
	pub mode: CatalogMode,
	pub read_filter: Predicate,
	pub roi: Option<Region>,
	pub allow_feature_info: bool,
}

impl WmsAccessLimits {
	pub fn new(mode: CatalogMode) -> Self {
		Self {
			mode,
			read_filter: Predicate::Always,
			roi: None,
			allow_feature_info: true,
		}
	}

	pub fn with_read_filter(mut self, filter: Predicate) -> Self {
		self.read_filter = filter;
		self
	}

	pub fn with_roi(mut self, roi: Region) -> Self {
		self.roi = Some(roi);
		self
	}

	pub fn with_feature_info(mut self, allowed: bool) -> Self {
		self.allow_feature_info = allowed;
		self
	}
}

/// Limits for a layer cascaded from a remote WMTS.
#[derive(Debug, Clone, PartialEq)]
pub struct WmtsAccessLimits {
	pub mode: CatalogMode,
	pub read_filter: Predicate,
	pub roi: Option<Region>,
}

impl WmtsAccessLimits {
	pub fn new(mode: CatalogMode) -> Self {
		Self {
			mode,
			read_filter: Predicate::Always,
			roi: None,
		}
	}

	pub fn with_read_filter(mut self, filter: Predicate) -> Self {
		self.read_filter = filter;
		self
	}

	pub fn with_roi(mut self, roi: Region) -> Self {
		self.roi = Some(roi);
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceAccessLimits {
	pub mode: CatalogMode,
	pub readable: bool,
	pub writable: bool,
	pub adminable: bool,
}

impl WorkspaceAccessLimits {
	pub fn new(mode: CatalogMode, readable: bool, writable: bool, adminable: bool) -> Self {
		Self {
			mode,
			readable,
			writable,
			adminable,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleAccessLimits {
	pub mode: CatalogMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerGroupAccessLimits {
	pub mode: CatalogMode,
}

/// Discriminant of [`AccessLimits`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitsKind {
	Data,
	Vector,
	Coverage,
	Wms,
	Wmts,
	Workspace,
	Style,
	LayerGroup,
}

impl fmt::Display for LimitsKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			LimitsKind::Data => "data",
			LimitsKind::Vector => "vector",
			LimitsKind::Coverage => "coverage",
			LimitsKind::Wms => "wms",
			LimitsKind::Wmts => "wmts",
			LimitsKind::Workspace => "workspace",
			LimitsKind::Style => "style",
			LimitsKind::LayerGroup => "layer_group",
		};
		write!(f, "{name}")
	}
}

/// Access limits for one catalog entity.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessLimits {
	Data(DataAccessLimits),
	Vector(VectorAccessLimits),
	Coverage(CoverageAccessLimits),
	Wms(WmsAccessLimits),
	Wmts(WmtsAccessLimits),
	Workspace(WorkspaceAccessLimits),
	Style(StyleAccessLimits),
	LayerGroup(LayerGroupAccessLimits),
}

impl AccessLimits {
	pub fn kind(&self) -> LimitsKind {
		match self {
			AccessLimits::Data(_) => LimitsKind::Data,
			AccessLimits::Vector(_) => LimitsKind::Vector,
			AccessLimits::Coverage(_) => LimitsKind::Coverage,
			AccessLimits::Wms(_) => LimitsKind::Wms,
			AccessLimits::Wmts(_) => LimitsKind::Wmts,
			AccessLimits::Workspace(_) => LimitsKind::Workspace,
			AccessLimits::Style(_) => LimitsKind::Style,
			AccessLimits::LayerGroup(_) => LimitsKind::LayerGroup,
		}
	}

	pub fn mode(&self) -> CatalogMode {
		match self {
			AccessLimits::Data(l) => l.mode,
			AccessLimits::Vector(l) => l.mode,
			AccessLimits::Coverage(l) => l.mode,
			AccessLimits::Wms(l) => l.mode,
			AccessLimits::Wmts(l) => l.mode,
			AccessLimits::Workspace(l) => l.mode,
			AccessLimits::Style(l) => l.mode,
			AccessLimits::LayerGroup(l) => l.mode,
		}
	}

	/// The read filter, for the kinds that have one.
	pub fn read_filter(&self) -> Option<&Predicate> {
		match self {
			AccessLimits::Data(l) => Some(&l.read_filter),
			AccessLimits::Vector(l) => Some(&l.read_filter),
			AccessLimits::Coverage(l) => Some(&l.read_filter),
			AccessLimits::Wms(l) => Some(&l.read_filter),
			AccessLimits::Wmts(l) => Some(&l.read_filter),
			AccessLimits::Workspace(_)
			| AccessLimits::Style(_)
			| AccessLimits::LayerGroup(_) => None,
		}
	}

	/// Whether these limits still let the caller read anything.
	pub fn can_read(&self) -> bool {
		match self {
			AccessLimits::Workspace(l) => l.readable,
			other => !other.read_filter().is_some_and(Predicate::is_never),
		}
	}

	/// Whether these limits still let the caller write anything.
	pub fn can_write(&self) -> bool {
		match self {
			AccessLimits::Vector(l) => !l.write_filter.is_never(),
			AccessLimits::Workspace(l) => l.writable,
			other => other.can_read(),
		}
	}
}

macro_rules! impl_from_limits {
	($variant:ident, $ty:ty) => {
		impl From<$ty> for AccessLimits {
			fn from(limits: $ty) -> Self {
				AccessLimits::$variant(limits)
			}
		}
	};
}

impl_from_limits!(Data, DataAccessLimits);
impl_from_limits!(Vector, VectorAccessLimits);
impl_from_limits!(Coverage, CoverageAccessLimits);
impl_from_limits!(Wms, WmsAccessLimits);
impl_from_limits!(Wmts, WmtsAccessLimits);
impl_from_limits!(Workspace, WorkspaceAccessLimits);
impl_from_limits!(Style, StyleAccessLimits);
impl_from_limits!(LayerGroup, LayerGroupAccessLimits);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vector_defaults_are_unrestricted() {
		let limits = VectorAccessLimits::new(CatalogMode::Challenge);
		assert!(limits.read_filter.is_always());
		assert!(limits.write_filter.is_always());
		assert!(limits.read_attributes.is_none());
		assert!(limits.clip_region.is_none());
	}

	#[test]
	fn never_read_filter_blocks_reading() {
		let limits: AccessLimits =
			DataAccessLimits::new(CatalogMode::Hide, Predicate::Never).into();
		assert!(!limits.can_read());
		assert!(!limits.can_write());
	}

	#[test]
	fn vector_write_filter_controls_writes() {
		let limits: AccessLimits = VectorAccessLimits::new(CatalogMode::Hide)
			.with_write_filter(Predicate::Never)
			.into();
		assert!(limits.can_read());
		assert!(!limits.can_write());
	}

	#[test]
	fn workspace_flags_drive_access() {
		let limits: AccessLimits =
			WorkspaceAccessLimits::new(CatalogMode::Challenge, true, false, false).into();
		assert!(limits.can_read());
		assert!(!limits.can_write());
		assert!(limits.read_filter().is_none());
	}

	#[test]
	fn style_limits_are_always_readable() {
		let limits: AccessLimits = StyleAccessLimits {
			mode: CatalogMode::Hide,
		}
		.into();
		assert_eq!(limits.kind(), LimitsKind::Style);
		assert!(limits.can_read());
	}
}
