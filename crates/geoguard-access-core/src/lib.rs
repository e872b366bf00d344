// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Access-control core for GeoGuard.
//!
//! This crate provides:
//! - Per-entity access limits and their intersection
//! - Wrapper policies derived from limits
//! - Pluggable catalog filters and a filtering access manager
//!
//! Everything here is pure computation over catalog descriptors. Nothing is
//! persisted and no I/O is performed.
//!
//! # Usage
//!
//! ```ignore
//! use geoguard_access_core::{intersect, MixedModeBehavior, WrapperPolicy};
//!
//! let combined = intersect(rule_limits, filter_limits)?;
//! let policy = WrapperPolicy::from_limits(combined, MixedModeBehavior::Challenge);
//! ```

pub mod access_manager;
pub mod catalog;
pub mod catalog_filter;
pub mod error;
pub mod intersect;
pub mod limits;
pub mod mode;
pub mod policy;
pub mod predicate;
pub mod region;

pub use access_manager::{
	AllowAllAccessManager, CatalogFilterAccessManager, ResourceAccessManager, SecurityContext,
};
pub use catalog::{
	CatalogEntity, CatalogInfoKind, LayerGroupInfo, LayerInfo, ResourceInfo, ResourceKind,
	StyleInfo, WorkspaceInfo,
};
pub use catalog_filter::{hide_limits_for_resource, CatalogFilter, CatalogFilterRegistry};
pub use error::{AccessError, AccessResult};
pub use intersect::{intersect, intersect_all, intersect_limits};
pub use limits::{
	AccessLimits, CoverageAccessLimits, DataAccessLimits, LayerGroupAccessLimits, LimitsKind,
	ReaderParams, StyleAccessLimits, VectorAccessLimits, WmsAccessLimits, WmtsAccessLimits,
	WorkspaceAccessLimits,
};
pub use mode::{intersect_mode, CatalogMode};
pub use policy::{AccessLevel, MixedModeBehavior, Response, WrapperPolicy};
pub use predicate::Predicate;
pub use region::Region;
