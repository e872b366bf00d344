// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read-only catalog descriptors.
//!
//! The catalog itself is persisted elsewhere. These types carry just enough
//! identity for access decisions and are never mutated by this crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of data a published resource serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	/// Vector feature type.
	FeatureType,
	/// Raster coverage.
	Coverage,
	/// Layer cascaded from a remote WMS.
	WmsLayer,
	/// Layer cascaded from a remote WMTS.
	WmtsLayer,
	/// A resource type this core has no dedicated limits for.
	Other(String),
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceKind::FeatureType => write!(f, "feature_type"),
			ResourceKind::Coverage => write!(f, "coverage"),
			ResourceKind::WmsLayer => write!(f, "wms_layer"),
			ResourceKind::WmtsLayer => write!(f, "wmts_layer"),
			ResourceKind::Other(name) => write!(f, "{name}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceInfo {
	pub name: String,
}

impl WorkspaceInfo {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceInfo {
	pub name: String,
	pub workspace: String,
	pub kind: ResourceKind,
}

impl ResourceInfo {
	pub fn new(workspace: impl Into<String>, name: impl Into<String>, kind: ResourceKind) -> Self {
		Self {
			name: name.into(),
			workspace: workspace.into(),
			kind,
		}
	}

	/// Qualified `workspace:name` form.
	pub fn prefixed_name(&self) -> String {
		format!("{}:{}", self.workspace, self.name)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerInfo {
	pub name: String,
	pub resource: ResourceInfo,
}

impl LayerInfo {
	/// A layer publishing `resource` under the resource's own name.
	pub fn for_resource(resource: ResourceInfo) -> Self {
		Self {
			name: resource.name.clone(),
			resource,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleInfo {
	pub name: String,
	pub workspace: Option<String>,
}

impl StyleInfo {
	pub fn new(workspace: Option<&str>, name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			workspace: workspace.map(str::to_string),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerGroupInfo {
	pub name: String,
	pub workspace: Option<String>,
	pub layers: Vec<String>,
}

impl LayerGroupInfo {
	pub fn new(workspace: Option<&str>, name: impl Into<String>, layers: Vec<String>) -> Self {
		Self {
			name: name.into(),
			workspace: workspace.map(str::to_string),
			layers,
		}
	}
}

/// Entity kinds that security filters can be requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogInfoKind {
	Workspace,
	Layer,
	Resource,
	Style,
	LayerGroup,
}

impl fmt::Display for CatalogInfoKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CatalogInfoKind::Workspace => write!(f, "workspace"),
			CatalogInfoKind::Layer => write!(f, "layer"),
			CatalogInfoKind::Resource => write!(f, "resource"),
			CatalogInfoKind::Style => write!(f, "style"),
			CatalogInfoKind::LayerGroup => write!(f, "layer_group"),
		}
	}
}

/// A borrowed reference to any catalog entity.
#[derive(Debug, Clone, Copy)]
pub enum CatalogEntity<'a> {
	Workspace(&'a WorkspaceInfo),
	Layer(&'a LayerInfo),
	Resource(&'a ResourceInfo),
	Style(&'a StyleInfo),
	LayerGroup(&'a LayerGroupInfo),
}

impl CatalogEntity<'_> {
	pub fn kind(&self) -> CatalogInfoKind {
		match self {
			CatalogEntity::Workspace(_) => CatalogInfoKind::Workspace,
			CatalogEntity::Layer(_) => CatalogInfoKind::Layer,
			CatalogEntity::Resource(_) => CatalogInfoKind::Resource,
			CatalogEntity::Style(_) => CatalogInfoKind::Style,
			CatalogEntity::LayerGroup(_) => CatalogInfoKind::LayerGroup,
		}
	}

	pub fn name(&self) -> &str {
		match self {
			CatalogEntity::Workspace(ws) => &ws.name,
			CatalogEntity::Layer(layer) => &layer.name,
			CatalogEntity::Resource(resource) => &resource.name,
			CatalogEntity::Style(style) => &style.name,
			CatalogEntity::LayerGroup(group) => &group.name,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn prefixed_name_joins_workspace_and_name() {
		let r = ResourceInfo::new("topp", "states", ResourceKind::FeatureType);
		assert_eq!(r.prefixed_name(), "topp:states");
	}

	#[test]
	fn entity_kind_matches_variant() {
		let ws = WorkspaceInfo::new("topp");
		let layer = LayerInfo::for_resource(ResourceInfo::new(
			"topp",
			"states",
			ResourceKind::FeatureType,
		));
		assert_eq!(CatalogEntity::Workspace(&ws).kind(), CatalogInfoKind::Workspace);
		assert_eq!(CatalogEntity::Layer(&layer).kind(), CatalogInfoKind::Layer);
		assert_eq!(CatalogEntity::Layer(&layer).name(), "states");
	}
}
