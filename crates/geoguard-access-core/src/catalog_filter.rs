// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pluggable catalog filters.
//!
//! Extensions can veto the visibility of catalog entities and contribute query
//! predicates without knowing about each other. Each [`CatalogFilter`] only
//! implements the hooks it cares about; the [`CatalogFilterRegistry`] combines
//! them:
//!
//! - an entity is hidden as soon as one filter hides it
//! - security predicates of all filters are ANDed with the delegate's predicate
//!
//! The registry is populated lazily from an injected loader on first use and
//! then cached until [`CatalogFilterRegistry::reset`] is called.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::{
	CatalogEntity, CatalogInfoKind, LayerGroupInfo, LayerInfo, ResourceInfo, ResourceKind,
	StyleInfo, WorkspaceInfo,
};
use crate::limits::{
	AccessLimits, CoverageAccessLimits, DataAccessLimits, VectorAccessLimits, WmsAccessLimits,
	WmtsAccessLimits,
};
use crate::mode::CatalogMode;
use crate::predicate::Predicate;

type HideHook<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type SecurityFilterHook = Arc<dyn Fn(CatalogInfoKind) -> Predicate + Send + Sync>;

/// One independently registered catalog filter.
///
/// Hooks are optional: a missing hide hook never hides, a missing security
/// filter hook contributes [`Predicate::Always`].
#[derive(Clone)]
pub struct CatalogFilter {
	name: String,
	hide_resource: Option<HideHook<ResourceInfo>>,
	hide_layer: Option<HideHook<LayerInfo>>,
	hide_workspace: Option<HideHook<WorkspaceInfo>>,
	hide_style: Option<HideHook<StyleInfo>>,
	hide_layer_group: Option<HideHook<LayerGroupInfo>>,
	security_filter: Option<SecurityFilterHook>,
}

impl CatalogFilter {
	/// Creates a filter with no hooks.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			hide_resource: None,
			hide_layer: None,
			hide_workspace: None,
			hide_style: None,
			hide_layer_group: None,
			security_filter: None,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn with_hide_resource(
		mut self,
		f: impl Fn(&ResourceInfo) -> bool + Send + Sync + 'static,
	) -> Self {
		self.hide_resource = Some(Arc::new(f));
		self
	}

	pub fn with_hide_layer(
		mut self,
		f: impl Fn(&LayerInfo) -> bool + Send + Sync + 'static,
	) -> Self {
		self.hide_layer = Some(Arc::new(f));
		self
	}

	pub fn with_hide_workspace(
		mut self,
		f: impl Fn(&WorkspaceInfo) -> bool + Send + Sync + 'static,
	) -> Self {
		self.hide_workspace = Some(Arc::new(f));
		self
	}

	pub fn with_hide_style(
		mut self,
		f: impl Fn(&StyleInfo) -> bool + Send + Sync + 'static,
	) -> Self {
		self.hide_style = Some(Arc::new(f));
		self
	}

	pub fn with_hide_layer_group(
		mut self,
		f: impl Fn(&LayerGroupInfo) -> bool + Send + Sync + 'static,
	) -> Self {
		self.hide_layer_group = Some(Arc::new(f));
		self
	}

	pub fn with_security_filter(
		mut self,
		f: impl Fn(CatalogInfoKind) -> Predicate + Send + Sync + 'static,
	) -> Self {
		self.security_filter = Some(Arc::new(f));
		self
	}

	/// Runs the hide hook matching the entity's kind.
	pub fn hides(&self, entity: CatalogEntity<'_>) -> bool {
		fn run<T>(hook: &Option<HideHook<T>>, value: &T) -> bool {
			hook.as_ref().is_some_and(|f| f(value))
		}

		match entity {
			CatalogEntity::Workspace(ws) => run(&self.hide_workspace, ws),
			CatalogEntity::Layer(layer) => run(&self.hide_layer, layer),
			CatalogEntity::Resource(resource) => run(&self.hide_resource, resource),
			CatalogEntity::Style(style) => run(&self.hide_style, style),
			CatalogEntity::LayerGroup(group) => run(&self.hide_layer_group, group),
		}
	}

	pub fn security_filter(&self, kind: CatalogInfoKind) -> Predicate {
		match &self.security_filter {
			Some(f) => f(kind),
			None => Predicate::Always,
		}
	}
}

impl fmt::Debug for CatalogFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CatalogFilter")
			.field("name", &self.name)
			.field("hide_resource", &self.hide_resource.is_some())
			.field("hide_layer", &self.hide_layer.is_some())
			.field("hide_workspace", &self.hide_workspace.is_some())
			.field("hide_style", &self.hide_style.is_some())
			.field("hide_layer_group", &self.hide_layer_group.is_some())
			.field("security_filter", &self.security_filter.is_some())
			.finish()
	}
}

type FilterLoader = Box<dyn Fn() -> Vec<CatalogFilter> + Send + Sync>;

/// Ordered set of catalog filters, resolved once and shared by all requests.
pub struct CatalogFilterRegistry {
	loader: FilterLoader,
	filters: RwLock<Option<Arc<[CatalogFilter]>>>,
}

impl CatalogFilterRegistry {
	/// A registry that calls `loader` the first time filters are needed, and
	/// again after each [`reset`](Self::reset).
	pub fn new(loader: impl Fn() -> Vec<CatalogFilter> + Send + Sync + 'static) -> Self {
		Self {
			loader: Box::new(loader),
			filters: RwLock::new(None),
		}
	}

	/// A registry over a fixed list of filters.
	pub fn with_filters(filters: Vec<CatalogFilter>) -> Self {
		Self::new(move || filters.clone())
	}

	pub fn empty() -> Self {
		Self::new(Vec::new)
	}

	/// The registered filters, loading them on first use.
	pub fn filters(&self) -> Arc<[CatalogFilter]> {
		if let Some(filters) = self.filters.read().as_ref() {
			return Arc::clone(filters);
		}

		let mut slot = self.filters.write();
		if let Some(filters) = slot.as_ref() {
			return Arc::clone(filters);
		}
		let loaded: Arc<[CatalogFilter]> = (self.loader)().into();
		debug!(
			count = loaded.len(),
			filters = ?loaded.iter().map(CatalogFilter::name).collect::<Vec<_>>(),
			"catalog filters loaded"
		);
		*slot = Some(Arc::clone(&loaded));
		loaded
	}

	/// Drops the cached filter list; the next access reloads it.
	pub fn reset(&self) {
		*self.filters.write() = None;
	}

	/// True if any registered filter hides the entity.
	pub fn is_hidden(&self, entity: CatalogEntity<'_>) -> bool {
		self.filters().iter().any(|filter| {
			let hidden = filter.hides(entity);
			if hidden {
				debug!(
					filter = filter.name(),
					kind = %entity.kind(),
					entity = entity.name(),
					"catalog filter hides entity"
				);
			}
			hidden
		})
	}

	/// ANDs the delegate's predicate with every filter's predicate for `kind`.
	///
	/// Without registered filters the delegate is handed back untouched.
	pub fn combined_security_filter(
		&self,
		kind: CatalogInfoKind,
		delegate: Predicate,
	) -> Predicate {
		let filters = self.filters();
		if filters.is_empty() {
			return delegate;
		}
		filters
			.iter()
			.fold(delegate, |acc, filter| acc.and(filter.security_filter(kind)))
	}
}

impl Default for CatalogFilterRegistry {
	fn default() -> Self {
		Self::empty()
	}
}

impl fmt::Debug for CatalogFilterRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CatalogFilterRegistry")
			.field("filters", &*self.filters.read())
			.finish()
	}
}

/// The most restrictive limits for a resource, shaped after its kind.
///
/// Resource kinds without dedicated limits fall back to generic limits.
pub fn hide_limits_for_resource(resource: &ResourceInfo) -> AccessLimits {
	match &resource.kind {
		ResourceKind::FeatureType => VectorAccessLimits::new(CatalogMode::Hide)
			.with_read_filter(Predicate::Never)
			.with_write_filter(Predicate::Never)
			.into(),
		ResourceKind::Coverage => CoverageAccessLimits::new(CatalogMode::Hide)
			.with_read_filter(Predicate::Never)
			.into(),
		ResourceKind::WmsLayer => WmsAccessLimits::new(CatalogMode::Hide)
			.with_read_filter(Predicate::Never)
			.with_feature_info(false)
			.into(),
		ResourceKind::WmtsLayer => WmtsAccessLimits::new(CatalogMode::Hide)
			.with_read_filter(Predicate::Never)
			.into(),
		ResourceKind::Other(type_name) => {
			warn!(
				resource = %resource.prefixed_name(),
				r#type = %type_name,
				"no dedicated hide limits for resource type, using generic limits"
			);
			DataAccessLimits::new(CatalogMode::Hide, Predicate::Never).into()
		}
	}
}
