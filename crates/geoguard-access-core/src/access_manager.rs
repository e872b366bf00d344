// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource access managers.
//!
//! A [`ResourceAccessManager`] answers "what may this caller do with that
//! entity". [`CatalogFilterAccessManager`] decorates any manager with the
//! vetoes and predicates of a [`CatalogFilterRegistry`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use crate::catalog::{
	CatalogEntity, CatalogInfoKind, LayerGroupInfo, LayerInfo, ResourceInfo, StyleInfo,
	WorkspaceInfo,
};
use crate::catalog_filter::{hide_limits_for_resource, CatalogFilterRegistry};
use crate::limits::{
	AccessLimits, LayerGroupAccessLimits, StyleAccessLimits, WorkspaceAccessLimits,
};
use crate::mode::CatalogMode;
use crate::predicate::Predicate;

/// The authenticated caller an access decision is made for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
	pub username: Option<String>,
	pub roles: Vec<String>,
}

impl SecurityContext {
	pub fn anonymous() -> Self {
		Self::default()
	}

	pub fn user(username: impl Into<String>) -> Self {
		Self {
			username: Some(username.into()),
			roles: Vec::new(),
		}
	}

	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.roles.push(role.into());
		self
	}

	pub fn is_anonymous(&self) -> bool {
		self.username.is_none()
	}

	pub fn has_role(&self, role: &str) -> bool {
		self.roles.iter().any(|r| r == role)
	}
}

/// Computes access limits for catalog entities.
///
/// Every method returns `None` when the caller is not restricted at all.
pub trait ResourceAccessManager: Send + Sync {
	fn workspace_limits(
		&self,
		ctx: &SecurityContext,
		workspace: &WorkspaceInfo,
	) -> Option<WorkspaceAccessLimits>;

	fn layer_limits(&self, ctx: &SecurityContext, layer: &LayerInfo) -> Option<AccessLimits>;

	fn resource_limits(
		&self,
		ctx: &SecurityContext,
		resource: &ResourceInfo,
	) -> Option<AccessLimits>;

	fn style_limits(&self, ctx: &SecurityContext, style: &StyleInfo) -> Option<StyleAccessLimits>;

	fn layer_group_limits(
		&self,
		ctx: &SecurityContext,
		group: &LayerGroupInfo,
	) -> Option<LayerGroupAccessLimits>;

	/// Predicate restricting catalog queries over entities of `kind`.
	fn security_filter(&self, ctx: &SecurityContext, kind: CatalogInfoKind) -> Predicate;
}

impl<T: ResourceAccessManager + ?Sized> ResourceAccessManager for Arc<T> {
	fn workspace_limits(
		&self,
		ctx: &SecurityContext,
		workspace: &WorkspaceInfo,
	) -> Option<WorkspaceAccessLimits> {
		(**self).workspace_limits(ctx, workspace)
	}

	fn layer_limits(&self, ctx: &SecurityContext, layer: &LayerInfo) -> Option<AccessLimits> {
		(**self).layer_limits(ctx, layer)
	}

	fn resource_limits(
		&self,
		ctx: &SecurityContext,
		resource: &ResourceInfo,
	) -> Option<AccessLimits> {
		(**self).resource_limits(ctx, resource)
	}

	fn style_limits(&self, ctx: &SecurityContext, style: &StyleInfo) -> Option<StyleAccessLimits> {
		(**self).style_limits(ctx, style)
	}

	fn layer_group_limits(
		&self,
		ctx: &SecurityContext,
		group: &LayerGroupInfo,
	) -> Option<LayerGroupAccessLimits> {
		(**self).layer_group_limits(ctx, group)
	}

	fn security_filter(&self, ctx: &SecurityContext, kind: CatalogInfoKind) -> Predicate {
		(**self).security_filter(ctx, kind)
	}
}

/// Grants everything. Useful as the innermost delegate.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAccessManager;

impl ResourceAccessManager for AllowAllAccessManager {
	fn workspace_limits(
		&self,
		_: &SecurityContext,
		_: &WorkspaceInfo,
	) -> Option<WorkspaceAccessLimits> {
		None
	}

	fn layer_limits(&self, _: &SecurityContext, _: &LayerInfo) -> Option<AccessLimits> {
		None
	}

	fn resource_limits(&self, _: &SecurityContext, _: &ResourceInfo) -> Option<AccessLimits> {
		None
	}

	fn style_limits(&self, _: &SecurityContext, _: &StyleInfo) -> Option<StyleAccessLimits> {
		None
	}

	fn layer_group_limits(
		&self,
		_: &SecurityContext,
		_: &LayerGroupInfo,
	) -> Option<LayerGroupAccessLimits> {
		None
	}

	fn security_filter(&self, _: &SecurityContext, _: CatalogInfoKind) -> Predicate {
		Predicate::Always
	}
}

/// Applies catalog filters on top of a delegate manager.
///
/// Hidden entities get the most restrictive limits of their shape; everything
/// else is answered by the delegate.
#[derive(Debug)]
pub struct CatalogFilterAccessManager<D> {
	delegate: D,
	filters: Arc<CatalogFilterRegistry>,
}

impl<D: ResourceAccessManager> CatalogFilterAccessManager<D> {
	pub fn new(delegate: D, filters: Arc<CatalogFilterRegistry>) -> Self {
		Self { delegate, filters }
	}

	pub fn delegate(&self) -> &D {
		&self.delegate
	}

	pub fn filters(&self) -> &CatalogFilterRegistry {
		&self.filters
	}
}

impl<D: ResourceAccessManager> ResourceAccessManager for CatalogFilterAccessManager<D> {
	#[instrument(level = "trace", skip_all, fields(workspace = %workspace.name))]
	fn workspace_limits(
		&self,
		ctx: &SecurityContext,
		workspace: &WorkspaceInfo,
	) -> Option<WorkspaceAccessLimits> {
		if self.filters.is_hidden(CatalogEntity::Workspace(workspace)) {
			return Some(WorkspaceAccessLimits::new(CatalogMode::Hide, false, false, false));
		}
		self.delegate.workspace_limits(ctx, workspace)
	}

	#[instrument(level = "trace", skip_all, fields(layer = %layer.name))]
	fn layer_limits(&self, ctx: &SecurityContext, layer: &LayerInfo) -> Option<AccessLimits> {
		if self.filters.is_hidden(CatalogEntity::Layer(layer))
			|| self.filters.is_hidden(CatalogEntity::Resource(&layer.resource))
		{
			return Some(hide_limits_for_resource(&layer.resource));
		}
		self.delegate.layer_limits(ctx, layer)
	}

	#[instrument(level = "trace", skip_all, fields(resource = %resource.prefixed_name()))]
	fn resource_limits(
		&self,
		ctx: &SecurityContext,
		resource: &ResourceInfo,
	) -> Option<AccessLimits> {
		if self.filters.is_hidden(CatalogEntity::Resource(resource)) {
			return Some(hide_limits_for_resource(resource));
		}
		self.delegate.resource_limits(ctx, resource)
	}

	fn style_limits(&self, ctx: &SecurityContext, style: &StyleInfo) -> Option<StyleAccessLimits> {
		if self.filters.is_hidden(CatalogEntity::Style(style)) {
			return Some(StyleAccessLimits {
				mode: CatalogMode::Hide,
			});
		}
		self.delegate.style_limits(ctx, style)
	}

	fn layer_group_limits(
		&self,
		ctx: &SecurityContext,
		group: &LayerGroupInfo,
	) -> Option<LayerGroupAccessLimits> {
		if self.filters.is_hidden(CatalogEntity::LayerGroup(group)) {
			return Some(LayerGroupAccessLimits {
				mode: CatalogMode::Hide,
			});
		}
		self.delegate.layer_group_limits(ctx, group)
	}

	fn security_filter(&self, ctx: &SecurityContext, kind: CatalogInfoKind) -> Predicate {
		self.filters
			.combined_security_filter(kind, self.delegate.security_filter(ctx, kind))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::ResourceKind;
	use crate::catalog_filter::CatalogFilter;
	use crate::limits::{DataAccessLimits, VectorAccessLimits};

	/// Restricts everything owned by "topp" to a read filter.
	struct OwnerManager;

	impl ResourceAccessManager for OwnerManager {
		fn workspace_limits(
			&self,
			_: &SecurityContext,
			_: &WorkspaceInfo,
		) -> Option<WorkspaceAccessLimits> {
			Some(WorkspaceAccessLimits::new(CatalogMode::Challenge, true, false, false))
		}

		fn layer_limits(&self, ctx: &SecurityContext, layer: &LayerInfo) -> Option<AccessLimits> {
			self.resource_limits(ctx, &layer.resource)
		}

		fn resource_limits(
			&self,
			ctx: &SecurityContext,
			resource: &ResourceInfo,
		) -> Option<AccessLimits> {
			if ctx.has_role("ADMIN") || resource.workspace != "topp" {
				return None;
			}
			let owned = Predicate::expr("owner = 'topp'");
			Some(DataAccessLimits::new(CatalogMode::Challenge, owned).into())
		}

		fn style_limits(&self, _: &SecurityContext, _: &StyleInfo) -> Option<StyleAccessLimits> {
			None
		}

		fn layer_group_limits(
			&self,
			_: &SecurityContext,
			_: &LayerGroupInfo,
		) -> Option<LayerGroupAccessLimits> {
			None
		}

		fn security_filter(&self, ctx: &SecurityContext, _: CatalogInfoKind) -> Predicate {
			if ctx.is_anonymous() {
				Predicate::expr("public = true")
			} else {
				Predicate::Always
			}
		}
	}

	fn manager(filters: Vec<CatalogFilter>) -> CatalogFilterAccessManager<OwnerManager> {
		CatalogFilterAccessManager::new(
			OwnerManager,
			Arc::new(CatalogFilterRegistry::with_filters(filters)),
		)
	}

	fn roads() -> ResourceInfo {
		ResourceInfo::new("topp", "roads", ResourceKind::FeatureType)
	}

	mod delegation {
		use super::*;

		#[test]
		fn no_filters_defers_to_delegate() {
			let manager = manager(vec![]);
			let ctx = SecurityContext::user("bob");

			let limits = manager.resource_limits(&ctx, &roads());
			assert_eq!(
				limits.as_ref().and_then(AccessLimits::read_filter),
				Some(&Predicate::expr("owner = 'topp'"))
			);

			let admin = SecurityContext::user("root").with_role("ADMIN");
			assert!(manager.resource_limits(&admin, &roads()).is_none());

			let ws = manager.workspace_limits(&ctx, &WorkspaceInfo::new("topp"));
			assert_eq!(ws.map(|l| l.writable), Some(false));
		}

		#[test]
		fn arc_delegate_is_a_manager() {
			let shared: Arc<dyn ResourceAccessManager> = Arc::new(AllowAllAccessManager);
			let manager =
				CatalogFilterAccessManager::new(shared, Arc::new(CatalogFilterRegistry::empty()));
			assert!(manager
				.layer_limits(&SecurityContext::anonymous(), &LayerInfo::for_resource(roads()))
				.is_none());
		}
	}

	mod hidden_entities {
		use super::*;

		#[test]
		fn hidden_workspace_gets_all_flags_false() {
			let manager = manager(vec![
				CatalogFilter::new("ws").with_hide_workspace(|ws| ws.name == "secret")
			]);
			let limits = manager
				.workspace_limits(&SecurityContext::user("bob"), &WorkspaceInfo::new("secret"))
				.unwrap();
			assert_eq!(
				limits,
				WorkspaceAccessLimits::new(CatalogMode::Hide, false, false, false)
			);
		}

		#[test]
		fn layer_hidden_through_its_resource() {
			let manager = manager(vec![
				CatalogFilter::new("roads").with_hide_resource(|r| r.name == "roads")
			]);
			let limits = manager
				.layer_limits(&SecurityContext::user("bob"), &LayerInfo::for_resource(roads()))
				.unwrap();
			let AccessLimits::Vector(vector) = limits else {
				panic!("expected vector limits, got {limits:?}");
			};
			assert_eq!(vector, VectorAccessLimits::new(CatalogMode::Hide)
				.with_read_filter(Predicate::Never)
				.with_write_filter(Predicate::Never));
		}

		#[test]
		fn layer_hidden_by_layer_hook() {
			let manager = manager(vec![
				CatalogFilter::new("layers").with_hide_layer(|l| l.name == "roads")
			]);
			let limits = manager
				.layer_limits(&SecurityContext::user("bob"), &LayerInfo::for_resource(roads()))
				.unwrap();
			assert!(!limits.can_read());
			assert_eq!(limits.mode(), CatalogMode::Hide);
		}

		#[test]
		fn hidden_style_and_group() {
			let manager = manager(vec![CatalogFilter::new("all")
				.with_hide_style(|_| true)
				.with_hide_layer_group(|_| true)]);
			let ctx = SecurityContext::anonymous();
			assert_eq!(
				manager
					.style_limits(&ctx, &StyleInfo::new(None, "line"))
					.map(|l| l.mode),
				Some(CatalogMode::Hide)
			);
			assert_eq!(
				manager
					.layer_group_limits(&ctx, &LayerGroupInfo::new(None, "base", vec![]))
					.map(|l| l.mode),
				Some(CatalogMode::Hide)
			);
		}
	}

	mod security_filter {
		use super::*;

		#[test]
		fn filters_are_anded_with_delegate_predicate() {
			let manager = manager(vec![
				CatalogFilter::new("tenant").with_security_filter(|_| Predicate::expr("tenant = 7"))
			]);
			let predicate =
				manager.security_filter(&SecurityContext::anonymous(), CatalogInfoKind::Layer);
			assert_eq!(predicate.to_string(), "(public = true) AND (tenant = 7)");

			let predicate =
				manager.security_filter(&SecurityContext::user("bob"), CatalogInfoKind::Layer);
			assert_eq!(predicate, Predicate::expr("tenant = 7"));
		}

		#[test]
		fn without_filters_delegate_predicate_passes_through() {
			let manager = manager(vec![]);
			let predicate =
				manager.security_filter(&SecurityContext::anonymous(), CatalogInfoKind::Resource);
			assert_eq!(predicate, Predicate::expr("public = true"));
		}
	}
}
