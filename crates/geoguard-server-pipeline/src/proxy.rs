// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The published pipeline table and its rebuild protocol.
//!
//! Request handlers read the current [`PipelineTable`] without locking.
//! Rebuilds are serialized; each one compiles a fresh table, publishes it in
//! one atomic swap, destroys the stages that only the old table used and
//! finally clears cached authentication results. A destroyed stage instance
//! is never published again, even if the resolver still hands it out.

use arc_swap::ArcSwap;
use geoguard_server_config::RequestFilterChain;
use http::Method;
use parking_lot::Mutex;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::auth_cache::AuthenticationCache;
use crate::stage::{stage_id, Stage, StageResolver};
use crate::table::{compile, CompiledChain, PipelineTable};

/// The stages of one matched chain, kept alive with the table they came from.
#[derive(Debug, Clone)]
pub struct MatchedPipeline {
	table: Arc<PipelineTable>,
	index: usize,
}

impl MatchedPipeline {
	pub fn chain(&self) -> &CompiledChain {
		&self.table.chains()[self.index]
	}
}

impl Deref for MatchedPipeline {
	type Target = [Arc<dyn Stage>];

	fn deref(&self) -> &Self::Target {
		self.chain().stages()
	}
}

/// Resolves through `inner` but refuses instances that were already destroyed.
struct LiveStages<'a> {
	inner: &'a dyn StageResolver,
	retired: &'a [Arc<dyn Stage>],
}

impl StageResolver for LiveStages<'_> {
	fn resolve(&self, name: &str) -> Option<Arc<dyn Stage>> {
		let stage = self.inner.resolve(name)?;
		let id = stage_id(&stage);
		if self.retired.iter().any(|r| stage_id(r) == id) {
			error!(stage = %name, "resolver returned a destroyed stage, dropping it");
			return None;
		}
		Some(stage)
	}
}

pub struct FilterChainProxy {
	table: ArcSwap<PipelineTable>,
	/// Serializes rebuilds and holds every instance destroyed so far.
	retired: Mutex<Vec<Arc<dyn Stage>>>,
	resolver: Arc<dyn StageResolver>,
	auth_cache: Option<Arc<dyn AuthenticationCache>>,
}

impl FilterChainProxy {
	/// A proxy with an empty table. Call [`rebuild`](Self::rebuild) to load chains.
	pub fn new(resolver: Arc<dyn StageResolver>) -> Self {
		Self {
			table: ArcSwap::from_pointee(PipelineTable::default()),
			retired: Mutex::new(Vec::new()),
			resolver,
			auth_cache: None,
		}
	}

	pub fn with_auth_cache(mut self, cache: Arc<dyn AuthenticationCache>) -> Self {
		self.auth_cache = Some(cache);
		self
	}

	/// The currently published table.
	pub fn table(&self) -> Arc<PipelineTable> {
		self.table.load_full()
	}

	/// Stages for a request, from the table published at call time.
	pub fn lookup(&self, path: &str, method: &Method) -> Option<MatchedPipeline> {
		let table = self.table.load_full();
		let index = table
			.chains()
			.iter()
			.position(|chain| chain.matches(path, method))?;
		Some(MatchedPipeline { table, index })
	}

	/// Recompiles `chains` and publishes the result.
	///
	/// Stage instances of the previous table that the new table does not
	/// reference are destroyed exactly once and retired with the resolver.
	#[instrument(level = "debug", skip_all, fields(chains = chains.len()))]
	pub fn rebuild(&self, chains: &[RequestFilterChain]) -> Arc<PipelineTable> {
		let mut retired = self.retired.lock();

		let resolver = LiveStages {
			inner: self.resolver.as_ref(),
			retired: &retired,
		};
		let fresh = Arc::new(compile(chains, &resolver));
		let previous = self.table.swap(Arc::clone(&fresh));

		let mut destroyed = 0;
		for stage in previous.unique_stages() {
			if fresh.contains_stage(&stage) {
				continue;
			}
			debug!(stage = %stage.name(), "destroying retired pipeline stage");
			stage.destroy();
			self.resolver.retire(&stage);
			retired.push(stage);
			destroyed += 1;
		}

		if let Some(cache) = &self.auth_cache {
			cache.remove_all();
		}

		info!(
			chains = fresh.len(),
			stages = fresh.unique_stages().len(),
			destroyed,
			"pipeline table rebuilt"
		);
		fresh
	}
}

impl std::fmt::Debug for FilterChainProxy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FilterChainProxy")
			.field("table", &*self.table.load())
			.field("auth_cache", &self.auth_cache.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::auth_cache::{CachedAuthentication, InMemoryAuthenticationCache};
	use crate::stage::testing::CountingStage;
	use crate::stage::{SessionContextStage, StageRegistry};
	use std::collections::HashMap;
	use std::thread;

	fn chains() -> Vec<RequestFilterChain> {
		vec![
			RequestFilterChain::new("admin", ["/admin/**"])
				.with_require_ssl(true)
				.with_role_filter("roleFilter")
				.with_filters(["basicAuth"]),
			RequestFilterChain::new("rest", ["/rest/**"]).with_filters(["basicAuth"]),
		]
	}

	struct Fixture {
		registry: Arc<StageRegistry>,
		basic: Arc<CountingStage>,
		role: Arc<CountingStage>,
		cache: Arc<InMemoryAuthenticationCache>,
		proxy: FilterChainProxy,
	}

	fn fixture() -> Fixture {
		let registry = Arc::new(StageRegistry::with_builtins());
		let basic = CountingStage::new("basicAuth");
		let role = CountingStage::new("roleFilter");
		registry.register(basic.clone());
		registry.register(role.clone());
		let cache = Arc::new(InMemoryAuthenticationCache::default());
		let proxy = FilterChainProxy::new(registry.clone()).with_auth_cache(cache.clone());
		Fixture {
			registry,
			basic,
			role,
			cache,
			proxy,
		}
	}

	#[test]
	fn empty_until_first_rebuild() {
		let f = fixture();
		assert!(f.proxy.table().is_empty());
		assert!(f.proxy.lookup("/admin", &Method::GET).is_none());

		f.proxy.rebuild(&chains());
		let matched = f.proxy.lookup("/admin/users", &Method::GET).unwrap();
		assert_eq!(matched.chain().name(), "admin");
		let names: Vec<_> = matched.iter().map(|s| s.name()).collect();
		assert_eq!(names, vec!["ssl", "noSessionContext", "roleFilter", "basicAuth"]);
	}

	#[test]
	fn retired_stages_are_destroyed_once() {
		let f = fixture();
		f.proxy.rebuild(&chains());

		let replacement = CountingStage::new("basicAuth");
		f.registry.register(replacement.clone());
		f.proxy.rebuild(&chains());

		// basicAuth was shared by both chains but is destroyed only once.
		assert_eq!(f.basic.destroyed(), 1);
		assert_eq!(f.role.destroyed(), 0);
		assert_eq!(replacement.destroyed(), 0);

		f.proxy.rebuild(&[]);
		assert_eq!(f.role.destroyed(), 1);
		assert_eq!(replacement.destroyed(), 1);
		assert_eq!(f.basic.destroyed(), 1);
	}

	#[test]
	fn removed_then_restored_chain_gets_no_destroyed_stage() {
		let f = fixture();
		let rest = vec![RequestFilterChain::new("rest", ["/rest/**"]).with_filters(["basicAuth"])];
		f.proxy.rebuild(&rest);
		f.proxy.rebuild(&[]);
		assert_eq!(f.basic.destroyed(), 1);

		let table = f.proxy.rebuild(&rest);
		assert_eq!(table.chains()[0].stage_names(), vec!["noSessionContext"]);

		let fresh = CountingStage::new("basicAuth");
		f.registry.register(fresh.clone());
		let table = f.proxy.rebuild(&rest);
		assert_eq!(
			table.chains()[0].stage_names(),
			vec!["noSessionContext", "basicAuth"]
		);

		f.proxy.rebuild(&[]);
		assert_eq!(f.basic.destroyed(), 1);
		assert_eq!(fresh.destroyed(), 1);
	}

	#[test]
	fn destroyed_stage_from_static_resolver_is_not_republished() {
		let basic = CountingStage::new("basicAuth");
		let mut stages: HashMap<String, Arc<dyn Stage>> = HashMap::new();
		stages.insert("noSessionContext".to_string(), Arc::new(SessionContextStage::new(false)));
		stages.insert("basicAuth".to_string(), basic.clone());
		let proxy = FilterChainProxy::new(Arc::new(stages));
		let rest = vec![RequestFilterChain::new("rest", ["/rest/**"]).with_filters(["basicAuth"])];

		proxy.rebuild(&rest);
		proxy.rebuild(&[]);
		let table = proxy.rebuild(&rest);
		assert!(table.chains()[0].stages().is_empty());

		proxy.rebuild(&[]);
		assert_eq!(basic.destroyed(), 1);
	}

	#[test]
	fn rebuild_clears_authentication_cache() {
		let f = fixture();
		f.cache.put(
			"basicAuth",
			"alice",
			CachedAuthentication::new("alice", vec![]),
			None,
			None,
		);
		f.proxy.rebuild(&chains());
		assert!(f.cache.is_empty());
	}

	#[test]
	fn matched_pipeline_outlives_rebuild() {
		let f = fixture();
		f.proxy.rebuild(&chains());
		let matched = f.proxy.lookup("/rest/layers", &Method::GET).unwrap();

		f.proxy.rebuild(&[]);
		assert!(f.proxy.lookup("/rest/layers", &Method::GET).is_none());
		assert_eq!(matched.len(), 2);
		assert_eq!(matched.chain().name(), "rest");
	}

	#[test]
	fn readers_see_whole_tables_during_rebuilds() {
		let f = fixture();
		let proxy = Arc::new(f.proxy);
		let with_admin = chains();
		let without_admin = vec![chains().remove(1)];
		proxy.rebuild(&with_admin);

		let readers: Vec<_> = (0..4)
			.map(|_| {
				let proxy = Arc::clone(&proxy);
				thread::spawn(move || {
					for _ in 0..500 {
						let table = proxy.table();
						let names: Vec<_> = table.chains().iter().map(|c| c.name()).collect();
						assert!(
							names == ["admin", "rest"] || names == ["rest"],
							"partial table observed: {names:?}"
						);
					}
				})
			})
			.collect();

		for i in 0..50 {
			if i % 2 == 0 {
				proxy.rebuild(&without_admin);
			} else {
				proxy.rebuild(&with_admin);
			}
		}

		for reader in readers {
			reader.join().unwrap();
		}
	}
}
