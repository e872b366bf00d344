// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pipeline stages and the resolver that maps configured names to them.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Name of the stage that rejects requests not received over TLS.
pub const SSL_STAGE: &str = "ssl";
/// Name of the stage that may create a session to persist the security context.
pub const SESSION_CONTEXT_STAGE: &str = "sessionContext";
/// Name of the stage that persists the security context only in existing sessions.
pub const NO_SESSION_CONTEXT_STAGE: &str = "noSessionContext";

/// One processing step of a request pipeline.
///
/// A stage instance may be shared by many chains.
pub trait Stage: Send + Sync + fmt::Debug {
	fn name(&self) -> &str;

	/// Releases resources held by the stage. Called at most once, when the
	/// stage leaves the published pipeline table.
	fn destroy(&self) {}
}

/// Looks up live stage instances by their configured name.
pub trait StageResolver: Send + Sync {
	fn resolve(&self, name: &str) -> Option<Arc<dyn Stage>>;

	/// Told that `stage` has been destroyed. It must not be resolved again.
	fn retire(&self, _stage: &Arc<dyn Stage>) {}
}

impl StageResolver for HashMap<String, Arc<dyn Stage>> {
	fn resolve(&self, name: &str) -> Option<Arc<dyn Stage>> {
		self.get(name).cloned()
	}
}

impl<T: StageResolver + ?Sized> StageResolver for Arc<T> {
	fn resolve(&self, name: &str) -> Option<Arc<dyn Stage>> {
		(**self).resolve(name)
	}

	fn retire(&self, stage: &Arc<dyn Stage>) {
		(**self).retire(stage)
	}
}

/// Rejects plain-text requests.
#[derive(Debug, Default)]
pub struct SslStage;

impl Stage for SslStage {
	fn name(&self) -> &str {
		SSL_STAGE
	}
}

/// Persists the security context between requests.
#[derive(Debug)]
pub struct SessionContextStage {
	allow_session_creation: bool,
}

impl SessionContextStage {
	pub fn new(allow_session_creation: bool) -> Self {
		Self {
			allow_session_creation,
		}
	}

	pub fn allows_session_creation(&self) -> bool {
		self.allow_session_creation
	}
}

impl Stage for SessionContextStage {
	fn name(&self) -> &str {
		if self.allow_session_creation {
			SESSION_CONTEXT_STAGE
		} else {
			NO_SESSION_CONTEXT_STAGE
		}
	}
}

/// Mutable name → stage registry.
///
/// [`StageRegistry::with_builtins`] pre-registers the SSL and session context
/// stages every compiled chain may reference. Retired built-ins are replaced
/// with fresh instances; any other retired stage is unregistered.
#[derive(Debug, Default)]
pub struct StageRegistry {
	stages: RwLock<HashMap<String, Arc<dyn Stage>>>,
}

impl StageRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_builtins() -> Self {
		let registry = Self::new();
		for name in [SSL_STAGE, SESSION_CONTEXT_STAGE, NO_SESSION_CONTEXT_STAGE] {
			if let Some(stage) = builtin(name) {
				registry.register(stage);
			}
		}
		registry
	}

	/// Registers `stage` under its own name, returning the stage it replaced.
	pub fn register(&self, stage: Arc<dyn Stage>) -> Option<Arc<dyn Stage>> {
		let name = stage.name().to_string();
		debug!(stage = %name, "registering pipeline stage");
		self.stages.write().insert(name, stage)
	}

	pub fn unregister(&self, name: &str) -> Option<Arc<dyn Stage>> {
		self.stages.write().remove(name)
	}

	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<_> = self.stages.read().keys().cloned().collect();
		names.sort();
		names
	}
}

impl StageResolver for StageRegistry {
	fn resolve(&self, name: &str) -> Option<Arc<dyn Stage>> {
		self.stages.read().get(name).cloned()
	}

	fn retire(&self, stage: &Arc<dyn Stage>) {
		let mut stages = self.stages.write();
		let name = stage.name();
		let registered = stages
			.get(name)
			.is_some_and(|current| stage_id(current) == stage_id(stage));
		if !registered {
			return;
		}
		match builtin(name) {
			Some(fresh) => {
				debug!(stage = %name, "replacing retired built-in stage");
				stages.insert(name.to_string(), fresh);
			}
			None => {
				debug!(stage = %name, "unregistering retired stage");
				stages.remove(name);
			}
		}
	}
}

fn builtin(name: &str) -> Option<Arc<dyn Stage>> {
	match name {
		SSL_STAGE => Some(Arc::new(SslStage)),
		SESSION_CONTEXT_STAGE => Some(Arc::new(SessionContextStage::new(true))),
		NO_SESSION_CONTEXT_STAGE => Some(Arc::new(SessionContextStage::new(false))),
		_ => None,
	}
}

/// Identity of a stage instance, for de-duplicating shared instances.
pub(crate) fn stage_id(stage: &Arc<dyn Stage>) -> *const () {
	Arc::as_ptr(stage) as *const ()
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtins_are_registered() {
		let registry = StageRegistry::with_builtins();
		assert_eq!(
			registry.names(),
			vec!["noSessionContext", "sessionContext", "ssl"]
		);
		let session = registry.resolve(SESSION_CONTEXT_STAGE).unwrap();
		assert_eq!(session.name(), SESSION_CONTEXT_STAGE);
	}

	#[test]
	fn register_replaces_by_name() {
		let registry = StageRegistry::new();
		let first: Arc<dyn Stage> = testing::CountingStage::new("basicAuth");
		let second: Arc<dyn Stage> = testing::CountingStage::new("basicAuth");

		assert!(registry.register(Arc::clone(&first)).is_none());
		let replaced = registry.register(Arc::clone(&second)).unwrap();
		assert_eq!(stage_id(&replaced), stage_id(&first));
		assert_eq!(
			stage_id(&registry.resolve("basicAuth").unwrap()),
			stage_id(&second)
		);

		registry.unregister("basicAuth");
		assert!(registry.resolve("basicAuth").is_none());
	}

	#[test]
	fn retire_unregisters_custom_stages() {
		let registry = StageRegistry::new();
		let stage: Arc<dyn Stage> = testing::CountingStage::new("basicAuth");
		registry.register(Arc::clone(&stage));

		registry.retire(&stage);
		assert!(registry.resolve("basicAuth").is_none());
	}

	#[test]
	fn retire_ignores_replaced_instances() {
		let registry = StageRegistry::new();
		let old: Arc<dyn Stage> = testing::CountingStage::new("basicAuth");
		let current: Arc<dyn Stage> = testing::CountingStage::new("basicAuth");
		registry.register(Arc::clone(&old));
		registry.register(Arc::clone(&current));

		registry.retire(&old);
		let resolved = registry.resolve("basicAuth").unwrap();
		assert_eq!(stage_id(&resolved), stage_id(&current));
	}

	#[test]
	fn retire_refreshes_builtins() {
		let registry = StageRegistry::with_builtins();
		let ssl = registry.resolve(SSL_STAGE).unwrap();

		registry.retire(&ssl);
		let fresh = registry.resolve(SSL_STAGE).unwrap();
		assert_ne!(stage_id(&fresh), stage_id(&ssl));
	}

	#[test]
	fn map_resolver() {
		let mut map: HashMap<String, Arc<dyn Stage>> = HashMap::new();
		map.insert("ssl".to_string(), Arc::new(SslStage));
		assert!(map.resolve("ssl").is_some());
		assert!(map.resolve("missing").is_none());
	}
}
