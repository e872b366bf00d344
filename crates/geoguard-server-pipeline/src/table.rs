// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Compilation of declared filter chains into an immutable lookup table.

use geoguard_server_config::RequestFilterChain;
use http::Method;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::error::PipelineError;
use crate::matcher::PathMatcher;
use crate::stage::{
	stage_id, Stage, StageResolver, NO_SESSION_CONTEXT_STAGE, SESSION_CONTEXT_STAGE, SSL_STAGE,
};

/// A filter chain ready to serve requests.
#[derive(Debug, Clone)]
pub struct CompiledChain {
	name: String,
	matchers: Vec<PathMatcher>,
	methods: Option<HashSet<Method>>,
	stages: Vec<Arc<dyn Stage>>,
}

impl CompiledChain {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn stages(&self) -> &[Arc<dyn Stage>] {
		&self.stages
	}

	pub fn stage_names(&self) -> Vec<&str> {
		self.stages.iter().map(|s| s.name()).collect()
	}

	pub fn matchers(&self) -> &[PathMatcher] {
		&self.matchers
	}

	/// True if any path pattern matches and, when method matching is on,
	/// the method is one of the configured ones.
	pub fn matches(&self, path: &str, method: &Method) -> bool {
		self.matchers.iter().any(|m| m.matches(path))
			&& self
				.methods
				.as_ref()
				.map_or(true, |methods| methods.contains(method))
	}
}

/// Immutable snapshot of every compiled chain, in declared order.
#[derive(Debug, Clone, Default)]
pub struct PipelineTable {
	chains: Vec<CompiledChain>,
}

impl PipelineTable {
	pub fn chains(&self) -> &[CompiledChain] {
		&self.chains
	}

	pub fn len(&self) -> usize {
		self.chains.len()
	}

	pub fn is_empty(&self) -> bool {
		self.chains.is_empty()
	}

	/// The first chain matching the request.
	pub fn lookup_chain(&self, path: &str, method: &Method) -> Option<&CompiledChain> {
		self.chains.iter().find(|chain| chain.matches(path, method))
	}

	/// Stages of the first chain matching the request. A matching disabled
	/// chain yields an empty slice.
	pub fn lookup(&self, path: &str, method: &Method) -> Option<&[Arc<dyn Stage>]> {
		self.lookup_chain(path, method).map(CompiledChain::stages)
	}

	/// Every distinct stage instance referenced by the table, in first-use order.
	pub fn unique_stages(&self) -> Vec<Arc<dyn Stage>> {
		let mut seen = HashSet::new();
		self.chains
			.iter()
			.flat_map(|chain| chain.stages.iter())
			.filter(|stage| seen.insert(stage_id(stage)))
			.cloned()
			.collect()
	}

	pub(crate) fn contains_stage(&self, stage: &Arc<dyn Stage>) -> bool {
		let id = stage_id(stage);
		self.chains
			.iter()
			.flat_map(|chain| chain.stages.iter())
			.any(|s| stage_id(s) == id)
	}
}

/// Compiles the declared chains, in order, against `resolver`.
///
/// Problems never fail the whole table: unresolved stages, bad patterns and
/// unknown methods are logged and left out of their chain.
#[instrument(level = "debug", skip_all, fields(chains = chains.len()))]
pub fn compile(chains: &[RequestFilterChain], resolver: &dyn StageResolver) -> PipelineTable {
	let chains = chains
		.iter()
		.map(|chain| compile_chain(chain, resolver))
		.collect();
	PipelineTable { chains }
}

fn compile_chain(chain: &RequestFilterChain, resolver: &dyn StageResolver) -> CompiledChain {
	let matchers = chain
		.patterns
		.iter()
		.flat_map(|patterns| PathMatcher::compile_list(patterns))
		.filter_map(|compiled| match compiled {
			Ok(matcher) => Some(matcher),
			Err(e) => {
				error!(chain = %chain.name, error = %e, "dropping invalid path pattern");
				None
			}
		})
		.collect();

	let methods = chain
		.match_http_method
		.then(|| chain.http_methods.as_ref())
		.flatten()
		.map(|methods| parse_methods(&chain.name, methods));

	let stages = if chain.disabled {
		debug!(chain = %chain.name, "filter chain disabled, no stages");
		Vec::new()
	} else {
		stage_names(chain)
			.into_iter()
			.filter_map(|name| {
				let stage = resolver.resolve(name);
				if stage.is_none() {
					error!(chain = %chain.name, stage = %name, "unresolved pipeline stage dropped");
				}
				stage
			})
			.collect()
	};

	let compiled = CompiledChain {
		name: chain.name.clone(),
		matchers,
		methods,
		stages,
	};
	debug!(
		chain = %compiled.name,
		stages = ?compiled.stage_names(),
		"compiled filter chain"
	);
	compiled
}

/// The stage names a chain asks for, before resolution.
pub fn stage_names(chain: &RequestFilterChain) -> Vec<&str> {
	if chain.disabled {
		return Vec::new();
	}

	let mut names = Vec::with_capacity(chain.filter_names.len() + 3);
	if chain.require_ssl {
		names.push(SSL_STAGE);
	}
	names.push(if chain.allow_session_creation {
		SESSION_CONTEXT_STAGE
	} else {
		NO_SESSION_CONTEXT_STAGE
	});
	if let Some(role_filter) = chain
		.role_filter_name
		.as_deref()
		.map(str::trim)
		.filter(|n| !n.is_empty())
	{
		names.push(role_filter);
	}
	names.extend(chain.filter_names.iter().map(String::as_str));
	names
}

fn parse_methods(chain: &str, methods: &[String]) -> HashSet<Method> {
	methods
		.iter()
		.filter_map(|method| {
			let parsed = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
				.map_err(|_| PipelineError::InvalidMethod {
					method: method.clone(),
				});
			match parsed {
				Ok(method) => Some(method),
				Err(e) => {
					error!(chain = %chain, error = %e, "dropping invalid HTTP method");
					None
				}
			}
		})
		.collect()
}
