// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request filter chain declarations.
//!
//! Chains are declared in the config file only:
//!
//! ```toml
//! [[filter_chains]]
//! name = "admin"
//! patterns = ["/admin/**"]
//! require_ssl = true
//! role_filter_name = "roleFilter"
//! filter_names = ["basicAuth"]
//! ```

use serde::{Deserialize, Serialize};

/// One declared request filter chain.
///
/// Each entry of `patterns` may itself hold several comma separated ant-style
/// path patterns. `http_methods` is only consulted when `match_http_method`
/// is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestFilterChain {
	pub name: String,
	#[serde(default)]
	pub patterns: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub http_methods: Option<Vec<String>>,
	#[serde(default)]
	pub match_http_method: bool,
	#[serde(default)]
	pub disabled: bool,
	#[serde(default)]
	pub allow_session_creation: bool,
	#[serde(default)]
	pub require_ssl: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role_filter_name: Option<String>,
	#[serde(default)]
	pub filter_names: Vec<String>,
}

impl RequestFilterChain {
	pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			name: name.into(),
			patterns: patterns.into_iter().map(Into::into).collect(),
			..Default::default()
		}
	}

	/// Restricts the chain to the given methods and turns method matching on.
	pub fn with_http_methods<I, S>(mut self, methods: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.http_methods = Some(methods.into_iter().map(Into::into).collect());
		self.match_http_method = true;
		self
	}

	pub fn with_disabled(mut self, disabled: bool) -> Self {
		self.disabled = disabled;
		self
	}

	pub fn with_session_creation(mut self, allowed: bool) -> Self {
		self.allow_session_creation = allowed;
		self
	}

	pub fn with_require_ssl(mut self, required: bool) -> Self {
		self.require_ssl = required;
		self
	}

	pub fn with_role_filter(mut self, name: impl Into<String>) -> Self {
		self.role_filter_name = Some(name.into());
		self
	}

	pub fn with_filters<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.filter_names = names.into_iter().map(Into::into).collect();
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Deserialize)]
	struct Doc {
		filter_chains: Vec<RequestFilterChain>,
	}

	#[test]
	fn test_deserialize_minimal_chain() {
		let doc: Doc = toml::from_str(
			r#"
[[filter_chains]]
name = "web"
patterns = ["/web/**,/gwc/rest/web/**"]
"#,
		)
		.unwrap();
		let chain = &doc.filter_chains[0];
		assert_eq!(chain.name, "web");
		assert_eq!(chain.patterns, vec!["/web/**,/gwc/rest/web/**"]);
		assert!(!chain.disabled);
		assert!(!chain.require_ssl);
		assert!(!chain.match_http_method);
		assert!(chain.role_filter_name.is_none());
		assert!(chain.filter_names.is_empty());
	}

	#[test]
	fn test_deserialize_full_chain() {
		let doc: Doc = toml::from_str(
			r#"
[[filter_chains]]
name = "rest"
patterns = ["/rest/**"]
http_methods = ["GET", "POST"]
match_http_method = true
allow_session_creation = true
require_ssl = true
role_filter_name = "roleFilter"
filter_names = ["basicAuth", "anonymous"]
"#,
		)
		.unwrap();
		let expected = RequestFilterChain::new("rest", ["/rest/**"])
			.with_http_methods(["GET", "POST"])
			.with_session_creation(true)
			.with_require_ssl(true)
			.with_role_filter("roleFilter")
			.with_filters(["basicAuth", "anonymous"]);
		assert_eq!(doc.filter_chains[0], expected);
	}

	#[test]
	fn test_with_http_methods_enables_matching() {
		let chain = RequestFilterChain::new("x", ["/x"]).with_http_methods(["PUT"]);
		assert!(chain.match_http_method);
		assert_eq!(chain.http_methods, Some(vec!["PUT".to_string()]));
	}
}
