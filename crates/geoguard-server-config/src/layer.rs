// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The partial configuration produced by every source.

use serde::{Deserialize, Serialize};

use crate::sections::{BruteForceConfigLayer, LoggingConfigLayer, RequestFilterChain};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SecurityConfigLayer {
	pub brute_force: Option<BruteForceConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
	/// Replaced as a whole by a later layer, never merged chain by chain.
	pub filter_chains: Option<Vec<RequestFilterChain>>,
}

impl SecurityConfigLayer {
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.brute_force, other.brute_force, BruteForceConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		if other.filter_chains.is_some() {
			self.filter_chains = other.filter_chains;
		}
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	match base {
		Some(current) => merge(current, other),
		None => *base = Some(other),
	}
}
