// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod brute_force;
mod filter_chains;
mod logging;

pub use brute_force::{
	default_whitelist, BruteForceConfig, BruteForceConfigLayer, DEFAULT_MAX_BLOCKED_THREADS,
	DEFAULT_MAX_DELAY_MS, DEFAULT_MIN_DELAY_MS,
};
pub use filter_chains::RequestFilterChain;
pub use logging::{LoggingConfig, LoggingConfigLayer};
