// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ant-style path patterns.
//!
//! - `?` matches one character other than `/`
//! - `*` matches any run of characters other than `/`
//! - `**` matches any number of whole path segments
//!
//! `/admin/**` therefore matches `/admin`, `/admin/` and `/admin/users/1`.

use regex::Regex;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone)]
pub struct PathMatcher {
	pattern: String,
	regex: Regex,
}

impl PathMatcher {
	pub fn compile(pattern: &str) -> Result<Self> {
		let pattern = pattern.trim();
		if pattern.is_empty() {
			return Err(invalid(pattern, "pattern is empty"));
		}
		let source = ant_to_regex(pattern)?;
		let regex = Regex::new(&source).map_err(|e| invalid(pattern, &e.to_string()))?;
		Ok(Self {
			pattern: pattern.to_string(),
			regex,
		})
	}

	/// Compiles every comma separated pattern of `patterns`. Blank entries
	/// are skipped.
	pub fn compile_list(patterns: &str) -> Vec<Result<Self>> {
		patterns
			.split(',')
			.map(str::trim)
			.filter(|p| !p.is_empty())
			.map(Self::compile)
			.collect()
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn matches(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}
}

fn invalid(pattern: &str, reason: &str) -> PipelineError {
	PipelineError::InvalidPattern {
		pattern: pattern.to_string(),
		reason: reason.to_string(),
	}
}

fn ant_to_regex(pattern: &str) -> Result<String> {
	let chars: Vec<char> = pattern.chars().collect();
	let mut out = String::with_capacity(pattern.len() * 2 + 2);
	out.push('^');

	let mut i = 0;
	while i < chars.len() {
		let at_segment_start = i == 0 || chars[i - 1] == '/';
		let double_star = chars[i] == '*' && chars.get(i + 1) == Some(&'*');

		if double_star {
			let at_segment_end = matches!(chars.get(i + 2), None | Some('/'));
			if !at_segment_start || !at_segment_end {
				return Err(invalid(pattern, "'**' must be a whole path segment"));
			}
			if i > 0 {
				// "/**" also matches the bare parent, so drop the separator
				// already emitted and make it part of the optional group.
				out.pop();
				out.push_str("(/.*)?");
			} else if chars.get(i + 2) == Some(&'/') {
				out.push_str("(.*/)?");
				i += 1;
			} else {
				out.push_str(".*");
			}
			i += 2;
			continue;
		}

		match chars[i] {
			'*' => out.push_str("[^/]*"),
			'?' => out.push_str("[^/]"),
			c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
		}
		i += 1;
	}

	out.push('$');
	Ok(out)
}
