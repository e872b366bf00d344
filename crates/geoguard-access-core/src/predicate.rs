// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Read and write filter predicates.
//!
//! The filter language itself lives outside this crate. A [`Predicate`] either
//! is one of the two sentinels ([`Predicate::Always`], [`Predicate::Never`]),
//! an opaque pre-encoded expression, or a conjunction of predicates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A filter over catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
	/// Matches everything (no restriction).
	Always,
	/// Matches nothing (full denial).
	Never,
	/// An opaque filter expression supplied by the filter library.
	Expr(Arc<str>),
	/// Logical AND of the parts. Never empty, never nested.
	And(Arc<[Predicate]>),
}

impl Predicate {
	/// Creates an opaque expression predicate.
	pub fn expr(text: impl Into<Arc<str>>) -> Self {
		Predicate::Expr(text.into())
	}

	pub fn is_always(&self) -> bool {
		matches!(self, Predicate::Always)
	}

	pub fn is_never(&self) -> bool {
		matches!(self, Predicate::Never)
	}

	/// Conjunction of two predicates.
	///
	/// `Never` absorbs, `Always` is the identity, and nested conjunctions are
	/// flattened so the result stays a single level deep.
	pub fn and(self, other: Predicate) -> Predicate {
		match (self, other) {
			(Predicate::Never, _) | (_, Predicate::Never) => Predicate::Never,
			(Predicate::Always, p) | (p, Predicate::Always) => p,
			(a, b) => {
				let mut parts = Vec::new();
				a.push_parts(&mut parts);
				b.push_parts(&mut parts);
				Predicate::And(parts.into())
			}
		}
	}

	/// Conjunction of any number of predicates. An empty input yields `Always`.
	pub fn and_all(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
		predicates
			.into_iter()
			.fold(Predicate::Always, |acc, p| acc.and(p))
	}

	fn push_parts(self, parts: &mut Vec<Predicate>) {
		match self {
			Predicate::And(inner) => parts.extend(inner.iter().cloned()),
			other => parts.push(other),
		}
	}
}

impl Default for Predicate {
	fn default() -> Self {
		Predicate::Always
	}
}

impl fmt::Display for Predicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Predicate::Always => write!(f, "INCLUDE"),
			Predicate::Never => write!(f, "EXCLUDE"),
			Predicate::Expr(text) => write!(f, "{text}"),
			Predicate::And(parts) => {
				for (i, part) in parts.iter().enumerate() {
					if i > 0 {
						write!(f, " AND ")?;
					}
					write!(f, "({part})")?;
				}
				Ok(())
			}
		}
	}
}
