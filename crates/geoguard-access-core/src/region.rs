// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Regions of interest.

use geo::{Area, BooleanOps, Coord, MultiPolygon, Polygon, Rect};

/// A planar multi-polygon used to clip or constrain spatial reads.
#[derive(Debug, Clone, PartialEq)]
pub struct Region(MultiPolygon<f64>);

impl Region {
	pub fn new(geometry: MultiPolygon<f64>) -> Self {
		Self(geometry)
	}

	/// Axis-aligned rectangle, mostly useful for bounding-box rules.
	pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
		let rect = Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y });
		Self::from(rect.to_polygon())
	}

	/// A region with no area at all.
	pub fn empty() -> Self {
		Self(MultiPolygon::new(Vec::new()))
	}

	/// Geometric intersection. The overlay result is already split into simple
	/// polygon parts, which become the parts of the returned region.
	pub fn intersection(&self, other: &Region) -> Region {
		let parts: Vec<Polygon<f64>> = self
			.0
			.intersection(&other.0)
			.into_iter()
			.filter(|p| p.unsigned_area() > 0.0)
			.collect();
		Region(MultiPolygon::new(parts))
	}

	/// True when the region covers no area.
	pub fn is_empty(&self) -> bool {
		self.0 .0.is_empty() || self.0.unsigned_area() == 0.0
	}

	pub fn parts(&self) -> &[Polygon<f64>] {
		&self.0 .0
	}

	pub fn area(&self) -> f64 {
		self.0.unsigned_area()
	}

	pub fn as_multi_polygon(&self) -> &MultiPolygon<f64> {
		&self.0
	}
}

impl From<Polygon<f64>> for Region {
	fn from(polygon: Polygon<f64>) -> Self {
		Self(MultiPolygon::new(vec![polygon]))
	}
}

impl From<MultiPolygon<f64>> for Region {
	fn from(geometry: MultiPolygon<f64>) -> Self {
		Self(geometry)
	}
}
