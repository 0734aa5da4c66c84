//! # Axis-Aligned Bounding Box
//!
//! Boxes are stored as centre plus half-extents. Box-vs-box questions are
//! reduced to origin-vs-box questions through the Minkowski difference.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::Vec2;

/// Axis-Aligned Bounding Box.
///
/// Half-extents are never negative.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Aabb {
    /// Centre of the box.
    pub center: Vec2,
    /// Half width and half height.
    pub half_extents: Vec2,
}

impl Aabb {
    /// Creates a box from its centre and half-extents.
    #[must_use]
    pub const fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Creates a box from its centre and full size.
    #[must_use]
    pub fn from_size(center: Vec2, size: Vec2) -> Self {
        Self::new(center, size * 0.5)
    }

    /// Bottom-left corner.
    #[inline]
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    /// Top-right corner.
    #[inline]
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Full width and height.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    /// Minkowski difference `a - b`.
    ///
    /// The result contains the origin exactly when `a` and `b` overlap.
    /// Its [`penetration_vector`](Self::penetration_vector) is the shift that
    /// moves `b` out of `a`.
    #[inline]
    #[must_use]
    pub fn minkowski_difference(a: &Self, b: &Self) -> Self {
        Self::new(a.center - b.center, a.half_extents + b.half_extents)
    }

    /// Returns true if the boxes overlap or touch.
    ///
    /// Boxes sharing an edge count as overlapping.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        Self::minkowski_difference(self, other).contains_point(Vec2::ZERO)
    }

    /// Returns true if the boxes share interior area.
    ///
    /// Unlike [`overlaps`](Self::overlaps), touching boxes do not penetrate.
    #[must_use]
    pub fn penetrates(&self, other: &Self) -> bool {
        let diff = Self::minkowski_difference(self, other);
        let min = diff.min();
        let max = diff.max();
        min.x < 0.0 && max.x > 0.0 && min.y < 0.0 && max.y > 0.0
    }

    /// Returns true if the point lies inside or on the boundary.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Returns this box with `extra` added to its half-extents.
    ///
    /// Sweeping a box of half-extents `h` against `target` is the same as
    /// sweeping its centre point against `target.expanded_by(h)`.
    #[must_use]
    pub fn expanded_by(&self, extra: Vec2) -> Self {
        Self::new(self.center, self.half_extents + extra)
    }

    /// Returns this box moved by `delta`.
    #[must_use]
    pub fn translate(&self, delta: Vec2) -> Self {
        Self::new(self.center + delta, self.half_extents)
    }

    /// Shortest axis-aligned shift that moves the origin onto this box's
    /// boundary.
    ///
    /// Meant for Minkowski differences that contain the origin. Candidates
    /// are evaluated min-x, max-x, min-y, max-y, and each later candidate
    /// replaces the current one only if it is strictly shorter, so equal
    /// penetrations resolve on the earliest candidate.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let diff = Aabb::minkowski_difference(&wall, &body);
    /// if diff.contains_point(Vec2::ZERO) {
    ///     body.center += diff.penetration_vector();
    /// }
    /// ```
    #[must_use]
    pub fn penetration_vector(&self) -> Vec2 {
        let min = self.min();
        let max = self.max();

        let mut min_dist = min.x.abs();
        let mut result = Vec2::new(min.x, 0.0);

        if max.x.abs() < min_dist {
            min_dist = max.x.abs();
            result = Vec2::new(max.x, 0.0);
        }

        if min.y.abs() < min_dist {
            min_dist = min.y.abs();
            result = Vec2::new(0.0, min.y);
        }

        if max.y.abs() < min_dist {
            result = Vec2::new(0.0, max.y);
        }

        result
    }
}
