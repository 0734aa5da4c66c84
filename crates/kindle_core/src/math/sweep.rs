//! # Swept Collision
//!
//! Slab-method segment-vs-box test. Box-vs-box sweeps are reduced to a
//! point sweep by growing the target by the moving box's half-extents
//! (see [`Aabb::expanded_by`]).

use super::{Aabb, Vec2};

/// Result of a sweep that made contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Time of impact as a fraction of the displacement.
    ///
    /// Below 1. May be negative when the origin already starts inside the
    /// target.
    pub time: f32,
    /// Origin advanced to the time of impact.
    pub position: Vec2,
    /// Axis-aligned contact normal. At most one component is non-zero.
    pub normal: Vec2,
}

/// Sweeps the point `origin` along `displacement` against `target`.
///
/// A zero displacement component only passes when the origin lies strictly
/// inside `target` on that axis. Otherwise the slab entry and exit times
/// are intersected across both axes, and the segment hits when it leaves
/// the box after entering it, exits after `t = 0` and enters before
/// `t = 1`.
///
/// # Arguments
///
/// * `origin` - Centre of the moving box
/// * `displacement` - Motion over the step
/// * `target` - Obstacle grown by the moving box's half-extents
///
/// # Returns
///
/// The earliest contact, or `None` if the segment misses.
///
/// # Example
///
/// ```rust,ignore
/// let grown = floor.expanded_by(body.half_extents);
/// if let Some(hit) = sweep(body.center, velocity * dt, &grown) {
///     body.center = hit.position;
/// }
/// ```
#[must_use]
pub fn sweep(origin: Vec2, displacement: Vec2, target: &Aabb) -> Option<Hit> {
    let min = target.min();
    let max = target.max();

    let mut last_entry = f32::NEG_INFINITY;
    let mut first_exit = f32::INFINITY;

    for axis in 0..2 {
        let d = displacement.axis(axis);
        let o = origin.axis(axis);
        let (lo, hi) = (min.axis(axis), max.axis(axis));

        if d == 0.0 {
            if o <= lo || o >= hi {
                return None;
            }
            continue;
        }

        let t1 = (lo - o) / d;
        let t2 = (hi - o) / d;
        last_entry = last_entry.max(t1.min(t2));
        first_exit = first_exit.min(t1.max(t2));
    }

    if !(first_exit > last_entry && first_exit > 0.0 && last_entry < 1.0) {
        return None;
    }

    // Stationary origin strictly inside: neither axis constrained entry.
    let (time, position) = if last_entry == f32::NEG_INFINITY {
        (0.0, origin)
    } else {
        (last_entry, origin + displacement * last_entry)
    };

    let offset = position - target.center;
    let clearance = target.half_extents - offset.abs();
    let sign = offset.sign();
    let normal = if clearance.x < clearance.y {
        Vec2::new(sign.x, 0.0)
    } else {
        Vec2::new(0.0, sign.y)
    };

    Some(Hit {
        time,
        position,
        normal,
    })
}
