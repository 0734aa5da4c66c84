//! # Static Bodies
//!
//! Level geometry. Never moves, never destroyed individually; the whole set
//! is dropped on world reset.

use bytemuck::{Pod, Zeroable};
use kindle_core::Aabb;

use crate::filter::CollisionFilter;

/// Handle to a static body, valid until the next world reset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticBodyId(pub(crate) u32);

impl StaticBodyId {
    /// Returns the creation-order index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A solid box that bodies collide with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticBody {
    /// Bounds.
    pub aabb: Aabb,
    /// Layer and mask.
    pub filter: CollisionFilter,
}

/// Kind tag for a [`DebugBox`].
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugBoxKind {
    /// Live dynamic body.
    Active = 0,
    /// Tombstoned dynamic body.
    Inactive = 1,
    /// Static body.
    Static = 2,
}

/// Outline a renderer draws in debug mode.
///
/// `Pod`, so a frame's boxes can be uploaded with `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DebugBox {
    /// Bounds.
    pub aabb: Aabb,
    /// A [`DebugBoxKind`] as `u32`.
    pub kind: u32,
}

impl DebugBox {
    /// Creates a debug box.
    #[must_use]
    pub const fn new(aabb: Aabb, kind: DebugBoxKind) -> Self {
        Self {
            aabb,
            kind: kind as u32,
        }
    }

    /// Returns true if this outlines a body of `kind`.
    #[must_use]
    pub const fn is(&self, kind: DebugBoxKind) -> bool {
        self.kind == kind as u32
    }
}
