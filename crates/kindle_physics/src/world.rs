//! # Physics World
//!
//! Owns every dynamic and static body. Stepping lives in [`crate::step`].

use std::fmt;
use std::rc::Rc;

use kindle_core::{fatal, Aabb, SlotPool, SlotStore, Vec2};
use tracing::{debug, warn};

use crate::body::{Body, BodyDesc, BodyId};
use crate::config::PhysicsConfig;
use crate::error::PhysicsResult;
use crate::filter::CollisionFilter;
use crate::handler::HitHandler;
use crate::static_body::{DebugBox, DebugBoxKind, StaticBody, StaticBodyId};

/// The set of bodies stepped together.
///
/// `C` is the context type handed to hit handlers, usually the struct
/// that owns this world (see [`PhysicsContext`](crate::PhysicsContext)).
pub struct PhysicsWorld<C> {
    pub(crate) config: PhysicsConfig,
    pub(crate) bodies: SlotPool<Body<C>>,
    pub(crate) statics: SlotStore<StaticBody>,
}

impl<C> PhysicsWorld<C> {
    /// Creates an empty world.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`](crate::PhysicsError::InvalidConfig)
    /// if `config` fails validation.
    pub fn new(config: PhysicsConfig) -> PhysicsResult<Self> {
        config.validate()?;
        debug!(
            gravity = config.gravity,
            terminal_velocity = config.terminal_velocity,
            iterations = config.iterations,
            "physics world created"
        );
        Ok(Self {
            config,
            bodies: SlotPool::new(),
            statics: SlotStore::new(),
        })
    }

    /// Returns the world's tunables.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // =========================================================================
    // DYNAMIC BODIES
    // =========================================================================

    /// Creates a dynamic body, reusing the lowest destroyed slot if any.
    ///
    /// Failing to grow the body store is fatal.
    pub fn create_body(&mut self, desc: BodyDesc<C>) -> BodyId {
        let body = desc.build();
        let aabb = body.aabb;
        let id = match self.bodies.insert(body) {
            Ok(slot) => BodyId::from_slot(slot),
            Err(err) => fatal(err),
        };
        debug!(index = id.index(), x = aabb.center.x, y = aabb.center.y, "body created");
        id
    }

    /// Creates a kinematic body that never moves on its own and reports
    /// overlapping bodies through `handler.on_dynamic_hit`.
    pub fn create_trigger(
        &mut self,
        position: Vec2,
        size: Vec2,
        filter: CollisionFilter,
        handler: Rc<dyn HitHandler<C>>,
    ) -> BodyId {
        self.create_body(
            BodyDesc::new(position, size)
                .filter(filter)
                .kinematic(true)
                .handler(handler),
        )
    }

    /// Gets a body, live or destroyed, if `id` still owns its slot.
    #[inline]
    #[must_use]
    pub fn body(&self, id: BodyId) -> Option<&Body<C>> {
        self.bodies.get(id.slot())
    }

    /// Gets a mutable body, live or destroyed, if `id` still owns its slot.
    #[inline]
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body<C>> {
        self.bodies.get_mut(id.slot())
    }

    /// Tombstones a body. Its data stays readable until the slot is reused.
    ///
    /// Returns `false` if the body was already destroyed or the id is stale.
    pub fn destroy_body(&mut self, id: BodyId) -> bool {
        let destroyed = self.bodies.destroy(id.slot());
        if destroyed {
            debug!(index = id.index(), "body destroyed");
        } else {
            warn!(index = id.index(), "destroy of inactive or stale body");
        }
        destroyed
    }

    /// Checks if `id` refers to a live body.
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: BodyId) -> bool {
        self.bodies.is_active(id.slot())
    }

    /// Number of body slots, including destroyed ones.
    #[inline]
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live bodies.
    #[inline]
    #[must_use]
    pub fn active_body_count(&self) -> usize {
        self.bodies.active_count()
    }

    /// Iterates over live bodies in slot order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body<C>)> {
        self.bodies
            .iter()
            .map(|(slot, body)| (BodyId::from_slot(slot), body))
    }

    pub(crate) fn active_body_at(&self, index: usize) -> Option<BodyId> {
        self.bodies.active_id_at(index).map(BodyId::from_slot)
    }

    // =========================================================================
    // STATIC BODIES
    // =========================================================================

    /// Adds a piece of level geometry.
    ///
    /// Failing to grow the static store is fatal.
    pub fn create_static_body(
        &mut self,
        position: Vec2,
        size: Vec2,
        filter: CollisionFilter,
    ) -> StaticBodyId {
        let aabb = Aabb::from_size(position, size);
        let index = match self.statics.push(StaticBody { aabb, filter }) {
            Ok(index) => index,
            Err(err) => fatal(err),
        };
        debug!(index, x = position.x, y = position.y, "static body created");
        StaticBodyId(index as u32)
    }

    /// Gets a static body.
    #[inline]
    #[must_use]
    pub fn static_body(&self, id: StaticBodyId) -> Option<&StaticBody> {
        self.statics.get(id.0 as usize)
    }

    /// Number of static bodies.
    #[inline]
    #[must_use]
    pub fn static_body_count(&self) -> usize {
        self.statics.len()
    }

    /// Iterates over static bodies in creation order.
    pub fn static_bodies(&self) -> impl Iterator<Item = (StaticBodyId, &StaticBody)> {
        self.statics
            .iter()
            .enumerate()
            .map(|(index, body)| (StaticBodyId(index as u32), body))
    }

    // =========================================================================
    // LEVEL LIFECYCLE
    // =========================================================================

    /// Drops every dynamic and static body. Capacity is kept.
    ///
    /// Body ids from before the reset never validate afterwards. Static ids
    /// are plain indices and must be discarded by the caller.
    pub fn reset(&mut self) {
        debug!(
            bodies = self.bodies.len(),
            statics = self.statics.len(),
            "physics world reset"
        );
        self.bodies.clear();
        self.statics.clear();
    }

    /// Outlines for debug drawing: every body slot, then every static body.
    #[must_use]
    pub fn debug_boxes(&self) -> Vec<DebugBox> {
        let mut boxes = Vec::with_capacity(self.bodies.len() + self.statics.len());
        for (_, active, body) in self.bodies.iter_all() {
            let kind = if active {
                DebugBoxKind::Active
            } else {
                DebugBoxKind::Inactive
            };
            boxes.push(DebugBox::new(body.aabb, kind));
        }
        for body in self.statics.iter() {
            boxes.push(DebugBox::new(body.aabb, DebugBoxKind::Static));
        }
        boxes
    }
}

impl<C> Default for PhysicsWorld<C> {
    fn default() -> Self {
        Self {
            config: PhysicsConfig::default(),
            bodies: SlotPool::new(),
            statics: SlotStore::new(),
        }
    }
}

impl<C> fmt::Debug for PhysicsWorld<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld")
            .field("config", &self.config)
            .field("bodies", &self.bodies.len())
            .field("active_bodies", &self.bodies.active_count())
            .field("statics", &self.statics.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PhysicsError;

    fn world() -> PhysicsWorld<()> {
        PhysicsWorld::new(PhysicsConfig::default()).unwrap()
    }

    fn unit_body(x: f32) -> BodyDesc<()> {
        BodyDesc::new(Vec2::new(x, 0.0), Vec2::new(1.0, 1.0))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = PhysicsConfig {
            iterations: 0,
            ..PhysicsConfig::default()
        };
        assert!(matches!(
            PhysicsWorld::<()>::new(config),
            Err(PhysicsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_destroy_keeps_data_until_reuse() {
        let mut world = world();
        let id = world.create_body(unit_body(5.0));

        assert!(world.destroy_body(id));
        assert!(!world.is_active(id));
        assert!(!world.destroy_body(id));
        assert_eq!(world.body(id).map(|b| b.aabb.center.x), Some(5.0));

        let reused = world.create_body(unit_body(9.0));
        assert_eq!(reused.index(), id.index());
        assert!(world.body(id).is_none());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_reuses_lowest_destroyed_slot() {
        let mut world = world();
        let ids: Vec<_> = (0..5).map(|i| world.create_body(unit_body(i as f32))).collect();

        world.destroy_body(ids[3]);
        world.destroy_body(ids[1]);

        assert_eq!(world.create_body(unit_body(0.0)).index(), 1);
        assert_eq!(world.create_body(unit_body(0.0)).index(), 3);
        assert_eq!(world.create_body(unit_body(0.0)).index(), 5);
        assert_eq!(world.active_body_count(), 6);
    }

    #[test]
    fn test_static_bodies_in_creation_order() {
        let mut world = world();
        let a = world.create_static_body(Vec2::ZERO, Vec2::new(10.0, 1.0), CollisionFilter::solid(1));
        let b = world.create_static_body(Vec2::new(0.0, 5.0), Vec2::new(1.0, 1.0), CollisionFilter::solid(2));

        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(world.static_body_count(), 2);
        assert_eq!(world.static_body(b).map(|s| s.filter.layer), Some(2));
        assert!(world.static_body(StaticBodyId(7)).is_none());

        let layers: Vec<_> = world
            .static_bodies()
            .map(|(id, body)| (id.index(), body.filter.layer))
            .collect();
        assert_eq!(layers, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_reset_invalidates_everything() {
        let mut world = world();
        let id = world.create_body(unit_body(0.0));
        world.create_static_body(Vec2::ZERO, Vec2::new(1.0, 1.0), CollisionFilter::solid(1));

        world.reset();

        assert!(world.body(id).is_none());
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.static_body_count(), 0);

        let fresh = world.create_body(unit_body(0.0));
        assert_eq!(fresh.index(), 0);
        assert_ne!(fresh, id);
    }

    #[test]
    fn test_debug_boxes_tag_kinds() {
        let mut world = world();
        let a = world.create_body(unit_body(0.0));
        world.create_body(unit_body(2.0));
        world.create_static_body(Vec2::ZERO, Vec2::new(4.0, 1.0), CollisionFilter::solid(1));
        world.destroy_body(a);

        let boxes = world.debug_boxes();
        assert_eq!(boxes.len(), 3);
        assert!(boxes[0].is(DebugBoxKind::Inactive));
        assert!(boxes[1].is(DebugBoxKind::Active));
        assert!(boxes[2].is(DebugBoxKind::Static));

        let floats: &[f32] = bytemuck::cast_slice(&boxes);
        assert_eq!(floats.len(), 15);
    }
}
