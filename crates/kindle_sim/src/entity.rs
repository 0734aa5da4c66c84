//! # Entity Manager
//!
//! Game objects. An entity owns exactly one physics body and at most one
//! animation instance, both by id. Destroying an entity destroys its body
//! in the same call; the two share a lifetime.
//!
//! Animation instances are NOT destroyed with their entity. Several
//! entities may show the same instance, so the caller that created it
//! decides when it stops.

use std::fmt;
use std::rc::Rc;

use kindle_core::{fatal, SlotPool};
use kindle_physics::{BodyDesc, BodyId, CollisionFilter, HitHandler, PhysicsWorld, Vec2};
use tracing::{debug, warn};

use crate::animation::AnimationId;

kindle_core::slot_handle! {
    /// Handle to an [`Entity`].
    EntityId
}

/// A game object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    /// Owned physics body.
    pub body: BodyId,
    /// Animation shown for this entity, if any.
    pub animation: Option<AnimationId>,
    /// Sprite position relative to the body centre.
    pub sprite_offset: Vec2,
    /// Facing left.
    pub flipped: bool,
    /// Seconds the entity lives for. Zero or less never expires.
    pub lifetime: f32,
    /// Seconds lived so far.
    pub age: f64,
    /// Damage the entity can take before it is destroyed.
    pub health: u32,
    /// Game-specific variant flag.
    pub enraged: bool,
}

/// Parameters for [`EntityManager::create`].
///
/// # Example
///
/// ```rust,ignore
/// let bullet = entities.create(
///     &mut physics,
///     EntityDesc::new(muzzle, Vec2::new(5.0, 5.0))
///         .velocity(Vec2::new(700.0, 0.0))
///         .kinematic(true)
///         .filter(CollisionFilter::new(PROJECTILE, ENEMY | TERRAIN))
///         .handler(projectile_handler.clone())
///         .lifetime(0.2),
/// );
/// ```
pub struct EntityDesc<C> {
    body: BodyDesc<C>,
    /// Sprite position relative to the body centre.
    pub sprite_offset: Vec2,
    /// Animation shown for this entity.
    pub animation: Option<AnimationId>,
    /// Facing left.
    pub flipped: bool,
    /// Seconds until expiry, zero or less for never.
    pub lifetime: f32,
    /// Starting health.
    pub health: u32,
    /// Game-specific variant flag.
    pub enraged: bool,
}

impl<C> EntityDesc<C> {
    /// Describes an entity whose body is centred at `position`.
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            body: BodyDesc::new(position, size),
            sprite_offset: Vec2::ZERO,
            animation: None,
            flipped: false,
            lifetime: 0.0,
            health: 1,
            enraged: false,
        }
    }

    /// Sets the initial body velocity.
    #[must_use]
    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.body = self.body.velocity(velocity);
        self
    }

    /// Sets the per-frame body acceleration.
    #[must_use]
    pub fn acceleration(mut self, acceleration: Vec2) -> Self {
        self.body = self.body.acceleration(acceleration);
        self
    }

    /// Sets the body's layer and mask.
    #[must_use]
    pub fn filter(mut self, filter: CollisionFilter) -> Self {
        self.body = self.body.filter(filter);
        self
    }

    /// Makes the body ignore gravity.
    #[must_use]
    pub fn kinematic(mut self, kinematic: bool) -> Self {
        self.body = self.body.kinematic(kinematic);
        self
    }

    /// Attaches a hit handler to the body.
    #[must_use]
    pub fn handler(mut self, handler: Rc<dyn HitHandler<C>>) -> Self {
        self.body = self.body.handler(handler);
        self
    }

    /// Sets the sprite offset.
    #[must_use]
    pub fn sprite_offset(mut self, offset: Vec2) -> Self {
        self.sprite_offset = offset;
        self
    }

    /// Shows `animation` for this entity.
    #[must_use]
    pub fn animation(mut self, animation: AnimationId) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Sets the facing flag.
    #[must_use]
    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    /// Expires the entity after `seconds`.
    #[must_use]
    pub fn lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = seconds;
        self
    }

    /// Sets starting health.
    #[must_use]
    pub fn health(mut self, health: u32) -> Self {
        self.health = health;
        self
    }

    /// Sets the variant flag.
    #[must_use]
    pub fn enraged(mut self, enraged: bool) -> Self {
        self.enraged = enraged;
        self
    }
}

impl<C> fmt::Debug for EntityDesc<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDesc")
            .field("body", &self.body)
            .field("sprite_offset", &self.sprite_offset)
            .field("animation", &self.animation)
            .field("flipped", &self.flipped)
            .field("lifetime", &self.lifetime)
            .field("health", &self.health)
            .field("enraged", &self.enraged)
            .finish()
    }
}

/// Owns every entity record.
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: SlotPool<Entity>,
}

impl EntityManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the entity's body, then the entity, and links the body back
    /// to it.
    ///
    /// Failing to grow either store is fatal.
    pub fn create<C>(&mut self, physics: &mut PhysicsWorld<C>, desc: EntityDesc<C>) -> EntityId {
        let body = physics.create_body(desc.body);
        let entity = Entity {
            body,
            animation: desc.animation,
            sprite_offset: desc.sprite_offset,
            flipped: desc.flipped,
            lifetime: desc.lifetime,
            age: 0.0,
            health: desc.health,
            enraged: desc.enraged,
        };

        let id = match self.entities.insert(entity) {
            Ok(slot) => EntityId::from_slot(slot),
            Err(err) => fatal(err),
        };
        if let Some(body) = physics.body_mut(body) {
            body.owner = Some(id.slot());
        }

        debug!(index = id.index(), body = body.index(), "entity created");
        id
    }

    /// Gets an entity, live or destroyed, if `id` still owns its slot.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.slot())
    }

    /// Gets a mutable entity, live or destroyed, if `id` still owns its slot.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.slot())
    }

    /// Checks if `id` refers to a live entity.
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: EntityId) -> bool {
        self.entities.is_active(id.slot())
    }

    /// Returns the number of entity slots, live or destroyed.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.entities.active_count()
    }

    /// Iterates over live entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities
            .iter()
            .map(|(slot, entity)| (EntityId::from_slot(slot), entity))
    }

    /// Destroys an entity together with its body.
    ///
    /// Returns `false` if the entity was already destroyed or the id is
    /// stale.
    pub fn destroy<C>(&mut self, physics: &mut PhysicsWorld<C>, id: EntityId) -> bool {
        let Some(body) = self.live(id).map(|entity| entity.body) else {
            warn!(index = id.index(), "destroy of inactive or stale entity");
            return false;
        };

        physics.destroy_body(body);
        self.entities.destroy(id.slot());
        debug!(index = id.index(), "entity destroyed");
        true
    }

    /// Subtracts `amount` from the entity's health, destroying it once the
    /// damage reaches what is left.
    ///
    /// # Returns
    ///
    /// `true` if this call destroyed the entity.
    pub fn damage<C>(&mut self, physics: &mut PhysicsWorld<C>, id: EntityId, amount: u32) -> bool {
        let Some(health) = self.live(id).map(|entity| entity.health) else {
            return false;
        };

        if amount >= health {
            return self.destroy(physics, id);
        }
        if let Some(entity) = self.entities.get_mut(id.slot()) {
            entity.health = health - amount;
        }
        false
    }

    /// Finds the live entity that owns `body`.
    #[must_use]
    pub fn owner_of<C>(&self, physics: &PhysicsWorld<C>, body: BodyId) -> Option<EntityId> {
        if !physics.is_active(body) {
            return None;
        }
        let owner = EntityId::from_slot(physics.body(body)?.owner?);
        self.live(owner)
            .filter(|entity| entity.body == body)
            .map(|_| owner)
    }

    /// Ages every mortal entity by `dt`.
    ///
    /// An entity is destroyed on the frame its summed deltas first reach
    /// its lifetime, before the new age is stored.
    ///
    /// # Returns
    ///
    /// The number of entities that expired.
    pub fn expire<C>(&mut self, physics: &mut PhysicsWorld<C>, dt: f32) -> usize {
        let mut expired = 0;

        for index in 0..self.entities.len() {
            let Some(slot) = self.entities.active_id_at(index) else {
                continue;
            };
            let id = EntityId::from_slot(slot);
            let Some(entity) = self.entities.get_mut(slot) else {
                continue;
            };
            if entity.lifetime <= 0.0 {
                continue;
            }

            let age = entity.age + f64::from(dt);
            if age >= expiry_threshold(entity.lifetime) {
                self.destroy(physics, id);
                expired += 1;
            } else {
                entity.age = age;
            }
        }

        expired
    }

    /// Drops every entity at once.
    ///
    /// Bodies are left alone; pair this with
    /// [`PhysicsWorld::reset`] so no body outlives its owner.
    pub fn reset(&mut self) {
        self.entities.clear();
        debug!("entities reset");
    }

    fn live(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(id.slot())
            .filter(|_| self.entities.is_active(id.slot()))
    }
}

/// Age at which `lifetime` counts as reached.
///
/// Each frame delta is an `f32` rounded from `1 / frame_rate`, so a sum of
/// deltas can fall short of the lifetime by up to one `f32` epsilon
/// relative to it.
fn expiry_threshold(lifetime: f32) -> f64 {
    f64::from(lifetime) * (1.0 - f64::from(f32::EPSILON))
}
