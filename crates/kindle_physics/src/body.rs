//! # Dynamic Bodies
//!
//! Moving boxes: integrated, swept and resolved every frame.

use std::fmt;
use std::ops::BitOr;
use std::rc::Rc;

use kindle_core::{Aabb, SlotId, Vec2};

use crate::filter::CollisionFilter;
use crate::handler::HitHandler;

kindle_core::slot_handle! {
    /// Handle to a dynamic body in a [`PhysicsWorld`](crate::PhysicsWorld).
    BodyId
}

/// Sides of a body that were blocked by static geometry this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContactFlags(u8);

impl ContactFlags {
    /// No contact.
    pub const NONE: Self = Self(0);
    /// Blocked on the left side.
    pub const LEFT: Self = Self(1 << 0);
    /// Blocked on the right side.
    pub const RIGHT: Self = Self(1 << 1);
    /// Blocked from above.
    pub const UP: Self = Self(1 << 2);
    /// Blocked from below. Set while standing on the ground.
    pub const DOWN: Self = Self(1 << 3);

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Checks if every flag in `flag` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) == flag.0 && flag.0 != 0
    }

    /// Returns true if no flag is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Combines two flag sets.
    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    /// Flag for the side a contact normal pushes against.
    ///
    /// A normal pointing right means the obstacle is on the left.
    #[must_use]
    pub fn from_normal(normal: Vec2) -> Self {
        if normal.x > 0.0 {
            Self::LEFT
        } else if normal.x < 0.0 {
            Self::RIGHT
        } else if normal.y > 0.0 {
            Self::DOWN
        } else if normal.y < 0.0 {
            Self::UP
        } else {
            Self::NONE
        }
    }
}

impl BitOr for ContactFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

/// A dynamic body.
///
/// Destroyed bodies keep their data until the slot is reused; check
/// [`PhysicsWorld::is_active`](crate::PhysicsWorld::is_active) before
/// trusting a body fetched by a possibly stale id.
pub struct Body<C> {
    /// Current bounds.
    pub aabb: Aabb,
    /// Velocity in world units per second.
    pub velocity: Vec2,
    /// Added to the velocity once per frame.
    pub acceleration: Vec2,
    /// Layer and mask.
    pub filter: CollisionFilter,
    /// Kinematic bodies ignore gravity.
    pub kinematic: bool,
    /// Entity that owns this body, if any.
    pub owner: Option<SlotId>,
    pub(crate) contacts: ContactFlags,
    pub(crate) hit_layers: u32,
    pub(crate) handler: Option<Rc<dyn HitHandler<C>>>,
}

impl<C> Body<C> {
    /// Sides blocked by static geometry during the last step.
    #[inline]
    #[must_use]
    pub const fn contacts(&self) -> ContactFlags {
        self.contacts
    }

    /// Layers of everything this body touched during the last step.
    #[inline]
    #[must_use]
    pub const fn hit_layers(&self) -> u32 {
        self.hit_layers
    }

    /// Returns true if the body was standing on something last step.
    #[inline]
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        self.contacts.has(ContactFlags::DOWN)
    }

    /// Returns true if a hit handler is attached.
    #[must_use]
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

impl<C> fmt::Debug for Body<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("aabb", &self.aabb)
            .field("velocity", &self.velocity)
            .field("acceleration", &self.acceleration)
            .field("filter", &self.filter)
            .field("kinematic", &self.kinematic)
            .field("owner", &self.owner)
            .field("contacts", &self.contacts)
            .field("hit_layers", &self.hit_layers)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// Parameters for [`PhysicsWorld::create_body`](crate::PhysicsWorld::create_body).
///
/// # Example
///
/// ```rust,ignore
/// let id = world.create_body(
///     BodyDesc::new(Vec2::new(100.0, 200.0), Vec2::new(24.0, 24.0))
///         .filter(CollisionFilter::new(PLAYER, TERRAIN | ENEMY))
///         .handler(Rc::new(PlayerHandler)),
/// );
/// ```
pub struct BodyDesc<C> {
    /// Centre of the box.
    pub position: Vec2,
    /// Full width and height.
    pub size: Vec2,
    /// Initial velocity.
    pub velocity: Vec2,
    /// Per-frame acceleration.
    pub acceleration: Vec2,
    /// Layer and mask.
    pub filter: CollisionFilter,
    /// Skip gravity.
    pub kinematic: bool,
    /// Owning entity.
    pub owner: Option<SlotId>,
    /// Hit handler.
    pub handler: Option<Rc<dyn HitHandler<C>>>,
}

impl<C> BodyDesc<C> {
    /// Starts a description for a box at rest.
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            filter: CollisionFilter::default(),
            kinematic: false,
            owner: None,
            handler: None,
        }
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the per-frame acceleration.
    #[must_use]
    pub fn acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Sets the layer and mask.
    #[must_use]
    pub fn filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets whether the body ignores gravity.
    #[must_use]
    pub fn kinematic(mut self, kinematic: bool) -> Self {
        self.kinematic = kinematic;
        self
    }

    /// Sets the owning entity.
    #[must_use]
    pub fn owner(mut self, owner: SlotId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Attaches a hit handler.
    #[must_use]
    pub fn handler(mut self, handler: Rc<dyn HitHandler<C>>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub(crate) fn build(self) -> Body<C> {
        Body {
            aabb: Aabb::from_size(self.position, self.size),
            velocity: self.velocity,
            acceleration: self.acceleration,
            filter: self.filter,
            kinematic: self.kinematic,
            owner: self.owner,
            contacts: ContactFlags::NONE,
            hit_layers: 0,
            handler: self.handler,
        }
    }
}

impl<C> fmt::Debug for BodyDesc<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyDesc")
            .field("position", &self.position)
            .field("size", &self.size)
            .field("velocity", &self.velocity)
            .field("filter", &self.filter)
            .field("kinematic", &self.kinematic)
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}
