//! # Hit Handlers
//!
//! The only way game code reacts to collisions. Handlers run synchronously
//! inside [`step`](crate::step), receive the whole context mutably, and may
//! change velocities, destroy bodies or touch any game state.

use std::rc::Rc;

use kindle_core::Hit;

use crate::body::BodyId;
use crate::static_body::StaticBodyId;

/// A moving body touched another dynamic body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyContact {
    /// The body being stepped. Its handler is the one called.
    pub body: BodyId,
    /// The body it touched.
    pub other: BodyId,
    /// Contact geometry.
    pub hit: Hit,
    /// Layers touched by `body` during this sub-iteration.
    pub layers: u32,
}

/// A moving body was stopped by a static body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticContact {
    /// The body being stepped. Its handler is the one called.
    pub body: BodyId,
    /// The static body that blocked it.
    pub other: StaticBodyId,
    /// Contact geometry. `hit.normal` points away from the obstacle.
    pub hit: Hit,
    /// Layers touched by `body` during this sub-iteration.
    pub layers: u32,
}

/// Collision callbacks attached to a body.
///
/// Called at most once per kind per sub-iteration, dynamic first. Both
/// methods default to doing nothing.
///
/// # Example
///
/// ```rust,ignore
/// struct Bounce;
///
/// impl<G> HitHandler<Simulation<G>> for Bounce {
///     fn on_static_hit(&self, sim: &mut Simulation<G>, contact: &StaticContact) {
///         if let Some(body) = sim.physics.body_mut(contact.body) {
///             body.velocity.x = -body.velocity.x;
///         }
///     }
/// }
/// ```
pub trait HitHandler<C> {
    /// The body touched another dynamic body.
    fn on_dynamic_hit(&self, ctx: &mut C, contact: &BodyContact) {
        let _ = (ctx, contact);
    }

    /// The body was blocked by a static body.
    fn on_static_hit(&self, ctx: &mut C, contact: &StaticContact) {
        let _ = (ctx, contact);
    }
}

/// Adapter from a closure to a handler that only reacts to dynamic hits.
pub struct OnDynamicHit<F>(pub F);

impl<C, F> HitHandler<C> for OnDynamicHit<F>
where
    F: Fn(&mut C, &BodyContact),
{
    fn on_dynamic_hit(&self, ctx: &mut C, contact: &BodyContact) {
        (self.0)(ctx, contact);
    }
}

/// Adapter from a closure to a handler that only reacts to static hits.
pub struct OnStaticHit<F>(pub F);

impl<C, F> HitHandler<C> for OnStaticHit<F>
where
    F: Fn(&mut C, &StaticContact),
{
    fn on_static_hit(&self, ctx: &mut C, contact: &StaticContact) {
        (self.0)(ctx, contact);
    }
}

/// Boxes a dynamic-hit closure as a shareable handler.
pub fn on_dynamic_hit<C, F>(f: F) -> Rc<dyn HitHandler<C>>
where
    F: Fn(&mut C, &BodyContact) + 'static,
{
    Rc::new(OnDynamicHit(f))
}

/// Boxes a static-hit closure as a shareable handler.
pub fn on_static_hit<C, F>(f: F) -> Rc<dyn HitHandler<C>>
where
    F: Fn(&mut C, &StaticContact) + 'static,
{
    Rc::new(OnStaticHit(f))
}
