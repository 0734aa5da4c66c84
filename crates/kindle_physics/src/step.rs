//! # Frame Step
//!
//! Per body, per frame:
//!
//! 1. **Integrate** - gravity (clamped to terminal velocity) unless
//!    kinematic, then acceleration
//! 2. **Sub-iterate** `iterations` times:
//!    - sweep against static bodies, keep the earliest hit
//!    - sweep against other live bodies, keep the earliest hit
//!    - resolve: snap to the static contact and slide along it
//!    - dispatch handlers, dynamic first
//!    - stationary correction: push out of overlapping statics, report
//!      overlapping bodies that were not swept into
//!
//! Bodies never push each other. Hit handlers may create and destroy bodies
//! while the step runs: the body loop walks slot indices up to the current
//! length and re-checks the stepped body after every dispatch.

use kindle_core::{sweep, Aabb, Hit, Vec2};
use tracing::trace;

use crate::body::{BodyId, ContactFlags};
use crate::config::PhysicsConfig;
use crate::handler::{BodyContact, StaticContact};
use crate::static_body::StaticBodyId;
use crate::world::PhysicsWorld;

/// A context that owns a physics world.
///
/// Handlers receive the context, not just the world, so they can reach
/// game state that sits next to it.
pub trait PhysicsContext: Sized {
    /// The owned world.
    fn physics(&self) -> &PhysicsWorld<Self>;
    /// The owned world, mutably.
    fn physics_mut(&mut self) -> &mut PhysicsWorld<Self>;
}

/// Contacts produced by one sub-iteration's sweeps.
#[derive(Debug, Default)]
struct SweepOutcome {
    dynamic: Option<BodyContact>,
    fixed: Option<StaticContact>,
}

/// Advances every live body in `ctx`'s world by `dt` seconds.
///
/// # Example
///
/// ```rust,ignore
/// impl PhysicsContext for Game {
///     fn physics(&self) -> &PhysicsWorld<Self> { &self.physics }
///     fn physics_mut(&mut self) -> &mut PhysicsWorld<Self> { &mut self.physics }
/// }
///
/// kindle_physics::step(&mut game, clock.delta());
/// ```
pub fn step<C: PhysicsContext>(ctx: &mut C, dt: f32) {
    let config = *ctx.physics().config();
    let sub_dt = dt / config.iterations as f32;

    let mut index = 0;
    let mut stepped = 0usize;
    while index < ctx.physics().body_count() {
        if let Some(id) = ctx.physics().active_body_at(index) {
            step_body(ctx, id, &config, sub_dt);
            stepped += 1;
        }
        index += 1;
    }

    trace!(dt, stepped, statics = ctx.physics().static_body_count(), "physics step");
}

fn step_body<C: PhysicsContext>(ctx: &mut C, id: BodyId, config: &PhysicsConfig, sub_dt: f32) {
    let Some(body) = ctx.physics_mut().body_mut(id) else {
        return;
    };

    if !body.kinematic {
        body.velocity.y += config.gravity;
        if body.velocity.y < config.terminal_velocity {
            body.velocity.y = config.terminal_velocity;
        }
    }
    body.velocity += body.acceleration;
    body.contacts = ContactFlags::NONE;
    body.hit_layers = 0;

    for _ in 0..config.iterations {
        let outcome = sweep_and_resolve(ctx.physics_mut(), id, sub_dt);

        let swept_into_body = outcome.dynamic.is_some();
        if let Some(contact) = outcome.dynamic {
            dispatch_dynamic(ctx, &contact);
            if !ctx.physics().is_active(id) {
                return;
            }
        }
        if let Some(contact) = outcome.fixed {
            dispatch_static(ctx, &contact);
            if !ctx.physics().is_active(id) {
                return;
            }
        }

        let overlap = stationary_correction(ctx.physics_mut(), id);
        if !swept_into_body {
            if let Some(contact) = overlap {
                dispatch_dynamic(ctx, &contact);
                if !ctx.physics().is_active(id) {
                    return;
                }
            }
        }
    }
}

/// Sweeps one body against everything and moves it.
fn sweep_and_resolve<C>(world: &mut PhysicsWorld<C>, id: BodyId, sub_dt: f32) -> SweepOutcome {
    let Some(body) = world.bodies.get(id.slot()) else {
        return SweepOutcome::default();
    };
    let aabb = body.aabb;
    let filter = body.filter;
    let displacement = body.velocity * sub_dt;

    let mut layers = 0u32;

    let mut nearest_static: Option<(StaticBodyId, Hit)> = None;
    for (index, fixed) in world.statics.iter().enumerate() {
        if !filter.interacts(fixed.filter) {
            continue;
        }
        let Some(hit) = sweep(aabb.center, displacement, &fixed.aabb.expanded_by(aabb.half_extents)) else {
            continue;
        };
        layers |= fixed.filter.layer;

        let replace = match &nearest_static {
            None => true,
            Some((_, best)) => {
                hit.time < best.time
                    || (hit.time == best.time && along_dominant_axis(displacement, hit.normal))
            }
        };
        if replace {
            nearest_static = Some((StaticBodyId(index as u32), hit));
        }
    }

    let mut nearest_body: Option<(BodyId, Hit)> = None;
    for (slot, other) in world.bodies.iter() {
        if slot == id.slot() || !filter.interacts(other.filter) {
            continue;
        }
        let Some(hit) = sweep(aabb.center, displacement, &other.aabb.expanded_by(aabb.half_extents)) else {
            continue;
        };
        layers |= other.filter.layer;

        if nearest_body.map_or(true, |(_, best)| hit.time < best.time) {
            nearest_body = Some((BodyId::from_slot(slot), hit));
        }
    }

    let Some(body) = world.bodies.get_mut(id.slot()) else {
        return SweepOutcome::default();
    };
    body.hit_layers |= layers;

    match nearest_static {
        Some((_, hit)) => {
            // Snap to the contact; the free axis still covers its whole
            // displacement for the sub-step.
            body.aabb.center = hit.position;
            if hit.normal.x != 0.0 {
                body.aabb.center.y = aabb.center.y + displacement.y;
                body.velocity.x = 0.0;
            } else if hit.normal.y != 0.0 {
                body.aabb.center.x = aabb.center.x + displacement.x;
                body.velocity.y = 0.0;
            }
            body.contacts = body.contacts | ContactFlags::from_normal(hit.normal);
        }
        None => body.aabb.center += displacement,
    }

    SweepOutcome {
        dynamic: nearest_body.map(|(other, hit)| BodyContact {
            body: id,
            other,
            hit,
            layers,
        }),
        fixed: nearest_static.map(|(other, hit)| StaticContact {
            body: id,
            other,
            hit,
            layers,
        }),
    }
}

/// Tie-break for equal-time static hits.
fn along_dominant_axis(displacement: Vec2, normal: Vec2) -> bool {
    let moving = displacement.abs();
    (moving.x > moving.y && normal.x != 0.0) || (moving.y > moving.x && normal.y != 0.0)
}

/// Pushes a body out of overlapping statics, in creation order, and returns
/// the first overlapping body.
fn stationary_correction<C>(world: &mut PhysicsWorld<C>, id: BodyId) -> Option<BodyContact> {
    let (mut aabb, filter) = {
        let body = world.bodies.get(id.slot())?;
        (body.aabb, body.filter)
    };

    for fixed in world.statics.iter() {
        if !filter.interacts(fixed.filter) {
            continue;
        }
        let diff = Aabb::minkowski_difference(&fixed.aabb, &aabb);
        if diff.contains_point(Vec2::ZERO) {
            aabb.center += diff.penetration_vector();
        }
    }

    let mut layers = 0u32;
    let mut first: Option<(BodyId, Aabb)> = None;
    for (slot, other) in world.bodies.iter() {
        if slot == id.slot() || !filter.interacts(other.filter) {
            continue;
        }
        if aabb.overlaps(&other.aabb) {
            layers |= other.filter.layer;
            if first.is_none() {
                first = Some((BodyId::from_slot(slot), other.aabb));
            }
        }
    }

    let body = world.bodies.get_mut(id.slot())?;
    body.aabb = aabb;
    body.hit_layers |= layers;

    first.map(|(other, other_aabb)| {
        let push = Aabb::minkowski_difference(&other_aabb, &aabb).penetration_vector();
        BodyContact {
            body: id,
            other,
            hit: Hit {
                time: 0.0,
                position: aabb.center,
                normal: push.sign(),
            },
            layers,
        }
    })
}

fn dispatch_dynamic<C: PhysicsContext>(ctx: &mut C, contact: &BodyContact) {
    let handler = ctx
        .physics()
        .body(contact.body)
        .and_then(|body| body.handler.clone());
    if let Some(handler) = handler {
        handler.on_dynamic_hit(ctx, contact);
    }
}

fn dispatch_static<C: PhysicsContext>(ctx: &mut C, contact: &StaticContact) {
    let handler = ctx
        .physics()
        .body(contact.body)
        .and_then(|body| body.handler.clone());
    if let Some(handler) = handler {
        handler.on_static_hit(ctx, contact);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::body::BodyDesc;
    use crate::filter::CollisionFilter;
    use crate::handler::{on_dynamic_hit, on_static_hit, HitHandler};

    const PLAYER: u32 = 1 << 0;
    const ENEMY: u32 = 1 << 1;
    const TERRAIN: u32 = 1 << 2;

    #[derive(Default)]
    struct Ctx {
        physics: PhysicsWorld<Ctx>,
        static_hits: u32,
        dynamic_hits: u32,
    }

    impl PhysicsContext for Ctx {
        fn physics(&self) -> &PhysicsWorld<Self> {
            &self.physics
        }
        fn physics_mut(&mut self) -> &mut PhysicsWorld<Self> {
            &mut self.physics
        }
    }

    fn ctx(gravity: f32, iterations: u32) -> Ctx {
        Ctx {
            physics: PhysicsWorld::new(PhysicsConfig {
                gravity,
                iterations,
                ..PhysicsConfig::default()
            })
            .unwrap(),
            ..Ctx::default()
        }
    }

    fn counting() -> Rc<dyn HitHandler<Ctx>> {
        struct Counter;
        impl HitHandler<Ctx> for Counter {
            fn on_dynamic_hit(&self, ctx: &mut Ctx, _: &BodyContact) {
                ctx.dynamic_hits += 1;
            }
            fn on_static_hit(&self, ctx: &mut Ctx, _: &StaticContact) {
                ctx.static_hits += 1;
            }
        }
        Rc::new(Counter)
    }

    #[test]
    fn test_free_fall_integrates_gravity() {
        let mut ctx = ctx(-8.0, 4);
        let id = ctx
            .physics
            .create_body(BodyDesc::new(Vec2::new(0.0, 100.0), Vec2::new(2.0, 2.0)));

        step(&mut ctx, 0.5);

        let body = ctx.physics.body(id).unwrap();
        assert_eq!(body.velocity, Vec2::new(0.0, -8.0));
        assert_eq!(body.aabb.center, Vec2::new(0.0, 96.0));
        assert!(body.contacts().is_empty());
    }

    #[test]
    fn test_terminal_velocity_clamps_fall() {
        let mut ctx = Ctx {
            physics: PhysicsWorld::new(PhysicsConfig {
                gravity: -300.0,
                terminal_velocity: -500.0,
                iterations: 1,
            })
            .unwrap(),
            ..Ctx::default()
        };
        let id = ctx
            .physics
            .create_body(BodyDesc::new(Vec2::ZERO, Vec2::new(1.0, 1.0)));

        step(&mut ctx, 0.0);
        step(&mut ctx, 0.0);
        assert_eq!(ctx.physics.body(id).unwrap().velocity.y, -500.0);
    }

    #[test]
    fn test_kinematic_skips_gravity_but_accelerates() {
        let mut ctx = ctx(-200.0, 4);
        let id = ctx.physics.create_body(
            BodyDesc::new(Vec2::ZERO, Vec2::new(1.0, 1.0))
                .kinematic(true)
                .acceleration(Vec2::new(4.0, 0.0)),
        );

        step(&mut ctx, 1.0);

        let body = ctx.physics.body(id).unwrap();
        assert_eq!(body.velocity, Vec2::new(4.0, 0.0));
        assert_eq!(body.aabb.center, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn test_wall_stops_horizontal_motion_and_slides() {
        let mut ctx = ctx(0.0, 1);
        ctx.physics
            .create_static_body(Vec2::new(10.0, 0.0), Vec2::new(4.0, 40.0), CollisionFilter::solid(TERRAIN));
        let id = ctx.physics.create_body(
            BodyDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0))
                .velocity(Vec2::new(16.0, 4.0))
                .filter(CollisionFilter::new(PLAYER, TERRAIN))
                .handler(counting()),
        );

        step(&mut ctx, 1.0);

        let body = ctx.physics.body(id).unwrap();
        // Snapped against the wall face at x = 7, y kept moving.
        assert_eq!(body.aabb.center, Vec2::new(7.0, 4.0));
        assert_eq!(body.velocity, Vec2::new(0.0, 4.0));
        assert!(body.contacts().has(ContactFlags::RIGHT));
        assert_eq!(body.hit_layers(), TERRAIN);
        assert_eq!(ctx.static_hits, 1);
    }

    #[test]
    fn test_corner_tie_prefers_dominant_axis() {
        let mut ctx = ctx(0.0, 1);
        // A floor below and a wall to the right, both reached at t = 0.45.
        ctx.physics
            .create_static_body(Vec2::new(0.0, -6.5), Vec2::new(40.0, 2.0), CollisionFilter::solid(TERRAIN));
        ctx.physics
            .create_static_body(Vec2::new(11.0, 0.0), Vec2::new(2.0, 40.0), CollisionFilter::solid(TERRAIN));
        let id = ctx.physics.create_body(
            BodyDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0))
                .velocity(Vec2::new(20.0, -10.0))
                .kinematic(true)
                .filter(CollisionFilter::new(PLAYER, TERRAIN)),
        );

        step(&mut ctx, 1.0);

        // Mostly horizontal motion resolves on the wall.
        let body = ctx.physics.body(id).unwrap();
        assert!(body.contacts().has(ContactFlags::RIGHT));
        assert_eq!(body.velocity, Vec2::new(0.0, -10.0));
    }

    #[test]
    fn test_corner_tie_without_dominant_axis_keeps_first() {
        let mut ctx = ctx(0.0, 1);
        ctx.physics
            .create_static_body(Vec2::new(0.0, -11.0), Vec2::new(40.0, 2.0), CollisionFilter::solid(TERRAIN));
        ctx.physics
            .create_static_body(Vec2::new(11.0, 0.0), Vec2::new(2.0, 40.0), CollisionFilter::solid(TERRAIN));
        let id = ctx.physics.create_body(
            BodyDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0))
                .velocity(Vec2::new(18.0, -18.0))
                .kinematic(true)
                .filter(CollisionFilter::new(PLAYER, TERRAIN)),
        );

        step(&mut ctx, 1.0);

        let body = ctx.physics.body(id).unwrap();
        assert!(body.contacts().has(ContactFlags::DOWN));
        assert_eq!(body.velocity, Vec2::new(18.0, 0.0));
        assert_eq!(body.aabb.center, Vec2::new(18.0, -9.0));
    }

    #[test]
    fn test_filtered_static_is_ignored() {
        let mut ctx = ctx(-10.0, 2);
        ctx.physics
            .create_static_body(Vec2::new(0.0, -2.0), Vec2::new(20.0, 2.0), CollisionFilter::solid(TERRAIN));
        let id = ctx.physics.create_body(
            BodyDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0)).filter(CollisionFilter::new(ENEMY, PLAYER)),
        );

        step(&mut ctx, 1.0);

        let body = ctx.physics.body(id).unwrap();
        assert_eq!(body.aabb.center.y, -10.0);
        assert_eq!(body.hit_layers(), 0);
    }

    #[test]
    fn test_dynamic_sweep_reports_without_pushing() {
        let mut ctx = ctx(0.0, 1);
        let target = ctx.physics.create_body(
            BodyDesc::new(Vec2::new(10.0, 0.0), Vec2::new(2.0, 2.0))
                .kinematic(true)
                .filter(CollisionFilter::new(ENEMY, PLAYER)),
        );
        let mover = ctx.physics.create_body(
            BodyDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0))
                .velocity(Vec2::new(16.0, 0.0))
                .kinematic(true)
                .filter(CollisionFilter::new(PLAYER, ENEMY))
                .handler(counting()),
        );

        step(&mut ctx, 1.0);

        assert_eq!(ctx.physics.body(mover).unwrap().aabb.center.x, 16.0);
        assert_eq!(ctx.physics.body(target).unwrap().aabb.center.x, 10.0);
        assert_eq!(ctx.physics.body(mover).unwrap().hit_layers(), ENEMY);
        assert_eq!(ctx.dynamic_hits, 1);
    }

    #[test]
    fn test_trigger_fires_on_overlap() {
        let mut ctx = ctx(0.0, 4);
        let fired = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&fired);
        let trigger = ctx.physics.create_trigger(
            Vec2::ZERO,
            Vec2::new(10.0, 10.0),
            CollisionFilter::new(ENEMY, PLAYER),
            on_dynamic_hit(move |_: &mut Ctx, contact: &BodyContact| {
                assert_eq!(contact.layers, PLAYER);
                seen.set(seen.get() + 1);
            }),
        );
        // Touching the trigger's right edge: no sweep hit, only overlap.
        ctx.physics.create_body(
            BodyDesc::new(Vec2::new(6.0, 0.0), Vec2::new(2.0, 2.0))
                .kinematic(true)
                .filter(CollisionFilter::new(PLAYER, ENEMY)),
        );

        step(&mut ctx, 1.0 / 60.0);

        // Once per sub-iteration, through the stationary pass.
        assert_eq!(fired.get(), 4);
        assert!(ctx.physics.is_active(trigger));
    }

    #[test]
    fn test_handler_can_destroy_stepped_body() {
        let mut ctx = ctx(-64.0, 4);
        ctx.physics
            .create_static_body(Vec2::new(0.0, -2.0), Vec2::new(20.0, 2.0), CollisionFilter::solid(TERRAIN));
        let bullet = ctx.physics.create_body(
            BodyDesc::new(Vec2::new(0.0, 0.5), Vec2::new(1.0, 1.0))
                .filter(CollisionFilter::new(PLAYER, TERRAIN))
                .handler(on_static_hit(|ctx: &mut Ctx, contact: &StaticContact| {
                    ctx.static_hits += 1;
                    ctx.physics.destroy_body(contact.body);
                })),
        );
        let other = ctx
            .physics
            .create_body(BodyDesc::new(Vec2::new(50.0, 0.0), Vec2::new(1.0, 1.0)).kinematic(true));

        step(&mut ctx, 1.0);

        assert!(!ctx.physics.is_active(bullet));
        assert_eq!(ctx.static_hits, 1);
        assert!(ctx.physics.is_active(other));
    }

    #[test]
    fn test_body_created_mid_step_is_stepped() {
        let mut ctx = ctx(0.0, 1);
        ctx.physics
            .create_static_body(Vec2::new(10.0, 0.0), Vec2::new(2.0, 20.0), CollisionFilter::solid(TERRAIN));
        ctx.physics.create_body(
            BodyDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0))
                .kinematic(true)
                .velocity(Vec2::new(20.0, 0.0))
                .filter(CollisionFilter::new(PLAYER, TERRAIN))
                .handler(on_static_hit(|ctx: &mut Ctx, _: &StaticContact| {
                    ctx.physics.create_body(
                        BodyDesc::new(Vec2::new(0.0, 50.0), Vec2::new(1.0, 1.0))
                            .kinematic(true)
                            .velocity(Vec2::new(0.0, 3.0)),
                    );
                })),
        );

        step(&mut ctx, 1.0);

        let spawned = ctx.physics.bodies().nth(1).map(|(_, body)| body.aabb.center);
        assert_eq!(spawned, Some(Vec2::new(0.0, 53.0)));
    }
}
