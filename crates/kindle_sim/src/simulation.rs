//! # Simulation
//!
//! The context every hit handler receives. Owns the clock, the physics
//! world, the entities, the animations and whatever game state `G` the
//! driver adds on top.

use std::time::Instant;

use kindle_core::fatal;
use kindle_physics::{step, BodyId, PhysicsContext, PhysicsWorld, Vec2};
use tracing::{debug, trace};

use crate::animation::{AnimationPlayer, SheetId};
use crate::clock::{FrameClock, FrameStats};
use crate::config::SimConfig;
use crate::entity::{EntityDesc, EntityId, EntityManager};
use crate::error::{AnimationError, SimResult};

/// One sprite to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Entity the sprite belongs to.
    pub entity: EntityId,
    /// Body centre plus sprite offset.
    pub position: Vec2,
    /// Sheet to sample.
    pub sheet: SheetId,
    /// Sheet row.
    pub row: u8,
    /// Sheet column.
    pub column: u8,
    /// Mirror horizontally.
    pub flipped: bool,
}

/// Everything stepped together once per frame.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = Simulation::new(&SimConfig::default(), Level::default())?;
/// let player = sim.create_entity(
///     EntityDesc::new(Vec2::new(100.0, 200.0), Vec2::new(24.0, 24.0))
///         .handler(on_static_hit(|sim: &mut Simulation<Level>, contact| {
///             sim.game.grounded = contact.hit.normal.y > 0.0;
///         })),
/// );
///
/// loop {
///     sim.tick();
///     for sprite in sim.sprites() { /* draw */ }
/// }
/// ```
pub struct Simulation<G> {
    /// Frame time source.
    pub clock: FrameClock,
    /// Bodies and level geometry.
    pub physics: PhysicsWorld<Simulation<G>>,
    /// Game objects.
    pub entities: EntityManager,
    /// Sprite animations.
    pub animations: AnimationPlayer,
    /// Driver-specific state.
    pub game: G,
}

impl<G> PhysicsContext for Simulation<G> {
    #[inline]
    fn physics(&self) -> &PhysicsWorld<Self> {
        &self.physics
    }

    #[inline]
    fn physics_mut(&mut self) -> &mut PhysicsWorld<Self> {
        &mut self.physics
    }
}

impl<G> Simulation<G> {
    /// Builds an empty simulation.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: &SimConfig, game: G) -> SimResult<Self> {
        config.validate()?;
        let physics = PhysicsWorld::new(config.physics)?;
        debug!(frame_rate = config.clock.frame_rate, "simulation created");

        Ok(Self {
            clock: FrameClock::new(config.clock.frame_rate),
            physics,
            entities: EntityManager::new(),
            animations: AnimationPlayer::new(),
            game,
        })
    }

    // =========================================================================
    // FRAME
    // =========================================================================

    /// Runs one fixed-step frame.
    pub fn tick(&mut self) -> FrameStats {
        let dt = self.clock.advance();
        self.run_frame(dt)
    }

    /// Runs one frame of `dt` seconds (clamped by the clock).
    pub fn tick_with(&mut self, dt: f32) -> FrameStats {
        let dt = self.clock.advance_by(dt);
        self.run_frame(dt)
    }

    fn run_frame(&mut self, dt: f32) -> FrameStats {
        let start = Instant::now();

        step(self, dt);
        let physics_done = Instant::now();

        self.animations.update(dt);
        let animation_done = Instant::now();

        let expired = self.entities.expire(&mut self.physics, dt);
        let end = Instant::now();

        let stats = FrameStats {
            frame: self.clock.frame(),
            dt,
            physics_us: micros(physics_done - start),
            animation_us: micros(animation_done - physics_done),
            expire_us: micros(end - animation_done),
            total_us: micros(end - start),
            active_bodies: self.physics.active_body_count(),
            active_entities: self.entities.active_count(),
            active_animations: self.animations.active_count(),
        };
        trace!(
            frame = stats.frame,
            bodies = stats.active_bodies,
            entities = stats.active_entities,
            expired,
            total_us = stats.total_us,
            "tick"
        );
        stats
    }

    /// Drops every body, static body and entity.
    ///
    /// Animation definitions and instances survive; the clock keeps
    /// counting.
    pub fn reset(&mut self) {
        self.physics.reset();
        self.entities.reset();
        debug!(frame = self.clock.frame(), "simulation reset");
    }

    // =========================================================================
    // ENTITIES
    // =========================================================================

    /// Creates an entity and its body.
    ///
    /// Referencing an animation instance that is not live is fatal.
    pub fn create_entity(&mut self, desc: EntityDesc<Self>) -> EntityId {
        if let Some(animation) = desc.animation {
            if !self.animations.is_active(animation) {
                fatal(AnimationError::UnknownInstance(animation.index()));
            }
        }
        self.entities.create(&mut self.physics, desc)
    }

    /// Destroys an entity and its body.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        self.entities.destroy(&mut self.physics, id)
    }

    /// Damages an entity. Returns `true` if this destroyed it.
    pub fn damage_entity(&mut self, id: EntityId, amount: u32) -> bool {
        self.entities.damage(&mut self.physics, id, amount)
    }

    /// Finds the live entity that owns `body`.
    #[must_use]
    pub fn owner_of(&self, body: BodyId) -> Option<EntityId> {
        self.entities.owner_of(&self.physics, body)
    }

    /// Render data for every live entity showing a live animation.
    pub fn sprites(&self) -> impl Iterator<Item = Sprite> + '_ {
        self.entities.iter().filter_map(|(id, entity)| {
            let frame = self.animations.render_frame(entity.animation?)?;
            let body = self.physics.body(entity.body)?;
            Some(Sprite {
                entity: id,
                position: body.aabb.center + entity.sprite_offset,
                sheet: frame.sheet,
                row: frame.row,
                column: frame.column,
                flipped: entity.flipped != frame.flipped,
            })
        })
    }
}

fn micros(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindle_physics::{on_static_hit, CollisionFilter, StaticContact};

    const TERRAIN: u32 = 1 << 2;

    #[derive(Default)]
    struct Game {
        wall_hits: u32,
    }

    fn sim() -> Simulation<Game> {
        Simulation::new(&SimConfig::default(), Game::default()).unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = SimConfig::default();
        config.physics.iterations = 0;
        assert!(Simulation::new(&config, ()).is_err());
    }

    #[test]
    fn test_tick_order_physics_then_expiry() {
        let mut sim = sim();
        let id = sim.create_entity(
            EntityDesc::new(Vec2::ZERO, Vec2::new(4.0, 4.0))
                .kinematic(true)
                .velocity(Vec2::new(64.0, 0.0))
                .lifetime(1.0 / 60.0),
        );
        let body = sim.entities.get(id).unwrap().body;

        let stats = sim.tick();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.active_entities, 0);
        assert!(!sim.entities.is_active(id));
        // Moved before it expired.
        assert!(sim.physics.body(body).unwrap().aabb.center.x > 0.0);
    }

    #[test]
    fn test_variable_delta_is_clamped_before_physics() {
        let mut sim = sim();
        let id = sim.create_entity(
            EntityDesc::new(Vec2::ZERO, Vec2::new(4.0, 4.0))
                .kinematic(true)
                .velocity(Vec2::new(4.0, 0.0)),
        );
        let body = sim.entities.get(id).unwrap().body;

        let stats = sim.tick_with(1.0);
        assert_eq!(stats.dt, 0.25);
        assert_eq!(sim.clock.elapsed(), 0.25);
        assert_eq!(sim.physics.body(body).unwrap().aabb.center.x, 1.0);

        let stats = sim.tick_with(0.0625);
        assert_eq!(stats.dt, 0.0625);
        assert_eq!(sim.physics.body(body).unwrap().aabb.center.x, 1.25);
    }

    #[test]
    fn test_handler_reaches_game_state() {
        let mut sim = sim();
        sim.physics.create_static_body(
            Vec2::new(20.0, 0.0),
            Vec2::new(10.0, 40.0),
            CollisionFilter::solid(TERRAIN),
        );
        sim.create_entity(
            EntityDesc::new(Vec2::ZERO, Vec2::new(4.0, 4.0))
                .kinematic(true)
                .velocity(Vec2::new(600.0, 0.0))
                .handler(on_static_hit(|sim: &mut Simulation<Game>, _: &StaticContact| {
                    sim.game.wall_hits += 1;
                })),
        );

        for _ in 0..4 {
            sim.tick();
        }
        assert!(sim.game.wall_hits > 0);
    }

    #[test]
    fn test_sprites_follow_bodies() {
        let mut sim = sim();
        let def = sim
            .animations
            .define_filmstrip(SheetId(1), 3, 0.1, &[5, 6])
            .unwrap();
        let anim = sim.animations.create(def, true);

        let id = sim.create_entity(
            EntityDesc::new(Vec2::new(10.0, 20.0), Vec2::new(4.0, 4.0))
                .kinematic(true)
                .sprite_offset(Vec2::new(0.0, 2.0))
                .animation(anim)
                .flipped(true),
        );
        sim.create_entity(EntityDesc::new(Vec2::ZERO, Vec2::new(4.0, 4.0)).kinematic(true));

        let sprites: Vec<_> = sim.sprites().collect();
        assert_eq!(sprites.len(), 1);
        assert_eq!(sprites[0].entity, id);
        assert_eq!(sprites[0].position, Vec2::new(10.0, 22.0));
        assert_eq!((sprites[0].row, sprites[0].column), (3, 5));
        assert!(sprites[0].flipped);
    }

    #[test]
    #[should_panic(expected = "unknown animation instance")]
    fn test_destroyed_animation_is_fatal() {
        let mut sim = sim();
        let def = sim.animations.define_filmstrip(SheetId(0), 0, 0.1, &[0]).unwrap();
        let anim = sim.animations.create(def, true);
        sim.animations.destroy(anim);

        sim.create_entity(EntityDesc::new(Vec2::ZERO, Vec2::new(4.0, 4.0)).animation(anim));
    }

    #[test]
    fn test_reset_keeps_animations() {
        let mut sim = sim();
        let def = sim.animations.define_filmstrip(SheetId(0), 0, 0.1, &[0]).unwrap();
        let anim = sim.animations.create(def, false);
        sim.create_entity(EntityDesc::new(Vec2::ZERO, Vec2::new(4.0, 4.0)).animation(anim));

        sim.reset();

        assert_eq!(sim.entities.active_count(), 0);
        assert_eq!(sim.physics.active_body_count(), 0);
        assert!(sim.animations.is_active(anim));
    }
}
