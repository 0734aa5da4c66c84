//! Entity and body lifetimes: slot reuse, stale ids, expiry, damage, reset
//! and handlers that change the world mid-step.

use kindle_physics::{on_static_hit, CollisionFilter, PhysicsConfig, StaticContact, Vec2};
use kindle_sim::{ClockConfig, EntityDesc, EntityId, SimConfig, Simulation};

const PLAYER: u32 = 1 << 0;
const TERRAIN: u32 = 1 << 2;

#[derive(Default)]
struct Log {
    wall_hits: u32,
    destroyed_in_handler: Vec<EntityId>,
}

type Sim = Simulation<Log>;

fn sim(frame_rate: u32) -> Sim {
    let config = SimConfig {
        physics: PhysicsConfig {
            gravity: 0.0,
            ..PhysicsConfig::default()
        },
        clock: ClockConfig { frame_rate },
    };
    Simulation::new(&config, Log::default()).unwrap()
}

fn crate_at(sim: &mut Sim, x: f32) -> EntityId {
    sim.create_entity(EntityDesc::new(Vec2::new(x, 0.0), Vec2::new(8.0, 8.0)).kinematic(true))
}

#[test]
fn test_stale_ids_never_validate() {
    let mut sim = sim(60);
    let first = crate_at(&mut sim, 0.0);
    let first_body = sim.entities.get(first).unwrap().body;

    assert!(sim.destroy_entity(first));
    // Tombstoned data stays readable until reuse.
    assert!(sim.entities.get(first).is_some());
    assert!(!sim.entities.is_active(first));

    let second = crate_at(&mut sim, 5.0);
    let second_body = sim.entities.get(second).unwrap().body;

    assert_eq!(second.index(), first.index());
    assert_eq!(second_body.index(), first_body.index());
    assert!(sim.entities.get(first).is_none());
    assert!(sim.physics.body(first_body).is_none());
    assert!(!sim.destroy_entity(first));
    assert!(sim.entities.is_active(second));
}

#[test]
fn test_freed_slots_reused_in_index_order() {
    let mut sim = sim(60);
    let ids: Vec<_> = (0..5).map(|i| crate_at(&mut sim, i as f32 * 20.0)).collect();

    sim.destroy_entity(ids[3]);
    sim.destroy_entity(ids[1]);

    assert_eq!(crate_at(&mut sim, 0.0).index(), 1);
    assert_eq!(crate_at(&mut sim, 0.0).index(), 3);
    assert_eq!(crate_at(&mut sim, 0.0).index(), 5);
    assert_eq!(sim.entities.active_count(), 6);
}

#[test]
fn test_lifetime_expires_when_elapsed_reaches_it() {
    // dt = 0.125, lifetime 0.5: alive through frame 3, gone after frame 4.
    let mut sim = sim(8);
    let shot = sim.create_entity(
        EntityDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0))
            .kinematic(true)
            .lifetime(0.5),
    );

    for _ in 0..3 {
        sim.tick();
        assert!(sim.entities.is_active(shot));
    }
    let stats = sim.tick();
    assert!(!sim.entities.is_active(shot));
    assert_eq!(stats.active_entities, 0);
    assert_eq!(stats.active_bodies, 0);
}

#[test]
fn test_lifetime_at_default_frame_rate() {
    // dt = 1/60 is inexact; one second must still be exactly 60 frames.
    let mut sim = Simulation::new(&SimConfig::default(), Log::default()).unwrap();
    let shot = sim.create_entity(
        EntityDesc::new(Vec2::ZERO, Vec2::new(2.0, 2.0))
            .kinematic(true)
            .lifetime(1.0),
    );

    for _ in 0..59 {
        sim.tick();
    }
    assert!(sim.entities.is_active(shot));
    assert!((sim.entities.get(shot).unwrap().age - 59.0 / 60.0).abs() < 1e-5);

    let stats = sim.tick();
    assert_eq!(stats.frame, 60);
    assert!(!sim.entities.is_active(shot));
}

#[test]
fn test_damage_destroys_at_zero_health() {
    let mut sim = sim(60);
    let enemy = sim.create_entity(
        EntityDesc::new(Vec2::ZERO, Vec2::new(12.0, 12.0)).health(3),
    );
    let body = sim.entities.get(enemy).unwrap().body;

    assert!(!sim.damage_entity(enemy, 1));
    assert!(!sim.damage_entity(enemy, 1));
    assert!(sim.physics.is_active(body));
    assert!(sim.damage_entity(enemy, 1));
    assert!(!sim.physics.is_active(body));
    assert_eq!(sim.owner_of(body), None);
}

#[test]
fn test_reset_clears_world_and_entities() {
    let mut sim = sim(60);
    sim.physics.create_static_body(
        Vec2::ZERO,
        Vec2::new(100.0, 10.0),
        CollisionFilter::solid(TERRAIN),
    );
    let old = crate_at(&mut sim, 0.0);
    let old_body = sim.entities.get(old).unwrap().body;
    crate_at(&mut sim, 10.0);

    sim.reset();

    assert_eq!(sim.entities.count(), 0);
    assert_eq!(sim.physics.body_count(), 0);
    assert_eq!(sim.physics.static_body_count(), 0);
    assert!(sim.entities.get(old).is_none());
    assert!(sim.physics.body(old_body).is_none());

    let fresh = crate_at(&mut sim, 0.0);
    assert_eq!(fresh.index(), 0);
    assert_ne!(fresh, old);
    assert_eq!(sim.owner_of(sim.entities.get(fresh).unwrap().body), Some(fresh));
}

#[test]
fn test_handler_velocity_applies_next_sub_step() {
    // 64 fps: 640 units/s moves 2.5 per sub-step. The wall's grown left
    // face is at x = 12, reached at 80% of frame 2's first sub-step.
    let mut sim = sim(64);
    sim.physics.create_static_body(
        Vec2::new(20.0, 0.0),
        Vec2::new(8.0, 100.0),
        CollisionFilter::solid(TERRAIN),
    );
    let ball = sim.create_entity(
        EntityDesc::new(Vec2::ZERO, Vec2::new(8.0, 8.0))
            .kinematic(true)
            .velocity(Vec2::new(640.0, 0.0))
            .filter(CollisionFilter::new(PLAYER, TERRAIN))
            .handler(on_static_hit(|sim: &mut Sim, contact: &StaticContact| {
                sim.game.wall_hits += 1;
                if let Some(body) = sim.physics.body_mut(contact.body) {
                    body.velocity.x = 640.0 * contact.hit.normal.x;
                }
            })),
    );
    let body = sim.entities.get(ball).unwrap().body;

    sim.tick();
    assert_eq!(sim.game.wall_hits, 0);
    assert_eq!(sim.physics.body(body).unwrap().aabb.center.x, 10.0);

    sim.tick();
    assert_eq!(sim.game.wall_hits, 1);
    let ball = sim.physics.body(body).unwrap();
    assert_eq!(ball.velocity.x, -640.0);
    // 12 at the wall, then three sub-steps of 2.5 back out.
    assert!((ball.aabb.center.x - 4.5).abs() < 1e-4);
}

#[test]
fn test_handler_destroying_its_own_entity() {
    let mut sim = sim(64);
    sim.physics.create_static_body(
        Vec2::new(20.0, 0.0),
        Vec2::new(8.0, 100.0),
        CollisionFilter::solid(TERRAIN),
    );

    let bullet = sim.create_entity(
        EntityDesc::new(Vec2::ZERO, Vec2::new(8.0, 8.0))
            .kinematic(true)
            .velocity(Vec2::new(640.0, 0.0))
            .filter(CollisionFilter::new(PLAYER, TERRAIN))
            .handler(on_static_hit(|sim: &mut Sim, contact: &StaticContact| {
                if let Some(owner) = sim.owner_of(contact.body) {
                    sim.destroy_entity(owner);
                    sim.game.destroyed_in_handler.push(owner);
                }
            })),
    );
    // Stepped after the bullet, must still move this frame.
    let bystander = sim.create_entity(
        EntityDesc::new(Vec2::new(-100.0, 0.0), Vec2::new(8.0, 8.0))
            .kinematic(true)
            .velocity(Vec2::new(0.0, 64.0)),
    );
    let bystander_body = sim.entities.get(bystander).unwrap().body;

    sim.tick();
    sim.tick();

    assert_eq!(sim.game.destroyed_in_handler, vec![bullet]);
    assert!(!sim.entities.is_active(bullet));
    assert_eq!(sim.entities.active_count(), 1);
    assert_eq!(
        sim.physics.body(bystander_body).unwrap().aabb.center,
        Vec2::new(-100.0, 2.0)
    );
}
