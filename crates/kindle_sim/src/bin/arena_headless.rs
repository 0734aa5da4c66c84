//! # KINDLE Arena (Headless)
//!
//! Runs the single-screen arena level without a window:
//! - Floor, ledges, walls and enemy-only pass-through blocks
//! - A fire pit that enrages enemies and restarts the level on the player
//! - A seeded enemy spawner
//! - Five weapons fired by a scripted player
//!
//! ```text
//! arena_headless [config.toml] [frames]
//! ```
//!
//! Nothing is drawn. Sprite and debug-box data are still produced every
//! frame so the run exercises the same paths a renderer would.

use std::rc::Rc;

use kindle_physics::{
    on_dynamic_hit, on_static_hit, BodyContact, CollisionFilter, HitHandler, StaticContact, Vec2,
};
use kindle_sim::{
    AnimationError, AnimationId, AnimationPlayer, Entity, EntityDesc, EntityId,
    FrameStatsAccumulator, SheetId, SimConfig, SimResult, Simulation,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

type Sim = Simulation<Arena>;

// ============================================================================
// CONSTANTS
// ============================================================================
const WIDTH: f32 = 640.0;
const HEIGHT: f32 = 360.0;
const DEFAULT_FRAMES: u64 = 3_600;
const SPAWN_SEED: u64 = 0x4b49_4e44_4c45;

const SPEED_PLAYER: f32 = 250.0;
const JUMP_VELOCITY: f32 = 1350.0;
const SPEED_ENEMY_LARGE: f32 = 80.0;
const SPEED_ENEMY_SMALL: f32 = 100.0;
const ENRAGED_SPEEDUP: f32 = 1.5;
const HEALTH_ENEMY_LARGE: u32 = 7;
const HEALTH_ENEMY_SMALL: u32 = 3;

/// Frames between scripted direction changes.
const TURN_EVERY: u64 = 90;
/// Frames between scripted jump attempts.
const JUMP_EVERY: u64 = 45;
/// Frames between scripted weapon switches.
const SWITCH_EVERY: u64 = 240;

// ============================================================================
// COLLISION LAYERS
// ============================================================================
const PLAYER: u32 = 1 << 0;
const ENEMY: u32 = 1 << 1;
const TERRAIN: u32 = 1 << 2;
const ENEMY_PASSTHROUGH: u32 = 1 << 3;
const PROJECTILE: u32 = 1 << 4;
const FIRE: u32 = 1 << 5;

const PLAYER_MASK: u32 = ENEMY | TERRAIN | ENEMY_PASSTHROUGH | FIRE;
const ENEMY_MASK: u32 = PLAYER | TERRAIN | PROJECTILE | FIRE;
const PROJECTILE_MASK: u32 = ENEMY | TERRAIN;
const FIRE_MASK: u32 = ENEMY | PLAYER;

// ============================================================================
// SPRITE SHEETS
// ============================================================================
const SHEET_PLAYER: SheetId = SheetId(0);
const SHEET_ENEMY_SMALL: SheetId = SheetId(1);
const SHEET_ENEMY_LARGE: SheetId = SheetId(2);
const SHEET_PROPS: SheetId = SheetId(3);
const SHEET_FIRE: SheetId = SheetId(4);

// ============================================================================
// WEAPONS
// ============================================================================
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ProjectileKind {
    Small,
    Large,
    Rocket,
}

#[derive(Clone, Copy, Debug)]
struct Weapon {
    name: &'static str,
    /// Seconds between shots.
    fire_rate: f32,
    recoil: f32,
    projectile_speed: f32,
    projectile: ProjectileKind,
    sprite_offset: Vec2,
}

const WEAPONS: [Weapon; 5] = [
    Weapon {
        name: "pistol",
        fire_rate: 0.1,
        recoil: 20.0,
        projectile_speed: 700.0,
        projectile: ProjectileKind::Small,
        sprite_offset: Vec2::new(12.0, -3.0),
    },
    Weapon {
        name: "revolver",
        fire_rate: 0.5,
        recoil: 5.0,
        projectile_speed: 700.0,
        projectile: ProjectileKind::Large,
        sprite_offset: Vec2::new(-4.0, -6.0),
    },
    Weapon {
        name: "smg",
        fire_rate: 0.1,
        recoil: 2.0,
        projectile_speed: 700.0,
        projectile: ProjectileKind::Small,
        sprite_offset: Vec2::new(-5.0, -6.0),
    },
    Weapon {
        name: "shotgun",
        fire_rate: 0.6,
        recoil: 4.0,
        projectile_speed: 500.0,
        projectile: ProjectileKind::Small,
        sprite_offset: Vec2::new(-5.0, -7.0),
    },
    Weapon {
        name: "rocket launcher",
        fire_rate: 0.1,
        recoil: 2.0,
        projectile_speed: 700.0,
        projectile: ProjectileKind::Rocket,
        sprite_offset: Vec2::new(-4.0, -6.0),
    },
];

const SHOTGUN: usize = 3;
const SHOTGUN_PELLETS: usize = 7;
const SHOTGUN_LIFETIME: f32 = 0.2;

// ============================================================================
// GAME STATE
// ============================================================================

/// Playing animation instances, shared by every entity that shows them.
#[derive(Default)]
struct Anims {
    player_walk: AnimationId,
    player_idle: AnimationId,
    enemy_small: AnimationId,
    enemy_large: AnimationId,
    enemy_small_enraged: AnimationId,
    enemy_large_enraged: AnimationId,
    fire: AnimationId,
    projectile_small: AnimationId,
    projectile_large: AnimationId,
    projectile_rocket: AnimationId,
}

impl Anims {
    fn load(player: &mut AnimationPlayer) -> Result<Self, AnimationError> {
        let all = [0, 1, 2, 3, 4, 5, 6, 7];

        let walk = player.define_filmstrip(SHEET_PLAYER, 0, 0.1, &all[1..])?;
        let idle = player.define_filmstrip(SHEET_PLAYER, 0, 0.0, &[0])?;
        let small = player.define_filmstrip(SHEET_ENEMY_SMALL, 1, 0.1, &all)?;
        let large = player.define_filmstrip(SHEET_ENEMY_LARGE, 1, 0.1, &all)?;
        let small_enraged = player.define_filmstrip(SHEET_ENEMY_SMALL, 0, 0.1, &all)?;
        let large_enraged = player.define_filmstrip(SHEET_ENEMY_LARGE, 0, 0.1, &all)?;
        let fire = player.define_filmstrip(SHEET_FIRE, 0, 0.1, &all[..7])?;
        let projectile_small = player.define_filmstrip(SHEET_PROPS, 0, 1.0, &[0])?;
        let projectile_large = player.define_filmstrip(SHEET_PROPS, 0, 1.0, &[1])?;
        let projectile_rocket = player.define_filmstrip(SHEET_PROPS, 0, 1.0, &[2])?;

        Ok(Self {
            player_walk: player.create(walk, true),
            player_idle: player.create(idle, false),
            enemy_small: player.create(small, true),
            enemy_large: player.create(large, true),
            enemy_small_enraged: player.create(small_enraged, true),
            enemy_large_enraged: player.create(large_enraged, true),
            fire: player.create(fire, true),
            projectile_small: player.create(projectile_small, false),
            projectile_large: player.create(projectile_large, false),
            projectile_rocket: player.create(projectile_rocket, false),
        })
    }

    fn enemy(&self, small: bool, enraged: bool) -> AnimationId {
        match (small, enraged) {
            (true, false) => self.enemy_small,
            (true, true) => self.enemy_small_enraged,
            (false, false) => self.enemy_large,
            (false, true) => self.enemy_large_enraged,
        }
    }

    fn is_small_enemy(&self, entity: &Entity) -> bool {
        entity.animation == Some(self.enemy_small) || entity.animation == Some(self.enemy_small_enraged)
    }

    fn projectile(&self, kind: ProjectileKind) -> AnimationId {
        match kind {
            ProjectileKind::Small => self.projectile_small,
            ProjectileKind::Large => self.projectile_large,
            ProjectileKind::Rocket => self.projectile_rocket,
        }
    }
}

struct Handlers {
    player: Rc<dyn HitHandler<Sim>>,
    enemy: Rc<dyn HitHandler<Sim>>,
    projectile: Rc<dyn HitHandler<Sim>>,
    fire: Rc<dyn HitHandler<Sim>>,
}

impl Handlers {
    fn new() -> Self {
        Self {
            player: Rc::new(PlayerHandler),
            enemy: on_static_hit(enemy_on_static_hit),
            projectile: Rc::new(ProjectileHandler),
            fire: on_dynamic_hit(fire_on_hit),
        }
    }
}

#[derive(Default, Debug)]
struct ArenaStats {
    shots: u64,
    jumps: u64,
    enemies_spawned: u64,
    enemies_killed: u64,
    enemies_burned: u64,
    player_hits: u64,
    resets: u64,
}

struct Arena {
    rng: ChaCha8Rng,
    anims: Anims,
    handlers: Handlers,
    player: EntityId,
    player_grounded: bool,
    pending_reset: bool,
    weapon: usize,
    shoot_timer: f32,
    spawn_timer: f32,
    stats: ArenaStats,
}

impl Arena {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            anims: Anims::default(),
            handlers: Handlers::new(),
            player: EntityId::NULL,
            player_grounded: false,
            pending_reset: false,
            weapon: 0,
            shoot_timer: 0.0,
            spawn_timer: 0.0,
            stats: ArenaStats::default(),
        }
    }
}

// ============================================================================
// HIT HANDLERS
// ============================================================================

fn layer_of(sim: &Sim, body: kindle_physics::BodyId) -> u32 {
    sim.physics.body(body).map_or(0, |body| body.filter.layer)
}

struct PlayerHandler;

impl HitHandler<Sim> for PlayerHandler {
    fn on_dynamic_hit(&self, sim: &mut Sim, contact: &BodyContact) {
        if layer_of(sim, contact.other) == ENEMY {
            sim.game.stats.player_hits += 1;
        }
    }

    fn on_static_hit(&self, sim: &mut Sim, contact: &StaticContact) {
        if contact.hit.normal.y > 0.0 {
            sim.game.player_grounded = true;
        }
    }
}

struct ProjectileHandler;

impl HitHandler<Sim> for ProjectileHandler {
    fn on_dynamic_hit(&self, sim: &mut Sim, contact: &BodyContact) {
        if layer_of(sim, contact.other) != ENEMY {
            return;
        }
        if let Some(enemy) = sim.owner_of(contact.other) {
            if sim.damage_entity(enemy, 1) {
                sim.game.stats.enemies_killed += 1;
            }
        }
        if let Some(projectile) = sim.owner_of(contact.body) {
            sim.destroy_entity(projectile);
        }
    }

    fn on_static_hit(&self, sim: &mut Sim, contact: &StaticContact) {
        if let Some(projectile) = sim.owner_of(contact.body) {
            sim.destroy_entity(projectile);
        }
    }
}

/// Turns an enemy around when it walks into a wall.
fn enemy_on_static_hit(sim: &mut Sim, contact: &StaticContact) {
    let direction = contact.hit.normal.x;
    if direction == 0.0 {
        return;
    }
    let Some(id) = sim.owner_of(contact.body) else {
        return;
    };
    let Some(entity) = sim.entities.get(id).copied() else {
        return;
    };

    let mut speed = if sim.game.anims.is_small_enemy(&entity) {
        SPEED_ENEMY_SMALL
    } else {
        SPEED_ENEMY_LARGE
    };
    if entity.enraged {
        speed *= ENRAGED_SPEEDUP;
    }

    if let Some(body) = sim.physics.body_mut(contact.body) {
        body.velocity.x = speed.copysign(direction);
    }
    if let Some(entity) = sim.entities.get_mut(id) {
        entity.flipped = direction < 0.0;
    }
}

/// The fire pit: enemies come back enraged, the player restarts the level.
fn fire_on_hit(sim: &mut Sim, contact: &BodyContact) {
    match layer_of(sim, contact.other) {
        ENEMY => {
            let Some(enemy) = sim.owner_of(contact.other) else {
                return;
            };
            let small = sim
                .entities
                .get(enemy)
                .is_some_and(|entity| sim.game.anims.is_small_enemy(entity));
            let flipped = sim.game.rng.gen_range(0..100) >= 50;

            spawn_enemy(sim, small, true, flipped);
            sim.destroy_entity(enemy);
            sim.game.stats.enemies_burned += 1;
        }
        PLAYER => sim.game.pending_reset = true,
        _ => {}
    }
}

// ============================================================================
// SPAWNING
// ============================================================================

fn spawn_enemy(sim: &mut Sim, small: bool, enraged: bool, flipped: bool) -> EntityId {
    let (size, sprite_offset, mut speed, health) = if small {
        (Vec2::new(12.0, 12.0), Vec2::new(0.0, 6.0), SPEED_ENEMY_SMALL, HEALTH_ENEMY_SMALL)
    } else {
        (Vec2::new(20.0, 20.0), Vec2::new(0.0, 10.0), SPEED_ENEMY_LARGE, HEALTH_ENEMY_LARGE)
    };
    if enraged {
        speed *= ENRAGED_SPEEDUP;
    }

    let x = if flipped { WIDTH } else { 0.0 };
    let desc = EntityDesc::new(Vec2::new(x, HEIGHT - 64.0), size)
        .sprite_offset(sprite_offset)
        .velocity(Vec2::new(if flipped { -speed } else { speed }, 0.0))
        .filter(CollisionFilter::new(ENEMY, ENEMY_MASK))
        .handler(Rc::clone(&sim.game.handlers.enemy))
        .animation(sim.game.anims.enemy(small, enraged))
        .health(health)
        .enraged(enraged)
        .flipped(flipped);

    sim.game.stats.enemies_spawned += 1;
    sim.create_entity(desc)
}

fn spawn_projectile(sim: &mut Sim, weapon: &Weapon, angle: f32, lifetime: f32) {
    let Some(player) = sim.entities.get(sim.game.player).copied() else {
        return;
    };
    let Some(origin) = sim.physics.body(player.body).map(|body| body.aabb.center) else {
        return;
    };

    let speed = if player.flipped {
        -weapon.projectile_speed
    } else {
        weapon.projectile_speed
    };
    let radians = angle.to_radians();
    let desc = EntityDesc::new(origin, Vec2::new(16.0, 16.0))
        .sprite_offset(weapon.sprite_offset)
        .velocity(Vec2::new(speed * radians.cos(), speed * radians.sin()))
        .kinematic(true)
        .filter(CollisionFilter::new(PROJECTILE, PROJECTILE_MASK))
        .handler(Rc::clone(&sim.game.handlers.projectile))
        .animation(sim.game.anims.projectile(weapon.projectile))
        .lifetime(lifetime);

    sim.create_entity(desc);
    sim.game.stats.shots += 1;
}

fn spawn_enemies(sim: &mut Sim) {
    if sim.game.spawn_timer > 0.0 {
        return;
    }
    let rng = &mut sim.game.rng;
    sim.game.spawn_timer = (rng.gen_range(0..200) + 200) as f32 / 100.0 * 0.2;
    let flipped = rng.gen_range(0..100) >= 50;
    let small = rng.gen_range(0..100) > 18;

    spawn_enemy(sim, small, false, flipped);
}

// ============================================================================
// LEVEL
// ============================================================================

fn build_level(sim: &mut Sim) {
    sim.reset();
    sim.game.player_grounded = false;
    sim.game.shoot_timer = 0.0;
    sim.game.spawn_timer = 0.0;

    let player = EntityDesc::new(Vec2::new(100.0, 200.0), Vec2::new(24.0, 24.0))
        .filter(CollisionFilter::new(PLAYER, PLAYER_MASK))
        .handler(Rc::clone(&sim.game.handlers.player))
        .animation(sim.game.anims.player_idle);
    sim.game.player = sim.create_entity(player);

    let terrain = CollisionFilter::solid(TERRAIN);
    let passthrough = CollisionFilter::solid(ENEMY_PASSTHROUGH);
    let level = [
        (Vec2::new(WIDTH * 0.5, HEIGHT - 16.0), Vec2::new(WIDTH, 32.0), terrain),
        (Vec2::new(WIDTH * 0.25 - 16.0, 16.0), Vec2::new(WIDTH * 0.5 - 32.0, 48.0), terrain),
        (Vec2::new(WIDTH * 0.75 + 16.0, 16.0), Vec2::new(WIDTH * 0.5 - 32.0, 48.0), terrain),
        (Vec2::new(16.0, HEIGHT * 0.5 - 96.0), Vec2::new(32.0, HEIGHT), terrain),
        (Vec2::new(WIDTH - 16.0, HEIGHT * 0.5 - 96.0), Vec2::new(32.0, HEIGHT), terrain),
        (Vec2::new(96.0, HEIGHT - 112.0), Vec2::new(128.0, 32.0), terrain),
        (Vec2::new(WIDTH - 96.0, HEIGHT - 112.0), Vec2::new(128.0, 32.0), terrain),
        (Vec2::new(WIDTH * 0.5, HEIGHT - 112.0), Vec2::new(192.0, 32.0), terrain),
        (Vec2::new(WIDTH * 0.5, 120.0), Vec2::new(448.0, 32.0), terrain),
        (Vec2::new(16.0, HEIGHT - 64.0), Vec2::new(32.0, 64.0), passthrough),
        (Vec2::new(WIDTH - 16.0, HEIGHT - 64.0), Vec2::new(32.0, 64.0), passthrough),
    ];
    for (position, size, filter) in level {
        sim.physics.create_static_body(position, size, filter);
    }

    let fire = Rc::clone(&sim.game.handlers.fire);
    sim.physics.create_trigger(
        Vec2::new(WIDTH * 0.5, -4.0),
        Vec2::new(64.0, 8.0),
        CollisionFilter::new(FIRE, FIRE_MASK),
        fire,
    );

    for position in [
        Vec2::new(WIDTH * 0.5, 0.0),
        Vec2::new(WIDTH * 0.5 + 16.0, -16.0),
        Vec2::new(WIDTH * 0.5 - 16.0, -16.0),
    ] {
        let flames = EntityDesc::new(position, Vec2::new(32.0, 64.0))
            .filter(CollisionFilter::new(CollisionFilter::NONE, CollisionFilter::NONE))
            .kinematic(true)
            .animation(sim.game.anims.fire);
        sim.create_entity(flames);
    }
}

// ============================================================================
// SCRIPTED INPUT
// ============================================================================

fn drive_player(sim: &mut Sim) {
    let frame = sim.clock.frame();
    let id = sim.game.player;
    let Some(player) = sim.entities.get(id).copied().filter(|_| sim.entities.is_active(id)) else {
        return;
    };
    let Some(body_velocity) = sim.physics.body(player.body).map(|body| body.velocity) else {
        return;
    };

    if frame > 0 && frame % SWITCH_EVERY == 0 {
        sim.game.weapon = (sim.game.weapon + 1) % WEAPONS.len();
    }

    let animation = if body_velocity.x == 0.0 {
        sim.game.anims.player_idle
    } else {
        sim.game.anims.player_walk
    };

    let right = (frame / TURN_EVERY) % 2 == 0;
    let flipped = !right;
    let mut velocity = Vec2::new(if right { SPEED_PLAYER } else { -SPEED_PLAYER }, body_velocity.y);

    if let Some(entity) = sim.entities.get_mut(id) {
        entity.animation = Some(animation);
        entity.flipped = flipped;
    }

    if sim.game.player_grounded && frame % JUMP_EVERY == 0 {
        sim.game.player_grounded = false;
        velocity.y = JUMP_VELOCITY;
        sim.game.stats.jumps += 1;
    }

    if sim.game.shoot_timer <= 0.0 {
        let weapon = WEAPONS[sim.game.weapon];
        sim.game.shoot_timer = weapon.fire_rate;

        if sim.game.weapon == SHOTGUN {
            let mut angle = 20.0;
            for _ in 0..SHOTGUN_PELLETS {
                angle -= 5.0;
                spawn_projectile(sim, &weapon, angle, SHOTGUN_LIFETIME);
            }
        } else {
            spawn_projectile(sim, &weapon, 0.0, 0.0);
        }

        velocity.x = if flipped { weapon.recoil } else { -weapon.recoil };
    }

    if let Some(body) = sim.physics.body_mut(player.body) {
        body.velocity = velocity;
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let frames = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut sim = Simulation::new(&config, Arena::new(SPAWN_SEED))?;
    sim.game.anims = Anims::load(&mut sim.animations)?;
    build_level(&mut sim);

    let mut accumulator = FrameStatsAccumulator::new();
    let mut sprites_drawn = 0usize;
    let mut debug_boxes = 0usize;
    let dt = sim.clock.step();

    for _ in 0..frames {
        sim.game.shoot_timer -= dt;
        sim.game.spawn_timer -= dt;

        drive_player(&mut sim);
        let stats = sim.tick();
        spawn_enemies(&mut sim);

        sprites_drawn += sim.sprites().count();
        debug_boxes += sim.physics.debug_boxes().len();
        accumulator.record(&stats);

        if sim.game.pending_reset {
            sim.game.pending_reset = false;
            sim.game.stats.resets += 1;
            build_level(&mut sim);
        }
    }

    let player_position = sim
        .entities
        .get(sim.game.player)
        .and_then(|player| sim.physics.body(player.body))
        .map(|body| body.aabb.center);
    let stats = &sim.game.stats;

    println!();
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                  KINDLE ARENA (HEADLESS)                         ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();
    println!("┌─ RUN ────────────────────────────────────────────────────────────┐");
    println!("│ Frames:             {frames} ({:.1} s simulated)", sim.clock.elapsed());
    println!("│ Seed:               {SPAWN_SEED:#x}");
    println!("│ Weapon:             {}", WEAPONS[sim.game.weapon].name);
    println!("│ Player:             {player_position:?}");
    println!("│ Level Restarts:     {}", stats.resets);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("┌─ GAMEPLAY ───────────────────────────────────────────────────────┐");
    println!("│ Shots Fired:        {}", stats.shots);
    println!("│ Jumps:              {}", stats.jumps);
    println!("│ Enemies Spawned:    {}", stats.enemies_spawned);
    println!("│ Enemies Killed:     {}", stats.enemies_killed);
    println!("│ Enemies Enraged:    {}", stats.enemies_burned);
    println!("│ Player Contacts:    {}", stats.player_hits);
    println!("│ Sprites Produced:   {sprites_drawn}");
    println!("│ Debug Boxes:        {debug_boxes}");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    accumulator.print_summary();

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("arena_headless: {err}");
        std::process::exit(1);
    }
}
