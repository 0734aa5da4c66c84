//! # KINDLE Sim
//!
//! Game objects and sprite animation on top of [`kindle_physics`], plus the
//! [`Simulation`] context that steps them in a fixed order.
//!
//! ## Frame Order
//!
//! 1. The driver writes desired velocities into bodies
//! 2. Physics integrates and resolves, calling hit handlers with
//!    `&mut Simulation<G>`
//! 3. Animations advance
//! 4. Entities whose lifetime ran out are destroyed
//! 5. The driver reads [`Simulation::sprites`] and draws
//!
//! ## Example
//!
//! ```rust,ignore
//! use kindle_sim::{EntityDesc, SimConfig, Simulation};
//!
//! let config = SimConfig::load("kindle.toml")?;
//! let mut sim = Simulation::new(&config, ())?;
//! sim.physics.create_static_body(Vec2::ZERO, Vec2::new(640.0, 32.0), CollisionFilter::solid(TERRAIN));
//! sim.create_entity(EntityDesc::new(Vec2::new(100.0, 200.0), Vec2::new(24.0, 24.0)));
//!
//! for _ in 0..600 {
//!     sim.tick();
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod simulation;

pub use animation::{
    Animation, AnimationDefinition, AnimationFrame, AnimationId, AnimationPlayer, DefinitionId,
    RenderFrame, SheetId, MAX_FRAMES,
};
pub use clock::{FrameClock, FrameStats, FrameStatsAccumulator};
pub use config::{ClockConfig, SimConfig};
pub use entity::{Entity, EntityDesc, EntityId, EntityManager};
pub use error::{AnimationError, SimError, SimResult};
pub use simulation::{Simulation, Sprite};
