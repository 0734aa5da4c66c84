//! # KINDLE Physics
//!
//! Swept AABB physics for a side-scroller.
//!
//! ## Model
//!
//! - **Dynamic bodies** move every frame, fall under gravity unless
//!   kinematic, and are stopped by static bodies
//! - **Static bodies** are the level geometry
//! - Bodies interact when their [`CollisionFilter`]s accept each other
//! - Bodies never push each other; they only report contacts through their
//!   [`HitHandler`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use kindle_physics::{step, BodyDesc, CollisionFilter, PhysicsContext, PhysicsWorld};
//!
//! struct Level {
//!     physics: PhysicsWorld<Level>,
//! }
//!
//! impl PhysicsContext for Level {
//!     fn physics(&self) -> &PhysicsWorld<Self> { &self.physics }
//!     fn physics_mut(&mut self) -> &mut PhysicsWorld<Self> { &mut self.physics }
//! }
//!
//! let mut level = Level { physics: PhysicsWorld::new(PhysicsConfig::default())? };
//! level.physics.create_static_body(Vec2::ZERO, Vec2::new(200.0, 32.0), CollisionFilter::solid(TERRAIN));
//! level.physics.create_body(BodyDesc::new(Vec2::new(0.0, 100.0), Vec2::new(24.0, 24.0)));
//!
//! step(&mut level, 1.0 / 60.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod body;
pub mod config;
pub mod error;
pub mod filter;
pub mod handler;
pub mod static_body;
pub mod step;
pub mod world;

pub use body::{Body, BodyDesc, BodyId, ContactFlags};
pub use config::PhysicsConfig;
pub use error::{PhysicsError, PhysicsResult};
pub use filter::CollisionFilter;
pub use handler::{on_dynamic_hit, on_static_hit, BodyContact, HitHandler, StaticContact};
pub use static_body::{DebugBox, DebugBoxKind, StaticBody, StaticBodyId};
pub use step::{step, PhysicsContext};
pub use world::PhysicsWorld;

pub use kindle_core::{Aabb, Hit, Vec2};
