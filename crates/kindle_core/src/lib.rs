//! # KINDLE Core
//!
//! Storage and geometry primitives shared by the physics world, the entity
//! manager and the animation player.
//!
//! ## Architecture Rules
//!
//! 1. **Index handles, not pointers** - Records live in slot stores and are
//!    addressed by index (plus a generation tag where identity matters)
//! 2. **Tombstones over compaction** - Destroying a record flips a flag; the
//!    slot is reused by the next insert
//! 3. **Allocation failure is fatal** - Growth is fallible internally, but a
//!    failed growth terminates the process through [`fatal`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use kindle_core::{Aabb, Vec2, sweep};
//!
//! let wall = Aabb::from_size(Vec2::new(20.0, 0.0), Vec2::new(10.0, 10.0));
//! let hit = sweep(Vec2::ZERO, Vec2::new(30.0, 0.0), &wall);
//! assert!(hit.is_some());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod math;
pub mod memory;

pub use error::{fatal, CoreError, CoreResult};
pub use math::{sweep, Aabb, Hit, Vec2};
pub use memory::{SlotId, SlotPool, SlotStore};
