//! # Memory Management
//!
//! Index-addressed record storage for the simulation.
//!
//! ## Design Philosophy
//!
//! Every subsystem keeps its records in one of two containers:
//! - [`SlotStore`]: a growable array with O(1) append and swap-remove, for
//!   records whose index is never handed out as an identity
//! - [`SlotPool`]: a tombstoning pool on top of a store, for records that
//!   are created and destroyed every frame and addressed by [`SlotId`]
//!
//! Neither container hands out references that survive a mutation.

mod slot_pool;
mod slot_store;

pub use slot_pool::{SlotId, SlotPool};
pub use slot_store::SlotStore;
