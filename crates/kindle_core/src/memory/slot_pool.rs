//! # Slot Pool
//!
//! Tombstoning record pool with generation-tagged ids.
//!
//! Destroying a record only clears its active flag. The slot keeps its data
//! until the next insert reuses it, at which point the slot's generation is
//! bumped so that ids handed out before the reuse stop validating.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::slot_store::SlotStore;
use crate::error::CoreResult;

/// Identifier of a record in a [`SlotPool`].
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index of the slot
/// - Upper 32 bits: Generation of the slot when the record was inserted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SlotId(u64);

impl SlotId {
    /// Null/invalid slot ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a slot ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the packed representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds an ID from [`to_bits`](Self::to_bits).
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Checks if this ID is the null sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::NULL
    }
}

/// Declares a typed id over [`SlotId`].
///
/// ```rust,ignore
/// kindle_core::slot_handle! {
///     /// Handle to a body.
///     BodyId
/// }
/// ```
#[macro_export]
macro_rules! slot_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name($crate::SlotId);

        impl $name {
            /// Null/invalid handle.
            pub const NULL: Self = Self($crate::SlotId::NULL);

            /// Wraps a raw slot id.
            #[inline]
            #[must_use]
            pub const fn from_slot(slot: $crate::SlotId) -> Self {
                Self(slot)
            }

            /// Returns the raw slot id.
            #[inline]
            #[must_use]
            pub const fn slot(self) -> $crate::SlotId {
                self.0
            }

            /// Returns the slot index.
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.0.index()
            }

            /// Checks if this handle is the null sentinel.
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::NULL
            }
        }
    };
}

/// One pool slot: the record plus its bookkeeping.
#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    active: bool,
    value: T,
}

/// A pool of records that are destroyed by tombstoning.
///
/// Inserts reuse the lowest-indexed tombstone before growing, the same slot
/// a linear first-inactive scan would pick, but found through a min-heap.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It is owned by exactly one subsystem.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: SlotPool<&str> = SlotPool::new();
///
/// let a = pool.insert("bullet")?;
/// pool.destroy(a);
///
/// // Slot 0 is reused, `a` no longer validates.
/// let b = pool.insert("enemy")?;
/// assert_eq!(a.index(), b.index());
/// assert!(pool.get(a).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    /// All slots ever created since the last clear.
    slots: SlotStore<Slot<T>>,
    /// Tombstoned indices, smallest first.
    free: BinaryHeap<Reverse<u32>>,
    /// Number of live records.
    active_count: usize,
    /// Generation for freshly appended slots.
    generation_base: u32,
}

impl<T> SlotPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty pool with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotStore::with_capacity(capacity),
            free: BinaryHeap::new(),
            active_count: 0,
            generation_base: 0,
        }
    }

    /// Returns the number of slots, live or tombstoned.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the pool has no slots at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the number of live records.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Stores a record, reusing the lowest tombstoned slot if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AllocationFailed`](crate::CoreError::AllocationFailed)
    /// if the pool has to grow and cannot.
    pub fn insert(&mut self, value: T) -> CoreResult<SlotId> {
        if let Some(Reverse(index)) = self.free.pop() {
            if let Some(slot) = self.slots.get_mut(index as usize) {
                slot.generation = slot.generation.wrapping_add(1);
                slot.active = true;
                slot.value = value;
                self.active_count += 1;
                return Ok(SlotId::new(index, slot.generation));
            }
        }

        let generation = self.generation_base;
        let index = self.slots.push(Slot {
            generation,
            active: true,
            value,
        })?;
        self.active_count += 1;

        Ok(SlotId::new(index as u32, generation))
    }

    /// Tombstones a live record.
    ///
    /// The record stays readable through [`get`](Self::get) until its slot is
    /// reused.
    ///
    /// # Returns
    ///
    /// `true` if the record was live, `false` if it was already destroyed or
    /// the id is stale.
    pub fn destroy(&mut self, id: SlotId) -> bool {
        let Some(slot) = self.slot_mut(id) else {
            return false;
        };
        if !slot.active {
            return false;
        }

        slot.active = false;
        self.free.push(Reverse(id.index()));
        self.active_count -= 1;
        true
    }

    /// Checks if `id` refers to a live record.
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: SlotId) -> bool {
        self.slot(id).is_some_and(|slot| slot.active)
    }

    /// Gets a record, live or tombstoned, if `id` still owns its slot.
    #[inline]
    #[must_use]
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slot(id).map(|slot| &slot.value)
    }

    /// Gets a mutable record, live or tombstoned, if `id` still owns its slot.
    #[inline]
    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slot_mut(id).map(|slot| &mut slot.value)
    }

    /// Returns the current id of the slot at `index`, live or not.
    #[must_use]
    pub fn id_at(&self, index: usize) -> Option<SlotId> {
        self.slots
            .as_slice()
            .get(index)
            .map(|slot| SlotId::new(index as u32, slot.generation))
    }

    /// Returns the id of the record at `index` if that record is live.
    #[must_use]
    pub fn active_id_at(&self, index: usize) -> Option<SlotId> {
        self.slots
            .as_slice()
            .get(index)
            .filter(|slot| slot.active)
            .map(|slot| SlotId::new(index as u32, slot.generation))
    }

    /// Iterates over live records in index order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (SlotId::new(index as u32, slot.generation), &slot.value))
    }

    /// Iterates mutably over live records in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (SlotId::new(index as u32, slot.generation), &mut slot.value))
    }

    /// Iterates over every slot in index order, with its live flag.
    pub fn iter_all(&self) -> impl Iterator<Item = (SlotId, bool, &T)> {
        self.slots.iter().enumerate().map(|(index, slot)| {
            (SlotId::new(index as u32, slot.generation), slot.active, &slot.value)
        })
    }

    /// Drops every record at once. Capacity is kept.
    ///
    /// Ids handed out before the clear never validate afterwards.
    pub fn clear(&mut self) {
        let newest = self
            .slots
            .iter()
            .map(|slot| slot.generation)
            .max()
            .unwrap_or(self.generation_base);
        self.generation_base = newest.max(self.generation_base).wrapping_add(1);

        self.slots.clear();
        self.free.clear();
        self.active_count = 0;
    }

    fn slot(&self, id: SlotId) -> Option<&Slot<T>> {
        if id.is_null() {
            return None;
        }
        self.slots
            .as_slice()
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot<T>> {
        if id.is_null() {
            return None;
        }
        self.slots
            .as_mut_slice()
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
