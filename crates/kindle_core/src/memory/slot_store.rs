//! # Slot Store
//!
//! Growable array of fixed-size records with a logical length.

use crate::error::{CoreError, CoreResult};

/// A growable, index-addressed array of records.
///
/// Capacity doubles when an append finds the store full. Growth uses a
/// fallible reservation so that the caller decides how to report an
/// allocation failure (every subsystem treats it as fatal).
///
/// Removal either swaps the last record into the freed index
/// ([`remove_swap`](Self::remove_swap)), which changes the last record's
/// index, or drops everything at once ([`clear`](Self::clear)). Callers that
/// need stable identities use [`SlotPool`](super::SlotPool) instead.
///
/// # Example
///
/// ```rust,ignore
/// let mut store: SlotStore<u32> = SlotStore::with_capacity(4);
/// let index = store.push(7)?;
/// assert_eq!(store.get(index), Some(&7));
/// ```
#[derive(Debug, Clone)]
pub struct SlotStore<T> {
    /// Records, `items.len()` is the logical length.
    items: Vec<T>,
}

impl<T> SlotStore<T> {
    /// Creates an empty store without reserving memory.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Creates an empty store with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Returns the logical length.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the store holds no records.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of records the store can hold without growing.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Appends a record and returns its index.
    ///
    /// Amortized **O(1)**. When the store is full its capacity is doubled
    /// (or set to one for an empty store).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AllocationFailed`] if the store cannot grow.
    pub fn push(&mut self, item: T) -> CoreResult<usize> {
        let capacity = self.items.capacity();
        if self.items.len() == capacity {
            let additional = capacity.max(1);
            self.items
                .try_reserve_exact(additional)
                .map_err(|_| CoreError::AllocationFailed {
                    requested: capacity + additional,
                })?;
        }

        let index = self.items.len();
        self.items.push(item);
        Ok(index)
    }

    /// Gets a record by index.
    ///
    /// Returns `None`, and logs a diagnostic, if `index` is past the length.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        let item = self.items.get(index);
        if item.is_none() {
            tracing::warn!(index, len = self.items.len(), "slot store lookup out of range");
        }
        item
    }

    /// Gets a mutable record by index.
    ///
    /// Returns `None`, and logs a diagnostic, if `index` is past the length.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let len = self.items.len();
        let item = self.items.get_mut(index);
        if item.is_none() {
            tracing::warn!(index, len, "slot store lookup out of range");
        }
        item
    }

    /// Removes a record in **O(1)** by moving the last record into its slot.
    ///
    /// The record previously at `len - 1` now lives at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyStore`] on an empty store and
    /// [`CoreError::IndexOutOfRange`] if `index` is past the length.
    pub fn remove_swap(&mut self, index: usize) -> CoreResult<T> {
        let len = self.items.len();
        if len == 0 {
            return Err(CoreError::EmptyStore);
        }
        if index >= len {
            return Err(CoreError::IndexOutOfRange { index, len });
        }
        Ok(self.items.swap_remove(index))
    }

    /// Resets the length to zero. Capacity is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns all records as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns all records as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Iterates over all records in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates mutably over all records in index order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }
}

impl<T> Default for SlotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
