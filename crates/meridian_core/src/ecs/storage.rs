//! # Component Storage
//!
//! Pre-allocated, dense component storage indexed by entity slot.
//!
//! - All slots are allocated when the world is created
//! - Access is O(1) via [`EntityId::slot`](super::EntityId::slot)
//! - Iteration walks contiguous memory, which is what the per-tick advance
//!   and the render sampler want

use super::component::Component;

/// Pre-allocated storage for a single component type.
///
/// Slot contents for dead entities are left at `C::default()`; liveness is
/// tracked by the world, not here.
pub struct ComponentStorage<C: Component> {
    data: Box<[C]>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates storage with `capacity` default-initialized slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self {
            data: vec![C::default(); capacity].into_boxed_slice(),
        }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Component at `index`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index)
    }

    /// Mutable component at `index`, or `None` if out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index)
    }

    /// Overwrites the slot at `index`.
    ///
    /// Returns `false` if `index` is out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) -> bool {
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = component;
                true
            }
            None => false,
        }
    }

    /// Resets a slot to the component default.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        if let Some(slot) = self.data.get_mut(index) {
            *slot = C::default();
        }
    }

    /// All slots, live or not.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }

    /// All slots, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.data
    }

    /// Iterates over `(index, component)` pairs.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.data.iter().enumerate()
    }

    /// Resets every slot.
    pub fn clear(&mut self) {
        self.data.fill(C::default());
    }
}
