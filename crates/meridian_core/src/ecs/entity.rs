//! # Entity Handles
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into component arrays (and the snapshot arena)
//! - A generation counter so a recycled slot never aliases an old handle

use std::fmt;

/// Stable handle for a simulation entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into component arrays
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Creates a new entity ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the slot index as a `usize` for array access.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.index() as usize
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw 64-bit representation.
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.0
    }

    /// Rebuilds a handle from [`to_bits`](Self::to_bits) output.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("entity(null)")
        } else {
            write!(f, "entity({}v{})", self.index(), self.generation())
        }
    }
}

/// One slot of the world's entity table.
///
/// Tracks which components are attached via a bitmask indexed by
/// [`Component::ID`](super::Component::ID).
#[derive(Clone, Copy, Debug)]
pub struct EntitySlot {
    /// Handle currently (or last) occupying this slot.
    pub id: EntityId,
    /// Bitmask of attached components (up to 64 component types).
    pub component_mask: u64,
    /// Whether this slot is currently alive.
    pub alive: bool,
}

impl EntitySlot {
    /// Creates a live slot for `id` with no components.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            component_mask: 0,
            alive: true,
        }
    }

    /// Creates a dead/empty slot.
    #[inline]
    #[must_use]
    pub const fn vacant() -> Self {
        Self {
            id: EntityId::new(0, 0),
            component_mask: 0,
            alive: false,
        }
    }

    /// Checks if this slot has a specific component.
    #[inline]
    #[must_use]
    pub const fn has_component(self, component_id: u8) -> bool {
        (self.component_mask & (1 << component_id)) != 0
    }

    /// Sets a component flag.
    #[inline]
    pub fn add_component(&mut self, component_id: u8) {
        self.component_mask |= 1 << component_id;
    }

    /// Clears a component flag.
    #[inline]
    pub fn remove_component(&mut self, component_id: u8) {
        self.component_mask &= !(1 << component_id);
    }
}

impl Default for EntitySlot {
    fn default() -> Self {
        Self::vacant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_parts() {
        let id = EntityId::new(4_000_000, 7);
        assert_eq!(id.index(), 4_000_000);
        assert_eq!(id.slot(), 4_000_000);
        assert_eq!(id.generation(), 7);
        assert!(!id.is_null());
        assert!(EntityId::default().is_null());
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::new(3, 2).to_string(), "entity(3v2)");
        assert_eq!(EntityId::NULL.to_string(), "entity(null)");
    }

    #[test]
    fn test_slot_component_mask() {
        let mut slot = EntitySlot::new(EntityId::new(0, 1));
        assert!(!slot.has_component(2));

        slot.add_component(2);
        assert!(slot.has_component(2));
        assert!(!slot.has_component(0));

        slot.remove_component(2);
        assert_eq!(slot.component_mask, 0);
    }
}
