//! Snapshot arena keyed by entity slot.
//!
//! One [`PoseSnapshot`] per tracked entity, stored densely at the entity's
//! slot index. The owner column records which generation a slot belongs to,
//! so a handle to a despawned entity never reads its successor's history.

use meridian_shared::Transform;

use super::pose::PoseSnapshot;
use crate::ecs::{ComponentStorage, EntityId, World};

/// Pose history for every tracked entity.
pub struct SnapshotStore {
    snapshots: ComponentStorage<PoseSnapshot>,
    owners: Box<[EntityId]>,
    len: usize,
}

impl SnapshotStore {
    /// Creates a store with room for `capacity` entity slots.
    ///
    /// Use the world's capacity so every slot index fits.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: ComponentStorage::new(capacity),
            owners: vec![EntityId::NULL; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.owners.len()
    }

    /// Number of tracked entities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is tracked.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether `entity` has a snapshot.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        !entity.is_null() && self.owners.get(entity.slot()) == Some(&entity)
    }

    /// Starts tracking `entity`, seeding both halves with `live` at `tick`.
    ///
    /// Returns `true` if a snapshot was created. Attaching an already
    /// tracked entity leaves its history untouched and returns `false`.
    /// A snapshot left behind by an older generation in the same slot is
    /// replaced.
    pub fn attach(&mut self, entity: EntityId, live: Transform, tick: u32) -> bool {
        if entity.is_null() {
            return false;
        }
        let idx = entity.slot();
        let Some(owner) = self.owners.get_mut(idx) else {
            tracing::warn!(%entity, capacity = self.snapshots.capacity(), "snapshot slot out of range");
            return false;
        };
        if *owner == entity {
            return false;
        }
        if owner.is_null() {
            self.len += 1;
        } else {
            tracing::debug!(stale = %*owner, %entity, "replacing stale snapshot");
        }
        *owner = entity;
        self.snapshots.set(idx, PoseSnapshot::seeded(live, tick));
        tracing::trace!(%entity, tick, "snapshot attached");
        true
    }

    /// Stops tracking `entity`. Returns `false` if it was not tracked.
    pub fn detach(&mut self, entity: EntityId) -> bool {
        if !self.contains(entity) {
            return false;
        }
        let idx = entity.slot();
        self.owners[idx] = EntityId::NULL;
        self.snapshots.reset(idx);
        self.len -= 1;
        tracing::trace!(%entity, "snapshot detached");
        true
    }

    /// Snapshot of `entity`.
    #[inline]
    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&PoseSnapshot> {
        if !self.contains(entity) {
            return None;
        }
        self.snapshots.get(entity.slot())
    }

    /// Interpolated pose of `entity` at `alpha` (unclamped).
    #[inline]
    #[must_use]
    pub fn sample(&self, entity: EntityId, alpha: f32) -> Option<Transform> {
        self.get(entity).map(|snap| snap.sample(alpha))
    }

    /// Iterates over `(entity, snapshot)` for all tracked entities, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &PoseSnapshot)> + '_ {
        self.owners
            .iter()
            .zip(self.snapshots.as_slice())
            .filter(|(owner, _)| !owner.is_null())
            .map(|(owner, snap)| (*owner, snap))
    }

    /// Detaches every snapshot whose owner is no longer alive in `world`.
    ///
    /// Returns the number detached.
    pub fn retain_alive(&mut self, world: &World) -> usize {
        let mut removed = 0;
        for (idx, owner) in self.owners.iter_mut().enumerate() {
            if owner.is_null() || world.is_alive(*owner) {
                continue;
            }
            tracing::debug!(entity = %*owner, "dropping snapshot of dead entity");
            *owner = EntityId::NULL;
            self.snapshots.reset(idx);
            removed += 1;
        }
        self.len -= removed;
        removed
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.owners.fill(EntityId::NULL);
        self.snapshots.clear();
        self.len = 0;
    }

    /// Owner column and snapshot column, for the advance pass.
    pub(crate) fn columns_mut(&mut self) -> (&[EntityId], &mut [PoseSnapshot]) {
        (&self.owners, self.snapshots.as_mut_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_shared::Vec3;

    #[test]
    fn test_attach_seeds_both_halves() {
        let mut store = SnapshotStore::new(8);
        let e = EntityId::new(3, 1);
        let live = Transform::from_position(Vec3::new(4.0, 5.0, 6.0));

        assert!(store.attach(e, live, 42));
        let snap = store.get(e).unwrap();
        assert_eq!(snap.prev_pose(), live);
        assert_eq!(snap.curr_pose(), live);
        assert_eq!((snap.prev_tick(), snap.curr_tick()), (42, 42));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut store = SnapshotStore::new(8);
        let e = EntityId::new(0, 1);
        store.attach(e, Transform::IDENTITY, 1);
        assert!(!store.attach(e, Transform::from_position(Vec3::X), 7));
        assert_eq!(store.get(e).unwrap().curr_tick(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_stale_generation_isolated() {
        let mut store = SnapshotStore::new(4);
        let old = EntityId::new(2, 1);
        let new = EntityId::new(2, 2);

        store.attach(old, Transform::IDENTITY, 1);
        assert!(store.get(new).is_none());

        assert!(store.attach(new, Transform::from_position(Vec3::Y), 5));
        assert!(store.get(old).is_none());
        assert!(!store.detach(old));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_detach() {
        let mut store = SnapshotStore::new(4);
        let e = EntityId::new(1, 1);
        store.attach(e, Transform::IDENTITY, 0);
        assert!(store.detach(e));
        assert!(!store.detach(e));
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
    }

    #[test]
    fn test_out_of_range_and_null() {
        let mut store = SnapshotStore::new(2);
        assert!(!store.attach(EntityId::new(5, 1), Transform::IDENTITY, 0));
        assert!(!store.attach(EntityId::NULL, Transform::IDENTITY, 0));
        assert!(store.is_empty());
    }

    #[test]
    fn test_retain_alive() {
        let mut world = World::new(4);
        let a = world.spawn();
        let b = world.spawn();
        let mut store = SnapshotStore::new(world.capacity());
        store.attach(a, Transform::IDENTITY, 0);
        store.attach(b, Transform::IDENTITY, 0);

        world.despawn(a);
        assert_eq!(store.retain_alive(&world), 1);
        assert!(!store.contains(a));
        assert!(store.contains(b));
        assert_eq!(store.len(), 1);
    }
}
