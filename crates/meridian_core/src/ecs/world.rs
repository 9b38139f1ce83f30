//! # ECS World
//!
//! The simulation-owned container for entities and their components.
//! Pre-allocates all memory at creation time.
//!
//! The world is the only thing that creates or destroys entities. When a
//! lifecycle sender is installed it publishes [`LifecycleEvent`]s so the
//! presentation side can attach and detach pose snapshots.

use meridian_shared::Transform;

use super::component::{CargoHold, Component, RenderTint, Renderable, ResourceDeposit};
use super::entity::{EntityId, EntitySlot};
use super::storage::ComponentStorage;
use crate::events::{LifecycleEvent, LifecycleSender};

/// The simulation world.
///
/// All memory is pre-allocated at creation. Spawn, despawn and component
/// access never allocate.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(10_000);
///
/// let ship = world.spawn_with_transform(Transform::IDENTITY);
/// world.make_renderable(ship, Renderable::new(RenderKind::Carrier, 12.0));
/// ```
pub struct World {
    slots: Box<[EntitySlot]>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    alive_count: usize,
    capacity: usize,
    lifecycle: Option<LifecycleSender>,

    // =========================================================================
    // Component Storages
    // =========================================================================
    transforms: ComponentStorage<Transform>,
    renderables: ComponentStorage<Renderable>,
    cargo_holds: ComponentStorage<CargoHold>,
    deposits: ComponentStorage<ResourceDeposit>,
    tints: ComponentStorage<RenderTint>,
}

impl World {
    /// Creates a new world with the specified entity capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        let slots = vec![EntitySlot::vacant(); capacity].into_boxed_slice();
        // Reversed so the lowest index is handed out first
        let free_indices: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots,
            free_indices,
            alive_count: 0,
            capacity,
            lifecycle: None,
            transforms: ComponentStorage::new(capacity),
            renderables: ComponentStorage::new(capacity),
            cargo_holds: ComponentStorage::new(capacity),
            deposits: ComponentStorage::new(capacity),
            tints: ComponentStorage::new(capacity),
        }
    }

    /// Creates a world that publishes lifecycle events to `sender`.
    #[must_use]
    pub fn with_lifecycle(capacity: usize, sender: LifecycleSender) -> Self {
        let mut world = Self::new(capacity);
        world.lifecycle = Some(sender);
        world
    }

    /// Installs (or replaces) the lifecycle event sender.
    pub fn set_lifecycle_sender(&mut self, sender: LifecycleSender) {
        self.lifecycle = Some(sender);
    }

    /// Maximum number of simultaneously alive entities.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Spawns a new entity with an identity transform.
    ///
    /// Returns `EntityId::NULL` if capacity is reached.
    #[inline]
    pub fn spawn(&mut self) -> EntityId {
        self.spawn_with_transform(Transform::IDENTITY)
    }

    /// Spawns a new entity at `transform`.
    ///
    /// Returns `EntityId::NULL` if capacity is reached.
    pub fn spawn_with_transform(&mut self, transform: Transform) -> EntityId {
        let Some(index) = self.free_indices.pop() else {
            tracing::warn!(capacity = self.capacity, "world full, spawn refused");
            return EntityId::NULL;
        };

        let idx = index as usize;
        let slot = &mut self.slots[idx];

        // New generation invalidates every handle to the previous occupant
        let generation = slot.id.generation().wrapping_add(1);
        let id = EntityId::new(index, generation);

        *slot = EntitySlot::new(id);
        slot.add_component(Transform::ID);
        self.transforms.set(idx, transform);
        self.alive_count += 1;

        id
    }

    /// Despawns an entity, freeing its slot for reuse.
    ///
    /// Publishes [`LifecycleEvent::Despawned`] if the entity was renderable.
    /// Returns `false` if the ID was null, stale or already dead.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let idx = id.slot();
        let was_renderable = self.slots[idx].has_component(Renderable::ID);

        let slot = &mut self.slots[idx];
        slot.alive = false;
        slot.component_mask = 0;
        self.alive_count -= 1;
        self.free_indices.push(id.index());

        self.transforms.reset(idx);
        self.renderables.reset(idx);
        self.cargo_holds.reset(idx);
        self.deposits.reset(idx);
        self.tints.reset(idx);

        if was_renderable {
            self.publish(LifecycleEvent::Despawned { entity: id });
        }

        true
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        self.slots
            .get(id.slot())
            .is_some_and(|slot| slot.alive && slot.id.generation() == id.generation())
    }

    /// Slot for a live entity, or `None` if dead or stale.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySlot> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots.get(id.slot())
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    /// Live transform of an entity.
    #[inline]
    #[must_use]
    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        if !self.is_alive(id) {
            return None;
        }
        self.transforms.get(id.slot())
    }

    /// Mutable live transform of an entity.
    #[inline]
    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        if !self.is_alive(id) {
            return None;
        }
        self.transforms.get_mut(id.slot())
    }

    /// Overwrites the live transform. Returns `false` if the entity is dead.
    #[inline]
    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> bool {
        match self.transform_mut(id) {
            Some(slot) => {
                *slot = transform;
                true
            }
            None => false,
        }
    }

    /// All transform slots, indexed by [`EntityId::slot`].
    #[inline]
    #[must_use]
    pub fn transforms(&self) -> &[Transform] {
        self.transforms.as_slice()
    }

    // =========================================================================
    // Renderables
    // =========================================================================

    /// Marks an entity renderable and publishes
    /// [`LifecycleEvent::BecameRenderable`].
    ///
    /// Calling it again on an already renderable entity updates the marker
    /// without publishing a second event.
    pub fn make_renderable(&mut self, id: EntityId, renderable: Renderable) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.slot();
        let newly = !self.slots[idx].has_component(Renderable::ID);
        self.slots[idx].add_component(Renderable::ID);
        self.renderables.set(idx, renderable);

        if newly {
            self.publish(LifecycleEvent::BecameRenderable {
                entity: id,
                renderable,
            });
        }
        true
    }

    /// Whether the entity is alive and renderable.
    #[inline]
    #[must_use]
    pub fn is_renderable(&self, id: EntityId) -> bool {
        self.has::<Renderable>(id)
    }

    /// Renderable marker of an entity.
    #[inline]
    #[must_use]
    pub fn renderable(&self, id: EntityId) -> Option<Renderable> {
        self.component(id, &self.renderables)
    }

    // =========================================================================
    // Simulation data read by the presentation layer
    // =========================================================================

    /// Attaches or replaces a cargo hold.
    pub fn set_cargo_hold(&mut self, id: EntityId, hold: CargoHold) -> bool {
        self.attach(id, hold, |world| &mut world.cargo_holds)
    }

    /// Cargo hold of an entity.
    #[must_use]
    pub fn cargo_hold(&self, id: EntityId) -> Option<CargoHold> {
        self.component(id, &self.cargo_holds)
    }

    /// Mutable cargo hold of an entity.
    pub fn cargo_hold_mut(&mut self, id: EntityId) -> Option<&mut CargoHold> {
        if !self.has::<CargoHold>(id) {
            return None;
        }
        self.cargo_holds.get_mut(id.slot())
    }

    /// Attaches or replaces a resource deposit.
    pub fn set_deposit(&mut self, id: EntityId, deposit: ResourceDeposit) -> bool {
        self.attach(id, deposit, |world| &mut world.deposits)
    }

    /// Resource deposit of an entity.
    #[must_use]
    pub fn deposit(&self, id: EntityId) -> Option<ResourceDeposit> {
        self.component(id, &self.deposits)
    }

    /// Mutable resource deposit of an entity.
    pub fn deposit_mut(&mut self, id: EntityId) -> Option<&mut ResourceDeposit> {
        if !self.has::<ResourceDeposit>(id) {
            return None;
        }
        self.deposits.get_mut(id.slot())
    }

    /// Attaches or replaces a color override.
    pub fn set_tint(&mut self, id: EntityId, tint: RenderTint) -> bool {
        self.attach(id, tint, |world| &mut world.tints)
    }

    /// Color override of an entity.
    #[must_use]
    pub fn tint(&self, id: EntityId) -> Option<RenderTint> {
        self.component(id, &self.tints)
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Iterates over the handles of all alive entities.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().filter(|s| s.alive).map(|s| s.id)
    }

    /// Iterates over `(handle, marker)` for all alive renderable entities.
    pub fn iter_renderable(&self) -> impl Iterator<Item = (EntityId, Renderable)> + '_ {
        let renderables = self.renderables.as_slice();
        self.slots
            .iter()
            .zip(renderables.iter())
            .filter(|(s, _)| s.alive && s.has_component(Renderable::ID))
            .map(|(s, r)| (s.id, *r))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn has<C: Component>(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|slot| slot.has_component(C::ID))
    }

    fn component<C: Component>(&self, id: EntityId, storage: &ComponentStorage<C>) -> Option<C> {
        if !self.has::<C>(id) {
            return None;
        }
        storage.get(id.slot()).copied()
    }

    fn attach<C, F>(&mut self, id: EntityId, value: C, storage: F) -> bool
    where
        C: Component,
        F: FnOnce(&mut Self) -> &mut ComponentStorage<C>,
    {
        if !self.is_alive(id) {
            return false;
        }
        let idx = id.slot();
        self.slots[idx].add_component(C::ID);
        storage(self).set(idx, value);
        true
    }

    fn publish(&self, event: LifecycleEvent) {
        if let Some(sender) = &self.lifecycle {
            sender.send(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{RenderKind, ResourceKind};
    use crate::events::LifecycleBus;
    use meridian_shared::Vec3;

    #[test]
    fn test_world_creation() {
        let world = World::new(1000);
        assert_eq!(world.capacity(), 1000);
        assert_eq!(world.alive_count(), 0);
    }

    #[test]
    fn test_spawn_despawn() {
        let mut world = World::new(100);

        let id1 = world.spawn();
        assert!(!id1.is_null());
        assert!(world.is_alive(id1));
        assert_eq!(world.alive_count(), 1);

        let id2 = world.spawn();
        assert!(!id2.is_null());
        assert_eq!(world.alive_count(), 2);

        assert!(world.despawn(id1));
        assert!(!world.is_alive(id1));
        assert!(!world.despawn(id1));
        assert_eq!(world.alive_count(), 1);

        // Spawn again - should reuse the slot
        let id3 = world.spawn();
        assert_eq!(id3.index(), id1.index());
        assert_ne!(id3.generation(), id1.generation());
        assert!(world.transform(id1).is_none());
    }

    #[test]
    fn test_capacity_exhausted() {
        let mut world = World::new(2);
        assert!(!world.spawn().is_null());
        assert!(!world.spawn().is_null());
        assert!(world.spawn().is_null());
    }

    #[test]
    fn test_transform_access() {
        let mut world = World::new(4);
        let id = world.spawn_with_transform(Transform::from_position(Vec3::X));
        assert_eq!(world.transform(id).map(|t| t.position), Some(Vec3::X));

        assert!(world.set_transform(id, Transform::from_position(Vec3::Y)));
        assert_eq!(world.transforms()[id.slot()].position, Vec3::Y);

        world.despawn(id);
        assert!(!world.set_transform(id, Transform::IDENTITY));
    }

    #[test]
    fn test_renderable_events() {
        let (tx, rx) = LifecycleBus::create_pair(16);
        let mut world = World::with_lifecycle(8, tx);

        let plain = world.spawn();
        let ship = world.spawn();
        let marker = Renderable::new(RenderKind::Carrier, 10.0);

        assert!(world.make_renderable(ship, marker));
        // Second call updates the marker only
        assert!(world.make_renderable(ship, Renderable::new(RenderKind::Carrier, 20.0)));
        assert_eq!(world.renderable(ship).map(|r| r.size_hint), Some(20.0));

        world.despawn(plain);
        world.despawn(ship);

        let mut events = Vec::new();
        rx.drain_into(&mut events);
        assert_eq!(
            events,
            vec![
                LifecycleEvent::BecameRenderable {
                    entity: ship,
                    renderable: marker
                },
                LifecycleEvent::Despawned { entity: ship },
            ]
        );
    }

    #[test]
    fn test_iter_renderable() {
        let mut world = World::new(8);
        let a = world.spawn();
        let _b = world.spawn();
        let c = world.spawn();
        world.make_renderable(a, Renderable::new(RenderKind::Asteroid, 0.0));
        world.make_renderable(c, Renderable::new(RenderKind::Pickup, 5.0));

        let ids: Vec<_> = world.iter_renderable().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
        assert_eq!(world.iter_alive().count(), 3);
    }

    #[test]
    fn test_optional_components() {
        let mut world = World::new(4);
        let vessel = world.spawn();
        assert!(world.cargo_hold(vessel).is_none());

        world.set_cargo_hold(vessel, CargoHold::new(50.0, ResourceKind::Minerals, EntityId::NULL));
        if let Some(hold) = world.cargo_hold_mut(vessel) {
            hold.amount = 12.0;
        }
        assert_eq!(world.cargo_hold(vessel).map(|h| h.amount), Some(12.0));
        assert!(world.deposit(vessel).is_none());

        world.despawn(vessel);
        assert!(world.cargo_hold(vessel).is_none());
    }
}
