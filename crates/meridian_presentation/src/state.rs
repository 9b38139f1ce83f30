//! Per-entity presentation state.
//!
//! Everything the renderer needs beyond the simulation's own components:
//! the pose history, the resolved base scale and color, and smoothed
//! overlay scales. Slots are indexed by entity slot like the world's
//! storages, so the state is sized from the world's capacity.

use meridian_core::{
    ComponentStorage, EntityId, RenderKind, RenderTint, Renderable, SnapshotStore, World,
};

use crate::color::{resolve_fallback, resource_color, Rgba};
use crate::config::BakedPresentationConfig;
use crate::overlay::{drive_cargo, drive_marker, MarkerParent, OverlayScale, OverlayState};
use crate::scale::{pickup_scale, resolve_scale, smooth_scale, smoothing_factor, PresentationScale};

/// Pickup amount above which a pickup is drawn.
pub const PICKUP_VISIBLE_THRESHOLD: f32 = 0.01;

/// Presentation data for every tracked entity.
pub struct PresentationState {
    snapshots: SnapshotStore,
    kinds: ComponentStorage<Renderable>,
    scales: ComponentStorage<PresentationScale>,
    tints: ComponentStorage<RenderTint>,
    overlay_scales: ComponentStorage<OverlayScale>,
    hidden: Box<[bool]>,
    bounds: Box<[Option<f32>]>,
    overlays: Vec<(EntityId, OverlayState)>,
}

impl PresentationState {
    /// Creates empty state for a world of `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: SnapshotStore::new(capacity),
            kinds: ComponentStorage::new(capacity),
            scales: ComponentStorage::new(capacity),
            tints: ComponentStorage::new(capacity),
            overlay_scales: ComponentStorage::new(capacity),
            hidden: vec![false; capacity].into_boxed_slice(),
            bounds: vec![None; capacity].into_boxed_slice(),
            overlays: Vec::new(),
        }
    }

    /// Pose history.
    #[inline]
    #[must_use]
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Pose history, for the advance.
    #[inline]
    pub fn snapshots_mut(&mut self) -> &mut SnapshotStore {
        &mut self.snapshots
    }

    /// Number of presented entities.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether nothing is presented.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Starts presenting `entity`.
    ///
    /// Seeds the pose history from the live transform at `tick` and
    /// resolves base scale and color. Returns `false` if the entity is dead
    /// or already presented.
    pub fn attach(
        &mut self,
        world: &World,
        config: &BakedPresentationConfig,
        entity: EntityId,
        renderable: Renderable,
        tick: u32,
    ) -> bool {
        let Some(live) = world.transform(entity).copied() else {
            return false;
        };
        if !self.snapshots.attach(entity, live, tick) {
            return false;
        }

        let idx = entity.slot();
        self.kinds.set(idx, renderable);
        self.scales.set(
            idx,
            PresentationScale {
                value: resolve_scale(&config.scale, &config.pickup, renderable),
            },
        );
        let color = resolve_color(world, config, entity, renderable);
        self.tints.set(idx, RenderTint { rgba: color.into() });
        self.overlay_scales.reset(idx);
        self.hidden[idx] = false;
        self.bounds[idx] = resolve_bounds(config, renderable);
        true
    }

    /// Stops presenting `entity`. Returns `false` if it was not presented.
    pub fn detach(&mut self, entity: EntityId) -> bool {
        if !self.snapshots.detach(entity) {
            return false;
        }
        let idx = entity.slot();
        self.kinds.reset(idx);
        self.scales.reset(idx);
        self.tints.reset(idx);
        self.overlay_scales.reset(idx);
        self.hidden[idx] = false;
        self.bounds[idx] = None;
        true
    }

    /// Detaches every entity that died without a lifecycle event reaching us.
    ///
    /// Returns the handles removed.
    pub fn detach_dead(&mut self, world: &World) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .snapshots
            .iter()
            .filter(|(id, _)| !world.is_alive(*id))
            .map(|(id, _)| id)
            .collect();
        for &id in &dead {
            self.detach(id);
        }
        dead
    }

    /// Render kind marker captured at attach time.
    #[inline]
    #[must_use]
    pub fn renderable(&self, entity: EntityId) -> Option<Renderable> {
        self.present(entity).then(|| self.kinds.as_slice()[entity.slot()])
    }

    /// Resolved presentation scale.
    #[inline]
    #[must_use]
    pub fn scale(&self, entity: EntityId) -> Option<f32> {
        self.present(entity).then(|| self.scales.as_slice()[entity.slot()].value)
    }

    /// Resolved base color.
    #[inline]
    #[must_use]
    pub fn tint(&self, entity: EntityId) -> Option<Rgba> {
        self.present(entity).then(|| self.tints.as_slice()[entity.slot()].into())
    }

    /// Whether a per-frame drive hid the entity.
    #[inline]
    #[must_use]
    pub fn is_hidden(&self, entity: EntityId) -> bool {
        self.present(entity) && self.hidden[entity.slot()]
    }

    /// Render bounds half-extent overriding the mesh's own, if any.
    #[inline]
    #[must_use]
    pub fn bounds_extents(&self, entity: EntityId) -> Option<f32> {
        if self.present(entity) {
            self.bounds[entity.slot()]
        } else {
            None
        }
    }

    /// Overlay outputs from the last [`drive`](Self::drive).
    #[inline]
    #[must_use]
    pub fn overlays(&self) -> &[(EntityId, OverlayState)] {
        &self.overlays
    }

    /// Runs the per-frame visual drives.
    ///
    /// - Pickups resize toward their current amount and hide when empty
    /// - Mining vessels with a hold get a cargo overlay
    /// - Asteroids with a deposit get a depletion marker
    pub fn drive(
        &mut self,
        world: &World,
        config: &BakedPresentationConfig,
        frame_seconds: f32,
        time_seconds: f32,
    ) {
        self.overlays.clear();

        let pickup_factor = smoothing_factor(config.pickup.smoothing, frame_seconds);
        let cargo_factor = smoothing_factor(config.cargo.smoothing, frame_seconds);
        let marker_factor = smoothing_factor(config.markers.smoothing, frame_seconds);

        for (entity, _) in self.snapshots.iter() {
            let idx = entity.slot();
            let Some(renderable) = world.renderable(entity) else {
                continue;
            };

            match renderable.kind() {
                Some(RenderKind::Pickup) => {
                    let amount = renderable.size_hint;
                    let target = pickup_scale(&config.pickup, amount);
                    let scale = &mut self.scales.as_mut_slice()[idx];
                    scale.value = smooth_scale(scale.value, target, pickup_factor);
                    self.hidden[idx] = amount <= PICKUP_VISIBLE_THRESHOLD;
                }
                Some(RenderKind::MiningVessel) => {
                    if let Some(hold) = world.cargo_hold(entity) {
                        let current = &mut self.overlay_scales.as_mut_slice()[idx];
                        let state = drive_cargo(&config.cargo, &hold, current.value, cargo_factor);
                        current.value = state.scale;
                        self.overlays.push((entity, state));
                    }
                }
                Some(RenderKind::Asteroid) => {
                    if let Some(deposit) = world.deposit(entity) {
                        let parent = MarkerParent {
                            entity,
                            tint: self.tints.as_slice()[idx].into(),
                        };
                        let current = &mut self.overlay_scales.as_mut_slice()[idx];
                        let state = drive_marker(
                            &config.markers,
                            &deposit,
                            parent,
                            current.value,
                            marker_factor,
                            time_seconds,
                        );
                        current.value = state.scale;
                        self.overlays.push((entity, state));
                    }
                }
                _ => {}
            }
        }
    }

    fn present(&self, entity: EntityId) -> bool {
        self.snapshots.contains(entity)
    }
}

/// Bounds override for a newly presented entity.
///
/// Pickups resize every frame, so they get fixed bounds large enough for
/// their biggest size; everything else keeps its mesh bounds.
#[must_use]
pub fn resolve_bounds(config: &BakedPresentationConfig, renderable: Renderable) -> Option<f32> {
    match renderable.kind() {
        Some(RenderKind::Pickup) => Some(config.pickup.bounds_extents),
        _ => None,
    }
}

/// Base color for a newly presented entity.
///
/// Explicit tints win. Vessels without one borrow their carrier's tint,
/// blended toward the vessel color; asteroids take their resource color.
#[must_use]
pub fn resolve_color(
    world: &World,
    config: &BakedPresentationConfig,
    entity: EntityId,
    renderable: Renderable,
) -> Rgba {
    if let Some(tint) = world.tint(entity) {
        return resolve_fallback(Some(tint.into()));
    }
    let colors = &config.colors;
    let resolved = match renderable.kind() {
        Some(RenderKind::Carrier) => Some(colors.carrier),
        Some(RenderKind::MiningVessel) => {
            let parent_tint = world
                .cargo_hold(entity)
                .and_then(|hold| hold.parent())
                .and_then(|parent| world.tint(parent));
            Some(match parent_tint {
                Some(parent) => Rgba::from(parent).lerp(colors.mining_vessel, colors.vessel_blend),
                None => colors.mining_vessel,
            })
        }
        Some(RenderKind::Asteroid) => Some(
            world
                .deposit(entity)
                .and_then(|d| d.resource())
                .map_or(colors.asteroid, resource_color),
        ),
        _ => None,
    };
    resolve_fallback(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresentationConfig;
    use meridian_core::{CargoHold, ResourceDeposit, ResourceKind};
    use meridian_shared::Transform;

    fn baked() -> BakedPresentationConfig {
        PresentationConfig::default().bake().unwrap()
    }

    #[test]
    fn test_attach_resolves_scale_and_color() {
        let config = baked();
        let mut world = World::new(8);
        let carrier = world.spawn();
        let marker = Renderable::new(RenderKind::Carrier, 80.0);
        world.make_renderable(carrier, marker);

        let mut state = PresentationState::new(world.capacity());
        assert!(state.attach(&world, &config, carrier, marker, 3));
        assert!(!state.attach(&world, &config, carrier, marker, 4));

        assert!((state.scale(carrier).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(state.tint(carrier), Some(config.colors.carrier));
        assert_eq!(state.snapshots().get(carrier).unwrap().curr_tick(), 3);
    }

    #[test]
    fn test_vessel_blends_parent_tint() {
        let config = baked();
        let mut world = World::new(8);
        let carrier = world.spawn();
        world.set_tint(carrier, RenderTint::new(1.0, 0.0, 0.0, 1.0));
        let vessel = world.spawn();
        world.set_cargo_hold(vessel, CargoHold::new(100.0, ResourceKind::Ore, carrier));

        let color = resolve_color(&world, &config, vessel, Renderable::new(RenderKind::MiningVessel, 100.0));
        let expected = Rgba::new(1.0, 0.0, 0.0, 1.0).lerp(config.colors.mining_vessel, 0.65);
        assert_eq!(color, expected);
    }

    #[test]
    fn test_asteroid_uses_resource_color() {
        let config = baked();
        let mut world = World::new(8);
        let rock = world.spawn();
        world.set_deposit(rock, ResourceDeposit::full(500.0, ResourceKind::EnergyCrystals));
        let color = resolve_color(&world, &config, rock, Renderable::new(RenderKind::Asteroid, 0.0));
        assert_eq!(color, Rgba::new(0.2, 0.8, 1.0, 1.0));
    }

    #[test]
    fn test_black_tint_falls_back_to_white() {
        let config = baked();
        let mut world = World::new(8);
        let craft = world.spawn();
        world.set_tint(craft, RenderTint::new(0.0, 0.0, 0.0, 1.0));
        let color = resolve_color(&world, &config, craft, Renderable::new(RenderKind::StrikeCraft, 0.0));
        assert_eq!(color, Rgba::WHITE);
        // No tint, no kind color
        let other = world.spawn();
        let color = resolve_color(&world, &config, other, Renderable::new(RenderKind::Debris, 0.0));
        assert_eq!(color, Rgba::WHITE);
    }

    #[test]
    fn test_drive_overlays_and_pickups() {
        let config = baked();
        let mut world = World::new(8);
        let mut state = PresentationState::new(world.capacity());

        let vessel = world.spawn();
        let mut hold = CargoHold::new(100.0, ResourceKind::Minerals, EntityId::NULL);
        hold.amount = 50.0;
        world.set_cargo_hold(vessel, hold);
        let vessel_marker = Renderable::new(RenderKind::MiningVessel, 100.0);
        world.make_renderable(vessel, vessel_marker);
        state.attach(&world, &config, vessel, vessel_marker, 0);

        let pickup = world.spawn();
        let pickup_marker = Renderable::new(RenderKind::Pickup, 0.0);
        world.make_renderable(pickup, pickup_marker);
        state.attach(&world, &config, pickup, pickup_marker, 0);

        state.drive(&world, &config, 1.0 / 60.0, 0.0);
        assert_eq!(state.overlays().len(), 1);
        assert_eq!(state.overlays()[0].0, vessel);
        assert!(state.overlays()[0].1.visible);
        assert!(state.is_hidden(pickup));
        assert!(!state.is_hidden(vessel));
        assert_eq!(state.bounds_extents(pickup), Some(config.pickup.bounds_extents));
        assert_eq!(state.bounds_extents(vessel), None);
        assert_eq!(state.overlays()[0].1.bounds_extents, config.cargo.bounds_extents);
    }

    #[test]
    fn test_detach_dead() {
        let config = baked();
        let mut world = World::new(4);
        let a = world.spawn_with_transform(Transform::IDENTITY);
        let marker = Renderable::new(RenderKind::Debris, 0.0);
        world.make_renderable(a, marker);
        let mut state = PresentationState::new(world.capacity());
        state.attach(&world, &config, a, marker, 0);

        world.despawn(a);
        assert_eq!(state.detach_dead(&world), vec![a]);
        assert!(state.is_empty());
        assert!(state.scale(a).is_none());
    }
}
