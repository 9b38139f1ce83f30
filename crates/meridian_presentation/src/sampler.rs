//! Render sampling.
//!
//! Turns pose history plus presentation state into flat instance lists a
//! renderer can upload directly. The lists are reused between frames.

use meridian_core::{EntityId, RenderKind};
use meridian_shared::Transform;

use crate::color::Rgba;
use crate::overlay::OverlayKind;
use crate::state::PresentationState;

/// One entity to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderInstance {
    /// Source entity.
    pub entity: EntityId,
    /// Mesh selector. `None` for a corrupt render marker.
    pub kind: Option<RenderKind>,
    /// Interpolated world transform, presentation scale applied.
    pub transform: Transform,
    /// Base color.
    pub tint: Rgba,
    /// Whether to draw it.
    pub visible: bool,
    /// Render bounds half-extent; `None` keeps the mesh bounds.
    pub bounds_extents: Option<f32>,
}

/// One overlay to draw this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayInstance {
    /// Entity the overlay hangs off.
    pub parent: EntityId,
    /// Overlay type.
    pub kind: OverlayKind,
    /// World transform, composed through the parent's.
    pub transform: Transform,
    /// Color.
    pub tint: Rgba,
    /// Whether to draw it.
    pub visible: bool,
    /// Render bounds half-extent, in overlay-local units.
    pub bounds_extents: f32,
}

/// Samples presentation state at a blend factor.
#[derive(Debug, Default)]
pub struct RenderSampler {
    instances: Vec<RenderInstance>,
    overlays: Vec<OverlayInstance>,
}

impl RenderSampler {
    /// Creates an empty sampler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds both instance lists at `alpha`.
    ///
    /// Reads only pose history, so sampling any number of times between
    /// ticks never changes what a later sample sees.
    pub fn sample(&mut self, state: &PresentationState, alpha: f32) {
        self.instances.clear();
        self.overlays.clear();

        for (entity, snapshot) in state.snapshots().iter() {
            let Some(transform) = presented_pose(state, entity, snapshot.sample(alpha)) else {
                continue;
            };
            self.instances.push(RenderInstance {
                entity,
                kind: state.renderable(entity).and_then(|r| r.kind()),
                transform,
                tint: state.tint(entity).unwrap_or(Rgba::WHITE),
                visible: !state.is_hidden(entity),
                bounds_extents: state.bounds_extents(entity),
            });
        }

        for &(parent, overlay) in state.overlays() {
            let Some(parent_pose) = state
                .snapshots()
                .sample(parent, alpha)
                .and_then(|pose| presented_pose(state, parent, pose))
            else {
                continue;
            };
            self.overlays.push(OverlayInstance {
                parent,
                kind: overlay.kind,
                transform: Transform::new(
                    parent_pose.transform_point(overlay.local_offset),
                    parent_pose.rotation,
                    parent_pose.scale * overlay.scale,
                ),
                tint: overlay.tint,
                visible: overlay.visible,
                bounds_extents: overlay.bounds_extents,
            });
        }
    }

    /// Entities from the last [`sample`](Self::sample).
    #[inline]
    #[must_use]
    pub fn instances(&self) -> &[RenderInstance] {
        &self.instances
    }

    /// Overlays from the last [`sample`](Self::sample).
    #[inline]
    #[must_use]
    pub fn overlays(&self) -> &[OverlayInstance] {
        &self.overlays
    }
}

fn presented_pose(state: &PresentationState, entity: EntityId, mut pose: Transform) -> Option<Transform> {
    pose.scale *= state.scale(entity)?;
    Some(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PresentationConfig;
    use meridian_core::{CargoHold, Renderable, ResourceKind, TickAdvancer, TickContext, World};
    use meridian_shared::{Quaternion, Vec3};

    #[test]
    fn test_sample_applies_scale_and_interpolates() {
        let config = PresentationConfig::default().bake().unwrap();
        let mut world = World::new(4);
        let e = world.spawn_with_transform(Transform::from_position(Vec3::ZERO));
        let marker = Renderable::new(RenderKind::Asteroid, 0.0);
        world.make_renderable(e, marker);

        let mut state = PresentationState::new(world.capacity());
        state.attach(&world, &config, e, marker, 0);
        world.set_transform(e, Transform::from_position(Vec3::new(10.0, 0.0, 0.0)));
        let mut advancer = TickAdvancer::new();
        advancer.advance(state.snapshots_mut(), &world, TickContext::running(1));

        let mut sampler = RenderSampler::new();
        sampler.sample(&state, 0.5);
        let inst = sampler.instances()[0];
        assert_eq!(inst.entity, e);
        assert_eq!(inst.kind, Some(RenderKind::Asteroid));
        assert!((inst.transform.position.x - 5.0).abs() < 1e-5);
        assert!((inst.transform.scale - config.scale.asteroid).abs() < 1e-6);
        assert!(inst.visible);
        assert_eq!(inst.bounds_extents, None);
    }

    #[test]
    fn test_overlay_composed_through_parent() {
        let config = PresentationConfig::default().bake().unwrap();
        let mut world = World::new(4);
        let rotation = Quaternion::from_axis_angle(Vec3::Z, std::f32::consts::FRAC_PI_2);
        let parent_pose = Transform::new(Vec3::new(1.0, 2.0, 3.0), rotation, 1.0);
        let vessel = world.spawn_with_transform(parent_pose);
        let mut hold = CargoHold::new(100.0, ResourceKind::Ore, EntityId::NULL);
        hold.amount = 100.0;
        world.set_cargo_hold(vessel, hold);
        let marker = Renderable::new(RenderKind::MiningVessel, 100.0);
        world.make_renderable(vessel, marker);

        let mut state = PresentationState::new(world.capacity());
        state.attach(&world, &config, vessel, marker, 0);
        state.drive(&world, &config, 1.0 / 60.0, 0.0);

        let mut sampler = RenderSampler::new();
        sampler.sample(&state, 1.0);
        let overlay = sampler.overlays()[0];
        let vessel_scale = config.scale.mining_vessel;
        assert_eq!(overlay.parent, vessel);
        assert_eq!(overlay.kind, OverlayKind::Cargo);
        assert_eq!(overlay.bounds_extents, config.cargo.bounds_extents);
        // (0, 0.5, 0) scaled, then rotated a quarter turn about Z -> -X
        let expected = Vec3::new(1.0 - 0.5 * vessel_scale, 2.0, 3.0);
        assert!(overlay.transform.position.distance(expected) < 1e-5);
        let overlay_scale = state.overlays()[0].1.scale;
        assert!((overlay.transform.scale - vessel_scale * overlay_scale).abs() < 1e-7);
    }
}
