//! # Overlays
//!
//! Small visuals attached to a parent entity that track simulation
//! quantities every frame:
//!
//! - **Cargo**: a load on a mining vessel that grows with the hold's fill ratio
//! - **Depletion marker**: a beacon near an asteroid that shrinks and fades as
//!   the deposit runs out, and pulses once it is nearly empty
//!
//! Overlay scales are relative to the parent and smoothed exponentially so
//! a sudden cargo dump does not pop.

use bytemuck::{Pod, Zeroable};
use meridian_core::{CargoHold, Component, EntityId, ResourceDeposit};
use meridian_shared::{lerp, saturate, Vec3};

use crate::color::{resource_color_or_white, Rgba};
use crate::config::{CargoConfig, MarkerConfig};
use crate::scale::smooth_scale;

/// Cargo amount above which the overlay is drawn.
pub const CARGO_VISIBLE_THRESHOLD: f32 = 0.01;

/// Denominator floor for fill ratios.
const RATIO_EPSILON: f32 = 1e-4;

/// Marker scale at an almost empty deposit, relative to `base_scale`.
const MARKER_EMPTY_SCALE: f32 = 0.45;

/// Marker opacity at an almost empty deposit.
const MARKER_MIN_OPACITY: f32 = 0.25;

/// Which overlay an [`OverlayState`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Vessel cargo load.
    Cargo,
    /// Asteroid depletion marker.
    DepletionMarker,
}

/// Smoothed overlay scale carried between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct OverlayScale {
    /// Current scale relative to the parent. 0 until first driven.
    pub value: f32,
}

impl Component for OverlayScale {
    const ID: u8 = 7;
}

/// One frame's overlay output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayState {
    /// Overlay type.
    pub kind: OverlayKind,
    /// Whether to draw it.
    pub visible: bool,
    /// Scale relative to the parent.
    pub scale: f32,
    /// Offset from the parent origin, in parent space.
    pub local_offset: Vec3,
    /// Tint.
    pub tint: Rgba,
    /// Render bounds half-extent, in overlay-local units.
    pub bounds_extents: f32,
}

/// Fill ratio of a hold, in `[0, 1]`.
#[inline]
#[must_use]
pub fn cargo_ratio(hold: &CargoHold) -> f32 {
    saturate(hold.amount.max(0.0) / hold.capacity.max(RATIO_EPSILON))
}

/// Advances the cargo overlay of one vessel.
///
/// `current` is last frame's scale (0 on the first frame, which starts the
/// overlay at `base_scale`); `factor` comes from
/// [`smoothing_factor`](crate::scale::smoothing_factor).
#[must_use]
pub fn drive_cargo(cfg: &CargoConfig, hold: &CargoHold, current: f32, factor: f32) -> OverlayState {
    let ratio = cargo_ratio(hold);
    let target = lerp(cfg.base_scale, cfg.max_scale, ratio);
    let current = if current > 0.0 { current } else { cfg.base_scale };

    OverlayState {
        kind: OverlayKind::Cargo,
        visible: hold.amount > CARGO_VISIBLE_THRESHOLD,
        scale: smooth_scale(current, target, factor),
        local_offset: cfg.local_offset,
        tint: resource_color_or_white(hold.resource()),
        bounds_extents: cfg.bounds_extents,
    }
}

/// Fill ratio of a deposit, in `[0, 1]`.
#[inline]
#[must_use]
pub fn deposit_ratio(deposit: &ResourceDeposit) -> f32 {
    saturate(deposit.amount / deposit.max_amount.max(RATIO_EPSILON))
}

/// Brightness multiplier for a nearly depleted deposit.
///
/// Phase is offset per entity so a field of asteroids does not blink in
/// lockstep.
#[must_use]
pub fn depletion_pulse(time_seconds: f32, entity: EntityId) -> f32 {
    0.8 + 0.2 * (time_seconds * 2.6 + entity.index() as f32 * 0.07).sin()
}

/// The asteroid a marker hangs off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerParent {
    /// Asteroid handle; seeds the pulse phase and marker direction.
    pub entity: EntityId,
    /// Asteroid's resolved color.
    pub tint: Rgba,
}

/// Advances the depletion marker of one asteroid.
#[must_use]
pub fn drive_marker(
    cfg: &MarkerConfig,
    deposit: &ResourceDeposit,
    parent: MarkerParent,
    current: f32,
    factor: f32,
    time_seconds: f32,
) -> OverlayState {
    let ratio = deposit_ratio(deposit);
    let has_resource = deposit.amount > 0.0;

    let brightness = if deposit.amount <= cfg.depleted_threshold {
        depletion_pulse(time_seconds, parent.entity)
    } else {
        1.0
    };
    let opacity = lerp(MARKER_MIN_OPACITY, 1.0, ratio);

    let target = lerp(cfg.base_scale * MARKER_EMPTY_SCALE, cfg.max_scale, ratio);
    let current = if current > 0.0 { current } else { cfg.base_scale };

    OverlayState {
        kind: OverlayKind::DepletionMarker,
        visible: has_resource,
        scale: smooth_scale(current, target, factor),
        local_offset: marker_direction(parent.entity) * cfg.offset_multiplier,
        tint: parent.tint.modulate(brightness, opacity),
        bounds_extents: cfg.bounds_extents,
    }
}

/// Stable pseudo-random unit direction for an entity's marker.
#[must_use]
pub fn marker_direction(entity: EntityId) -> Vec3 {
    let hash = mix(entity.to_bits() ^ 917);
    let u = (hash & 0xFFFF) as f32 / 65535.0;
    let v = ((hash >> 16) & 0xFFFF) as f32 / 65535.0;

    let theta = u * std::f32::consts::TAU;
    let z = v * 2.0 - 1.0;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), z, r * theta.sin())
}

/// SplitMix64 finalizer.
fn mix(mut x: u64) -> u64 {
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::ResourceKind;

    fn parent(entity: EntityId) -> MarkerParent {
        MarkerParent {
            entity,
            tint: Rgba::WHITE,
        }
    }

    fn hold(amount: f32, capacity: f32) -> CargoHold {
        let mut h = CargoHold::new(capacity, ResourceKind::RareMetals, EntityId::NULL);
        h.amount = amount;
        h
    }

    #[test]
    fn test_cargo_ratio_edges() {
        assert_eq!(cargo_ratio(&hold(50.0, 100.0)), 0.5);
        assert_eq!(cargo_ratio(&hold(-5.0, 100.0)), 0.0);
        assert_eq!(cargo_ratio(&hold(500.0, 100.0)), 1.0);
        // Zero capacity still yields a finite ratio
        assert_eq!(cargo_ratio(&hold(1.0, 0.0)), 1.0);
    }

    #[test]
    fn test_cargo_snap_and_visibility() {
        let cfg = CargoConfig::default();
        let full = drive_cargo(&cfg, &hold(100.0, 100.0), 0.0, 1.0);
        assert!(full.visible);
        assert_eq!(full.scale, cfg.max_scale);
        assert_eq!(full.tint, Rgba::new(0.8, 0.7, 0.2, 1.0));
        assert_eq!(full.bounds_extents, cfg.bounds_extents);

        let empty = drive_cargo(&cfg, &hold(0.005, 100.0), cfg.max_scale, 1.0);
        assert!(!empty.visible);
    }

    #[test]
    fn test_cargo_smoothing_moves_partway() {
        let cfg = CargoConfig::default();
        let state = drive_cargo(&cfg, &hold(100.0, 100.0), cfg.base_scale, 0.5);
        let expected = lerp(cfg.base_scale, cfg.max_scale, 0.5);
        assert!((state.scale - expected).abs() < 1e-6);
    }

    #[test]
    fn test_marker_hidden_when_empty() {
        let cfg = MarkerConfig::default();
        let deposit = ResourceDeposit {
            amount: 0.0,
            max_amount: 100.0,
            resource: 0,
        };
        let state = drive_marker(&cfg, &deposit, parent(EntityId::new(1, 1)), 0.0, 1.0, 0.0);
        assert!(!state.visible);
    }

    #[test]
    fn test_marker_full_deposit() {
        let cfg = MarkerConfig::default();
        let deposit = ResourceDeposit::full(1000.0, ResourceKind::Minerals);
        let state = drive_marker(&cfg, &deposit, parent(EntityId::new(2, 1)), 0.0, 1.0, 3.0);
        assert!(state.visible);
        assert_eq!(state.scale, cfg.max_scale);
        // Not low: no pulse, full opacity
        assert_eq!(state.tint, Rgba::WHITE);
        assert_eq!(state.bounds_extents, cfg.bounds_extents);
        let offset_len = state.local_offset.length();
        assert!((offset_len - cfg.offset_multiplier).abs() < 1e-4);
    }

    #[test]
    fn test_marker_low_pulses_and_fades() {
        let cfg = MarkerConfig::default();
        let deposit = ResourceDeposit {
            amount: 10.0,
            max_amount: 1000.0,
            resource: 0,
        };
        let e = EntityId::new(3, 1);
        let state = drive_marker(&cfg, &deposit, parent(e), 0.0, 1.0, 0.5);
        let pulse = depletion_pulse(0.5, e);
        assert!((0.6..=1.0).contains(&pulse));
        assert!((state.tint.r - pulse).abs() < 1e-6);
        assert!((state.tint.a - lerp(0.25, 1.0, 0.01)).abs() < 1e-6);
        assert!(state.scale < cfg.base_scale);
    }

    #[test]
    fn test_marker_direction_unit_and_stable() {
        for i in 0..64 {
            let e = EntityId::new(i, 1);
            let d = marker_direction(e);
            assert!((d.length() - 1.0).abs() < 1e-4);
            assert_eq!(d, marker_direction(e));
        }
    }
}
