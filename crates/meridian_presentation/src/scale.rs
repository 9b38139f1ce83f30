//! Presentation scale formulas.
//!
//! Sizes follow simulation quantities with a square-root response so a
//! carrier with four times the docking capacity draws twice as large.

use bytemuck::{Pod, Zeroable};
use meridian_core::{Component, RenderKind, Renderable};
use meridian_shared::{lerp, saturate};

use crate::config::{PickupConfig, ScaleConfig, MIN_SCALE};

/// Uniform scale applied on top of the interpolated transform scale.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PresentationScale {
    /// Multiplier.
    pub value: f32,
}

impl Default for PresentationScale {
    fn default() -> Self {
        Self { value: 1.0 }
    }
}

impl Component for PresentationScale {
    const ID: u8 = 6;
}

/// Carrier scale from total docking capacity.
#[must_use]
pub fn carrier_scale(cfg: &ScaleConfig, total_capacity: f32) -> f32 {
    if total_capacity <= 0.0 {
        return cfg.carrier;
    }
    let normalized = (total_capacity / cfg.carrier_capacity_reference).max(0.1);
    cfg.carrier * normalized.sqrt().clamp(cfg.carrier_min_factor, cfg.carrier_max_factor)
}

/// Mining vessel scale from cargo capacity.
#[must_use]
pub fn mining_vessel_scale(cfg: &ScaleConfig, cargo_capacity: f32) -> f32 {
    let normalized = (cargo_capacity / cfg.vessel_cargo_reference).max(0.1);
    cfg.mining_vessel * normalized.sqrt().clamp(cfg.vessel_min_factor, cfg.vessel_max_factor)
}

/// Pickup scale from the amount it holds.
#[must_use]
pub fn pickup_scale(cfg: &PickupConfig, amount: f32) -> f32 {
    let t = saturate(amount / cfg.amount_for_max_scale.max(MIN_SCALE));
    lerp(cfg.min_scale, cfg.max_scale, t.sqrt())
}

/// Base scale of a renderable entity.
///
/// Corrupt kinds draw at unit scale.
#[must_use]
pub fn resolve_scale(scale: &ScaleConfig, pickup: &PickupConfig, renderable: Renderable) -> f32 {
    let Some(kind) = renderable.kind() else {
        return 1.0;
    };
    let hint = renderable.size_hint;
    match kind {
        RenderKind::Carrier => carrier_scale(scale, hint),
        RenderKind::MiningVessel => mining_vessel_scale(scale, hint),
        RenderKind::Pickup => pickup_scale(pickup, hint),
        RenderKind::Asteroid => scale.asteroid,
        RenderKind::Individual => scale.individual,
        RenderKind::StrikeCraft => scale.strike_craft,
        RenderKind::FleetImpostor => scale.fleet_impostor,
        RenderKind::Projectile => scale.projectile,
        RenderKind::Debris => scale.debris,
    }
}

/// Per-frame blend factor for exponential smoothing at `rate` per second.
///
/// A rate of zero (or less) snaps straight to the target.
#[inline]
#[must_use]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 {
        1.0
    } else {
        1.0 - (-rate * dt.max(0.0)).exp()
    }
}

/// Moves `current` toward `target` by `factor`, never below [`MIN_SCALE`].
#[inline]
#[must_use]
pub fn smooth_scale(current: f32, target: f32, factor: f32) -> f32 {
    lerp(current, target, factor).max(MIN_SCALE)
}
