//! # Presentation Configuration
//!
//! Loaded once at startup from TOML, then **baked**: every value is checked
//! and clamped into its usable range exactly once, so the per-frame path
//! never branches on bad config.
//!
//! ## Example
//!
//! ```toml
//! [timing]
//! tick_rate = 30
//!
//! [scale]
//! carrier = 0.6
//!
//! [colors]
//! carrier = [0.3, 0.6, 1.0, 1.0]
//! ```
//!
//! Every section and field is optional; missing ones take the defaults below.

use std::fs;
use std::path::Path;

use meridian_shared::{Vec3, MAX_CATCHUP_STEPS, MAX_FRAME_SECONDS, TICK_RATE};
use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::error::{PresentationError, PresentationResult};

/// Smallest scale any formula may produce.
pub const MIN_SCALE: f32 = 0.001;

/// Smallest accepted bounds extent.
pub const MIN_BOUNDS_EXTENT: f32 = 0.01;

/// Accepted tick rates (Hz).
pub const TICK_RATE_RANGE: std::ops::RangeInclusive<u32> = 1..=1000;

// =============================================================================
// RAW CONFIG (as written in TOML)
// =============================================================================

/// Presentation config as read from disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresentationConfig {
    /// Fixed-step timing.
    pub timing: TimingConfig,
    /// Snapshot lifecycle.
    pub lifecycle: LifecycleConfig,
    /// Per-kind base scales.
    pub scale: ScaleConfig,
    /// Pickup sizing.
    pub pickup: PickupConfig,
    /// Base colors.
    pub colors: ColorConfig,
    /// Cargo overlay on mining vessels.
    pub cargo: CargoConfig,
    /// Depletion marker on asteroids.
    pub markers: MarkerConfig,
}

/// Fixed-step timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Most fixed steps run in one frame.
    pub max_catchup_steps: u32,
    /// Longest frame delta accepted before truncation (seconds).
    pub max_frame_seconds: f32,
    /// Advance snapshots on the rayon pool.
    pub parallel_advance: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            max_catchup_steps: MAX_CATCHUP_STEPS,
            max_frame_seconds: MAX_FRAME_SECONDS,
            parallel_advance: false,
        }
    }
}

/// Snapshot lifecycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifecycleConfig {
    /// Undelivered lifecycle events held before dropping.
    pub channel_capacity: usize,
    /// Frames between repair passes. 0 disables repair.
    pub repair_interval_frames: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 4096,
            repair_interval_frames: 120,
        }
    }
}

/// Per-kind base scales and the reference values of the sizing formulas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleConfig {
    /// Carrier base scale.
    pub carrier: f32,
    /// Mining vessel base scale.
    pub mining_vessel: f32,
    /// Asteroid base scale.
    pub asteroid: f32,
    /// Individual base scale.
    pub individual: f32,
    /// Strike craft base scale.
    pub strike_craft: f32,
    /// Fleet impostor base scale.
    pub fleet_impostor: f32,
    /// Projectile base scale.
    pub projectile: f32,
    /// Debris base scale.
    pub debris: f32,
    /// Docking capacity at which a carrier renders at base scale.
    pub carrier_capacity_reference: f32,
    /// Lower clamp on the carrier size factor.
    pub carrier_min_factor: f32,
    /// Upper clamp on the carrier size factor.
    pub carrier_max_factor: f32,
    /// Cargo capacity at which a vessel renders at base scale.
    pub vessel_cargo_reference: f32,
    /// Lower clamp on the vessel size factor.
    pub vessel_min_factor: f32,
    /// Upper clamp on the vessel size factor.
    pub vessel_max_factor: f32,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            carrier: 0.5,
            mining_vessel: 0.02,
            asteroid: 1.0,
            individual: 0.003,
            strike_craft: 0.012,
            fleet_impostor: 0.4,
            projectile: 0.008,
            debris: 0.01,
            carrier_capacity_reference: 20.0,
            carrier_min_factor: 0.6,
            carrier_max_factor: 2.5,
            vessel_cargo_reference: 100.0,
            vessel_min_factor: 0.6,
            vessel_max_factor: 1.8,
        }
    }
}

/// Pickup sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickupConfig {
    /// Scale of a nearly empty pickup.
    pub min_scale: f32,
    /// Scale at or above `amount_for_max_scale`.
    pub max_scale: f32,
    /// Amount that reaches `max_scale`.
    pub amount_for_max_scale: f32,
    /// Exponential smoothing rate (1/s). 0 snaps.
    pub smoothing: f32,
    /// Render bounds half-extent.
    pub bounds_extents: f32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.0075,
            max_scale: 0.045,
            amount_for_max_scale: 80.0,
            smoothing: 8.0,
            bounds_extents: 0.5,
        }
    }
}

/// Base colors. An absent entry falls back to white.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Carrier color when no tint override exists.
    pub carrier: Option<Rgba>,
    /// Mining vessel color.
    pub mining_vessel: Option<Rgba>,
    /// Asteroid color when the resource palette does not apply.
    pub asteroid: Option<Rgba>,
    /// How far a vessel's color moves from its carrier's tint toward
    /// `mining_vessel`.
    pub vessel_blend: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            carrier: Some(Rgba::new(0.35, 0.6, 1.0, 1.0)),
            mining_vessel: Some(Rgba::new(0.95, 0.8, 0.35, 1.0)),
            asteroid: Some(Rgba::new(0.55, 0.5, 0.45, 1.0)),
            vessel_blend: 0.65,
        }
    }
}

/// Cargo overlay on mining vessels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CargoConfig {
    /// Overlay scale (relative to the vessel) when nearly empty.
    pub base_scale: f32,
    /// Overlay scale when full.
    pub max_scale: f32,
    /// Exponential smoothing rate (1/s). 0 snaps.
    pub smoothing: f32,
    /// Offset from the vessel origin, in vessel space.
    pub local_offset: Vec3,
    /// Render bounds half-extent.
    pub bounds_extents: f32,
}

impl Default for CargoConfig {
    fn default() -> Self {
        Self {
            base_scale: 0.2,
            max_scale: 0.6,
            smoothing: 6.0,
            local_offset: Vec3::new(0.0, 0.5, 0.0),
            bounds_extents: 0.5,
        }
    }
}

/// Depletion marker on asteroids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerConfig {
    /// Full-deposit reference scale. An almost empty deposit shrinks to 45% of it.
    pub base_scale: f32,
    /// Marker scale for a full deposit.
    pub max_scale: f32,
    /// Exponential smoothing rate (1/s). 0 snaps.
    pub smoothing: f32,
    /// Remaining amount at or below which the marker pulses.
    pub depleted_threshold: f32,
    /// Marker distance from the asteroid, in asteroid scales.
    pub offset_multiplier: f32,
    /// Render bounds half-extent.
    pub bounds_extents: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            base_scale: 0.3,
            max_scale: 0.8,
            smoothing: 4.0,
            depleted_threshold: 50.0,
            offset_multiplier: 1.2,
            bounds_extents: 1.0,
        }
    }
}

impl PresentationConfig {
    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> PresentationResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PresentationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "presentation config loaded");
        Ok(config)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this shape.
    pub fn from_toml_str(text: &str) -> PresentationResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Validates and clamps every value.
    ///
    /// # Errors
    ///
    /// Returns [`PresentationError::InvalidConfig`] for non-finite numbers.
    pub fn bake(&self) -> PresentationResult<BakedPresentationConfig> {
        let timing = &self.timing;
        let tick_rate = timing
            .tick_rate
            .clamp(*TICK_RATE_RANGE.start(), *TICK_RATE_RANGE.end());
        let timing = BakedTiming {
            tick_rate,
            step_seconds: 1.0 / tick_rate as f32,
            max_catchup_steps: timing.max_catchup_steps.max(1),
            max_frame_seconds: floor("timing.max_frame_seconds", timing.max_frame_seconds, MIN_SCALE)?,
            parallel_advance: timing.parallel_advance,
        };

        let lifecycle = LifecycleConfig {
            channel_capacity: self.lifecycle.channel_capacity.max(1),
            repair_interval_frames: self.lifecycle.repair_interval_frames,
        };

        let s = &self.scale;
        let (carrier_min_factor, carrier_max_factor) = ordered(
            floor("scale.carrier_min_factor", s.carrier_min_factor, MIN_SCALE)?,
            floor("scale.carrier_max_factor", s.carrier_max_factor, MIN_SCALE)?,
        );
        let (vessel_min_factor, vessel_max_factor) = ordered(
            floor("scale.vessel_min_factor", s.vessel_min_factor, MIN_SCALE)?,
            floor("scale.vessel_max_factor", s.vessel_max_factor, MIN_SCALE)?,
        );
        let scale = ScaleConfig {
            carrier: floor("scale.carrier", s.carrier, MIN_SCALE)?,
            mining_vessel: floor("scale.mining_vessel", s.mining_vessel, MIN_SCALE)?,
            asteroid: floor("scale.asteroid", s.asteroid, MIN_SCALE)?,
            individual: floor("scale.individual", s.individual, MIN_SCALE)?,
            strike_craft: floor("scale.strike_craft", s.strike_craft, MIN_SCALE)?,
            fleet_impostor: floor("scale.fleet_impostor", s.fleet_impostor, MIN_SCALE)?,
            projectile: floor("scale.projectile", s.projectile, MIN_SCALE)?,
            debris: floor("scale.debris", s.debris, MIN_SCALE)?,
            carrier_capacity_reference: floor(
                "scale.carrier_capacity_reference",
                s.carrier_capacity_reference,
                MIN_SCALE,
            )?,
            carrier_min_factor,
            carrier_max_factor,
            vessel_cargo_reference: floor(
                "scale.vessel_cargo_reference",
                s.vessel_cargo_reference,
                MIN_SCALE,
            )?,
            vessel_min_factor,
            vessel_max_factor,
        };

        let p = &self.pickup;
        let (min_scale, max_scale) = ordered(
            floor("pickup.min_scale", p.min_scale, MIN_SCALE)?,
            floor("pickup.max_scale", p.max_scale, MIN_SCALE)?,
        );
        let pickup = PickupConfig {
            min_scale,
            max_scale,
            amount_for_max_scale: floor("pickup.amount_for_max_scale", p.amount_for_max_scale, MIN_SCALE)?,
            smoothing: floor("pickup.smoothing", p.smoothing, 0.0)?,
            bounds_extents: floor("pickup.bounds_extents", p.bounds_extents, MIN_BOUNDS_EXTENT)?,
        };

        let c = &self.colors;
        let colors = BakedColors {
            carrier: color("colors.carrier", c.carrier)?,
            mining_vessel: color("colors.mining_vessel", c.mining_vessel)?,
            asteroid: color("colors.asteroid", c.asteroid)?,
            vessel_blend: finite("colors.vessel_blend", c.vessel_blend)?.clamp(0.0, 1.0),
        };

        let k = &self.cargo;
        let (base_scale, max_scale) = ordered(
            floor("cargo.base_scale", k.base_scale, MIN_SCALE)?,
            floor("cargo.max_scale", k.max_scale, MIN_SCALE)?,
        );
        if !k.local_offset.is_finite() {
            return Err(invalid("cargo.local_offset", "must be finite"));
        }
        let cargo = CargoConfig {
            base_scale,
            max_scale,
            smoothing: floor("cargo.smoothing", k.smoothing, 0.0)?,
            local_offset: k.local_offset,
            bounds_extents: floor("cargo.bounds_extents", k.bounds_extents, MIN_BOUNDS_EXTENT)?,
        };

        let m = &self.markers;
        let markers = MarkerConfig {
            base_scale: floor("markers.base_scale", m.base_scale, MIN_SCALE)?,
            max_scale: floor("markers.max_scale", m.max_scale, MIN_SCALE)?,
            smoothing: floor("markers.smoothing", m.smoothing, 0.0)?,
            depleted_threshold: floor("markers.depleted_threshold", m.depleted_threshold, 0.0)?,
            offset_multiplier: floor("markers.offset_multiplier", m.offset_multiplier, 0.0)?,
            bounds_extents: floor("markers.bounds_extents", m.bounds_extents, MIN_BOUNDS_EXTENT)?,
        };

        Ok(BakedPresentationConfig {
            timing,
            lifecycle,
            scale,
            pickup,
            colors,
            cargo,
            markers,
        })
    }
}

// =============================================================================
// BAKED CONFIG (validated, used at runtime)
// =============================================================================

/// Validated configuration. Build it with [`PresentationConfig::bake`].
#[derive(Clone, Debug, PartialEq)]
pub struct BakedPresentationConfig {
    /// Fixed-step timing.
    pub timing: BakedTiming,
    /// Snapshot lifecycle.
    pub lifecycle: LifecycleConfig,
    /// Per-kind scales; factors ordered, everything at least [`MIN_SCALE`].
    pub scale: ScaleConfig,
    /// Pickup sizing; `min_scale <= max_scale`.
    pub pickup: PickupConfig,
    /// Resolved base colors.
    pub colors: BakedColors,
    /// Cargo overlay; `base_scale <= max_scale`.
    pub cargo: CargoConfig,
    /// Depletion markers.
    pub markers: MarkerConfig,
}

/// Timing with the step length derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BakedTiming {
    /// Ticks per second, in [`TICK_RATE_RANGE`].
    pub tick_rate: u32,
    /// Seconds per tick.
    pub step_seconds: f32,
    /// At least 1.
    pub max_catchup_steps: u32,
    /// Longest accepted frame delta.
    pub max_frame_seconds: f32,
    /// Advance snapshots on the rayon pool.
    pub parallel_advance: bool,
}

/// Base colors with the white fallback already applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BakedColors {
    /// Carrier base color.
    pub carrier: Rgba,
    /// Mining vessel base color.
    pub mining_vessel: Rgba,
    /// Asteroid base color.
    pub asteroid: Rgba,
    /// In `[0, 1]`.
    pub vessel_blend: f32,
}

fn invalid(field: &'static str, reason: &str) -> PresentationError {
    PresentationError::InvalidConfig {
        field,
        reason: reason.to_owned(),
    }
}

fn finite(field: &'static str, value: f32) -> PresentationResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(field, &format!("{value} is not finite")))
    }
}

fn floor(field: &'static str, value: f32, min: f32) -> PresentationResult<f32> {
    Ok(finite(field, value)?.max(min))
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn color(field: &'static str, value: Option<Rgba>) -> PresentationResult<Rgba> {
    match value {
        Some(c) if !c.is_finite() => Err(invalid(field, "color channels must be finite")),
        other => Ok(crate::color::resolve_fallback(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = PresentationConfig::from_toml_str("").unwrap();
        assert_eq!(config, PresentationConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = PresentationConfig::from_toml_str(
            r#"
            [timing]
            tick_rate = 30

            [scale]
            carrier = 0.75
            "#,
        )
        .unwrap();
        assert_eq!(config.timing.tick_rate, 30);
        assert_eq!(config.timing.max_catchup_steps, MAX_CATCHUP_STEPS);
        assert_eq!(config.scale.carrier, 0.75);
        assert_eq!(config.scale.mining_vessel, 0.02);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = PresentationConfig::from_toml_str("[timing]\ntick_rat = 30").unwrap_err();
        assert!(matches!(err, PresentationError::Parse(_)));
    }

    #[test]
    fn test_bake_clamps() {
        let mut config = PresentationConfig::default();
        config.timing.tick_rate = 0;
        config.timing.max_catchup_steps = 0;
        config.scale.carrier = -4.0;
        config.scale.carrier_min_factor = 3.0;
        config.scale.carrier_max_factor = 1.0;
        config.cargo.smoothing = -1.0;
        config.cargo.bounds_extents = 0.0;
        config.colors.vessel_blend = 2.0;

        let baked = config.bake().unwrap();
        assert_eq!(baked.timing.tick_rate, 1);
        assert_eq!(baked.timing.step_seconds, 1.0);
        assert_eq!(baked.timing.max_catchup_steps, 1);
        assert_eq!(baked.scale.carrier, MIN_SCALE);
        assert_eq!(baked.scale.carrier_min_factor, 1.0);
        assert_eq!(baked.scale.carrier_max_factor, 3.0);
        assert_eq!(baked.cargo.smoothing, 0.0);
        assert_eq!(baked.cargo.bounds_extents, MIN_BOUNDS_EXTENT);
        assert_eq!(baked.colors.vessel_blend, 1.0);
    }

    #[test]
    fn test_bake_tick_rate_upper_bound() {
        let mut config = PresentationConfig::default();
        config.timing.tick_rate = 50_000;
        assert_eq!(config.bake().unwrap().timing.tick_rate, 1000);
    }

    #[test]
    fn test_bake_rejects_non_finite() {
        let mut config = PresentationConfig::default();
        config.markers.smoothing = f32::NAN;
        let err = config.bake().unwrap_err();
        assert!(matches!(
            err,
            PresentationError::InvalidConfig {
                field: "markers.smoothing",
                ..
            }
        ));
    }

    #[test]
    fn test_colors_fall_back_to_white() {
        let mut config = PresentationConfig::default();
        config.colors.carrier = None;
        config.colors.asteroid = Some(Rgba::new(0.0, 0.0, 0.0, 1.0));
        let baked = config.bake().unwrap();
        assert_eq!(baked.colors.carrier, Rgba::WHITE);
        assert_eq!(baked.colors.asteroid, Rgba::WHITE);
    }

    #[test]
    fn test_load_missing_file() {
        let err = PresentationConfig::load("/nonexistent/meridian.toml").unwrap_err();
        assert!(matches!(err, PresentationError::Io { .. }));
    }
}
