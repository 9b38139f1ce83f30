//! Render colors.
//!
//! Colors are resolved once when an entity starts being presented, except
//! for overlays (cargo, depletion markers) which follow their parent's
//! simulation state every frame.

use meridian_core::{RenderTint, ResourceKind};
use meridian_shared::lerp;
use serde::{Deserialize, Serialize};

/// Channel value at or below which a color counts as black or transparent.
const NEAR_BLACK: f32 = 0.001;

/// Linear RGBA color. Serialized as a `[r, g, b, a]` array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a color.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise blend toward `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            lerp(self.r, other.r, t),
            lerp(self.g, other.g, t),
            lerp(self.b, other.b, t),
            lerp(self.a, other.a, t),
        )
    }

    /// Black in every color channel, or fully transparent.
    #[must_use]
    pub fn is_near_black(self) -> bool {
        (self.r <= NEAR_BLACK && self.g <= NEAR_BLACK && self.b <= NEAR_BLACK) || self.a <= NEAR_BLACK
    }

    /// Scales RGB by `brightness` and alpha by `opacity`.
    #[must_use]
    pub fn modulate(self, brightness: f32, opacity: f32) -> Self {
        Self::new(
            self.r * brightness,
            self.g * brightness,
            self.b * brightness,
            self.a * opacity,
        )
    }

    /// Whether every channel is finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 4]> for Rgba {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

impl From<RenderTint> for Rgba {
    fn from(t: RenderTint) -> Self {
        t.rgba.into()
    }
}

/// White when nothing was resolved or the result would be invisible.
#[must_use]
pub fn resolve_fallback(color: Option<Rgba>) -> Rgba {
    match color {
        Some(c) if !c.is_near_black() => c,
        _ => Rgba::WHITE,
    }
}

/// Palette entry for a resource.
#[must_use]
pub const fn resource_color(kind: ResourceKind) -> Rgba {
    match kind {
        ResourceKind::Minerals => Rgba::new(0.6, 0.6, 0.6, 1.0),
        ResourceKind::RareMetals => Rgba::new(0.8, 0.7, 0.2, 1.0),
        ResourceKind::EnergyCrystals => Rgba::new(0.2, 0.8, 1.0, 1.0),
        ResourceKind::OrganicMatter => Rgba::new(0.2, 0.8, 0.3, 1.0),
        ResourceKind::Ore => Rgba::new(0.5, 0.3, 0.2, 1.0),
    }
}

/// Palette entry for a possibly corrupt resource discriminant.
#[must_use]
pub fn resource_color_or_white(kind: Option<ResourceKind>) -> Rgba {
    kind.map_or(Rgba::WHITE, resource_color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback() {
        assert_eq!(resolve_fallback(None), Rgba::WHITE);
        assert_eq!(resolve_fallback(Some(Rgba::new(0.0, 0.0, 0.0, 1.0))), Rgba::WHITE);
        assert_eq!(resolve_fallback(Some(Rgba::new(1.0, 0.0, 0.0, 0.0))), Rgba::WHITE);

        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(resolve_fallback(Some(red)), red);
        // One bright channel is enough
        let dim = Rgba::new(0.0, 0.0, 0.01, 1.0);
        assert_eq!(resolve_fallback(Some(dim)), dim);
    }

    #[test]
    fn test_lerp_and_modulate() {
        let a = Rgba::new(0.0, 0.0, 0.0, 1.0);
        let b = Rgba::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(a.lerp(b, 0.65).r, 0.65);
        assert_eq!(b.modulate(0.5, 0.25), Rgba::new(0.5, 0.5, 0.5, 0.25));
    }

    #[test]
    fn test_serde_as_array() {
        #[derive(Deserialize)]
        struct Holder {
            c: Rgba,
        }
        let h: Holder = toml::from_str("c = [0.1, 0.2, 0.3, 0.4]").unwrap();
        assert_eq!(h.c, Rgba::new(0.1, 0.2, 0.3, 0.4));
    }
}
