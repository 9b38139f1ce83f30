//! Per-entity pose history.
//!
//! ## Layout:
//! - **Prev**: the pose recorded at `prev_tick`
//! - **Curr**: the pose recorded at `curr_tick`
//! - The renderer draws somewhere between the two using an alpha it derives
//!   from wall time
//!
//! Advancing always shifts Curr into Prev before overwriting Curr, so Prev
//! is the immediately preceding sample and never an older one.

use bytemuck::{Pod, Zeroable};
use meridian_shared::{Quaternion, Transform, Vec3};

use crate::ecs::Component;

/// Double-buffered pose history for one tracked entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct PoseSnapshot {
    prev: Transform,
    curr: Transform,
    prev_tick: u32,
    curr_tick: u32,
}

impl Component for PoseSnapshot {
    const ID: u8 = 1;
}

impl PoseSnapshot {
    /// Snapshot with both halves set to `pose` at `tick`.
    #[must_use]
    pub const fn seeded(pose: Transform, tick: u32) -> Self {
        Self {
            prev: pose,
            curr: pose,
            prev_tick: tick,
            curr_tick: tick,
        }
    }

    /// Builds a snapshot from explicit halves.
    ///
    /// Returns `None` if `prev_tick > curr_tick`.
    #[must_use]
    pub const fn from_parts(
        prev: Transform,
        prev_tick: u32,
        curr: Transform,
        curr_tick: u32,
    ) -> Option<Self> {
        if prev_tick > curr_tick {
            return None;
        }
        Some(Self {
            prev,
            curr,
            prev_tick,
            curr_tick,
        })
    }

    /// Rolls the history forward to `tick` with `live` as the new Curr.
    ///
    /// Does nothing and returns `false` unless `tick` is newer than the
    /// stored Curr tick, so a tick is never recorded twice.
    #[inline]
    pub fn advance(&mut self, live: Transform, tick: u32) -> bool {
        if tick <= self.curr_tick {
            return false;
        }
        self.prev = self.curr;
        self.prev_tick = self.curr_tick;
        self.curr = live;
        self.curr_tick = tick;
        true
    }

    /// Interpolated pose at `alpha`.
    ///
    /// `alpha = 0` returns Prev exactly and `alpha = 1` returns Curr exactly.
    /// `alpha` is not clamped.
    #[inline]
    #[must_use]
    pub fn sample(&self, alpha: f32) -> Transform {
        self.prev.interpolate(self.curr, alpha)
    }

    /// Pose recorded at [`prev_tick`](Self::prev_tick).
    #[inline]
    #[must_use]
    pub const fn prev_pose(&self) -> Transform {
        self.prev
    }

    /// Pose recorded at [`curr_tick`](Self::curr_tick).
    #[inline]
    #[must_use]
    pub const fn curr_pose(&self) -> Transform {
        self.curr
    }

    /// Tick of the older sample.
    #[inline]
    #[must_use]
    pub const fn prev_tick(&self) -> u32 {
        self.prev_tick
    }

    /// Tick of the newer sample.
    #[inline]
    #[must_use]
    pub const fn curr_tick(&self) -> u32 {
        self.curr_tick
    }

    /// Older sample position.
    #[inline]
    #[must_use]
    pub const fn prev_position(&self) -> Vec3 {
        self.prev.position
    }

    /// Newer sample position.
    #[inline]
    #[must_use]
    pub const fn curr_position(&self) -> Vec3 {
        self.curr.position
    }

    /// Older sample rotation.
    #[inline]
    #[must_use]
    pub const fn prev_rotation(&self) -> Quaternion {
        self.prev.rotation
    }

    /// Newer sample rotation.
    #[inline]
    #[must_use]
    pub const fn curr_rotation(&self) -> Quaternion {
        self.curr.rotation
    }

    /// Older sample scale.
    #[inline]
    #[must_use]
    pub const fn prev_scale(&self) -> f32 {
        self.prev.scale
    }

    /// Newer sample scale.
    #[inline]
    #[must_use]
    pub const fn curr_scale(&self) -> f32 {
        self.curr.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32) -> Transform {
        Transform::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_layout() {
        assert_eq!(std::mem::size_of::<PoseSnapshot>(), 72);
    }

    #[test]
    fn test_advance_shifts_curr_into_prev() {
        let mut snap = PoseSnapshot::from_parts(at(0.0), 9, at(1.0), 10).unwrap();
        assert!(snap.advance(at(3.0), 11));

        assert_eq!(snap.prev_position(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(snap.prev_tick(), 10);
        assert_eq!(snap.curr_position(), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(snap.curr_tick(), 11);
    }

    #[test]
    fn test_stale_tick_rejected() {
        let mut snap = PoseSnapshot::seeded(at(1.0), 5);
        let before = snap;
        assert!(!snap.advance(at(9.0), 5));
        assert!(!snap.advance(at(9.0), 4));
        assert_eq!(snap, before);
    }

    #[test]
    fn test_sample_endpoints() {
        let a = Transform::new(
            Vec3::new(0.3, 1.7, -2.0),
            Quaternion::from_axis_angle(Vec3::Y, 0.4),
            0.6,
        );
        let b = Transform::new(
            Vec3::new(5.1, -0.2, 8.8),
            Quaternion::from_axis_angle(Vec3::X, 1.9),
            1.3,
        );
        let snap = PoseSnapshot::from_parts(a, 1, b, 2).unwrap();
        assert_eq!(snap.sample(0.0), a);
        assert_eq!(snap.sample(1.0), b);
    }

    #[test]
    fn test_sample_extrapolates() {
        let snap = PoseSnapshot::from_parts(at(0.0), 1, at(2.0), 2).unwrap();
        assert!((snap.sample(1.5).position.x - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_from_parts_rejects_inverted_ticks() {
        assert!(PoseSnapshot::from_parts(at(0.0), 3, at(0.0), 2).is_none());
    }
}
