//! Simulation clock.
//!
//! Owned and mutated by the simulation driver. Everything downstream sees
//! only the [`TickContext`] value it hands out.

use meridian_shared::{FIXED_STEP_SECONDS, MAX_SPEED_MULTIPLIER};

/// Tick and pause state for one fixed simulation step.
///
/// Passed by value into the snapshot advance so the advance never reads
/// ambient state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TickContext {
    /// Tick of the step being recorded.
    pub tick: u32,
    /// Whether the simulation is paused.
    pub paused: bool,
}

impl TickContext {
    /// A running step at `tick`.
    #[inline]
    #[must_use]
    pub const fn running(tick: u32) -> Self {
        Self { tick, paused: false }
    }

    /// A paused step at `tick`.
    #[inline]
    #[must_use]
    pub const fn paused(tick: u32) -> Self {
        Self { tick, paused: true }
    }
}

/// Monotonic tick counter with a pause flag.
#[derive(Clone, Debug)]
pub struct SimClock {
    tick: u32,
    paused: bool,
    fixed_delta_seconds: f32,
    speed_multiplier: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(FIXED_STEP_SECONDS)
    }
}

impl SimClock {
    /// Creates a clock at tick 0, running at 1x.
    ///
    /// A non-positive or non-finite step falls back to [`FIXED_STEP_SECONDS`].
    #[must_use]
    pub fn new(fixed_delta_seconds: f32) -> Self {
        let fixed_delta_seconds = if fixed_delta_seconds.is_finite() && fixed_delta_seconds > 0.0 {
            fixed_delta_seconds
        } else {
            FIXED_STEP_SECONDS
        };
        Self {
            tick: 0,
            paused: false,
            fixed_delta_seconds,
            speed_multiplier: 1.0,
        }
    }

    /// Current tick.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Whether stepping is suspended.
    #[inline]
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Seconds of simulated time per tick.
    #[inline]
    #[must_use]
    pub const fn fixed_delta_seconds(&self) -> f32 {
        self.fixed_delta_seconds
    }

    /// Time scale applied to wall time before accumulation.
    #[inline]
    #[must_use]
    pub const fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Snapshot of the clock for the advance.
    #[inline]
    #[must_use]
    pub const fn context(&self) -> TickContext {
        TickContext {
            tick: self.tick,
            paused: self.paused,
        }
    }

    /// Moves to the next tick.
    ///
    /// Returns the new tick, or `None` while paused. Saturates at `u32::MAX`.
    pub fn step(&mut self) -> Option<u32> {
        if self.paused {
            return None;
        }
        self.tick = self.tick.saturating_add(1);
        Some(self.tick)
    }

    /// Suspends stepping.
    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    /// Resumes stepping from the current tick.
    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    /// Sets the pause flag.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::debug!(tick = self.tick, paused, "sim clock pause toggled");
        }
        self.paused = paused;
    }

    /// Sets the time scale, clamped to `[0, MAX_SPEED_MULTIPLIER]`.
    ///
    /// NaN is treated as 1x.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = if multiplier.is_nan() {
            1.0
        } else {
            multiplier.clamp(0.0, MAX_SPEED_MULTIPLIER)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_increments() {
        let mut clock = SimClock::default();
        assert_eq!(clock.step(), Some(1));
        assert_eq!(clock.step(), Some(2));
        assert_eq!(clock.context(), TickContext::running(2));
    }

    #[test]
    fn test_pause_holds_tick() {
        let mut clock = SimClock::default();
        clock.step();
        clock.pause();
        for _ in 0..10 {
            assert_eq!(clock.step(), None);
        }
        assert_eq!(clock.context(), TickContext::paused(1));

        clock.resume();
        assert_eq!(clock.step(), Some(2));
    }

    #[test]
    fn test_speed_clamped() {
        let mut clock = SimClock::default();
        clock.set_speed_multiplier(1000.0);
        assert_eq!(clock.speed_multiplier(), MAX_SPEED_MULTIPLIER);
        clock.set_speed_multiplier(-3.0);
        assert_eq!(clock.speed_multiplier(), 0.0);
        clock.set_speed_multiplier(f32::NAN);
        assert_eq!(clock.speed_multiplier(), 1.0);
    }

    #[test]
    fn test_invalid_step_falls_back() {
        assert_eq!(SimClock::new(0.0).fixed_delta_seconds(), FIXED_STEP_SECONDS);
        assert_eq!(SimClock::new(f32::INFINITY).fixed_delta_seconds(), FIXED_STEP_SECONDS);
        assert_eq!(SimClock::new(0.5).fixed_delta_seconds(), 0.5);
    }
}
