//! Wall-clock to fixed-step conversion.
//!
//! Each rendered frame feeds its elapsed time in; the accumulator answers
//! how many fixed steps to run and how far the renderer sits between the
//! last two recorded ticks.

use meridian_shared::{FIXED_STEP_SECONDS, MAX_CATCHUP_STEPS, MAX_FRAME_SECONDS};

/// What a frame should do.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepPlan {
    /// Fixed steps to run this frame.
    pub steps: u32,
    /// Interpolation fraction for rendering, in `[0, 1)`.
    pub alpha: f32,
    /// Whole steps discarded because of the catch-up cap.
    pub dropped_steps: u32,
}

/// Fixed-step accumulator with a catch-up cap.
#[derive(Clone, Debug)]
pub struct FixedStepAccumulator {
    step_seconds: f64,
    max_steps_per_frame: u32,
    max_frame_seconds: f64,
    accumulated: f64,
}

impl Default for FixedStepAccumulator {
    fn default() -> Self {
        Self::new(FIXED_STEP_SECONDS, MAX_CATCHUP_STEPS)
    }
}

impl FixedStepAccumulator {
    /// Creates an accumulator for `step_seconds` steps.
    ///
    /// Invalid inputs fall back to the defaults in `meridian_shared`.
    #[must_use]
    pub fn new(step_seconds: f32, max_steps_per_frame: u32) -> Self {
        let step_seconds = if step_seconds.is_finite() && step_seconds > 0.0 {
            step_seconds
        } else {
            FIXED_STEP_SECONDS
        };
        Self {
            step_seconds: f64::from(step_seconds),
            max_steps_per_frame: max_steps_per_frame.max(1),
            max_frame_seconds: f64::from(MAX_FRAME_SECONDS),
            accumulated: 0.0,
        }
    }

    /// Overrides the per-frame wall time clamp.
    #[must_use]
    pub fn with_max_frame_seconds(mut self, seconds: f32) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            self.max_frame_seconds = f64::from(seconds);
        }
        self
    }

    /// Seconds per fixed step.
    #[inline]
    #[must_use]
    pub fn step_seconds(&self) -> f32 {
        self.step_seconds as f32
    }

    /// Current fraction of a step waiting to be simulated.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulated / self.step_seconds) as f32
    }

    /// Adds one frame of wall time scaled by `speed` and plans the steps.
    ///
    /// Negative or non-finite inputs count as zero elapsed time.
    pub fn accumulate(&mut self, frame_seconds: f32, speed: f32) -> StepPlan {
        let frame = sanitize(frame_seconds).min(self.max_frame_seconds);
        self.accumulated += frame * sanitize(speed);

        let due = (self.accumulated / self.step_seconds).floor();
        let due = if due >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            due as u32
        };

        let steps = due.min(self.max_steps_per_frame);
        let dropped_steps = due - steps;
        self.accumulated -= f64::from(due) * self.step_seconds;
        // Guard against float residue landing just below zero or at one step
        self.accumulated = self.accumulated.clamp(0.0, self.step_seconds * 0.999_999);

        if dropped_steps > 0 {
            tracing::warn!(
                steps,
                dropped_steps,
                "frame too slow, dropping simulation steps"
            );
        }

        StepPlan {
            steps,
            alpha: self.alpha(),
            dropped_steps,
        }
    }

    /// Plan for a paused frame: no steps, alpha held where it was.
    #[must_use]
    pub fn frozen(&self) -> StepPlan {
        StepPlan {
            steps: 0,
            alpha: self.alpha(),
            dropped_steps: 0,
        }
    }

    /// Discards accumulated time.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

fn sanitize(value: f32) -> f64 {
    if value.is_finite() && value > 0.0 {
        f64::from(value)
    } else {
        0.0
    }
}
