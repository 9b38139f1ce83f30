//! # Frame Driver
//!
//! Owns the per-frame call order that makes interpolation correct:
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ 1. LIFECYCLE SYNC                                               │
//! │    └─ Attach new renderables, detach despawned (repair if due)  │
//! │                                                                 │
//! │ 2. PLAN                                                         │
//! │    └─ Accumulate wall time into whole steps + alpha             │
//! │       (paused: no steps, alpha frozen)                          │
//! │                                                                 │
//! │ 3. FOR EACH STEP                                                │
//! │    ├─ clock.step()                                              │
//! │    ├─ simulate(world, ctx)       writes live transforms         │
//! │    └─ advance snapshots          Prev := Curr, Curr := live     │
//! │                                                                 │
//! │ 4. DRIVE                                                        │
//! │    └─ Pickup sizes, cargo overlays, depletion markers           │
//! │                                                                 │
//! │ 5. SAMPLE                                                       │
//! │    └─ lerp(Prev, Curr, alpha) into render instances             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Existing snapshots only change in step 3, once per simulated tick, so any
//! number of frames between two ticks render from the same pair of poses.

use meridian_core::{
    AdvanceOutcome, FixedStepAccumulator, LifecycleBus, SimClock, StepPlan, TickAdvancer,
    TickContext, World,
};

use crate::config::BakedPresentationConfig;
use crate::lifecycle::{repair, LifecycleStats, PresentationLifecycle};
use crate::sampler::RenderSampler;
use crate::state::PresentationState;

/// What one frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// Simulation tick after the frame.
    pub tick: u32,
    /// Steps simulated.
    pub steps: u32,
    /// Whole steps discarded by the catch-up cap.
    pub dropped_steps: u32,
    /// Blend factor used for sampling.
    pub alpha: f32,
    /// Presented entities.
    pub tracked: usize,
    /// Snapshots rolled forward, summed over all steps.
    pub advanced: usize,
    /// Lifecycle work done this frame.
    pub lifecycle: LifecycleStats,
}

/// Runs the simulation at a fixed rate and renders it interpolated.
pub struct FrameDriver {
    config: BakedPresentationConfig,
    clock: SimClock,
    accumulator: FixedStepAccumulator,
    advancer: TickAdvancer,
    state: PresentationState,
    lifecycle: PresentationLifecycle,
    sampler: RenderSampler,
    frame: u64,
    presentation_seconds: f64,
}

impl FrameDriver {
    /// Creates a driver for `world`.
    ///
    /// Installs a lifecycle sender on the world and attaches every entity
    /// that is already renderable.
    pub fn new(config: BakedPresentationConfig, world: &mut World) -> Self {
        let timing = config.timing;
        let bus = LifecycleBus::new(config.lifecycle.channel_capacity);
        world.set_lifecycle_sender(bus.sender());

        let clock = SimClock::new(timing.step_seconds);
        let accumulator = FixedStepAccumulator::new(timing.step_seconds, timing.max_catchup_steps)
            .with_max_frame_seconds(timing.max_frame_seconds);
        let mut state = PresentationState::new(world.capacity());
        repair(&mut state, world, &config, clock.tick());

        tracing::info!(
            tick_rate = timing.tick_rate,
            parallel = timing.parallel_advance,
            tracked = state.len(),
            "frame driver ready"
        );

        Self {
            lifecycle: PresentationLifecycle::new(bus.receiver(), config.lifecycle.repair_interval_frames),
            config,
            clock,
            accumulator,
            advancer: TickAdvancer::new(),
            state,
            sampler: RenderSampler::new(),
            frame: 0,
            presentation_seconds: 0.0,
        }
    }

    /// Runs one rendered frame of `frame_seconds` wall time.
    ///
    /// `simulate` is called once per fixed step with the tick being
    /// simulated and must write the world's live transforms.
    pub fn frame<F>(&mut self, world: &mut World, frame_seconds: f32, mut simulate: F) -> FrameStats
    where
        F: FnMut(&mut World, TickContext),
    {
        let lifecycle = self
            .lifecycle
            .sync(&mut self.state, world, &self.config, self.clock.tick());

        let plan = self.plan(frame_seconds);

        let mut steps = 0;
        let mut advanced = 0;
        for _ in 0..plan.steps {
            if self.clock.step().is_none() {
                break;
            }
            let ctx = self.clock.context();
            simulate(world, ctx);
            advanced += self.advance(world, ctx).advanced_count();
            steps += 1;
        }

        // Overlays and markers hold still while paused; bad frame times count as zero
        let drive_seconds = if self.clock.is_paused() || !frame_seconds.is_finite() {
            0.0
        } else {
            frame_seconds.clamp(0.0, self.config.timing.max_frame_seconds)
        };
        self.presentation_seconds += f64::from(drive_seconds);
        self.state
            .drive(world, &self.config, drive_seconds, self.presentation_seconds as f32);

        self.sampler.sample(&self.state, plan.alpha);

        let stats = FrameStats {
            frame: self.frame,
            tick: self.clock.tick(),
            steps,
            dropped_steps: plan.dropped_steps,
            alpha: plan.alpha,
            tracked: self.state.len(),
            advanced,
            lifecycle,
        };
        self.frame += 1;
        stats
    }

    fn plan(&mut self, frame_seconds: f32) -> StepPlan {
        if self.clock.is_paused() {
            self.accumulator.frozen()
        } else {
            self.accumulator
                .accumulate(frame_seconds, self.clock.speed_multiplier())
        }
    }

    fn advance(&mut self, world: &World, ctx: TickContext) -> AdvanceOutcome {
        let store = self.state.snapshots_mut();
        if self.config.timing.parallel_advance {
            self.advancer.advance_parallel(store, world, ctx)
        } else {
            self.advancer.advance(store, world, ctx)
        }
    }

    /// Freezes simulation and interpolation.
    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Resumes from where [`pause`](Self::pause) left off.
    pub fn resume(&mut self) {
        self.clock.resume();
    }

    /// Whether paused.
    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Sets the simulation speed (clamped).
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.clock.set_speed_multiplier(multiplier);
    }

    /// Simulation clock.
    #[inline]
    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Presentation state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    /// Sampled output of the last frame.
    #[inline]
    #[must_use]
    pub fn sampler(&self) -> &RenderSampler {
        &self.sampler
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &BakedPresentationConfig {
        &self.config
    }

    /// Frames run so far.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}
