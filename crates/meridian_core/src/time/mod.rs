//! # Simulation Time
//!
//! The fixed-step clock and the accumulator that turns wall time into
//! steps plus a render alpha.

mod accumulator;
mod clock;

pub use accumulator::{FixedStepAccumulator, StepPlan};
pub use clock::{SimClock, TickContext};
