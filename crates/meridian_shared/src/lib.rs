//! # MERIDIAN Shared
//!
//! Math and timing types used by both the simulation and the presentation
//! side.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a renderer, a window, or the ECS. If you
//! need entity types, put them in `meridian_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constants;
pub mod math;

pub use constants::{
    FIXED_STEP_SECONDS, MAX_CATCHUP_STEPS, MAX_FRAME_SECONDS, MAX_SPEED_MULTIPLIER, TICK_RATE,
};
pub use math::{lerp, saturate, Quaternion, Transform, Vec3};
