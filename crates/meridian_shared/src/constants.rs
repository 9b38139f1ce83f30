//! # Timing Constants
//!
//! Defaults for the fixed simulation step. Runtime values come from the
//! presentation config; these are the fallbacks baked into the binary.

// =============================================================================
// SIMULATION TIMING
// =============================================================================

/// Fixed simulation ticks per second.
pub const TICK_RATE: u32 = 60;

/// Duration of one fixed step in seconds.
pub const FIXED_STEP_SECONDS: f32 = 1.0 / TICK_RATE as f32;

/// Upper bound on fixed steps executed in a single rendered frame.
///
/// Anything beyond this is dropped instead of spiralling.
pub const MAX_CATCHUP_STEPS: u32 = 8;

/// Upper bound on the simulation speed multiplier.
pub const MAX_SPEED_MULTIPLIER: f32 = 16.0;

/// Frame deltas above this are treated as a hitch and truncated (seconds).
pub const MAX_FRAME_SECONDS: f32 = 0.25;
