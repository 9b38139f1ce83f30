//! # Pose History
//!
//! Previous/current pose pairs per renderable entity, rolled forward once
//! per fixed tick and sampled by the renderer at a fractional alpha.
//!
//! ```text
//!   tick N-1           tick N             frame (alpha = 0.4)
//!   ┌──────┐           ┌──────┐
//!   │ Prev │ ────────> │ Curr │   sample = lerp/slerp(Prev, Curr, 0.4)
//!   └──────┘           └──────┘
//!        advance(N+1): Prev := Curr, Curr := live
//! ```

mod advance;
mod pose;
mod store;

pub use advance::{AdvanceOutcome, PoseSource, TickAdvancer};
pub use pose::PoseSnapshot;
pub use store::SnapshotStore;
