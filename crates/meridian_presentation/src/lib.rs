//! # MERIDIAN Presentation
//!
//! Turns a fixed-rate simulation into smooth per-frame render output.
//!
//! ```text
//! ┌──────────────┐  lifecycle events  ┌───────────────────────┐
//! │    World     │───────────────────>│ PresentationLifecycle │
//! │ (live poses) │                    └───────────┬───────────┘
//! └──────┬───────┘                                │ attach / detach
//!        │ once per tick                          v
//!        │                  ┌───────────────────────────────────┐
//!        └─────────────────>│ PresentationState                 │
//!            TickAdvancer   │  pose history, scale, tint,       │
//!                           │  overlay scales                   │
//!                           └─────────────────┬─────────────────┘
//!                                             │ every frame, at alpha
//!                                             v
//!                                   ┌──────────────────┐
//!                                   │  RenderSampler   │──> instances
//!                                   └──────────────────┘
//! ```
//!
//! [`FrameDriver`] owns the ordering. Configuration is read from TOML and
//! baked once ([`PresentationConfig::bake`]).

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod lifecycle;
pub mod overlay;
pub mod sampler;
pub mod scale;
pub mod state;

pub use color::Rgba;
pub use config::{BakedPresentationConfig, PresentationConfig};
pub use error::{PresentationError, PresentationResult};
pub use frame::{FrameDriver, FrameStats};
pub use lifecycle::{LifecycleStats, PresentationLifecycle};
pub use overlay::{OverlayKind, OverlayState};
pub use sampler::{OverlayInstance, RenderInstance, RenderSampler};
pub use scale::PresentationScale;
pub use state::PresentationState;
