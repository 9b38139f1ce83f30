//! # MERIDIAN Core
//!
//! Simulation-side state for interpolated rendering:
//! - A pre-allocated entity world with generational handles
//! - A fixed-step clock and wall-time accumulator
//! - Per-entity pose history advanced once per tick
//!
//! ## Frame order
//!
//! 1. Drain lifecycle events, attach/detach snapshots
//! 2. For each due fixed step: step the clock, simulate, advance snapshots
//! 3. Sample snapshots at the accumulator's alpha
//!
//! ## Example
//!
//! ```rust,ignore
//! use meridian_core::{SimClock, SnapshotStore, TickAdvancer, World};
//!
//! let mut world = World::new(10_000);
//! let mut store = SnapshotStore::new(world.capacity());
//! let mut clock = SimClock::default();
//! let mut advancer = TickAdvancer::new();
//!
//! clock.step();
//! advancer.advance(&mut store, &world, clock.context());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod events;
pub mod snapshot;
pub mod time;

pub use ecs::{
    CargoHold, Component, ComponentStorage, EntityId, EntitySlot, RenderKind, RenderTint,
    Renderable, ResourceDeposit, ResourceKind, World,
};
pub use events::{LifecycleBus, LifecycleEvent, LifecycleReceiver, LifecycleSender};
pub use snapshot::{AdvanceOutcome, PoseSnapshot, PoseSource, SnapshotStore, TickAdvancer};
pub use time::{FixedStepAccumulator, SimClock, StepPlan, TickContext};
