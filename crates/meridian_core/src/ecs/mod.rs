//! # Entity Component System
//!
//! A pre-allocated ECS holding the simulation state the presentation layer
//! reads from.
//!
//! ## Design Philosophy
//!
//! - All storage is pre-allocated at world creation
//! - Components are stored in dense arrays indexed by entity slot
//! - Entity IDs are indices with generation counters

mod component;
mod entity;
mod storage;
mod world;

pub use component::{
    CargoHold, Component, RenderKind, RenderTint, Renderable, ResourceDeposit, ResourceKind,
};
pub use entity::{EntityId, EntitySlot};
pub use storage::ComponentStorage;
pub use world::World;
