//! # Component System
//!
//! Components are pure data containers with no behavior.
//! They must be Copy and have a fixed size for zero-allocation storage.

use bytemuck::{Pod, Zeroable};
use meridian_shared::Transform;

use super::entity::EntityId;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Copy`: No heap allocations, bitwise copyable
/// - `Pod`: Plain old data
/// - `Zeroable`: Can be safely zeroed
/// - `Default`: Must have a default value for pre-allocation
pub trait Component: Copy + Pod + Zeroable + Default + Send + Sync + 'static {
    /// Unique identifier for this component type (0-63).
    ///
    /// This ID is used for the component bitmask in entity slots.
    const ID: u8;
}

/// The live simulation transform of an entity.
impl Component for Transform {
    const ID: u8 = 0;
}

/// Visual category of a renderable entity.
///
/// Determines default scale and palette on the presentation side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RenderKind {
    /// Capital ship with docking bays.
    Carrier = 0,
    /// Small craft hauling cargo.
    MiningVessel = 1,
    /// Resource body.
    Asteroid = 2,
    /// Crew member rendered in the field.
    Individual = 3,
    /// Fighter / bomber / recon craft.
    StrikeCraft = 4,
    /// Far-zoom stand-in for a whole fleet.
    FleetImpostor = 5,
    /// Weapon projectile.
    Projectile = 6,
    /// Loose resource pickup.
    Pickup = 7,
    /// Wreckage.
    Debris = 8,
}

impl RenderKind {
    /// Every kind, in discriminant order.
    pub const ALL: [Self; 9] = [
        Self::Carrier,
        Self::MiningVessel,
        Self::Asteroid,
        Self::Individual,
        Self::StrikeCraft,
        Self::FleetImpostor,
        Self::Projectile,
        Self::Pickup,
        Self::Debris,
    ];

    /// Decodes a stored discriminant.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Carrier),
            1 => Some(Self::MiningVessel),
            2 => Some(Self::Asteroid),
            3 => Some(Self::Individual),
            4 => Some(Self::StrikeCraft),
            5 => Some(Self::FleetImpostor),
            6 => Some(Self::Projectile),
            7 => Some(Self::Pickup),
            8 => Some(Self::Debris),
            _ => None,
        }
    }
}

/// Marks an entity as eligible for rendering.
///
/// `size_hint` feeds the presentation scale formula for the kind: total
/// docking capacity for carriers, cargo capacity for mining vessels,
/// resource amount for pickups. Other kinds ignore it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Renderable {
    /// [`RenderKind`] discriminant.
    pub kind: u32,
    /// Kind-specific sizing input.
    pub size_hint: f32,
}

impl Component for Renderable {
    const ID: u8 = 2;
}

impl Renderable {
    /// Creates a renderable marker.
    #[inline]
    #[must_use]
    pub const fn new(kind: RenderKind, size_hint: f32) -> Self {
        Self {
            kind: kind as u32,
            size_hint,
        }
    }

    /// Decoded render kind. `None` only for corrupted data.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> Option<RenderKind> {
        RenderKind::from_u32(self.kind)
    }
}

/// Resource category carried in holds and deposits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResourceKind {
    /// Common minerals.
    Minerals = 0,
    /// Rare metals.
    RareMetals = 1,
    /// Energy crystals.
    EnergyCrystals = 2,
    /// Organic matter.
    OrganicMatter = 3,
    /// Raw ore.
    Ore = 4,
}

impl ResourceKind {
    /// Decodes a stored discriminant.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Minerals),
            1 => Some(Self::RareMetals),
            2 => Some(Self::EnergyCrystals),
            3 => Some(Self::OrganicMatter),
            4 => Some(Self::Ore),
            _ => None,
        }
    }
}

/// Cargo carried by a vessel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct CargoHold {
    /// Units currently aboard.
    pub amount: f32,
    /// Maximum units.
    pub capacity: f32,
    /// [`ResourceKind`] discriminant.
    pub resource: u32,
    _pad: u32,
    /// Raw bits of the owning carrier's [`EntityId`], or null.
    pub parent_bits: u64,
}

impl Component for CargoHold {
    const ID: u8 = 3;
}

impl CargoHold {
    /// Creates an empty hold.
    #[must_use]
    pub const fn new(capacity: f32, resource: ResourceKind, parent: EntityId) -> Self {
        Self {
            amount: 0.0,
            capacity,
            resource: resource as u32,
            _pad: 0,
            parent_bits: parent.to_bits(),
        }
    }

    /// Owning carrier, if any.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<EntityId> {
        let id = EntityId::from_bits(self.parent_bits);
        if id.is_null() {
            None
        } else {
            Some(id)
        }
    }

    /// Decoded resource kind.
    #[inline]
    #[must_use]
    pub const fn resource(&self) -> Option<ResourceKind> {
        ResourceKind::from_u32(self.resource)
    }
}

/// Mineable resource remaining in an asteroid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ResourceDeposit {
    /// Units remaining.
    pub amount: f32,
    /// Units at full size.
    pub max_amount: f32,
    /// [`ResourceKind`] discriminant.
    pub resource: u32,
}

impl Component for ResourceDeposit {
    const ID: u8 = 4;
}

impl ResourceDeposit {
    /// Creates a full deposit.
    #[must_use]
    pub const fn full(max_amount: f32, resource: ResourceKind) -> Self {
        Self {
            amount: max_amount,
            max_amount,
            resource: resource as u32,
        }
    }

    /// Decoded resource kind.
    #[inline]
    #[must_use]
    pub const fn resource(&self) -> Option<ResourceKind> {
        ResourceKind::from_u32(self.resource)
    }
}

/// Explicit color override (faction color, highlight).
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RenderTint {
    /// Linear RGBA.
    pub rgba: [f32; 4],
}

impl Component for RenderTint {
    const ID: u8 = 5;
}

impl RenderTint {
    /// Creates a tint from components.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { rgba: [r, g, b, a] }
    }
}
