//! Presentation lifecycle.
//!
//! Keeps the set of presented entities in step with the world. Lifecycle
//! events from the world attach and detach entities as they happen; a
//! periodic repair pass catches anything the bounded channel dropped.

use meridian_core::{LifecycleEvent, LifecycleReceiver, World};

use crate::config::BakedPresentationConfig;
use crate::state::PresentationState;

/// Counters from one [`PresentationLifecycle::sync`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LifecycleStats {
    /// Events drained from the channel.
    pub events: usize,
    /// Entities attached (events and repair).
    pub attached: usize,
    /// Entities detached (events and repair).
    pub detached: usize,
    /// Whether the repair pass ran this call.
    pub repaired: bool,
}

/// Applies lifecycle events to a [`PresentationState`].
pub struct PresentationLifecycle {
    receiver: LifecycleReceiver,
    pending: Vec<LifecycleEvent>,
    repair_interval: u32,
    frames_since_repair: u32,
}

impl PresentationLifecycle {
    /// Creates a lifecycle reading from `receiver`.
    ///
    /// A `repair_interval` of 0 disables the repair pass.
    #[must_use]
    pub fn new(receiver: LifecycleReceiver, repair_interval: u32) -> Self {
        Self {
            receiver,
            pending: Vec::with_capacity(256),
            repair_interval,
            frames_since_repair: 0,
        }
    }

    /// Events waiting in the channel.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.receiver.pending_count()
    }

    /// Drains pending events into `state`, running the repair pass when due.
    ///
    /// New entities are seeded at `tick`, the last tick the simulation
    /// completed, so their first frame samples a stationary pose.
    pub fn sync(
        &mut self,
        state: &mut PresentationState,
        world: &World,
        config: &BakedPresentationConfig,
        tick: u32,
    ) -> LifecycleStats {
        let mut stats = LifecycleStats {
            events: self.receiver.drain_into(&mut self.pending),
            ..LifecycleStats::default()
        };

        for event in self.pending.drain(..) {
            match event {
                LifecycleEvent::BecameRenderable { entity, renderable } => {
                    // Spawned and despawned between syncs
                    if world.is_alive(entity) && state.attach(world, config, entity, renderable, tick) {
                        stats.attached += 1;
                    }
                }
                LifecycleEvent::Despawned { entity } => {
                    if state.detach(entity) {
                        stats.detached += 1;
                    }
                }
            }
        }

        if self.repair_interval > 0 {
            self.frames_since_repair += 1;
            if self.frames_since_repair >= self.repair_interval {
                self.frames_since_repair = 0;
                let (attached, detached) = repair(state, world, config, tick);
                stats.attached += attached;
                stats.detached += detached;
                stats.repaired = true;
            }
        }

        if stats.events > 0 {
            tracing::trace!(
                events = stats.events,
                attached = stats.attached,
                detached = stats.detached,
                "lifecycle synced"
            );
        }
        stats
    }
}

/// Reconciles `state` with the world from scratch.
///
/// Returns `(attached, detached)`.
pub fn repair(
    state: &mut PresentationState,
    world: &World,
    config: &BakedPresentationConfig,
    tick: u32,
) -> (usize, usize) {
    let detached = state.detach_dead(world).len();
    let mut attached = 0;
    for (entity, renderable) in world.iter_renderable() {
        if state.attach(world, config, entity, renderable, tick) {
            attached += 1;
        }
    }
    if attached > 0 || detached > 0 {
        tracing::debug!(attached, detached, "presentation repaired");
    }
    (attached, detached)
}
