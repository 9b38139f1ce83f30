//! # Lifecycle Events
//!
//! The world owns entity creation and destruction; the presentation side
//! owns pose snapshots. Lifecycle events are the hook between the two.
//!
//! ```text
//! ┌─────────────┐  BecameRenderable  ┌─────────────┐  attach/detach  ┌───────────────┐
//! │    World    │───────────────────>│  Lifecycle  │────────────────>│ SnapshotStore │
//! │ (simulation)│     Despawned      │   Channel   │                 │(presentation) │
//! └─────────────┘                    └─────────────┘                 └───────────────┘
//! ```
//!
//! Channels are bounded so a stalled consumer cannot grow memory. A dropped
//! event is logged and later reconciled by the presentation repair pass.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::ecs::{EntityId, Renderable};

/// Entity lifecycle transitions the presentation layer cares about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LifecycleEvent {
    /// An entity gained a [`Renderable`] marker.
    BecameRenderable {
        /// Entity handle.
        entity: EntityId,
        /// The marker that was attached.
        renderable: Renderable,
    },
    /// A renderable entity was destroyed.
    Despawned {
        /// Entity handle (now stale).
        entity: EntityId,
    },
}

impl LifecycleEvent {
    /// Entity the event refers to.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        match *self {
            Self::BecameRenderable { entity, .. } | Self::Despawned { entity } => entity,
        }
    }
}

/// Bounded lifecycle channel.
pub struct LifecycleBus {
    sender: Sender<LifecycleEvent>,
    receiver: Receiver<LifecycleEvent>,
}

impl LifecycleBus {
    /// Creates a bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Producer handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> LifecycleSender {
        LifecycleSender {
            sender: self.sender.clone(),
        }
    }

    /// Consumer handle.
    #[must_use]
    pub fn receiver(&self) -> LifecycleReceiver {
        LifecycleReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Convenience constructor returning both ends.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (LifecycleSender, LifecycleReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

/// Handle for publishing lifecycle events.
#[derive(Clone)]
pub struct LifecycleSender {
    sender: Sender<LifecycleEvent>,
}

impl LifecycleSender {
    /// Publishes an event without blocking.
    ///
    /// Returns `false` if the event was dropped (channel full or consumer gone).
    #[inline]
    pub fn send(&self, event: LifecycleEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(entity = %event.entity(), "lifecycle channel full, event dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for consuming lifecycle events.
#[derive(Clone)]
pub struct LifecycleReceiver {
    receiver: Receiver<LifecycleEvent>,
}

impl LifecycleReceiver {
    /// Moves all pending events into `out` without blocking.
    ///
    /// Returns the number of events appended. `out` is not cleared, so the
    /// caller can reuse one buffer across frames.
    pub fn drain_into(&self, out: &mut Vec<LifecycleEvent>) -> usize {
        let before = out.len();
        out.extend(self.receiver.try_iter());
        out.len() - before
    }

    /// Receives one event, if any.
    #[inline]
    #[must_use]
    pub fn try_recv(&self) -> Option<LifecycleEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::RenderKind;

    #[test]
    fn test_drain_preserves_order() {
        let (tx, rx) = LifecycleBus::create_pair(8);
        let a = EntityId::new(0, 1);
        let b = EntityId::new(1, 1);

        assert!(tx.send(LifecycleEvent::BecameRenderable {
            entity: a,
            renderable: Renderable::new(RenderKind::Carrier, 0.0),
        }));
        assert!(tx.send(LifecycleEvent::Despawned { entity: b }));
        assert_eq!(rx.pending_count(), 2);

        let mut out = Vec::new();
        assert_eq!(rx.drain_into(&mut out), 2);
        assert_eq!(out[0].entity(), a);
        assert_eq!(out[1], LifecycleEvent::Despawned { entity: b });
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_full_channel_drops() {
        let (tx, _rx) = LifecycleBus::create_pair(1);
        let e = EntityId::new(0, 1);
        assert!(tx.send(LifecycleEvent::Despawned { entity: e }));
        assert!(!tx.send(LifecycleEvent::Despawned { entity: e }));
    }
}
