//! Once-per-tick snapshot advance.
//!
//! The advancer is the only writer of pose history. It runs once per fixed
//! simulation step, after the simulation has written live transforms and
//! before anything samples for rendering.

use meridian_shared::Transform;
use rayon::prelude::*;

use super::pose::PoseSnapshot;
use super::store::SnapshotStore;
use crate::ecs::{EntityId, World};
use crate::time::TickContext;

/// Where the advancer reads live transforms from.
///
/// Must be `Sync` so the parallel path can share it across workers.
pub trait PoseSource: Sync {
    /// Live transform of `entity`, or `None` if it is gone.
    fn live_pose(&self, entity: EntityId) -> Option<Transform>;
}

impl PoseSource for World {
    #[inline]
    fn live_pose(&self, entity: EntityId) -> Option<Transform> {
        self.transform(entity).copied()
    }
}

/// Result of one advance call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Snapshots were rolled forward.
    Advanced {
        /// Tick recorded.
        tick: u32,
        /// Snapshots that changed.
        advanced: usize,
        /// Tracked entities with no live transform (despawned, not yet detached).
        missing: usize,
    },
    /// Clock paused; nothing changed.
    Paused,
    /// This tick (or a later one) was already recorded; nothing changed.
    AlreadyAdvanced {
        /// Tick that was requested.
        tick: u32,
        /// Last tick actually recorded.
        last: u32,
    },
}

impl AdvanceOutcome {
    /// Number of snapshots that changed.
    #[must_use]
    pub const fn advanced_count(&self) -> usize {
        match *self {
            Self::Advanced { advanced, .. } => advanced,
            Self::Paused | Self::AlreadyAdvanced { .. } => 0,
        }
    }
}

/// Rolls every tracked snapshot forward exactly once per tick.
#[derive(Clone, Debug, Default)]
pub struct TickAdvancer {
    last_tick: Option<u32>,
}

impl TickAdvancer {
    /// Creates an advancer that has not recorded any tick yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_tick: None }
    }

    /// Last tick recorded, if any.
    #[inline]
    #[must_use]
    pub const fn last_tick(&self) -> Option<u32> {
        self.last_tick
    }

    /// Advances every snapshot in `store` to `ctx.tick`.
    ///
    /// While paused nothing changes. A tick not newer than the last one
    /// recorded is ignored, which makes repeated calls within one step
    /// harmless.
    pub fn advance<S: PoseSource + ?Sized>(
        &mut self,
        store: &mut SnapshotStore,
        source: &S,
        ctx: TickContext,
    ) -> AdvanceOutcome {
        if let Some(early) = self.gate(ctx) {
            return early;
        }

        let (owners, snapshots) = store.columns_mut();
        let mut advanced = 0;
        let mut missing = 0;
        for (owner, snap) in owners.iter().zip(snapshots.iter_mut()) {
            match step_one(*owner, snap, source, ctx.tick) {
                Step::Advanced => advanced += 1,
                Step::Missing => missing += 1,
                Step::Skipped => {}
            }
        }

        self.finish(ctx.tick, advanced, missing)
    }

    /// Same as [`advance`](Self::advance), split across the rayon pool.
    ///
    /// Each snapshot is touched by exactly one worker, so the result is
    /// identical to the sequential pass.
    pub fn advance_parallel<S: PoseSource + ?Sized>(
        &mut self,
        store: &mut SnapshotStore,
        source: &S,
        ctx: TickContext,
    ) -> AdvanceOutcome {
        if let Some(early) = self.gate(ctx) {
            return early;
        }

        let (owners, snapshots) = store.columns_mut();
        let tick = ctx.tick;
        let (advanced, missing) = snapshots
            .par_iter_mut()
            .zip(owners.par_iter())
            .map(|(snap, owner)| match step_one(*owner, snap, source, tick) {
                Step::Advanced => (1, 0),
                Step::Missing => (0, 1),
                Step::Skipped => (0, 0),
            })
            .reduce(|| (0, 0), |a, b| (a.0 + b.0, a.1 + b.1));

        self.finish(tick, advanced, missing)
    }

    fn gate(&self, ctx: TickContext) -> Option<AdvanceOutcome> {
        if ctx.paused {
            return Some(AdvanceOutcome::Paused);
        }
        match self.last_tick {
            Some(last) if ctx.tick <= last => {
                if ctx.tick < last {
                    tracing::warn!(tick = ctx.tick, last, "tick went backwards, advance skipped");
                }
                Some(AdvanceOutcome::AlreadyAdvanced {
                    tick: ctx.tick,
                    last,
                })
            }
            _ => None,
        }
    }

    fn finish(&mut self, tick: u32, advanced: usize, missing: usize) -> AdvanceOutcome {
        self.last_tick = Some(tick);
        if missing > 0 {
            tracing::debug!(tick, missing, "tracked entities without live transform");
        }
        tracing::trace!(tick, advanced, "snapshots advanced");
        AdvanceOutcome::Advanced {
            tick,
            advanced,
            missing,
        }
    }
}

enum Step {
    Advanced,
    Missing,
    Skipped,
}

#[inline]
fn step_one<S: PoseSource + ?Sized>(
    owner: EntityId,
    snap: &mut PoseSnapshot,
    source: &S,
    tick: u32,
) -> Step {
    if owner.is_null() {
        return Step::Skipped;
    }
    match source.live_pose(owner) {
        Some(live) if snap.advance(live, tick) => Step::Advanced,
        Some(_) => Step::Skipped,
        None => Step::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_shared::Vec3;

    fn world_with(count: usize) -> (World, SnapshotStore, Vec<EntityId>) {
        let mut world = World::new(16);
        let mut store = SnapshotStore::new(world.capacity());
        let ids: Vec<_> = (0..count)
            .map(|i| {
                let id = world.spawn_with_transform(Transform::from_position(Vec3::splat(i as f32)));
                store.attach(id, *world.transform(id).unwrap(), 0);
                id
            })
            .collect();
        (world, store, ids)
    }

    #[test]
    fn test_advance_once_per_tick() {
        let (mut world, mut store, ids) = world_with(3);
        let mut advancer = TickAdvancer::new();

        world.set_transform(ids[0], Transform::from_position(Vec3::X));
        let outcome = advancer.advance(&mut store, &world, TickContext::running(1));
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                tick: 1,
                advanced: 3,
                missing: 0
            }
        );

        world.set_transform(ids[0], Transform::from_position(Vec3::Y));
        let again = advancer.advance(&mut store, &world, TickContext::running(1));
        assert_eq!(again, AdvanceOutcome::AlreadyAdvanced { tick: 1, last: 1 });
        assert_eq!(store.get(ids[0]).unwrap().curr_position(), Vec3::X);
    }

    #[test]
    fn test_paused_changes_nothing() {
        let (world, mut store, ids) = world_with(2);
        let mut advancer = TickAdvancer::new();
        let before = *store.get(ids[1]).unwrap();

        assert_eq!(
            advancer.advance(&mut store, &world, TickContext::paused(5)),
            AdvanceOutcome::Paused
        );
        assert_eq!(*store.get(ids[1]).unwrap(), before);
        assert_eq!(advancer.last_tick(), None);
    }

    #[test]
    fn test_regression_ignored() {
        let (world, mut store, _) = world_with(1);
        let mut advancer = TickAdvancer::new();
        advancer.advance(&mut store, &world, TickContext::running(10));
        assert_eq!(
            advancer.advance(&mut store, &world, TickContext::running(4)),
            AdvanceOutcome::AlreadyAdvanced { tick: 4, last: 10 }
        );
    }

    #[test]
    fn test_missing_owner_counted() {
        let (mut world, mut store, ids) = world_with(2);
        world.despawn(ids[0]);
        let mut advancer = TickAdvancer::new();
        let outcome = advancer.advance(&mut store, &world, TickContext::running(1));
        assert_eq!(
            outcome,
            AdvanceOutcome::Advanced {
                tick: 1,
                advanced: 1,
                missing: 1
            }
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (mut world, mut seq_store, ids) = world_with(10);
        let mut par_store = SnapshotStore::new(world.capacity());
        for &id in &ids {
            par_store.attach(id, *world.transform(id).unwrap(), 0);
        }
        let mut seq = TickAdvancer::new();
        let mut par = TickAdvancer::new();

        for tick in 1..=5u32 {
            for (i, &id) in ids.iter().enumerate() {
                let x = (tick as f32) * (i as f32 + 1.0);
                world.set_transform(id, Transform::from_position(Vec3::new(x, 0.0, 0.0)));
            }
            let a = seq.advance(&mut seq_store, &world, TickContext::running(tick));
            let b = par.advance_parallel(&mut par_store, &world, TickContext::running(tick));
            assert_eq!(a, b);
        }

        for &id in &ids {
            assert_eq!(seq_store.get(id), par_store.get(id));
        }
    }
}
