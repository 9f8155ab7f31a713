//! Deferred world mutations (§4.1, §9 "deferred updates").
//!
//! A typed enum is preferred over a generic thunk where the target language
//! supports sum types cheaply (§9) — Rust does, so `AgentUpdate` has one
//! variant per mutable field class rather than a boxed closure. Queuing
//! order is preserved by draining the backing `VecDeque` FIFO, which is
//! exactly the "last writer wins by queuing time" contract §4.1 specifies.

use std::collections::VecDeque;

use dt_core::AgentId;

use crate::agent::{CollisionPartner, DynamicState, Located};

/// One deferred mutation, captured during `Trigger` and applied during
/// `SyncGlobalData`.
#[derive(Clone, Debug)]
pub enum AgentUpdate {
    /// Replace the agent's dynamic state wholesale (the usual path for a
    /// `Dynamics` component's integration step).
    SetDynamicState(DynamicState),
    /// Overwrite the localized road view (normally only `World` itself
    /// produces this, via `sync_global_data`'s relocation pass, but a
    /// component may pre-seed it at spawn time).
    SetLocated(Located),
    /// Record a new collision partner (appended only if not already present
    /// — §3 "collision sets are symmetric" is maintained by the caller
    /// pushing the mirror update for the partner agent too).
    AddCollisionPartner(CollisionPartner),
    /// Set the velocity scalar only (used by spawn admission's velocity
    /// reduction and the collision component's post-latch deceleration).
    SetVelocity(f64),
    /// Mark the agent invalid; it is moved into removed-agent history and
    /// unregistered from the localization index at the next sync.
    Invalidate,
}

/// FIFO queue of per-agent deferred updates plus a separate removal queue.
///
/// Two independent `VecDeque`s rather than one combined queue: updates and
/// removals drain in two distinct passes (§4.1 "drains update queue...then
/// drains remove queue"), so keeping them apart avoids an extra branch on
/// every drain iteration.
#[derive(Default)]
pub struct UpdateQueue {
    updates: VecDeque<(AgentId, AgentUpdate)>,
    removals: Vec<AgentId>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_update(&mut self, agent: AgentId, update: AgentUpdate) {
        self.updates.push_back((agent, update));
    }

    pub fn push_removal(&mut self, agent: AgentId) {
        self.removals.push(agent);
    }

    /// Drain queued updates in FIFO order.
    pub fn drain_updates(&mut self) -> std::collections::vec_deque::Drain<'_, (AgentId, AgentUpdate)> {
        self.updates.drain(..)
    }

    /// Drain queued removals in the order they were requested.
    pub fn drain_removals(&mut self) -> std::vec::Drain<'_, AgentId> {
        self.removals.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.removals.is_empty()
    }

    pub fn pending_update_count(&self) -> usize {
        self.updates.len()
    }
}
