//! Tick-keyed deferred work and outgoing events
//!
//! Delayed actions (staggered suction onsets, absorption, submission) are
//! queued against a future tick and drained at the start of that tick. They
//! carry only ids; whoever fires them re-checks that the node still exists.

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Work scheduled for a later tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Start a suction chain from this node (portal auto-open)
    StartChain(NodeId),
    /// Add this node to the exclusion set
    BeginSuction(NodeId),
    /// Remove this node: it reached the portal
    Absorb(NodeId),
    /// Hand the entry order to validation
    Submit,
}

impl Deferred {
    /// Suction onsets are dropped when the portal closes
    pub fn is_suction_onset(&self) -> bool {
        matches!(self, Deferred::StartChain(_) | Deferred::BeginSuction(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Scheduled {
    due_tick: u64,
    seq: u64,
    action: Deferred,
}

/// Queue of deferred actions, fired in (due tick, insertion) order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeferredQueue {
    entries: Vec<Scheduled>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_tick: u64, action: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Scheduled {
            due_tick,
            seq,
            action,
        });
    }

    /// Is this exact action already waiting?
    pub fn is_pending(&self, action: &Deferred) -> bool {
        self.entries.iter().any(|e| &e.action == action)
    }

    /// Remove and return everything due at or before `tick`, in firing order
    pub fn take_due(&mut self, tick: u64) -> Vec<Deferred> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|e| e.due_tick <= tick);
        self.entries = rest;
        due.sort_by_key(|e| (e.due_tick, e.seq));
        due.into_iter().map(|e| e.action).collect()
    }

    /// Drop queued actions matching `pred`
    pub fn cancel_where(&mut self, pred: impl Fn(&Deferred) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !pred(&e.action));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Observable output of the frame scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// Node entered the exclusion set
    SuctionStarted { id: NodeId },
    /// Node reached the portal and left the simulation
    Absorbed { id: NodeId, order_index: usize },
    /// Every node has been absorbed; `entry_order` is ready for validation
    SubmissionReady { entry_order: Vec<NodeId> },
}
