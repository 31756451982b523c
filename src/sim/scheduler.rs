//! Frame scheduler
//!
//! Owns the node list between ticks and advances it once per display
//! refresh:
//! 1. fire deferred work that has come due
//! 2. pass 1: suction behaviours (override, gentle pull, entrance trigger)
//! 3. pass 2: one `CollisionEngine::update_physics` over every node
//! 4. merge the dragged node's pointer position back over the physics result

use std::collections::HashSet;

use glam::Vec2;

use super::collision::CollisionEngine;
use super::deferred::{Deferred, DeferredQueue, SimEvent};
use super::drag::{DragState, find_valid_position};
use super::node::{Node, NodeId, Viewport};
use super::suction::Portal;
use super::topology::Topology;
use crate::tuning::Tuning;

/// Per-tick orchestration of suction and collision
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    tuning: Tuning,
    engine: CollisionEngine,
    nodes: Vec<Node>,
    /// Exclusion set: nodes being pulled into the portal
    sucking: HashSet<NodeId>,
    /// Nodes absorbed since the current chain started
    absorbed: Vec<NodeId>,
    /// Order nodes entered the portal for the current submission
    entry_order: Vec<NodeId>,
    portal_open: bool,
    /// The active chain was started from a head node (stronger suction)
    chain_from_head: bool,
    drag: Option<DragState>,
    deferred: DeferredQueue,
    events: Vec<SimEvent>,
    tick: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl FrameScheduler {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            engine: CollisionEngine::new(tuning.physics.clone()),
            tuning,
            nodes: Vec::new(),
            sucking: HashSet::new(),
            absorbed: Vec::new(),
            entry_order: Vec::new(),
            portal_open: false,
            chain_from_head: false,
            drag: None,
            deferred: DeferredQueue::new(),
            events: Vec::new(),
            tick: 0,
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn has_node(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Ids currently skipped by the collision pipeline
    pub fn excluded(&self) -> &HashSet<NodeId> {
        &self.sucking
    }

    pub fn is_sucking(&self, id: NodeId) -> bool {
        self.sucking.contains(&id)
    }

    pub fn absorbed(&self) -> &[NodeId] {
        &self.absorbed
    }

    pub fn entry_order(&self) -> &[NodeId] {
        &self.entry_order
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_portal_open(&self) -> bool {
        self.portal_open
    }

    pub fn dragged(&self) -> Option<NodeId> {
        self.drag.as_ref().map(|d| d.id)
    }

    /// Take everything emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add a node created by the game layer (launch, insert)
    pub fn add_node(&mut self, node: Node) {
        log::debug!("node {} added at ({:.1}, {:.1})", node.id, node.pos.x, node.pos.y);
        self.nodes.push(node);
    }

    /// Delete a node on behalf of the game layer
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        self.sucking.remove(&id);
        if self.dragged() == Some(id) {
            self.drag = None;
        }
        Some(self.nodes.remove(idx))
    }

    /// Open the portal and queue suction for whatever is on screen
    ///
    /// Each head node starts its own chain, one after another. Without any
    /// heads, unlinked nodes are pulled in one at a time.
    pub fn open_portal(&mut self, topology: &dyn Topology) {
        if self.portal_open {
            return;
        }
        self.portal_open = true;

        let heads: Vec<NodeId> = self
            .nodes
            .iter()
            .map(|n| n.id)
            .filter(|&id| topology.is_head(id))
            .collect();

        if !heads.is_empty() {
            let stagger = self.tuning.suction.head_open_stagger_ticks;
            for (i, id) in heads.iter().enumerate() {
                let due = self.after(stagger.saturating_mul(i as u64));
                self.deferred.schedule(due, Deferred::StartChain(*id));
            }
            log::info!("Portal opened: {} chain(s) queued", heads.len());
            return;
        }

        let isolated: Vec<NodeId> = self
            .nodes
            .iter()
            .map(|n| n.id)
            .filter(|&id| {
                !topology.is_head(id)
                    && !topology.is_tail(id)
                    && topology.chain_order(id).len() <= 1
            })
            .collect();
        let stagger = self.tuning.suction.isolated_open_stagger_ticks;
        for (i, id) in isolated.iter().enumerate() {
            let due = self.after(stagger.saturating_mul(i as u64));
            self.deferred.schedule(due, Deferred::BeginSuction(*id));
        }
        log::info!("Portal opened: {} isolated node(s) queued", isolated.len());
    }

    /// Close the portal: release every sucking node and cancel pending onsets
    pub fn close_portal(&mut self) {
        if !self.portal_open {
            return;
        }
        self.portal_open = false;
        self.chain_from_head = false;
        self.sucking.clear();
        let cancelled = self.deferred.cancel_where(Deferred::is_suction_onset);
        log::info!("Portal closed ({} pending onset(s) cancelled)", cancelled);
    }

    /// Start pulling a chain into the portal, head first
    ///
    /// `start` is excluded immediately; the rest of its chain follows at
    /// `chain_stagger_ticks` intervals so the entry order runs head to tail.
    pub fn start_chain_suction(&mut self, start: NodeId, topology: &dyn Topology) {
        self.absorbed.clear();
        self.entry_order.clear();
        self.chain_from_head = topology.is_head(start);

        let chain = topology.chain_order(start);
        self.begin_suction(start);

        let stagger = self.tuning.suction.chain_stagger_ticks;
        for (i, id) in chain.iter().filter(|&&id| id != start).enumerate() {
            let due = self.after(stagger.saturating_mul(i as u64 + 1));
            self.deferred.schedule(due, Deferred::BeginSuction(*id));
        }
        log::debug!(
            "chain suction from {} ({} node(s), head: {})",
            start,
            chain.len().max(1),
            self.chain_from_head
        );
    }

    /// Tick number `ticks` from now
    fn after(&self, ticks: u64) -> u64 {
        self.tick.saturating_add(ticks)
    }

    fn begin_suction(&mut self, id: NodeId) {
        if self.sucking.insert(id) {
            log::debug!("node {} suction started", id);
            self.events.push(SimEvent::SuctionStarted { id });
        }
    }

    /// Pick up a node with the pointer
    pub fn begin_drag(&mut self, id: NodeId, pos: Vec2, time_ms: f64) -> bool {
        if !self.has_node(id) {
            return false;
        }
        self.drag = Some(DragState::new(id, pos, time_ms));
        true
    }

    /// Move the held node; it stays put (zero velocity) until released
    ///
    /// The node only goes as far as it can without landing on an obstacle,
    /// an edge or another node.
    pub fn drag_to(&mut self, pos: Vec2, viewport: Viewport, time_ms: f64) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.record(pos, time_ms, &self.tuning.drag);
        let id = drag.id;

        let others: Vec<Vec2> = self
            .nodes
            .iter()
            .filter(|n| n.id != id)
            .map(|n| n.pos)
            .collect();
        let radius = self.tuning.physics.node_radius;
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.pos = find_valid_position(pos, node.pos, radius, viewport, &others);
            node.vel = Vec2::ZERO;
        }
    }

    /// Let go of the held node, throwing it with the pointer's recent motion
    pub fn end_drag(&mut self) -> Option<NodeId> {
        let drag = self.drag.take()?;
        let vel = drag.release_velocity(&self.tuning.drag);
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == drag.id) {
            node.vel = vel;
        }
        Some(drag.id)
    }

    /// Advance one frame
    pub fn tick(&mut self, viewport: Viewport, topology: &dyn Topology) {
        self.tick += 1;
        self.fire_due(topology);

        let portal = Portal::new(viewport, &self.tuning.suction);
        let suction = &self.tuning.suction;
        let radius = self.tuning.physics.node_radius;
        let dragged = self.dragged();
        let any_head = self.nodes.iter().any(|n| topology.is_head(n.id));
        let mut triggers = Vec::new();

        // Pass 1: suction behaviours
        for node in self.nodes.iter_mut() {
            if Some(node.id) == dragged {
                continue;
            }

            if self.sucking.contains(&node.id) {
                if portal.has_arrived(node.pos) {
                    // Hold still for a beat so the last position renders
                    let absorb = Deferred::Absorb(node.id);
                    if !self.deferred.is_pending(&absorb) {
                        self.deferred
                            .schedule(self.tick.saturating_add(suction.absorb_delay_ticks), absorb);
                    }
                    continue;
                }
                let force = suction.base_force
                    + if self.chain_from_head {
                        suction.head_boost
                    } else {
                        0.0
                    };
                if let Some(vel) = portal.suction_velocity(node.pos, force) {
                    node.vel = vel;
                    node.pos += vel;
                }
                continue;
            }

            if self.portal_open {
                node.vel = node.effective_vel() + portal.gentle_pull(node.pos, suction);
                let predicted = node.pos + node.vel;
                if portal.at_entrance(predicted, radius)
                    && (topology.is_head(node.id) || !any_head)
                {
                    triggers.push(node.id);
                }
            }
        }

        for id in triggers {
            if !self.sucking.contains(&id) {
                self.start_chain_suction(id, topology);
            }
        }

        // Pass 2: uniform resolution
        let held = dragged.and_then(|id| self.node(id).map(|n| n.pos));
        let mut next = self.engine.update_physics(&self.nodes, &self.sucking, viewport);
        if let (Some(id), Some(pos)) = (dragged, held) {
            if let Some(node) = next.iter_mut().find(|n| n.id == id) {
                // Pointer owns the position; keep physics velocity for the throw
                node.pos = pos;
            }
        }
        self.nodes = next;

        log::trace!(
            "tick {}: {} node(s), {} sucking",
            self.tick,
            self.nodes.len(),
            self.sucking.len()
        );
    }

    fn fire_due(&mut self, topology: &dyn Topology) {
        for action in self.deferred.take_due(self.tick) {
            match action {
                Deferred::StartChain(id) => {
                    if self.portal_open && self.has_node(id) && !self.sucking.contains(&id) {
                        self.start_chain_suction(id, topology);
                    }
                }
                Deferred::BeginSuction(id) => {
                    if self.has_node(id) {
                        self.begin_suction(id);
                    }
                }
                Deferred::Absorb(id) => self.absorb(id),
                Deferred::Submit => {
                    if self.nodes.is_empty() && !self.entry_order.is_empty() {
                        log::info!("Submission ready: {:?}", self.entry_order);
                        self.events.push(SimEvent::SubmissionReady {
                            entry_order: self.entry_order.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Remove a node that reached the portal
    ///
    /// The node must still exist and still be sucking; the portal may have
    /// closed or the node been deleted since the absorption was queued.
    fn absorb(&mut self, id: NodeId) {
        let Some(idx) = self.nodes.iter().position(|n| n.id == id) else {
            log::debug!("absorb skipped: node {} is gone", id);
            return;
        };
        if !self.sucking.remove(&id) {
            log::debug!("absorb skipped: node {} no longer sucking", id);
            return;
        }

        self.nodes.remove(idx);
        if self.dragged() == Some(id) {
            self.drag = None;
        }
        if !self.absorbed.contains(&id) {
            self.absorbed.push(id);
        }
        let order_index = match self.entry_order.iter().position(|&e| e == id) {
            Some(i) => i,
            None => {
                self.entry_order.push(id);
                self.entry_order.len() - 1
            }
        };
        log::debug!("node {} absorbed (#{})", id, order_index);
        self.events.push(SimEvent::Absorbed { id, order_index });

        if self.nodes.is_empty() {
            self.deferred
                .schedule(self.after(self.tuning.suction.submit_delay_ticks), Deferred::Submit);
        }
    }
}
