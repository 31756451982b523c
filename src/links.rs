//! Directed links between nodes (the list the player builds)
//!
//! Lives outside `sim`: the engine only asks `Topology` questions and never
//! sees the links themselves.

use serde::{Deserialize, Serialize};

use crate::sim::{NodeId, Topology};

/// A `from -> to` pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkGraph {
    links: Vec<Link>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `from -> to`. Self links and duplicates are ignored.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> bool {
        if from == to || self.links.iter().any(|l| l.from == from && l.to == to) {
            return false;
        }
        self.links.push(Link { from, to });
        true
    }

    /// Drop every link touching `id`
    pub fn disconnect_all(&mut self, id: NodeId) {
        self.links.retain(|l| l.from != id && l.to != id);
    }

    /// Drop links whose ends were both absorbed
    pub fn prune_absorbed(&mut self, absorbed: &[NodeId]) {
        self.links
            .retain(|l| !(absorbed.contains(&l.from) && absorbed.contains(&l.to)));
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    fn has_outgoing(&self, id: NodeId) -> bool {
        self.links.iter().any(|l| l.from == id)
    }

    fn has_incoming(&self, id: NodeId) -> bool {
        self.links.iter().any(|l| l.to == id)
    }

    fn next(&self, id: NodeId) -> Option<NodeId> {
        self.links.iter().find(|l| l.from == id).map(|l| l.to)
    }

    fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.links.iter().find(|l| l.to == id).map(|l| l.from)
    }
}

impl Topology for LinkGraph {
    fn is_head(&self, id: NodeId) -> bool {
        self.has_outgoing(id) && !self.has_incoming(id)
    }

    fn is_tail(&self, id: NodeId) -> bool {
        self.has_incoming(id) && !self.has_outgoing(id)
    }

    fn chain_order(&self, start: NodeId) -> Vec<NodeId> {
        // Walk back to the head (cycle-safe), then forward to the tail
        let mut head = start;
        let mut seen = vec![start];
        while let Some(prev) = self.prev(head) {
            if seen.contains(&prev) {
                break;
            }
            seen.push(prev);
            head = prev;
        }

        let mut order = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            if order.contains(&id) {
                break;
            }
            order.push(id);
            current = self.next(id);
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> LinkGraph {
        let mut g = LinkGraph::new();
        g.connect(1, 2);
        g.connect(2, 3);
        g
    }

    #[test]
    fn test_head_and_tail() {
        let g = list();
        assert!(g.is_head(1));
        assert!(!g.is_head(2));
        assert!(g.is_tail(3));
        assert!(!g.is_tail(1));
        assert!(!g.is_head(9) && !g.is_tail(9));
    }

    #[test]
    fn test_chain_order_from_any_member() {
        let g = list();
        assert_eq!(g.chain_order(1), vec![1, 2, 3]);
        assert_eq!(g.chain_order(2), vec![1, 2, 3]);
        assert_eq!(g.chain_order(3), vec![1, 2, 3]);
        assert_eq!(g.chain_order(9), vec![9]);
    }

    #[test]
    fn test_cycle_terminates() {
        let mut g = list();
        g.connect(3, 1);
        let order = g.chain_order(2);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_connect_rejects_self_and_duplicate() {
        let mut g = list();
        assert!(!g.connect(1, 1));
        assert!(!g.connect(1, 2));
        assert_eq!(g.links().len(), 2);
    }

    #[test]
    fn test_prune_absorbed() {
        let mut g = list();
        g.prune_absorbed(&[1, 2]);
        assert_eq!(g.links(), &[Link { from: 2, to: 3 }]);
        g.disconnect_all(3);
        assert!(g.links().is_empty());
    }
}
