//! Linked-list topology queries
//!
//! The engine never walks the node graph itself. Whoever owns the links
//! (the game layer) answers these three questions.

use super::node::NodeId;

pub trait Topology {
    /// Has outgoing links but no incoming ones
    fn is_head(&self, id: NodeId) -> bool;

    /// Has incoming links but no outgoing ones
    fn is_tail(&self, id: NodeId) -> bool;

    /// Ids of the chain containing `start`, head first. A node with no
    /// links yields just itself.
    fn chain_order(&self, start: NodeId) -> Vec<NodeId>;
}

/// Topology with no links: every node is isolated
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlinked;

impl Topology for Unlinked {
    fn is_head(&self, _id: NodeId) -> bool {
        false
    }

    fn is_tail(&self, _id: NodeId) -> bool {
        false
    }

    fn chain_order(&self, start: NodeId) -> Vec<NodeId> {
        vec![start]
    }
}
