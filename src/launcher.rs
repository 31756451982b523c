//! Node launcher
//!
//! Nodes enter from the bottom-right corner with a randomised up-left
//! velocity. Seeded so a run can be replayed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{DEFAULT_MASS, LAUNCH_INSET_X, LAUNCH_INSET_Y};
use crate::sim::{Node, NodeId, Viewport};

/// Mass given to projectile nodes so they shove ordinary ones aside
pub const PROJECTILE_MASS: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct Launcher {
    rng: Pcg32,
    next_id: NodeId,
}

impl Launcher {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Allocate a node id
    pub fn next_node_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Launch point for the current viewport
    pub fn launch_point(viewport: Viewport) -> Vec2 {
        Vec2::new(
            viewport.width - LAUNCH_INSET_X,
            viewport.height - LAUNCH_INSET_Y,
        )
    }

    /// Random launch velocity: x in (-13, -8], y in (-8, -5]
    pub fn launch_velocity(&mut self) -> Vec2 {
        Vec2::new(
            -8.0 - self.rng.random::<f32>() * 5.0,
            -5.0 - self.rng.random::<f32>() * 3.0,
        )
    }

    /// Create a node carrying `address`/`value` at the launch point
    pub fn launch(&mut self, viewport: Viewport, address: &str, value: &str) -> Node {
        let id = self.next_node_id();
        let vel = self.launch_velocity();
        log::debug!("launch node {} ({}) vel ({:.2}, {:.2})", id, address, vel.x, vel.y);
        Node::new(id, Self::launch_point(viewport))
            .with_velocity(vel)
            .with_mass(DEFAULT_MASS)
            .with_payload(address, value)
    }

    /// Heavy node fired from the launch point
    pub fn fire_projectile(&mut self, viewport: Viewport) -> Node {
        let id = self.next_node_id();
        let vel = self.launch_velocity();
        Node::new(id, Self::launch_point(viewport))
            .with_velocity(vel)
            .with_mass(PROJECTILE_MASS)
    }
}
