//! Node entity and viewport geometry

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_MASS;

/// Stable node identifier (assigned by the game layer)
pub type NodeId = u64;

/// Display data carried with a node. The engine never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePayload {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub value: String,
}

/// A circular node
///
/// Every node shares the same radius (`PhysicsTuning::node_radius`).
/// On the wire it is the game layer's flat shape, see `NodeWire`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeWire", into = "NodeWire")]
pub struct Node {
    pub id: NodeId,
    pub pos: Vec2,
    /// Velocity in pixels per tick
    pub vel: Vec2,
    /// Projectile nodes are heavier; see `effective_mass`
    pub mass: f32,
    pub payload: NodePayload,
}

/// `{ id, x, y, velocityX, velocityY, mass, address, value }`
///
/// Each missing velocity axis reads as 0, a missing mass as 1.0.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeWire {
    id: NodeId,
    x: f32,
    y: f32,
    #[serde(default)]
    velocity_x: f32,
    #[serde(default)]
    velocity_y: f32,
    #[serde(default = "default_mass")]
    mass: f32,
    #[serde(flatten)]
    payload: NodePayload,
}

fn default_mass() -> f32 {
    DEFAULT_MASS
}

impl From<NodeWire> for Node {
    fn from(w: NodeWire) -> Self {
        Self {
            id: w.id,
            pos: Vec2::new(w.x, w.y),
            vel: Vec2::new(w.velocity_x, w.velocity_y),
            mass: w.mass,
            payload: w.payload,
        }
    }
}

impl From<Node> for NodeWire {
    fn from(n: Node) -> Self {
        Self {
            id: n.id,
            x: n.pos.x,
            y: n.pos.y,
            velocity_x: n.vel.x,
            velocity_y: n.vel.y,
            mass: n.mass,
            payload: n.payload,
        }
    }
}

impl Node {
    pub fn new(id: NodeId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            mass: DEFAULT_MASS,
            payload: NodePayload::default(),
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_payload(mut self, address: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload = NodePayload {
            address: address.into(),
            value: value.into(),
        };
        self
    }

    /// Mass used for impulses; unset, zero or garbage falls back to 1.0
    #[inline]
    pub fn effective_mass(&self) -> f32 {
        if self.mass > 0.0 && self.mass.is_finite() {
            self.mass
        } else {
            DEFAULT_MASS
        }
    }

    /// Velocity with non-finite components treated as 0
    #[inline]
    pub fn effective_vel(&self) -> Vec2 {
        Vec2::new(
            if self.vel.x.is_finite() { self.vel.x } else { 0.0 },
            if self.vel.y.is_finite() { self.vel.y } else { 0.0 },
        )
    }
}

/// Live viewport size in pixels (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle (`min` top-left, `max` bottom-right)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            min: Vec2::new(left, top),
            max: Vec2::new(right, bottom),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Inclusive point containment
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Circle bounding box touches or overlaps the rectangle
    pub fn overlaps_circle_bounds(&self, center: Vec2, radius: f32) -> bool {
        center.x + radius >= self.min.x
            && center.x - radius <= self.max.x
            && center.y + radius >= self.min.y
            && center.y - radius <= self.max.y
    }
}
