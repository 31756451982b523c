//! Collision engine
//!
//! One call advances every non-excluded node by one tick: integrate, bounce
//! off the UI obstacles, resolve node-node contacts, apply drag, bounce off
//! the viewport walls, then snap slow axes to rest. Stage order matters;
//! each stage consumes the previous stage's output.

use std::collections::HashSet;

use glam::Vec2;

use super::node::{Node, NodeId, Viewport};
use super::obstacle::{bounce_controls_strip, bounce_right_square, bounce_top_bar, bounce_walls};
use crate::snap_to_rest;
use crate::tuning::{ImpulseOrdering, PhysicsTuning};

/// Position/velocity change produced by one contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResponse {
    /// Separation applied to the first node (the second gets the negation)
    pub push: Vec2,
    /// Velocity change for the first node, if the pair was approaching
    pub dv_self: Vec2,
    /// Velocity change for the second node
    pub dv_other: Vec2,
}

/// Contact between two circles of equal radius
///
/// `normal` points from `other` toward `this`. Returns `None` when the pair
/// is apart or the centres coincide (no usable normal).
#[allow(clippy::too_many_arguments)]
pub fn resolve_contact(
    this_pos: Vec2,
    this_vel: Vec2,
    this_mass: f32,
    other_pos: Vec2,
    other_vel: Vec2,
    other_mass: f32,
    radius: f32,
    restitution: f32,
) -> Option<ContactResponse> {
    let delta = this_pos - other_pos;
    let distance = delta.length();
    let min_distance = radius * 2.0;
    if !(distance > 0.0 && distance < min_distance) {
        return None;
    }

    let normal = delta / distance;
    let push = normal * ((min_distance - distance) / 2.0);

    let velocity_along_normal = (this_vel - other_vel).dot(normal);
    if velocity_along_normal > 0.0 {
        // Separating already; position push only
        return Some(ContactResponse {
            push,
            dv_self: Vec2::ZERO,
            dv_other: Vec2::ZERO,
        });
    }

    let impulse = 2.0 * velocity_along_normal / (this_mass + other_mass) * restitution;
    Some(ContactResponse {
        push,
        dv_self: -impulse * other_mass * normal,
        dv_other: impulse * this_mass * normal,
    })
}

/// Per-tick circle simulator
#[derive(Debug, Clone, Default)]
pub struct CollisionEngine {
    pub tuning: PhysicsTuning,
}

impl CollisionEngine {
    pub fn new(tuning: PhysicsTuning) -> Self {
        Self { tuning }
    }

    /// Advance all nodes one tick. Excluded nodes come back untouched and
    /// are invisible to the others. Output has the input's length and order.
    pub fn update_physics(
        &self,
        nodes: &[Node],
        excluded: &HashSet<NodeId>,
        viewport: Viewport,
    ) -> Vec<Node> {
        match self.tuning.impulse_ordering {
            ImpulseOrdering::Staged => self.update_staged(nodes, excluded, viewport),
            ImpulseOrdering::Sequential => self.update_sequential(nodes, excluded, viewport),
        }
    }

    /// Single-node convenience; no siblings to collide with
    pub fn update_node(&self, node: &Node, excluded: &HashSet<NodeId>, viewport: Viewport) -> Node {
        self.update_physics(std::slice::from_ref(node), excluded, viewport)
            .pop()
            .unwrap_or_else(|| node.clone())
    }

    /// Stages 1-3: integrate and bounce off the UI obstacles
    fn integrate(&self, node: &Node, viewport: Viewport) -> (Vec2, Vec2) {
        let t = &self.tuning;
        let radius = t.node_radius;
        let vel = node.effective_vel();
        let pos = node.pos + vel;

        let b = bounce_top_bar(pos, vel, radius, viewport, t.wall_bounce_loss);
        let b = bounce_right_square(node.pos, b.pos, b.vel, radius, viewport, t.wall_bounce_loss);
        let b = if t.controls_strip {
            bounce_controls_strip(b.pos, b.vel, radius, viewport, t.wall_bounce_loss)
        } else {
            b
        };
        (b.pos, b.vel)
    }

    /// Stages 5-7: drag, walls, rest floor
    fn finish(&self, node: &Node, pos: Vec2, vel: Vec2, viewport: Viewport) -> Node {
        let t = &self.tuning;
        let vel = vel * t.air_resistance;
        let wall = bounce_walls(pos, vel, t.node_radius, viewport, t.wall_bounce_loss);
        if wall.hit {
            log::trace!("node {} hit wall at ({:.1}, {:.1})", node.id, wall.pos.x, wall.pos.y);
        }
        Node {
            pos: wall.pos,
            vel: snap_to_rest(wall.vel, t.rest_speed),
            ..node.clone()
        }
    }

    /// Order-independent resolution
    ///
    /// Every node is integrated first. Each unordered pair of active nodes is
    /// then resolved once against those tentative positions and the input
    /// velocities, and all pushes/velocity changes are summed and applied
    /// together.
    fn update_staged(
        &self,
        nodes: &[Node],
        excluded: &HashSet<NodeId>,
        viewport: Viewport,
    ) -> Vec<Node> {
        let t = &self.tuning;
        let active: Vec<bool> = nodes.iter().map(|n| !excluded.contains(&n.id)).collect();

        let tentative: Vec<(Vec2, Vec2)> = nodes
            .iter()
            .zip(&active)
            .map(|(n, &on)| if on { self.integrate(n, viewport) } else { (n.pos, n.vel) })
            .collect();

        let mut push = vec![Vec2::ZERO; nodes.len()];
        let mut dv = vec![Vec2::ZERO; nodes.len()];

        for i in 0..nodes.len() {
            if !active[i] {
                continue;
            }
            for j in (i + 1)..nodes.len() {
                if !active[j] || nodes[i].id == nodes[j].id {
                    continue;
                }
                let Some(contact) = resolve_contact(
                    tentative[i].0,
                    tentative[i].1,
                    nodes[i].effective_mass(),
                    tentative[j].0,
                    tentative[j].1,
                    nodes[j].effective_mass(),
                    t.node_radius,
                    t.restitution,
                ) else {
                    continue;
                };
                push[i] += contact.push;
                push[j] -= contact.push;
                dv[i] += contact.dv_self;
                dv[j] += contact.dv_other;
            }
        }

        nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                if !active[i] {
                    return node.clone();
                }
                let (pos, vel) = tentative[i];
                self.finish(node, pos + push[i], vel + dv[i], viewport)
            })
            .collect()
    }

    /// Order-dependent resolution
    ///
    /// Nodes are processed in list order. Only the current node is pushed,
    /// against its siblings' untouched input positions, but impulses are also
    /// written into the siblings' velocities. A sibling processed later starts
    /// from that modified velocity; one processed earlier never sees it.
    fn update_sequential(
        &self,
        nodes: &[Node],
        excluded: &HashSet<NodeId>,
        viewport: Viewport,
    ) -> Vec<Node> {
        let t = &self.tuning;
        let mut scratch_vel: Vec<Vec2> = nodes.iter().map(|n| n.effective_vel()).collect();
        let mut out = Vec::with_capacity(nodes.len());

        for (i, node) in nodes.iter().enumerate() {
            if excluded.contains(&node.id) {
                out.push(node.clone());
                continue;
            }

            let current = Node {
                vel: scratch_vel[i],
                ..node.clone()
            };
            let (mut pos, mut vel) = self.integrate(&current, viewport);

            for (j, other) in nodes.iter().enumerate() {
                if other.id == node.id || excluded.contains(&other.id) {
                    continue;
                }
                let Some(contact) = resolve_contact(
                    pos,
                    vel,
                    node.effective_mass(),
                    other.pos,
                    scratch_vel[j],
                    other.effective_mass(),
                    t.node_radius,
                    t.restitution,
                ) else {
                    continue;
                };
                pos += contact.push;
                vel += contact.dv_self;
                scratch_vel[j] += contact.dv_other;
            }

            out.push(self.finish(node, pos, vel, viewport));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn engine(ordering: ImpulseOrdering) -> CollisionEngine {
        CollisionEngine::new(PhysicsTuning {
            impulse_ordering: ordering,
            ..Default::default()
        })
    }

    fn both() -> [CollisionEngine; 2] {
        [
            engine(ImpulseOrdering::Staged),
            engine(ImpulseOrdering::Sequential),
        ]
    }

    #[test]
    fn test_head_on_overlap_scenario() {
        for engine in both() {
            let a = Node::new(1, Vec2::new(100.0, 100.0)).with_velocity(Vec2::new(5.0, 0.0));
            let b = Node::new(2, Vec2::new(158.0, 100.0));
            let out = engine.update_physics(&[a, b], &HashSet::new(), VIEW);

            let distance = out[0].pos.distance(out[1].pos);
            assert!(
                distance >= 60.0 - 1e-3,
                "{:?}: distance {}",
                engine.tuning.impulse_ordering,
                distance
            );
            assert!(out[0].vel.x < 5.0);
            assert!(out[1].vel.x > 0.0);
        }
    }

    #[test]
    fn test_left_wall_scenario() {
        for engine in both() {
            let node = Node::new(1, Vec2::new(30.0, 300.0)).with_velocity(Vec2::new(-6.0, 0.0));
            let out = engine.update_node(&node, &HashSet::new(), VIEW);
            assert_eq!(out.pos.x, 30.0);
            assert!((out.vel.x - 4.8).abs() < 0.02, "vx = {}", out.vel.x);
            assert_eq!(out.vel.y, 0.0);
        }
    }

    #[test]
    fn test_excluded_nodes_pass_through() {
        for engine in both() {
            let a = Node::new(1, Vec2::new(100.0, 100.0)).with_velocity(Vec2::new(5.0, 0.0));
            let b = Node::new(2, Vec2::new(140.0, 100.0)).with_velocity(Vec2::new(-3.0, 1.0));
            let excluded: HashSet<NodeId> = [2].into_iter().collect();
            let out = engine.update_physics(&[a.clone(), b.clone()], &excluded, VIEW);
            assert_eq!(out[1], b);
            // A does not see the excluded node: free flight plus drag
            assert_eq!(out[0].pos, Vec2::new(105.0, 100.0));
            assert!((out[0].vel.x - 5.0 * 0.998).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rest_invariant() {
        for engine in both() {
            let node = Node::new(1, Vec2::new(400.0, 300.0));
            let out = engine.update_node(&node, &HashSet::new(), VIEW);
            assert_eq!(out.pos, node.pos);
            assert_eq!(out.vel, Vec2::ZERO);
        }
    }

    #[test]
    fn test_slow_axis_snaps_to_zero() {
        let node = Node::new(1, Vec2::new(400.0, 300.0)).with_velocity(Vec2::new(0.1, 2.0));
        let out = engine(ImpulseOrdering::Staged).update_node(&node, &HashSet::new(), VIEW);
        // 0.1 * 0.998 drops below the floor
        assert_eq!(out.vel.x, 0.0);
        assert!((out.vel.y - 2.0 * 0.998).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_centres_skipped() {
        for engine in both() {
            let a = Node::new(1, Vec2::new(300.0, 300.0));
            let b = Node::new(2, Vec2::new(300.0, 300.0));
            let out = engine.update_physics(&[a, b], &HashSet::new(), VIEW);
            for n in &out {
                assert!(n.pos.is_finite());
                assert!(n.vel.is_finite());
                assert_eq!(n.pos, Vec2::new(300.0, 300.0));
            }
        }
    }

    #[test]
    fn test_staged_separation_is_symmetric() {
        let engine = engine(ImpulseOrdering::Staged);
        let a = Node::new(1, Vec2::new(380.0, 300.0));
        let b = Node::new(2, Vec2::new(420.0, 300.0));
        let out = engine.update_physics(&[a, b], &HashSet::new(), VIEW);
        assert_eq!(out[0].pos, Vec2::new(370.0, 300.0));
        assert_eq!(out[1].pos, Vec2::new(430.0, 300.0));
    }

    #[test]
    fn test_staged_is_order_independent() {
        let engine = engine(ImpulseOrdering::Staged);
        let a = Node::new(1, Vec2::new(300.0, 300.0)).with_velocity(Vec2::new(4.0, 1.0));
        let b = Node::new(2, Vec2::new(350.0, 305.0)).with_velocity(Vec2::new(-2.0, 0.0));
        let c = Node::new(3, Vec2::new(330.0, 350.0)).with_velocity(Vec2::new(0.0, -3.0));

        let forward =
            engine.update_physics(&[a.clone(), b.clone(), c.clone()], &HashSet::new(), VIEW);
        let reverse = engine.update_physics(&[c, b, a], &HashSet::new(), VIEW);

        for node in &forward {
            let twin = reverse.iter().find(|n| n.id == node.id).unwrap();
            assert!(node.pos.abs_diff_eq(twin.pos, 1e-4));
            assert!(node.vel.abs_diff_eq(twin.vel, 1e-4));
        }
    }

    #[test]
    fn test_sequential_first_processed_wins() {
        let engine = engine(ImpulseOrdering::Sequential);
        let a = Node::new(1, Vec2::new(100.0, 100.0)).with_velocity(Vec2::new(5.0, 0.0));
        let b = Node::new(2, Vec2::new(158.0, 100.0));

        let ab = engine.update_physics(&[a.clone(), b.clone()], &HashSet::new(), VIEW);
        let ba = engine.update_physics(&[b, a], &HashSet::new(), VIEW);
        // A keeps more of its speed when it is resolved before B
        let a_first = ab.iter().find(|n| n.id == 1).unwrap();
        let b_first = ba.iter().find(|n| n.id == 1).unwrap();
        assert!(a_first.vel.x > b_first.vel.x + 0.5);
    }

    #[test]
    fn test_heavier_node_moves_less() {
        let engine = engine(ImpulseOrdering::Staged);
        let bullet = Node::new(1, Vec2::new(300.0, 300.0))
            .with_velocity(Vec2::new(6.0, 0.0))
            .with_mass(3.0);
        let target = Node::new(2, Vec2::new(355.0, 300.0));
        let out = engine.update_physics(&[bullet, target], &HashSet::new(), VIEW);
        let bullet_dv = (out[0].vel.x - 6.0).abs();
        assert!(out[1].vel.x > bullet_dv);
    }

    #[test]
    fn test_resolve_contact_separating_pair_has_no_impulse() {
        let contact = resolve_contact(
            Vec2::new(0.0, 0.0),
            Vec2::new(-1.0, 0.0),
            1.0,
            Vec2::new(50.0, 0.0),
            Vec2::new(1.0, 0.0),
            1.0,
            30.0,
            0.8,
        )
        .unwrap();
        assert_eq!(contact.dv_self, Vec2::ZERO);
        assert_eq!(contact.dv_other, Vec2::ZERO);
        assert!((contact.push.x + 5.0).abs() < 1e-5);
    }
}
