//! Property tests for the collision engine

use std::collections::HashSet;

use glam::Vec2;
use proptest::prelude::*;

use galist_physics::PhysicsTuning;
use galist_physics::sim::{CollisionEngine, Node, NodeId, Viewport};
use galist_physics::tuning::ImpulseOrdering;

const VIEW: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};
const R: f32 = 30.0;

fn engine(ordering: ImpulseOrdering) -> CollisionEngine {
    CollisionEngine::new(PhysicsTuning {
        impulse_ordering: ordering,
        ..PhysicsTuning::default()
    })
}

fn ordering() -> impl Strategy<Value = ImpulseOrdering> {
    prop_oneof![Just(ImpulseOrdering::Staged), Just(ImpulseOrdering::Sequential)]
}

fn arb_node(id: NodeId) -> impl Strategy<Value = Node> {
    (0.0f32..1280.0, 0.0f32..720.0, -20.0f32..20.0, -20.0f32..20.0, 0.5f32..4.0).prop_map(
        move |(x, y, vx, vy, mass)| {
            Node::new(id, Vec2::new(x, y))
                .with_velocity(Vec2::new(vx, vy))
                .with_mass(mass)
        },
    )
}

fn arb_nodes(max: usize) -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(arb_node(0), 1..max).prop_map(|nodes| {
        nodes
            .into_iter()
            .enumerate()
            .map(|(i, n)| Node { id: i as NodeId + 1, ..n })
            .collect()
    })
}

proptest! {
    #[test]
    fn nodes_stay_inside_viewport(nodes in arb_nodes(8), ord in ordering()) {
        let out = engine(ord).update_physics(&nodes, &HashSet::new(), VIEW);
        for n in &out {
            prop_assert!(n.pos.x >= R && n.pos.x <= VIEW.width - R, "x {}", n.pos.x);
            prop_assert!(n.pos.y >= R && n.pos.y <= VIEW.height - R, "y {}", n.pos.y);
        }
    }

    #[test]
    fn excluded_nodes_are_untouched(nodes in arb_nodes(8), mask in any::<u8>(), ord in ordering()) {
        let excluded: HashSet<NodeId> = nodes
            .iter()
            .filter(|n| mask & (1 << (n.id % 8)) != 0)
            .map(|n| n.id)
            .collect();
        let out = engine(ord).update_physics(&nodes, &excluded, VIEW);
        prop_assert_eq!(out.len(), nodes.len());
        for (before, after) in nodes.iter().zip(&out) {
            prop_assert_eq!(before.id, after.id);
            if excluded.contains(&before.id) {
                prop_assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn single_node_never_speeds_up(node in arb_node(1), ord in ordering()) {
        let out = engine(ord).update_node(&node, &HashSet::new(), VIEW);
        prop_assert!(out.vel.x.abs() <= node.vel.x.abs() + 1e-4);
        prop_assert!(out.vel.y.abs() <= node.vel.y.abs() + 1e-4);
    }

    #[test]
    fn slow_axes_come_to_rest(nodes in arb_nodes(6), ord in ordering()) {
        let out = engine(ord).update_physics(&nodes, &HashSet::new(), VIEW);
        for n in &out {
            prop_assert!(n.vel.x == 0.0 || n.vel.x.abs() >= 0.1);
            prop_assert!(n.vel.y == 0.0 || n.vel.y.abs() >= 0.1);
        }
    }

    #[test]
    fn staged_pair_ends_separated(
        ax in 400.0f32..800.0, ay in 250.0f32..450.0,
        dx in -50.0f32..50.0, dy in -50.0f32..50.0,
        va in (-4.0f32..4.0, -4.0f32..4.0), vb in (-4.0f32..4.0, -4.0f32..4.0),
    ) {
        let a = Node::new(1, Vec2::new(ax, ay)).with_velocity(Vec2::new(va.0, va.1));
        let b = Node::new(2, Vec2::new(ax + dx, ay + dy)).with_velocity(Vec2::new(vb.0, vb.1));
        let tentative = (a.pos + a.vel).distance(b.pos + b.vel);
        prop_assume!(tentative > 0.01 && tentative < 2.0 * R);

        let out = engine(ImpulseOrdering::Staged).update_physics(&[a, b], &HashSet::new(), VIEW);
        prop_assert!(out[0].pos.distance(out[1].pos) >= 2.0 * R - 1e-2);
    }

    #[test]
    fn staged_result_ignores_list_order(
        ax in 400.0f32..800.0, ay in 250.0f32..450.0,
        dx in -50.0f32..50.0, dy in -50.0f32..50.0,
        va in (-4.0f32..4.0, -4.0f32..4.0),
    ) {
        let a = Node::new(1, Vec2::new(ax, ay)).with_velocity(Vec2::new(va.0, va.1));
        let b = Node::new(2, Vec2::new(ax + dx, ay + dy));
        let e = engine(ImpulseOrdering::Staged);
        let forward = e.update_physics(&[a.clone(), b.clone()], &HashSet::new(), VIEW);
        let reverse = e.update_physics(&[b, a], &HashSet::new(), VIEW);
        prop_assert!(forward[0].pos.distance(reverse[1].pos) < 1e-3);
        prop_assert!(forward[1].pos.distance(reverse[0].pos) < 1e-3);
        prop_assert!(forward[0].vel.distance(reverse[1].vel) < 1e-3);
        prop_assert!(forward[1].vel.distance(reverse[0].vel) < 1e-3);
    }
}

#[test]
fn head_on_pair_separates_and_transfers_momentum() {
    let a = Node::new(1, Vec2::new(100.0, 100.0)).with_velocity(Vec2::new(5.0, 0.0));
    let b = Node::new(2, Vec2::new(158.0, 100.0));
    for ord in [ImpulseOrdering::Staged, ImpulseOrdering::Sequential] {
        let out = engine(ord).update_physics(&[a.clone(), b.clone()], &HashSet::new(), VIEW);
        assert!(out[0].pos.distance(out[1].pos) >= 2.0 * R - 1e-3, "{:?}", ord);
        assert!(out[0].vel.x < 5.0);
        assert!(out[1].vel.x > 0.0);
    }
}
