//! Pointer drag tracking
//!
//! While a node is held, its position comes from the pointer. On release the
//! pointer's recent motion becomes the node's velocity so a flick throws it.
//! A held node is never placed on an obstacle, past an edge or on top of
//! another node; blocked moves stop at the furthest clear point.

use glam::Vec2;

use super::node::{NodeId, Viewport};
use super::obstacle::{controls_strip, drag_corner};
use crate::consts::DRAG_SEARCH_STEPS;
use crate::direction_to;
use crate::tuning::DragTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PointerSample {
    pos: Vec2,
    time_ms: f64,
}

/// A node currently held by the pointer
#[derive(Debug, Clone)]
pub struct DragState {
    pub id: NodeId,
    history: Vec<PointerSample>,
}

impl DragState {
    pub fn new(id: NodeId, pos: Vec2, time_ms: f64) -> Self {
        Self {
            id,
            history: vec![PointerSample { pos, time_ms }],
        }
    }

    /// Record a pointer position, forgetting samples older than the window
    pub fn record(&mut self, pos: Vec2, time_ms: f64, tuning: &DragTuning) {
        self.history.push(PointerSample { pos, time_ms });
        self.history.retain(|s| time_ms - s.time_ms < tuning.history_ms);
    }

    /// Throw velocity (pixels per tick) from the oldest and newest samples,
    /// clamped per axis
    pub fn release_velocity(&self, tuning: &DragTuning) -> Vec2 {
        let (Some(oldest), Some(newest)) = (self.history.first(), self.history.last()) else {
            return Vec2::ZERO;
        };
        if self.history.len() < 2 {
            return Vec2::ZERO;
        }
        let dt = (newest.time_ms - oldest.time_ms) as f32;
        if dt <= 0.0 {
            return Vec2::ZERO;
        }
        let max = tuning.max_release_speed;
        let vel = (newest.pos - oldest.pos) / dt * tuning.frame_ms;
        vel.clamp(Vec2::splat(-max), Vec2::splat(max))
    }
}

/// A held node of `radius` may sit at `pos`
pub fn is_valid_drop(pos: Vec2, radius: f32, viewport: Viewport, others: &[Vec2]) -> bool {
    if controls_strip(viewport).overlaps_circle_bounds(pos, radius)
        || drag_corner(viewport).overlaps_circle_bounds(pos, radius)
    {
        return false;
    }
    if pos.x - radius < 0.0
        || pos.x + radius > viewport.width
        || pos.y - radius < 0.0
        || pos.y + radius > viewport.height
    {
        return false;
    }
    others.iter().all(|o| pos.distance(*o) >= radius * 2.0)
}

/// Clamp a drag move from `current` toward `target`
///
/// A clear target is returned unchanged. Otherwise bisects along the move
/// for the furthest clear point, falling back to `current`.
pub fn find_valid_position(
    target: Vec2,
    current: Vec2,
    radius: f32,
    viewport: Viewport,
    others: &[Vec2],
) -> Vec2 {
    if is_valid_drop(target, radius, viewport, others) {
        return target;
    }
    let Some((dir, distance)) = direction_to(current, target) else {
        return current;
    };

    let mut valid = 0.0;
    let mut probe = distance;
    let mut step = distance / 2.0;
    for _ in 0..DRAG_SEARCH_STEPS {
        if is_valid_drop(current + dir * probe, radius, viewport, others) {
            valid = probe;
            probe += step;
        } else {
            probe -= step;
        }
        step /= 2.0;
        if step < 0.1 {
            break;
        }
    }
    current + dir * valid
}
