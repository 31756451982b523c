//! Galist Physics - circle collision and portal suction for the Galist game
//!
//! Core modules:
//! - `sim`: Per-frame simulation (obstacles, collisions, suction, frame scheduler)
//! - `platform`: Tick sources for browser (animation frame) and native (fixed rate)
//! - `tuning`: Data-driven physics constants
//! - `links`: Linked-list topology the suction chain follows
//! - `launcher`: Seeded node launching

pub mod launcher;
pub mod links;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use launcher::Launcher;
pub use links::LinkGraph;
pub use tuning::{DragTuning, PhysicsTuning, SuctionTuning, Tuning, TuningError};

use glam::Vec2;

/// Engine constants (defaults for `Tuning`)
pub mod consts {
    /// Nominal display refresh rate the tick counts are calibrated for
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Node defaults
    pub const NODE_RADIUS: f32 = 30.0;
    pub const DEFAULT_MASS: f32 = 1.0;

    /// Fraction of relative normal velocity kept after a node-node hit
    pub const RESTITUTION: f32 = 0.8;
    /// Per-tick velocity multiplier (drag)
    pub const AIR_RESISTANCE: f32 = 0.998;
    /// Velocity multiplier on wall and obstacle bounces
    pub const WALL_BOUNCE_LOSS: f32 = 0.8;
    /// Per-axis speed below which a node is snapped to rest
    pub const REST_SPEED: f32 = 0.1;

    /// Top bar (expected results strip)
    pub const TOP_BAR_HEIGHT: f32 = 60.0;

    /// Bottom-right square (launcher), relative to the viewport corner
    pub const RIGHT_SQUARE_INSET_X: f32 = 80.0;
    pub const RIGHT_SQUARE_WIDTH: f32 = 100.0;
    pub const RIGHT_SQUARE_INSET_Y: f32 = 55.0;
    pub const RIGHT_SQUARE_HEIGHT: f32 = 90.0;
    /// Corner box a held node may not be dropped into
    pub const DRAG_CORNER_SIZE: f32 = 100.0;

    /// Bottom-centre controls strip
    pub const CONTROLS_WIDTH: f32 = 1320.0;
    pub const CONTROLS_CENTER_FRACTION: f32 = 0.45;
    pub const CONTROLS_TOP_INSET: f32 = 60.0;
    pub const CONTROLS_BOTTOM_INSET: f32 = 10.0;

    /// Portal geometry (left edge of the viewport)
    pub const PORTAL_MARGIN: f32 = 10.0;
    pub const PORTAL_CANVAS_WIDTH: f32 = 45.0;
    pub const PORTAL_HALF_HEIGHT: f32 = 50.0;
    pub const ENTRANCE_INSET: f32 = 10.0;
    /// Gap between the portal canvas and the entrance plane
    pub const ENTRANCE_GAP: f32 = 20.0;
    /// Horizontal depth of the entrance trigger zone
    pub const ENTRANCE_DEPTH: f32 = 20.0;
    /// Right edge of the arrival window
    pub const ARRIVAL_MAX_X: f32 = 35.0;

    /// Suction forces (pixels per tick)
    pub const SUCTION_BASE_FORCE: f32 = 2.0;
    pub const SUCTION_HEAD_BOOST: f32 = 1.5;
    pub const GENTLE_PULL: f32 = 0.1;
    pub const PULL_DEAD_ZONE: f32 = 80.0;

    /// Deferred work, in ticks at 60 Hz
    pub const CHAIN_STAGGER_TICKS: u64 = 9; // 150 ms
    pub const ABSORB_DELAY_TICKS: u64 = 3; // 50 ms
    pub const SUBMIT_DELAY_TICKS: u64 = 30; // 500 ms
    pub const HEAD_OPEN_STAGGER_TICKS: u64 = 60; // 1 s
    pub const ISOLATED_OPEN_STAGGER_TICKS: u64 = 12; // 200 ms
    /// Longest configurable delay (10 minutes)
    pub const MAX_DELAY_TICKS: u64 = 36_000;

    /// Drag release
    pub const MAX_RELEASE_SPEED: f32 = 15.0;
    pub const POINTER_HISTORY_MS: f64 = 100.0;
    pub const RELEASE_FRAME_MS: f32 = 16.0;
    /// Bisection steps when a drag target is blocked
    pub const DRAG_SEARCH_STEPS: usize = 20;

    /// Launch point offsets from the bottom-right corner
    pub const LAUNCH_INSET_X: f32 = 10.0;
    pub const LAUNCH_INSET_Y: f32 = 55.0;
}

/// Unit vector from `from` toward `to` plus the distance, or `None` when coincident
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<(Vec2, f32)> {
    let delta = to - from;
    let distance = delta.length();
    if distance > 0.0 && distance.is_finite() {
        Some((delta / distance, distance))
    } else {
        None
    }
}

/// Zero out any axis whose magnitude is below `threshold`
#[inline]
pub fn snap_to_rest(vel: Vec2, threshold: f32) -> Vec2 {
    Vec2::new(
        if vel.x.abs() < threshold { 0.0 } else { vel.x },
        if vel.y.abs() < threshold { 0.0 } else { vel.y },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to() {
        let (dir, dist) = direction_to(Vec2::ZERO, Vec2::new(3.0, 4.0)).unwrap();
        assert!((dist - 5.0).abs() < 1e-6);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!(direction_to(Vec2::ONE, Vec2::ONE).is_none());
    }

    #[test]
    fn test_snap_to_rest_per_axis() {
        let v = snap_to_rest(Vec2::new(0.05, -3.0), consts::REST_SPEED);
        assert_eq!(v.x, 0.0);
        assert_eq!(v.y, -3.0);
        let v = snap_to_rest(Vec2::new(-0.1, 0.099), consts::REST_SPEED);
        assert_eq!(v.x, -0.1);
        assert_eq!(v.y, 0.0);
    }
}
