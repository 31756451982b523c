//! Portal suction geometry and forces
//!
//! The portal sits on the left edge, vertically centred. Three regions
//! matter:
//! - anchor: the point sucked nodes are driven toward
//! - arrival window: reaching it means the node is absorbed
//! - entrance zone: a free node heading into it starts a suction chain

use glam::Vec2;

use super::node::{Rect, Viewport};
use crate::direction_to;
use crate::tuning::SuctionTuning;

/// Portal regions for the current viewport (recomputed per call)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portal {
    pub anchor: Vec2,
    pub arrival: Rect,
    pub entrance: Rect,
}

impl Portal {
    pub fn new(viewport: Viewport, tuning: &SuctionTuning) -> Self {
        let mid = viewport.height / 2.0;
        let band_top = mid - tuning.portal_half_height + tuning.entrance_inset;
        let band_bottom = mid + tuning.portal_half_height - tuning.entrance_inset;
        let portal_right = tuning.portal_margin + tuning.portal_width + tuning.entrance_gap;

        Self {
            anchor: Vec2::new(tuning.portal_margin + tuning.portal_width / 2.0, mid),
            arrival: Rect::new(tuning.portal_margin, band_top, tuning.arrival_max_x, band_bottom),
            entrance: Rect::new(
                portal_right - tuning.entrance_depth,
                band_top,
                portal_right,
                band_bottom,
            ),
        }
    }

    /// Node centre is inside the arrival window
    #[inline]
    pub fn has_arrived(&self, pos: Vec2) -> bool {
        self.arrival.contains(pos)
    }

    /// Node's leading (left) edge is inside the entrance zone
    #[inline]
    pub fn at_entrance(&self, pos: Vec2, radius: f32) -> bool {
        self.entrance.contains(Vec2::new(pos.x - radius, pos.y))
    }

    /// Override velocity for a node being sucked in
    pub fn suction_velocity(&self, pos: Vec2, force: f32) -> Option<Vec2> {
        direction_to(pos, self.anchor).map(|(dir, _)| dir * force)
    }

    /// Additive pull on a free node while the portal is open. Zero inside the
    /// dead zone.
    pub fn gentle_pull(&self, pos: Vec2, tuning: &SuctionTuning) -> Vec2 {
        match direction_to(pos, self.anchor) {
            Some((dir, distance)) if distance > tuning.pull_dead_zone => dir * tuning.gentle_pull,
            _ => Vec2::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal() -> (Portal, SuctionTuning) {
        let tuning = SuctionTuning::default();
        (Portal::new(Viewport::new(1280.0, 720.0), &tuning), tuning)
    }

    #[test]
    fn test_regions() {
        let (p, _) = portal();
        assert_eq!(p.anchor, Vec2::new(32.5, 360.0));
        assert_eq!(p.arrival, Rect::new(10.0, 320.0, 35.0, 400.0));
        assert_eq!(p.entrance, Rect::new(55.0, 320.0, 75.0, 400.0));
        // The anchor lies inside the arrival window so sucked nodes can land
        assert!(p.has_arrived(p.anchor));
    }

    #[test]
    fn test_at_entrance_uses_leading_edge() {
        let (p, _) = portal();
        assert!(p.at_entrance(Vec2::new(100.0, 360.0), 30.0));
        assert!(!p.at_entrance(Vec2::new(110.0, 360.0), 30.0));
        assert!(!p.at_entrance(Vec2::new(100.0, 300.0), 30.0));
    }

    #[test]
    fn test_suction_velocity_points_at_anchor() {
        let (p, _) = portal();
        let v = p.suction_velocity(Vec2::new(332.5, 360.0), 3.5).unwrap();
        assert!((v.x + 3.5).abs() < 1e-5);
        assert!(v.y.abs() < 1e-5);
        assert!(p.suction_velocity(p.anchor, 3.5).is_none());
    }

    #[test]
    fn test_gentle_pull_dead_zone() {
        let (p, tuning) = portal();
        assert_eq!(p.gentle_pull(p.anchor + Vec2::new(50.0, 0.0), &tuning), Vec2::ZERO);
        let pull = p.gentle_pull(Vec2::new(600.0, 360.0), &tuning);
        assert!((pull.length() - 0.1).abs() < 1e-6);
        assert!(pull.x < 0.0);
    }
}
