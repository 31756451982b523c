//! Fixed UI obstacles
//!
//! Every obstacle is a rectangle derived from the live viewport. Nothing is
//! cached: callers pass the viewport on each call and the bounds follow it.

use glam::Vec2;

use super::node::{Rect, Viewport};
use crate::consts::*;

/// Outcome of an obstacle test: updated position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    pub pos: Vec2,
    pub vel: Vec2,
    pub hit: bool,
}

impl Bounce {
    #[inline]
    fn miss(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            hit: false,
        }
    }
}

/// Expected-results bar across the top of the screen
pub fn top_bar(viewport: Viewport) -> Rect {
    Rect::new(0.0, 0.0, viewport.width, TOP_BAR_HEIGHT)
}

/// Launcher square hanging off the bottom-right corner
pub fn right_square(viewport: Viewport) -> Rect {
    let left = viewport.width - RIGHT_SQUARE_INSET_X;
    let top = viewport.height - RIGHT_SQUARE_INSET_Y;
    Rect::new(
        left,
        top,
        left + RIGHT_SQUARE_WIDTH,
        top + RIGHT_SQUARE_HEIGHT,
    )
}

/// Bottom-right corner box kept clear of dragged nodes
pub fn drag_corner(viewport: Viewport) -> Rect {
    Rect::new(
        viewport.width - DRAG_CORNER_SIZE,
        viewport.height - DRAG_CORNER_SIZE,
        viewport.width,
        viewport.height,
    )
}

/// Controls strip along the bottom centre
pub fn controls_strip(viewport: Viewport) -> Rect {
    let left = viewport.width * CONTROLS_CENTER_FRACTION - CONTROLS_WIDTH / 2.0;
    Rect::new(
        left,
        viewport.height - CONTROLS_TOP_INSET,
        left + CONTROLS_WIDTH,
        viewport.height - CONTROLS_BOTTOM_INSET,
    )
}

/// Push a node moving upward back below the top bar
pub fn bounce_top_bar(pos: Vec2, vel: Vec2, radius: f32, viewport: Viewport, loss: f32) -> Bounce {
    let bar_bottom = top_bar(viewport).bottom();
    if pos.y - radius <= bar_bottom && vel.y < 0.0 {
        return Bounce {
            pos: Vec2::new(pos.x, bar_bottom + radius),
            vel: Vec2::new(vel.x, -vel.y * loss),
            hit: true,
        };
    }
    Bounce::miss(pos, vel)
}

/// Face-by-face bounce off the bottom-right square
///
/// A face only reacts if `prev` (the position before integration) was still
/// outside it, so a node that is already past a face is not yanked back.
/// Corner approaches can trigger two faces in the same call.
pub fn bounce_right_square(
    prev: Vec2,
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    viewport: Viewport,
    loss: f32,
) -> Bounce {
    let rect = right_square(viewport);
    if !rect.overlaps_circle_bounds(pos, radius) {
        return Bounce::miss(pos, vel);
    }

    let mut out = Bounce::miss(pos, vel);
    if out.pos.x + radius >= rect.left() && prev.x + radius < rect.left() {
        out.vel.x = -out.vel.x.abs() * loss;
        out.pos.x = rect.left() - radius;
        out.hit = true;
    }
    if out.pos.x - radius <= rect.right() && prev.x - radius > rect.right() {
        out.vel.x = out.vel.x.abs() * loss;
        out.pos.x = rect.right() + radius;
        out.hit = true;
    }
    if out.pos.y + radius >= rect.top() && prev.y + radius < rect.top() {
        out.vel.y = -out.vel.y.abs() * loss;
        out.pos.y = rect.top() - radius;
        out.hit = true;
    }
    if out.pos.y - radius <= rect.bottom() && prev.y - radius > rect.bottom() {
        out.vel.y = out.vel.y.abs() * loss;
        out.pos.y = rect.bottom() + radius;
        out.hit = true;
    }
    out
}

/// Nearest-face bounce off the controls strip
///
/// Only the face with the smallest penetration reacts, and only when the
/// node is moving into it.
pub fn bounce_controls_strip(
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    viewport: Viewport,
    loss: f32,
) -> Bounce {
    let rect = controls_strip(viewport);
    if !rect.overlaps_circle_bounds(pos, radius) {
        return Bounce::miss(pos, vel);
    }

    let to_left = (pos.x + radius - rect.left()).abs();
    let to_right = (pos.x - radius - rect.right()).abs();
    let to_top = (pos.y + radius - rect.top()).abs();
    let to_bottom = (pos.y - radius - rect.bottom()).abs();
    let nearest = to_left.min(to_right).min(to_top).min(to_bottom);

    let mut out = Bounce::miss(pos, vel);
    if nearest == to_left && vel.x > 0.0 {
        out.vel.x = -vel.x.abs() * loss;
        out.pos.x = rect.left() - radius;
        out.hit = true;
    } else if nearest == to_right && vel.x < 0.0 {
        out.vel.x = vel.x.abs() * loss;
        out.pos.x = rect.right() + radius;
        out.hit = true;
    } else if nearest == to_top && vel.y > 0.0 {
        out.vel.y = -vel.y.abs() * loss;
        out.pos.y = rect.top() - radius;
        out.hit = true;
    } else if nearest == to_bottom && vel.y < 0.0 {
        out.vel.y = vel.y.abs() * loss;
        out.pos.y = rect.bottom() + radius;
        out.hit = true;
    }
    out
}

/// Reflect and clamp against the outer viewport edges
pub fn bounce_walls(pos: Vec2, vel: Vec2, radius: f32, viewport: Viewport, loss: f32) -> Bounce {
    let mut out = Bounce::miss(pos, vel);

    if pos.x <= radius || pos.x >= viewport.width - radius {
        out.vel.x = -vel.x * loss;
        out.pos.x = if pos.x <= radius {
            radius
        } else {
            viewport.width - radius
        };
        out.hit = true;
    }

    if pos.y <= radius || pos.y >= viewport.height - radius {
        out.vel.y = -vel.y * loss;
        out.pos.y = if pos.y <= radius {
            radius
        } else {
            viewport.height - radius
        };
        out.hit = true;
    }

    out
}
