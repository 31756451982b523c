//! Per-frame simulation module
//!
//! Everything that moves nodes lives here. This module must stay pure:
//! - Viewport passed in, never read from a global
//! - Delays counted in ticks, never wall-clock timers
//! - Stable iteration order (node list order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod deferred;
pub mod drag;
pub mod node;
pub mod obstacle;
pub mod scheduler;
pub mod suction;
pub mod topology;

pub use collision::{CollisionEngine, ContactResponse, resolve_contact};
pub use deferred::{Deferred, DeferredQueue, SimEvent};
pub use drag::{DragState, find_valid_position, is_valid_drop};
pub use node::{Node, NodeId, NodePayload, Rect, Viewport};
pub use obstacle::{
    Bounce, bounce_controls_strip, bounce_right_square, bounce_top_bar, bounce_walls,
    controls_strip, drag_corner, right_square, top_bar,
};
pub use scheduler::FrameScheduler;
pub use suction::Portal;
pub use topology::{Topology, Unlinked};
