//! Platform abstraction layer
//!
//! Handles browser/native differences for the frame loop:
//! - Browser: one tick per `requestAnimationFrame`
//! - Native: fixed-rate timer

#[cfg(not(target_arch = "wasm32"))]
pub mod native;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use native::FixedRateTicker;
#[cfg(target_arch = "wasm32")]
pub use web::AnimationFrameTicker;

/// What the frame callback wants next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Frame callback; receives a timestamp in milliseconds
pub type FrameFn = Box<dyn FnMut(f64) -> TickControl>;

/// Something that calls a frame function once per tick until stopped
pub trait TickSource {
    /// Start delivering ticks. Native sources run the loop before
    /// returning; browser sources return immediately and tick from the
    /// event loop.
    fn start(&mut self, frame: FrameFn);

    /// Stop scheduling further ticks (the view was torn down)
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
