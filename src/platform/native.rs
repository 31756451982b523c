//! Fixed-rate tick source for native targets

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use super::{FrameFn, TickControl, TickSource};

/// Calls the frame function every `interval`, sleeping off the remainder
#[derive(Debug, Clone)]
pub struct FixedRateTicker {
    interval: Duration,
    running: Rc<Cell<bool>>,
    /// Upper bound on delivered ticks (`None` = until stopped)
    max_ticks: Option<u64>,
}

impl FixedRateTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Rc::new(Cell::new(false)),
            max_ticks: None,
        }
    }

    /// Ticker at `hz` ticks per second
    pub fn from_hz(hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / f64::from(hz.max(1))))
    }

    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Shared flag; clearing it from inside a frame stops the loop
    pub fn stop_handle(&self) -> Rc<Cell<bool>> {
        self.running.clone()
    }
}

impl TickSource for FixedRateTicker {
    fn start(&mut self, mut frame: FrameFn) {
        self.running.set(true);
        let started = Instant::now();
        let mut delivered = 0u64;

        while self.running.get() {
            if self.max_ticks.is_some_and(|max| delivered >= max) {
                log::debug!("ticker reached {} tick(s)", delivered);
                break;
            }
            let frame_start = Instant::now();
            let now_ms = started.elapsed().as_secs_f64() * 1000.0;
            delivered += 1;
            if frame(now_ms) == TickControl::Stop {
                break;
            }
            if let Some(rest) = self.interval.checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        self.running.set(false);
    }

    fn stop(&mut self) {
        self.running.set(false);
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}
