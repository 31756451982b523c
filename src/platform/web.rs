//! Browser glue: animation-frame tick source and JSON exports

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{FrameFn, TickControl, TickSource};
use crate::launcher::Launcher;
use crate::links::LinkGraph;
use crate::sim::{CollisionEngine, FrameScheduler, Node, NodeId, Viewport};
use crate::tuning::Tuning;

/// One tick per `requestAnimationFrame`
#[derive(Debug, Clone, Default)]
pub struct AnimationFrameTicker {
    running: Rc<Cell<bool>>,
}

impl AnimationFrameTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickSource for AnimationFrameTicker {
    fn start(&mut self, frame: FrameFn) {
        self.running.set(true);
        request_frame(Rc::new(RefCell::new(frame)), self.running.clone());
    }

    fn stop(&mut self) {
        self.running.set(false);
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}

fn request_frame(frame: Rc<RefCell<FrameFn>>, running: Rc<Cell<bool>>) {
    let Some(window) = web_sys::window() else {
        log::warn!("no window; animation frames unavailable");
        running.set(false);
        return;
    };
    let scheduled = running.clone();
    let closure = Closure::once(move |time: f64| {
        if !running.get() {
            return;
        }
        let control = (&mut *frame.borrow_mut())(time);
        if control == TickControl::Stop {
            running.set(false);
            return;
        }
        request_frame(frame, running);
    });
    if let Err(err) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
        log::warn!("requestAnimationFrame failed: {:?}", err);
        scheduled.set(false);
        return;
    }
    closure.forget();
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_tuning(tuning_json: Option<String>) -> Result<Tuning, JsValue> {
    match tuning_json {
        Some(json) => Tuning::from_json(&json).map_err(to_js),
        None => Ok(Tuning::default()),
    }
}

/// One collision pass over a JSON node list
///
/// Stateless entry point for callers that run their own frame loop.
#[wasm_bindgen]
pub fn update_physics_json(
    nodes_json: &str,
    excluded_json: &str,
    width: f32,
    height: f32,
    tuning_json: Option<String>,
) -> Result<String, JsValue> {
    let tuning = parse_tuning(tuning_json)?;
    let nodes: Vec<Node> = serde_json::from_str(nodes_json).map_err(to_js)?;
    let excluded: HashSet<NodeId> = serde_json::from_str(excluded_json).map_err(to_js)?;
    let engine = CollisionEngine::new(tuning.physics);
    let updated = engine.update_physics(&nodes, &excluded, Viewport::new(width, height));
    serde_json::to_string(&updated).map_err(to_js)
}

/// Stateful handle owning the scheduler and link graph
#[wasm_bindgen]
pub struct WebPhysics {
    scheduler: FrameScheduler,
    links: LinkGraph,
    launcher: Launcher,
    viewport: Viewport,
}

#[wasm_bindgen]
impl WebPhysics {
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: f32,
        height: f32,
        seed: u64,
        tuning_json: Option<String>,
    ) -> Result<WebPhysics, JsValue> {
        let tuning = parse_tuning(tuning_json)?;
        Ok(Self {
            scheduler: FrameScheduler::new(tuning),
            links: LinkGraph::new(),
            launcher: Launcher::new(seed),
            viewport: Viewport::new(width, height),
        })
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Launch a node; returns its id
    pub fn launch(&mut self, address: String, value: String) -> u64 {
        let node = self.launcher.launch(self.viewport, &address, &value);
        let id = node.id;
        self.scheduler.add_node(node);
        id
    }

    pub fn fire_projectile(&mut self) -> u64 {
        let node = self.launcher.fire_projectile(self.viewport);
        let id = node.id;
        self.scheduler.add_node(node);
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        self.links.disconnect_all(id);
        self.scheduler.remove_node(id).is_some()
    }

    pub fn connect(&mut self, from: u64, to: u64) -> bool {
        self.links.connect(from, to)
    }

    pub fn open_portal(&mut self) {
        self.scheduler.open_portal(&self.links);
    }

    pub fn close_portal(&mut self) {
        self.scheduler.close_portal();
    }

    pub fn begin_drag(&mut self, id: u64, x: f32, y: f32, time_ms: f64) -> bool {
        self.scheduler.begin_drag(id, Vec2::new(x, y), time_ms)
    }

    pub fn drag_to(&mut self, x: f32, y: f32, time_ms: f64) {
        self.scheduler.drag_to(Vec2::new(x, y), self.viewport, time_ms);
    }

    pub fn end_drag(&mut self) {
        self.scheduler.end_drag();
    }

    /// Advance one frame; returns the events it produced as JSON
    pub fn tick(&mut self) -> Result<String, JsValue> {
        self.scheduler.tick(self.viewport, &self.links);
        self.links.prune_absorbed(self.scheduler.absorbed());
        let events = self.scheduler.drain_events();
        serde_json::to_string(&events).map_err(to_js)
    }

    pub fn nodes_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.scheduler.nodes()).map_err(to_js)
    }
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialised".into());
    }
    log::info!("Galist physics (wasm) ready");
}
