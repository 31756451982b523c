//! Galist Physics headless demo
//!
//! Launches a handful of nodes, links them into a list, opens the portal
//! and ticks until the list has been absorbed and submitted.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::Duration;

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use galist_physics::consts::TICKS_PER_SECOND;
    use galist_physics::platform::{FixedRateTicker, TickControl, TickSource};
    use galist_physics::sim::{FrameScheduler, SimEvent, Viewport};
    use galist_physics::tuning::ImpulseOrdering;
    use galist_physics::{Launcher, LinkGraph, Tuning};

    #[derive(Parser, Debug)]
    #[command(about = "Run launched, linked nodes through the portal headlessly", version)]
    struct Args {
        /// Launcher seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Number of nodes to launch
        #[arg(long, default_value_t = 4)]
        nodes: usize,
        #[arg(long, default_value_t = 1280.0)]
        width: f32,
        #[arg(long, default_value_t = 720.0)]
        height: f32,
        /// Ticks between launches
        #[arg(long, default_value_t = 20)]
        launch_every: u64,
        /// Tick at which the portal opens (after the last launch settles)
        #[arg(long, default_value_t = 180)]
        open_at: u64,
        /// Give up after this many ticks
        #[arg(long, default_value_t = 3600)]
        max_ticks: u64,
        /// Tuning JSON file
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Override impulse ordering (staged | sequential)
        #[arg(long)]
        ordering: Option<String>,
        /// Tick as fast as possible instead of at 60 Hz
        #[arg(long)]
        fast: bool,
    }

    struct Demo {
        scheduler: FrameScheduler,
        links: LinkGraph,
        launcher: Launcher,
        viewport: Viewport,
        to_launch: usize,
        launch_every: u64,
        open_at: u64,
        submitted: Option<Vec<u64>>,
    }

    impl Demo {
        fn frame(&mut self) -> TickControl {
            let tick = self.scheduler.tick_count();

            if self.to_launch > 0 && tick % self.launch_every.max(1) == 0 {
                let index = self.scheduler.nodes().len() + self.scheduler.absorbed().len();
                let node = self.launcher.launch(
                    self.viewport,
                    &format!("0x{:02x}", index * 8),
                    &index.to_string(),
                );
                let id = node.id;
                // Link each new node after the previous one
                if let Some(prev) = self.scheduler.nodes().last().map(|n| n.id) {
                    self.links.connect(prev, id);
                }
                self.scheduler.add_node(node);
                self.to_launch -= 1;
            }

            if tick == self.open_at {
                self.scheduler.open_portal(&self.links);
            }

            self.scheduler.tick(self.viewport, &self.links);
            self.links.prune_absorbed(self.scheduler.absorbed());

            for event in self.scheduler.drain_events() {
                match event {
                    SimEvent::SuctionStarted { id } => {
                        log::info!("tick {}: node {} pulled in", tick, id)
                    }
                    SimEvent::Absorbed { id, order_index } => {
                        log::info!("tick {}: node {} absorbed as #{}", tick, id, order_index)
                    }
                    SimEvent::SubmissionReady { entry_order } => {
                        log::info!("tick {}: submission {:?}", tick, entry_order);
                        self.submitted = Some(entry_order);
                        return TickControl::Stop;
                    }
                }
            }
            TickControl::Continue
        }
    }

    fn load_tuning(args: &Args) -> Result<Tuning> {
        let mut tuning = match &args.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading tuning file {}", path.display()))?;
                Tuning::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
            }
            None => Tuning::default(),
        };
        if let Some(name) = &args.ordering {
            let Some(ordering) = ImpulseOrdering::from_str(name) else {
                bail!("unknown impulse ordering '{}' (expected staged or sequential)", name);
            };
            tuning.physics.impulse_ordering = ordering;
        }
        Ok(tuning)
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();
        let tuning = load_tuning(&args)?;

        log::info!(
            "Galist physics demo: {} node(s), {}x{}, ordering {}",
            args.nodes,
            args.width,
            args.height,
            tuning.physics.impulse_ordering.as_str()
        );

        let demo = Rc::new(RefCell::new(Demo {
            scheduler: FrameScheduler::new(tuning),
            links: LinkGraph::new(),
            launcher: Launcher::new(args.seed),
            viewport: Viewport::new(args.width, args.height),
            to_launch: args.nodes,
            launch_every: args.launch_every,
            open_at: args.open_at,
            submitted: None,
        }));

        let mut ticker = if args.fast {
            FixedRateTicker::new(Duration::ZERO)
        } else {
            FixedRateTicker::from_hz(TICKS_PER_SECOND)
        }
        .with_max_ticks(args.max_ticks);

        let frame_demo = demo.clone();
        ticker.start(Box::new(move |_now_ms| frame_demo.borrow_mut().frame()));

        let demo = demo.borrow();
        match &demo.submitted {
            Some(order) => {
                println!("Submitted after {} ticks: {:?}", demo.scheduler.tick_count(), order);
                Ok(())
            }
            None => bail!(
                "no submission after {} ticks ({} node(s) left)",
                demo.scheduler.tick_count(),
                demo.scheduler.nodes().len()
            ),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    demo::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_start in the library, this is just to satisfy the compiler
}
