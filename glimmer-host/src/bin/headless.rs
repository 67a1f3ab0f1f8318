//! Headless driver: runs the engine against a scripted pointer and prints
//! snapshots as JSON lines.
//!
//! ```text
//! glimmer-headless --config glimmer.toml --frames 1200 --every 60
//! RUST_LOG=glimmer_core=debug glimmer-headless --store memory
//! ```

use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use glimmer_core::clock::SystemClock;
use glimmer_core::config::GlimmerConfig;
use glimmer_core::persistence::{self, KeyValueStore, MemoryStore};
use glimmer_core::snapshot::FrameSnapshot;
use glimmer_core::types::Vec2;
use glimmer_host::hooks::{ManualScheduler, RecordingInput, RenderSink};
use glimmer_host::{Engine, EngineServices, InputEvent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Print every Nth snapshot
    #[arg(short, long, default_value_t = 30)]
    every: u64,

    /// Storage backend override (sqlite, json, memory)
    #[arg(long)]
    store: Option<String>,

    /// Surface width
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Surface height
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Emit structured JSON logs
    #[arg(long)]
    json_logs: bool,
}

/// Prints every `every`-th frame to stdout.
struct StdoutSink {
    every: u64,
}

impl RenderSink for StdoutSink {
    fn present(&mut self, snapshot: &FrameSnapshot) {
        if self.every == 0 || snapshot.frame % self.every != 0 {
            return;
        }
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!(error = %e, "Failed to encode snapshot"),
        }
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_store(config: &GlimmerConfig) -> Box<dyn KeyValueStore> {
    match persistence::open_store(&config.persistence) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %e, "Storage unavailable; memory will not persist");
            Box::new(MemoryStore::new())
        }
    }
}

/// Where the scripted pointer is on `frame`, if it is over the surface.
fn pointer_at(frame: u64, width: f32, height: f32) -> Option<Vec2> {
    // Present for 8 s, away for 2 s.
    if frame % 600 >= 480 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let t = frame as f32 / 60.0;
    let center = Vec2::new(width * 0.5, height * 0.5);
    let reach = Vec2::new(width * 0.3, height * 0.25);
    Some(center + Vec2::new((t * 0.4).cos(), (t * 0.8).sin()) * reach)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GlimmerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GlimmerConfig::default(),
    };
    if let Some(backend) = &args.store {
        config.persistence.backend.clone_from(backend);
    }

    init_logging(&config.general.log_level, args.json_logs);

    let scheduler = ManualScheduler::new();
    let services = EngineServices {
        store: open_store(&config),
        clock: Rc::new(SystemClock),
        scheduler: Box::new(scheduler.clone()),
        input: Box::new(RecordingInput::new()),
        sink: Box::new(StdoutSink { every: args.every }),
    };
    let mut engine = Engine::new(config, args.width, args.height, services)
        .context("creating engine")?;

    engine.start();
    let origin = Instant::now();
    let frame_len = Duration::from_micros(16_667);

    for frame in 0..args.frames {
        match pointer_at(frame, args.width, args.height) {
            Some(p) => {
                engine.handle_input(InputEvent::PointerMove { position: p });
                if frame % 240 == 120 {
                    engine.handle_input(InputEvent::PointerDown { position: p });
                }
            }
            None => {
                engine.handle_input(InputEvent::PointerLeave);
            }
        }

        if !scheduler.fire() {
            warn!(frame, state = ?engine.state(), "No frame requested; stopping");
            break;
        }
        #[allow(clippy::cast_possible_truncation)]
        let at = origin + frame_len * (frame as u32);
        engine.on_frame(at);
    }

    let stats = engine.creature_stats();
    engine.destroy();
    info!(
        trust = stats.trust,
        mood = %stats.mood,
        interactions = stats.interactions,
        feeding_spots = stats.feeding_spots,
        "Session finished"
    );
    println!("{}", serde_json::to_string(&stats)?);
    Ok(())
}
