//! Halo studio: exercises the context pool against real wgpu contexts.
//!
//! Simulates a short page session: a shared background, a navigation
//! component that owns three spinning beacons, then navigation away and
//! full teardown. Runs headless; every context renders offscreen.

use std::f32::consts::TAU;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use halo_engine::coords::Viewport;
use halo_engine::device::{DrawingSurface, WgpuContextFactory};
use halo_engine::graph::{Mesh, PerspectiveCamera, RenderGraph};
use halo_engine::logging::{LoggingConfig, init_logging};
use halo_engine::paint::Color;
use halo_engine::pool::{ContextManager, PoolConfig, RenderContextEntry};
use halo_engine::schedule::FrameQueue;
use halo_engine::time::FrameClock;
use winit::dpi::PhysicalSize;

const FRAME: Duration = Duration::from_millis(16);
const NAV_BEACONS: usize = 3;
const NIGHT_SKY: u32 = 0x0b1026;

/// Per-beacon state kept in the entry's auxiliary slot.
struct Orbit {
    angle: f32,
    speed: f32,
}

fn orbit(entry: &mut RenderContextEntry) -> Result<()> {
    let Some(orbit) = entry.auxiliary_mut::<Orbit>() else {
        return Ok(());
    };
    orbit.angle = (orbit.angle + orbit.speed) % TAU;
    let angle = orbit.angle;

    entry.graph.camera.position = [3.0 * angle.sin(), 0.0, 3.0 * angle.cos()];
    Ok(())
}

fn run_frames(queue: &FrameQueue, clock: &mut FrameClock, frames: usize) {
    for _ in 0..frames {
        let frame = clock.tick();
        queue.run_frame(frame.since_start);
        thread::sleep(FRAME);
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut config = PoolConfig::default();
    config.background_profile.clear_color = Color::from_hex(NIGHT_SKY, 1.0);
    if std::env::var_os("HALO_LOW_POWER").is_some() {
        config.background_profile.power_preference = wgpu::PowerPreference::LowPower;
    }

    let queue = Rc::new(FrameQueue::new());
    let mut manager = ContextManager::new(config, WgpuContextFactory::new(), queue.clone());
    let mut clock = FrameClock::new();

    // ── background ────────────────────────────────────────────────────────
    let viewport = Viewport::new(1280.0, 720.0);
    let camera = PerspectiveCamera::new(60.0, viewport.aspect(), 0.1, 1000.0);
    let mut graph = RenderGraph::empty(camera);
    graph.scene.add(Mesh::new("starfield"));

    match manager.init_background(
        DrawingSurface::new("background", viewport.physical_size(1.0)),
        graph,
        |entry| {
            entry.graph.camera.position[2] -= 0.01;
            Ok(())
        },
    ) {
        Ok(_) => log::info!("background ready"),
        Err(err) => log::warn!("running without background: {err}"),
    }

    // ── nav component ─────────────────────────────────────────────────────
    let granted = manager.register_component("nav", NAV_BEACONS);
    for i in 0..granted {
        let id = format!("nav-{i}");
        let surface = DrawingSurface::new(id.clone(), PhysicalSize::new(96, 96));
        match manager.create_beacon(&id, Some(surface), 96, orbit, "nav") {
            Ok(entry) => entry.borrow_mut().set_auxiliary(Orbit {
                angle: i as f32 * TAU / NAV_BEACONS as f32,
                speed: 0.05,
            }),
            Err(err) if err.is_denied() => log::info!("beacon {id} denied: {err}"),
            Err(err) => log::warn!("beacon {id} failed: {err}"),
        }
    }

    run_frames(&queue, &mut clock, 60);
    log::info!("stats: {}", manager.stats());

    manager.resize_background(Viewport::new(1600.0, 900.0));
    run_frames(&queue, &mut clock, 30);

    // Navigating away unmounts the nav component.
    let disposed = manager.dispose_component_beacons("nav");
    log::info!("nav unmounted, {disposed} beacons released");
    run_frames(&queue, &mut clock, 10);
    log::info!("stats: {}", manager.stats());

    manager.dispose_all();
    log::info!("{} frames run, {} requests left", queue.frames_run(), queue.pending());
    Ok(())
}
