use std::rc::Rc;

use anyhow::Result;

use crate::coords::Viewport;
use crate::device::{ContextFactory, DrawingSurface};
use crate::graph::RenderGraph;
use crate::schedule::FrameScheduler;

use super::{
    AllocationError, BackgroundSlot, BackgroundState, BeaconPool, EntryRef, Ledger, PoolConfig,
    PoolStats, RenderContextEntry,
};

/// Owner of every rendering context in the application.
///
/// Built once at the composition root and passed by reference to whatever
/// needs contexts. Dropping it disposes everything it still holds.
pub struct ContextManager {
    factory: Box<dyn ContextFactory>,
    background: BackgroundSlot,
    beacons: BeaconPool,
}

impl ContextManager {
    pub fn new(
        config: PoolConfig,
        factory: impl ContextFactory + 'static,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Self {
        let PoolConfig {
            max_beacons,
            beacon_fps,
            background_profile,
            beacon_profile,
        } = config;

        let beacons =
            BeaconPool::new(Rc::clone(&scheduler), beacon_profile, max_beacons, beacon_fps);
        log::info!("context manager initialized with max {} beacons", beacons.max_beacons());

        Self {
            factory: Box::new(factory),
            background: BackgroundSlot::new(scheduler, background_profile),
            beacons,
        }
    }

    // ── background ────────────────────────────────────────────────────────

    /// See [`BackgroundSlot::init`].
    pub fn init_background(
        &mut self,
        surface: DrawingSurface,
        graph: RenderGraph,
        per_frame: impl FnMut(&mut RenderContextEntry) -> Result<()> + 'static,
    ) -> Result<EntryRef, AllocationError> {
        self.background.init(self.factory.as_mut(), surface, graph, per_frame)
    }

    pub fn resize_background(&self, viewport: Viewport) -> bool {
        self.background.resize(viewport)
    }

    pub fn dispose_background(&mut self) -> bool {
        self.background.dispose()
    }

    pub fn background(&self) -> &BackgroundSlot {
        &self.background
    }

    pub fn background_state(&self) -> BackgroundState {
        self.background.state()
    }

    pub fn is_background_available(&self) -> bool {
        self.background.is_available()
    }

    pub fn has_background_renderer(&self) -> bool {
        self.background.is_available()
    }

    pub fn is_context_lost(&self) -> bool {
        self.background.is_context_lost()
    }

    // ── beacons ───────────────────────────────────────────────────────────

    /// See [`BeaconPool::register`].
    pub fn register_component(&mut self, component: &str, requested: usize) -> usize {
        self.beacons.register(component, requested)
    }

    /// See [`BeaconPool::create`].
    pub fn create_beacon(
        &mut self,
        id: &str,
        surface: Option<DrawingSurface>,
        size: u32,
        animate: impl FnMut(&mut RenderContextEntry) -> Result<()> + 'static,
        component: &str,
    ) -> Result<EntryRef, AllocationError> {
        self.beacons
            .create(self.factory.as_mut(), id, surface, size, animate, component)
    }

    pub fn get_beacon(&self, id: &str) -> Option<EntryRef> {
        self.beacons.get(id)
    }

    pub fn dispose_beacon(&mut self, id: &str) -> bool {
        self.beacons.dispose(id)
    }

    pub fn dispose_component_beacons(&mut self, component: &str) -> usize {
        self.beacons.dispose_component(component)
    }

    pub fn dispose_beacons_by_pattern(&mut self, pattern: &str) -> usize {
        self.beacons.dispose_matching(pattern)
    }

    pub fn set_max_beacons(&mut self, max: usize) -> usize {
        self.beacons.set_max_beacons(max)
    }

    pub fn max_beacons(&self) -> usize {
        self.beacons.max_beacons()
    }

    pub fn beacon_count(&self) -> usize {
        self.beacons.len()
    }

    pub fn available_slots(&self) -> usize {
        self.beacons.available_slots()
    }

    pub fn beacons(&self) -> &BeaconPool {
        &self.beacons
    }

    pub fn ledger(&self) -> &Ledger {
        self.beacons.ledger()
    }

    // ── whole pool ────────────────────────────────────────────────────────

    /// Disposes every beacon, then the background, and clears the ledger.
    pub fn dispose_all(&mut self) {
        log::info!("disposing all rendering contexts");
        self.beacons.dispose_all();
        self.background.dispose();
        log::info!("all rendering contexts disposed");
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            background_live: self.background.is_available(),
            beacon_count: self.beacons.len(),
            max_beacons: self.beacons.max_beacons(),
            beacon_ids: self.beacons.ids(),
            component_breakdown: self.beacons.ledger().breakdown(),
            context_lost: self.background.is_context_lost(),
        }
    }
}

impl Drop for ContextManager {
    fn drop(&mut self) {
        if !self.beacons.is_empty() || self.background.entry().is_some() {
            self.dispose_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    use anyhow::bail;
    use winit::dpi::PhysicalSize;

    use crate::device::{ContextEvent, ContextSignal};
    use crate::graph::{Mesh, PerspectiveCamera};
    use crate::pool::MAX_BEACONS;
    use crate::schedule::FrameQueue;
    use crate::testing::{CountingResource, FakeFactory};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn setup() -> (ContextManager, FakeFactory, Rc<FrameQueue>) {
        let queue = Rc::new(FrameQueue::new());
        let factory = FakeFactory::default();
        let manager =
            ContextManager::new(PoolConfig::default(), factory.clone(), queue.clone());
        (manager, factory, queue)
    }

    fn surface(label: &str) -> Option<DrawingSurface> {
        Some(DrawingSurface::new(label, PhysicalSize::new(64, 64)))
    }

    fn idle(_: &mut RenderContextEntry) -> Result<()> {
        Ok(())
    }

    fn beacon(m: &mut ContextManager, id: &str, component: &str) -> EntryRef {
        m.create_beacon(id, surface(id), 64, idle, component).unwrap()
    }

    fn bg_surface(label: &str) -> DrawingSurface {
        DrawingSurface::new(label, PhysicalSize::new(800, 600))
    }

    fn bg_graph() -> RenderGraph {
        RenderGraph::empty(PerspectiveCamera::new(60.0, 1.0, 0.1, 100.0))
    }

    // ── beacon admission ──────────────────────────────────────────────────

    #[test]
    fn live_count_never_exceeds_ceiling() {
        let (mut m, _, _) = setup();
        m.set_max_beacons(3);

        for i in 0..6 {
            let id = format!("b-{i}");
            let result = m.create_beacon(&id, surface(&id), 32, idle, "grid");
            if i < 3 {
                assert!(result.is_ok());
            } else {
                assert!(matches!(result, Err(AllocationError::CapacityExhausted { max: 3 })));
            }
            assert!(m.beacon_count() <= m.max_beacons());
        }
    }

    #[test]
    fn missing_surface_is_denied_without_side_effects() {
        let (mut m, factory, _) = setup();
        let err = m.create_beacon("b", None, 32, idle, "hero").unwrap_err();

        assert!(matches!(err, AllocationError::MissingSurface));
        assert!(err.is_denied());
        assert_eq!(factory.created(), 0);
        assert!(m.ledger().get("hero").is_none());
    }

    #[test]
    fn entry_debug_shows_label_and_release_state() {
        let (mut m, _, _) = setup();
        let entry = beacon(&mut m, "nav-1", "nav");
        assert_eq!(
            format!("{:?}", entry.borrow()),
            r#"RenderContextEntry { label: "nav-1", released: false }"#
        );
        m.dispose_beacon("nav-1");
        assert!(format!("{:?}", entry.borrow()).contains("released: true"));
    }

    #[test]
    fn context_creation_failure_is_reported_not_raised() {
        let (mut m, factory, queue) = setup();
        factory.fail_next();

        let err = m.create_beacon("b", surface("b"), 32, idle, "hero").unwrap_err();
        assert!(matches!(err, AllocationError::ContextCreationFailed(_)));
        assert!(!err.is_denied());
        assert_eq!(m.beacon_count(), 0);
        assert_eq!(queue.pending(), 0);
        assert!(m.ledger().owned_ids("hero").is_empty());
    }

    #[test]
    fn beacon_uses_beacon_profile_and_requested_size() {
        let (mut m, factory, _) = setup();
        m.create_beacon("b", surface("b"), 48, idle, "hero").unwrap();

        let ctx = factory.last();
        assert_eq!(ctx.size.get(), PhysicalSize::new(48, 48));
        let profile = ctx.profile.borrow();
        assert!(!profile.as_ref().unwrap().antialias);
    }

    #[test]
    fn empty_component_name_is_filed_under_unknown() {
        let (mut m, _, _) = setup();
        beacon(&mut m, "b", "");
        assert_eq!(m.ledger().owned_ids(crate::pool::UNKNOWN_COMPONENT), vec!["b"]);
    }

    #[test]
    fn same_id_replaces_the_live_beacon() {
        let (mut m, factory, _) = setup();
        let first = beacon(&mut m, "nav-1", "nav");
        let second = beacon(&mut m, "nav-1", "nav");

        assert!(!Rc::ptr_eq(&first, &second));
        assert!(first.borrow().is_released());
        assert_eq!(m.beacon_count(), 1);
        assert_eq!(m.beacons().ids(), vec!["nav-1"]);

        let old = factory.context(0);
        assert_eq!(old.disposed.get(), 1);
        assert_eq!(old.forced_loss.get(), 1);
        assert_eq!(m.ledger().owned_ids("nav"), vec!["nav-1"]);
    }

    #[test]
    fn replacement_at_capacity_is_refused_and_keeps_the_old_beacon() {
        let (mut m, _, _) = setup();
        m.set_max_beacons(1);
        let first = beacon(&mut m, "a", "c");

        let result = m.create_beacon("a", surface("a"), 32, idle, "c");
        assert!(matches!(result, Err(AllocationError::CapacityExhausted { max: 1 })));
        assert!(!first.borrow().is_released());
        assert!(Rc::ptr_eq(&first, &m.get_beacon("a").unwrap()));
    }

    // ── frame loops ───────────────────────────────────────────────────────

    #[test]
    fn beacon_loop_is_capped_at_thirty_fps() {
        let (mut m, factory, queue) = setup();
        beacon(&mut m, "b", "hero");

        for i in 0..4 {
            queue.run_frame(ms(i * 20));
        }
        assert_eq!(factory.last().renders.get(), 2);
    }

    #[test]
    fn broken_beacon_does_not_stop_its_neighbours() {
        let (mut m, factory, queue) = setup();
        let broken = m
            .create_beacon("broken", surface("broken"), 32, |_| bail!("bad animation"), "c")
            .unwrap();
        beacon(&mut m, "fine", "c");

        for i in 0..3 {
            queue.run_frame(ms(i * 40));
        }
        assert_eq!(factory.by_label("fine")[0].renders.get(), 3);
        assert_eq!(factory.by_label("broken")[0].renders.get(), 0);
        assert_eq!(broken.borrow().animation().unwrap().faults(), 3);
    }

    #[test]
    fn draw_failure_is_a_fault_not_a_stop() {
        let (mut m, factory, queue) = setup();
        let entry = beacon(&mut m, "b", "c");

        factory.last().fail_render.set(true);
        queue.run_frame(ms(0));
        factory.last().fail_render.set(false);
        queue.run_frame(ms(40));

        let handle = entry.borrow().animation().cloned().unwrap();
        assert_eq!(handle.faults(), 1);
        assert_eq!(handle.frames_rendered(), 1);
    }

    #[test]
    fn callback_mutates_the_entry_before_each_draw() {
        let (mut m, _, queue) = setup();
        let entry = m
            .create_beacon(
                "spinner",
                surface("spinner"),
                32,
                |entry| {
                    let angle = entry.auxiliary_mut::<f32>().map(|a| {
                        *a += 0.5;
                        *a
                    });
                    if angle.is_none() {
                        entry.set_auxiliary(0.0f32);
                    }
                    Ok(())
                },
                "hero",
            )
            .unwrap();

        for i in 0..3 {
            queue.run_frame(ms(i * 40));
        }
        assert_eq!(entry.borrow().auxiliary::<f32>(), Some(&1.0));
    }

    #[test]
    fn disposal_removes_the_pending_tick() {
        let (mut m, factory, queue) = setup();
        beacon(&mut m, "b", "c");
        assert_eq!(queue.pending(), 1);

        m.dispose_beacon("b");
        assert_eq!(queue.pending(), 0);
        queue.run_frame(ms(100));
        assert_eq!(factory.last().renders.get(), 0);
    }

    // ── disposal ──────────────────────────────────────────────────────────

    #[test]
    fn double_dispose_is_a_no_op() {
        let (mut m, factory, _) = setup();
        beacon(&mut m, "b", "c");

        assert!(m.dispose_beacon("b"));
        assert!(!m.dispose_beacon("b"));
        assert_eq!(factory.last().disposed.get(), 1);
    }

    #[test]
    fn dispose_releases_graph_resources_and_listeners() {
        let (mut m, _, _) = setup();
        let signal = ContextSignal::new();
        let geometry = CountingResource::default();
        let material = CountingResource::default();

        let entry = m
            .create_beacon(
                "b",
                Some(DrawingSurface::with_signal("b", PhysicalSize::new(32, 32), signal.clone())),
                32,
                idle,
                "c",
            )
            .unwrap();
        entry.borrow_mut().graph.scene.add(
            Mesh::new("core")
                .with_geometry(geometry.clone())
                .with_material(material.clone()),
        );
        assert_eq!(signal.listener_count(), 1);

        m.dispose_beacon("b");
        assert_eq!(geometry.releases(), 1);
        assert_eq!(material.releases(), 1);
        assert_eq!(signal.listener_count(), 0);
        assert!(entry.borrow().animation().unwrap().is_cancelled());
    }

    #[test]
    fn native_disposal_fault_still_clears_bookkeeping() {
        let (mut m, factory, _) = setup();
        beacon(&mut m, "b", "c");
        factory.last().fail_dispose.set(true);

        assert!(m.dispose_beacon("b"));
        assert_eq!(m.beacon_count(), 0);
        assert!(m.ledger().owned_ids("c").is_empty());
        assert_eq!(factory.last().forced_loss.get(), 1);
    }

    #[test]
    fn dispose_by_component_clears_ids_and_record() {
        let (mut m, _, _) = setup();
        beacon(&mut m, "nav-1", "nav");
        beacon(&mut m, "nav-2", "nav");
        beacon(&mut m, "hero-1", "hero");

        assert_eq!(m.dispose_component_beacons("nav"), 2);
        assert!(m.get_beacon("nav-1").is_none());
        assert!(m.get_beacon("nav-2").is_none());
        assert!(m.get_beacon("hero-1").is_some());
        assert!(m.ledger().get("nav").is_none());
    }

    #[test]
    fn dispose_by_pattern_matches_literal_substrings() {
        let (mut m, _, _) = setup();
        beacon(&mut m, "nav-1", "nav");
        beacon(&mut m, "nav-2", "nav");
        beacon(&mut m, "hero.1", "hero");

        assert_eq!(m.dispose_beacons_by_pattern("nav"), 2);
        assert_eq!(m.dispose_beacons_by_pattern("."), 1);
        assert_eq!(m.beacon_count(), 0);
        // The record stays; only its ids are gone.
        assert_eq!(m.ledger().get("nav").unwrap().owned.len(), 0);
    }

    #[test]
    fn beacon_context_loss_is_log_only() {
        let (mut m, factory, queue) = setup();
        let signal = ContextSignal::new();
        m.create_beacon(
            "b",
            Some(DrawingSurface::with_signal("b", PhysicalSize::new(32, 32), signal.clone())),
            32,
            idle,
            "c",
        )
        .unwrap();

        signal.fire(ContextEvent::Lost);
        queue.run_frame(ms(0));
        assert_eq!(m.beacon_count(), 1);
        assert_eq!(factory.last().renders.get(), 1);
    }

    // ── registration & limits ─────────────────────────────────────────────

    #[test]
    fn register_grants_against_current_live_count() {
        let (mut m, _, _) = setup();
        for i in 0..8 {
            beacon(&mut m, &format!("b-{i}"), "grid");
        }

        assert_eq!(m.register_component("A", 5), 2);
        // Nothing was reserved by the first call.
        assert_eq!(m.register_component("A", 5), 2);
        let record = m.ledger().get("A").unwrap();
        assert_eq!((record.requested, record.granted), (5, 2));
    }

    #[test]
    fn grant_is_advisory() {
        let (mut m, _, _) = setup();
        m.set_max_beacons(2);
        assert_eq!(m.register_component("A", 2), 2);

        beacon(&mut m, "other-1", "B");
        beacon(&mut m, "other-2", "B");
        let result = m.create_beacon("a-1", surface("a-1"), 32, idle, "A");
        assert!(matches!(result, Err(AllocationError::CapacityExhausted { .. })));
    }

    #[test]
    fn set_max_beacons_clamps_and_never_evicts() {
        let (mut m, _, _) = setup();
        for i in 0..4 {
            beacon(&mut m, &format!("b-{i}"), "grid");
        }

        assert_eq!(m.set_max_beacons(0), 1);
        assert_eq!(m.beacon_count(), 4);
        assert_eq!(m.available_slots(), 0);
        assert!(m.create_beacon("x", surface("x"), 32, idle, "grid").is_err());

        assert_eq!(m.set_max_beacons(100), MAX_BEACONS);
        assert_eq!(m.beacon_count(), 4);
    }

    #[test]
    fn nav_scenario() {
        let (mut m, _, _) = setup();
        assert_eq!(m.max_beacons(), 10);
        assert_eq!(m.register_component("nav", 3), 3);
        for id in ["nav-1", "nav-2", "nav-3"] {
            beacon(&mut m, id, "nav");
        }
        assert_eq!(m.stats().component_breakdown["nav"], 3);

        m.dispose_component_beacons("nav");
        let stats = m.stats();
        assert_eq!(stats.beacon_count, 0);
        assert!(!stats.component_breakdown.contains_key("nav"));
    }

    // ── background ────────────────────────────────────────────────────────

    #[test]
    fn background_init_is_idempotent() {
        let (mut m, factory, _) = setup();
        let first = m
            .init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();
        let second = m
            .init_background(bg_surface("bg-2"), bg_graph(), idle)
            .unwrap();

        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(factory.created(), 1);
        assert!(m.is_background_available());
        assert!(m.has_background_renderer());
    }

    #[test]
    fn background_uses_background_profile() {
        let (mut m, factory, _) = setup();
        m.init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();
        let profile = factory.last().profile.borrow().clone().unwrap();
        assert!(profile.antialias);
        assert_eq!(profile.power_preference, wgpu::PowerPreference::HighPerformance);
    }

    #[test]
    fn reinit_swaps_callback_and_releases_old_graph() {
        let (mut m, _, queue) = setup();
        let old_resource = CountingResource::default();
        let mut graph = bg_graph();
        graph.scene.add(Mesh::new("nebula").with_geometry(old_resource.clone()));

        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let a_hits = Rc::clone(&a);
        m.init_background(bg_surface("bg"), graph, move |_| {
            a_hits.set(a_hits.get() + 1);
            Ok(())
        })
        .unwrap();
        queue.run_frame(ms(0));

        let b_hits = Rc::clone(&b);
        let entry = m
            .init_background(bg_surface("bg"), bg_graph(), move |_| {
                b_hits.set(b_hits.get() + 1);
                Ok(())
            })
            .unwrap();
        queue.run_frame(ms(16));

        assert_eq!((a.get(), b.get()), (1, 1));
        assert_eq!(old_resource.releases(), 1);
        assert!(entry.borrow().graph.scene.is_empty());
    }

    #[test]
    fn background_renders_every_frame() {
        let (mut m, factory, queue) = setup();
        m.init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();
        for i in 0..4 {
            queue.run_frame(ms(i * 16));
        }
        assert_eq!(factory.last().renders.get(), 4);
    }

    #[test]
    fn context_loss_pauses_and_restore_resumes_without_init() {
        let (mut m, factory, queue) = setup();
        let signal = ContextSignal::new();
        let ticks = Rc::new(Cell::new(0));
        let t = Rc::clone(&ticks);
        let mut graph = bg_graph();
        graph.scene.add(Mesh::new("stars"));

        m.init_background(
            DrawingSurface::with_signal("bg", PhysicalSize::new(800, 600), signal.clone()),
            graph,
            move |_| {
                t.set(t.get() + 1);
                Ok(())
            },
        )
        .unwrap();
        queue.run_frame(ms(0));
        let ctx = factory.last();
        assert_eq!(ctx.renders.get(), 1);

        signal.fire(ContextEvent::Lost);
        assert!(!m.is_background_available());
        assert!(m.is_context_lost());
        assert_eq!(m.background_state(), BackgroundState::ContextLost);
        queue.run_frame(ms(16));
        assert_eq!(ctx.renders.get(), 1);
        assert_eq!(queue.pending(), 0);

        signal.fire(ContextEvent::Restored);
        queue.run_frame(ms(32));
        assert_eq!(ctx.renders.get(), 2);
        assert_eq!(ticks.get(), 2);
        assert!(m.is_background_available());
        assert_eq!(factory.created(), 1);
        let entry = m.background().entry().unwrap();
        assert_eq!(entry.borrow().graph.scene.len(), 1);
    }

    #[test]
    fn device_loss_seen_while_drawing_moves_background_to_lost() {
        let (mut m, factory, queue) = setup();
        let signal = ContextSignal::new();
        m.init_background(
            DrawingSurface::with_signal("bg", PhysicalSize::new(800, 600), signal.clone()),
            bg_graph(),
            idle,
        )
        .unwrap();
        queue.run_frame(ms(0));

        let ctx = factory.last();
        ctx.lost.set(true);
        queue.run_frame(ms(16));

        assert_eq!(m.background_state(), BackgroundState::ContextLost);
        assert!(m.is_context_lost());
        assert!(m.stats().context_lost);
        assert_eq!(queue.pending(), 0);
        assert_eq!(ctx.renders.get(), 1);

        ctx.lost.set(false);
        signal.fire(ContextEvent::Restored);
        queue.run_frame(ms(32));
        assert_eq!(ctx.renders.get(), 2);
        assert_eq!(m.background_state(), BackgroundState::Live);
    }

    #[test]
    fn lost_background_ignores_resize_and_disposes_cleanly() {
        let (mut m, factory, queue) = setup();
        let signal = ContextSignal::new();
        let entry = m
            .init_background(
                DrawingSurface::with_signal("bg", PhysicalSize::new(800, 600), signal.clone()),
                bg_graph(),
                idle,
            )
            .unwrap();
        signal.fire(ContextEvent::Lost);

        assert!(!m.resize_background(Viewport::new(1600.0, 800.0)));
        assert_eq!(factory.last().size.get(), PhysicalSize::new(800, 600));

        assert!(m.dispose_background());
        assert_eq!(m.background_state(), BackgroundState::Absent);
        assert!(!m.is_context_lost());
        assert!(entry.borrow().is_released());
        assert_eq!(signal.listener_count(), 0);
        assert_eq!(factory.last().disposed.get(), 1);

        signal.fire(ContextEvent::Restored);
        queue.run_frame(ms(0));
        assert_eq!(queue.pending(), 0);
        assert_eq!(factory.last().renders.get(), 0);
        assert_eq!(m.background_state(), BackgroundState::Absent);
    }

    #[test]
    fn init_after_loss_creates_a_fresh_context() {
        let (mut m, factory, _) = setup();
        let signal = ContextSignal::new();
        m.init_background(
            DrawingSurface::with_signal("bg", PhysicalSize::new(800, 600), signal.clone()),
            bg_graph(),
            idle,
        )
        .unwrap();
        signal.fire(ContextEvent::Lost);

        m.init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();
        assert_eq!(factory.created(), 2);
        assert_eq!(factory.context(0).disposed.get(), 1);
        assert!(m.is_background_available());
    }

    #[test]
    fn resize_updates_camera_and_buffer_only_when_live() {
        let (mut m, factory, _) = setup();
        assert!(!m.resize_background(Viewport::new(1600.0, 800.0)));

        let entry = m
            .init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();
        assert!(m.resize_background(Viewport::new(1600.0, 800.0)));
        assert_eq!(entry.borrow().graph.camera.aspect, 2.0);
        assert_eq!(factory.last().size.get(), PhysicalSize::new(1600, 800));
        assert_eq!(entry.borrow().surface().size(), PhysicalSize::new(1600, 800));
    }

    #[test]
    fn dispose_background_clears_state() {
        let (mut m, factory, queue) = setup();
        m.init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();

        assert!(m.dispose_background());
        assert!(!m.dispose_background());
        assert_eq!(m.background_state(), BackgroundState::Absent);
        assert!(!m.is_context_lost());
        assert_eq!(queue.pending(), 0);
        assert_eq!(factory.last().disposed.get(), 1);
    }

    #[test]
    fn creation_failure_leaves_background_absent() {
        let (mut m, factory, _) = setup();
        factory.fail_next();
        let result = m.init_background(bg_surface("bg"), bg_graph(), idle);

        assert!(matches!(result, Err(AllocationError::ContextCreationFailed(_))));
        assert_eq!(m.background_state(), BackgroundState::Absent);
    }

    // ── whole pool ────────────────────────────────────────────────────────

    #[test]
    fn stats_snapshot() {
        let (mut m, _, _) = setup();
        m.init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();
        beacon(&mut m, "b", "hero");

        let stats = m.stats();
        assert!(stats.background_live);
        assert!(!stats.context_lost);
        assert_eq!(stats.beacon_count, 1);
        assert_eq!(stats.max_beacons, 10);
        assert_eq!(stats.beacon_ids, vec!["b"]);
        assert_eq!(stats.component_breakdown["hero"], 1);
        assert_eq!(stats.to_string(), "background=live beacons=1/10 lost=false hero:1");
    }

    #[test]
    fn dispose_all_releases_everything() {
        let (mut m, factory, queue) = setup();
        m.init_background(bg_surface("bg"), bg_graph(), idle)
            .unwrap();
        beacon(&mut m, "a", "c");
        beacon(&mut m, "b", "c");

        m.dispose_all();
        assert_eq!(m.beacon_count(), 0);
        assert!(!m.is_background_available());
        assert!(m.ledger().is_empty());
        assert_eq!(queue.pending(), 0);
        for i in 0..3 {
            assert_eq!(factory.context(i).disposed.get(), 1);
        }
    }

    #[test]
    fn dropping_the_manager_releases_contexts() {
        let queue = Rc::new(FrameQueue::new());
        let factory = FakeFactory::default();
        {
            let mut m = ContextManager::new(PoolConfig::default(), factory.clone(), queue.clone());
            beacon(&mut m, "b", "c");
        }
        assert_eq!(factory.context(0).disposed.get(), 1);
        assert_eq!(queue.pending(), 0);
    }
}
