use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use crate::anim::{AnimationDriver, AnimationHandle, AnimationOptions, FrameFn};
use crate::coords::Viewport;
use crate::device::{CapabilityProfile, ContextEvent, ContextFactory, DrawingSurface};
use crate::dispose;
use crate::graph::RenderGraph;
use crate::schedule::FrameScheduler;

use super::{AllocationError, EntryRef, RenderContextEntry};

/// Lifecycle of the background slot.
///
/// `Absent → Live → ContextLost → Live`, and any state → `Absent` on disposal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BackgroundState {
    Absent,
    Live,
    /// Native context is gone; graph and callback are kept so the loop can
    /// resume on restore without the caller's involvement.
    ContextLost,
}

type SharedFrameFn = Rc<RefCell<FrameFn<RenderContextEntry>>>;

/// The single full-screen context shared by the whole application.
pub struct BackgroundSlot {
    inner: Rc<RefCell<SlotInner>>,
}

struct SlotInner {
    state: BackgroundState,
    entry: Option<EntryRef>,
    per_frame: Option<SharedFrameFn>,
    animation: Option<AnimationHandle>,
    scheduler: Rc<dyn FrameScheduler>,
    profile: CapabilityProfile,
}

impl BackgroundSlot {
    pub(crate) fn new(scheduler: Rc<dyn FrameScheduler>, profile: CapabilityProfile) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SlotInner {
                state: BackgroundState::Absent,
                entry: None,
                per_frame: None,
                animation: None,
                scheduler,
                profile,
            })),
        }
    }

    pub fn state(&self) -> BackgroundState {
        self.inner.borrow().state
    }

    pub fn entry(&self) -> Option<EntryRef> {
        self.inner.borrow().entry.clone()
    }

    /// Returns the live background, creating it if needed.
    ///
    /// While `Live`, only the stored graph and callback are swapped (the
    /// replaced graph is released) and the existing entry is returned; `surface`
    /// is dropped unused. Otherwise any stale context is disposed and a new one
    /// is created with the background profile.
    pub fn init(
        &mut self,
        factory: &mut dyn ContextFactory,
        surface: DrawingSurface,
        graph: RenderGraph,
        per_frame: impl FnMut(&mut RenderContextEntry) -> Result<()> + 'static,
    ) -> Result<EntryRef, AllocationError> {
        if let Some(entry) = self.live_entry() {
            log::info!("background already exists, reusing");
            let mut stale = std::mem::replace(&mut entry.borrow_mut().graph, graph);
            dispose::release_graph(&mut stale);
            if let Some(slot) = &self.inner.borrow().per_frame {
                *slot.borrow_mut() = Box::new(per_frame);
            }
            return Ok(entry);
        }

        if self.inner.borrow().entry.is_some() {
            self.dispose();
        }

        log::info!("creating new shared background");
        let mut surface = surface;
        let context = {
            let inner = self.inner.borrow();
            factory
                .create_context(&surface, &inner.profile)
                .map_err(|err| {
                    log::warn!("background context creation failed: {err:#}");
                    AllocationError::ContextCreationFailed(err)
                })?
        };

        let weak = Rc::downgrade(&self.inner);
        surface.on_context_event(move |event| {
            if let Some(inner) = weak.upgrade() {
                on_context_event(&inner, event);
            }
        });

        let entry = Rc::new(RefCell::new(RenderContextEntry::new(None, surface, context, graph)));
        let per_frame: SharedFrameFn = Rc::new(RefCell::new(Box::new(per_frame)));

        let mut inner = self.inner.borrow_mut();
        let handle = start_loop(&inner.scheduler, &entry, &per_frame);
        entry.borrow_mut().set_animation(handle.clone());

        inner.animation = Some(handle);
        inner.per_frame = Some(per_frame);
        inner.entry = Some(Rc::clone(&entry));
        inner.state = BackgroundState::Live;
        Ok(entry)
    }

    fn live_entry(&self) -> Option<EntryRef> {
        let inner = self.inner.borrow();
        match inner.state {
            BackgroundState::Live => inner.entry.clone(),
            _ => None,
        }
    }

    /// Recomputes the camera aspect and drawing-buffer size from `viewport`.
    ///
    /// No-op unless `Live`. Returns whether anything changed.
    pub fn resize(&self, viewport: Viewport) -> bool {
        if !viewport.is_valid() {
            return false;
        }
        let Some(entry) = self.live_entry() else {
            return false;
        };

        let mut entry = entry.borrow_mut();
        entry.graph.camera.set_aspect(viewport.aspect());
        entry.resize(viewport.physical_size(1.0));
        true
    }

    /// Cancels the loop, releases graph and context, clears all stored state.
    ///
    /// Returns `false` if there was nothing to dispose.
    pub fn dispose(&mut self) -> bool {
        let (entry, animation) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = BackgroundState::Absent;
            inner.per_frame = None;
            (inner.entry.take(), inner.animation.take())
        };

        if let Some(handle) = animation {
            handle.cancel();
        }
        let Some(entry) = entry else {
            return false;
        };

        log::info!("disposing background renderer");
        match entry.try_borrow_mut() {
            Ok(mut entry) => {
                dispose::release_context(&mut entry);
            }
            Err(_) => log::warn!("background is in use; release deferred to its last handle"),
        }
        log::info!("background disposed");
        true
    }

    pub fn is_available(&self) -> bool {
        let inner = self.inner.borrow();
        inner.state == BackgroundState::Live && inner.entry.is_some()
    }

    /// True when a background exists and its context is lost.
    pub fn is_context_lost(&self) -> bool {
        let inner = self.inner.borrow();
        let Some(entry) = &inner.entry else {
            return false;
        };
        if inner.state == BackgroundState::ContextLost {
            return true;
        }
        entry
            .try_borrow()
            .map(|entry| entry.context().is_context_lost())
            .unwrap_or(false)
    }
}

fn start_loop(
    scheduler: &Rc<dyn FrameScheduler>,
    entry: &EntryRef,
    per_frame: &SharedFrameFn,
) -> AnimationHandle {
    let callback = Rc::clone(per_frame);
    AnimationDriver::start(
        "background",
        scheduler,
        entry,
        move |entry: &mut RenderContextEntry| {
            let mut callback = callback.borrow_mut();
            (&mut **callback)(entry)
        },
        RenderContextEntry::draw,
        AnimationOptions::uncapped(),
    )
}

fn on_context_event(inner: &Rc<RefCell<SlotInner>>, event: ContextEvent) {
    let Ok(mut slot) = inner.try_borrow_mut() else {
        log::warn!("background busy, dropped context event {event:?}");
        return;
    };

    match event {
        ContextEvent::Lost => {
            log::warn!("background context lost");
            if slot.state != BackgroundState::Live {
                return;
            }
            if let Some(handle) = slot.animation.take() {
                handle.cancel();
            }
            slot.state = BackgroundState::ContextLost;
        }
        ContextEvent::Restored => {
            log::info!("background context restored");
            if slot.state != BackgroundState::ContextLost {
                return;
            }
            let (Some(entry), Some(per_frame)) = (slot.entry.clone(), slot.per_frame.clone()) else {
                return;
            };
            let handle = start_loop(&slot.scheduler, &entry, &per_frame);
            match entry.try_borrow_mut() {
                Ok(mut entry) => entry.set_animation(handle.clone()),
                Err(_) => log::debug!("background entry busy; handle kept by the slot only"),
            }
            slot.animation = Some(handle);
            slot.state = BackgroundState::Live;
        }
    }
}
