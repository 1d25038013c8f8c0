use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::time::Duration;

use anyhow::Result;

use crate::schedule::{FrameRequestId, FrameScheduler};
use crate::time::FrameLimiter;

/// Frame-rate ceiling applied to beacon loops.
pub const BEACON_TARGET_FPS: u32 = 30;

/// Per-frame callback with the fixed `(entry) -> result` shape.
pub type FrameFn<T> = Box<dyn FnMut(&mut T) -> Result<()>>;

/// Loop options.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct AnimationOptions {
    /// Frame-rate ceiling. `None` renders on every scheduled frame.
    pub max_fps: Option<u32>,
}

impl AnimationOptions {
    pub const fn uncapped() -> Self {
        Self { max_fps: None }
    }

    pub const fn capped(fps: u32) -> Self {
        Self { max_fps: Some(fps) }
    }
}

/// Handle to a running frame loop.
///
/// Clones refer to the same loop. Cancelling removes the pending frame request
/// from the scheduler, so no further tick reaches the loop's target.
#[derive(Clone)]
pub struct AnimationHandle {
    state: Rc<LoopState>,
}

struct LoopState {
    label: String,
    scheduler: Rc<dyn FrameScheduler>,
    pending: Cell<Option<FrameRequestId>>,
    cancelled: Cell<bool>,
    frames: Cell<u64>,
    skipped: Cell<u64>,
    faults: Cell<u64>,
}

impl AnimationHandle {
    /// Stops the loop. Idempotent.
    pub fn cancel(&self) {
        if self.state.cancelled.replace(true) {
            return;
        }
        if let Some(id) = self.state.pending.take() {
            self.state.scheduler.cancel_frame(id);
        }
        log::debug!("animation `{}` cancelled", self.state.label);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Frames rendered without a callback fault.
    pub fn frames_rendered(&self) -> u64 {
        self.state.frames.get()
    }

    /// Ticks dropped by the frame-rate ceiling.
    pub fn frames_skipped(&self) -> u64 {
        self.state.skipped.get()
    }

    /// Ticks whose callback returned an error or panicked.
    pub fn faults(&self) -> u64 {
        self.state.faults.get()
    }

    pub fn label(&self) -> &str {
        &self.state.label
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("label", &self.state.label)
            .field("cancelled", &self.state.cancelled.get())
            .field("frames", &self.state.frames.get())
            .finish()
    }
}

struct Ticker<T> {
    target: Weak<RefCell<T>>,
    per_frame: FrameFn<T>,
    render: FrameFn<T>,
    limiter: Option<FrameLimiter>,
}

impl<T> Ticker<T> {
    fn tick(&mut self, state: &LoopState, now: Duration) {
        if let Some(limiter) = &mut self.limiter {
            if !limiter.accept(now) {
                state.skipped.set(state.skipped.get() + 1);
                return;
            }
        }

        let Some(shared) = self.target.upgrade() else {
            // Target dropped without cancelling: stop quietly.
            state.cancelled.set(true);
            return;
        };
        let Ok(mut target) = shared.try_borrow_mut() else {
            log::debug!("animation `{}` skipped a frame: target is borrowed", state.label);
            return;
        };

        let per_frame = &mut self.per_frame;
        let render = &mut self.render;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<()> {
            per_frame(&mut target)?;
            render(&mut target)
        }));

        match outcome {
            Ok(Ok(())) => state.frames.set(state.frames.get() + 1),
            Ok(Err(err)) => {
                state.faults.set(state.faults.get() + 1);
                log::error!("error animating `{}`: {err:#}", state.label);
            }
            Err(payload) => {
                state.faults.set(state.faults.get() + 1);
                log::error!(
                    "animation `{}` panicked: {}",
                    state.label,
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}

/// Starts and reschedules frame loops.
pub struct AnimationDriver;

impl AnimationDriver {
    /// Starts a loop over `target`.
    ///
    /// On every accepted frame `per_frame` runs, then `render`. The first tick
    /// is requested from `scheduler`, not run synchronously. The loop holds
    /// only a weak reference to `target`.
    pub fn start<T: 'static>(
        label: impl Into<String>,
        scheduler: &Rc<dyn FrameScheduler>,
        target: &Rc<RefCell<T>>,
        per_frame: impl FnMut(&mut T) -> Result<()> + 'static,
        render: impl FnMut(&mut T) -> Result<()> + 'static,
        options: AnimationOptions,
    ) -> AnimationHandle {
        let state = Rc::new(LoopState {
            label: label.into(),
            scheduler: Rc::clone(scheduler),
            pending: Cell::new(None),
            cancelled: Cell::new(false),
            frames: Cell::new(0),
            skipped: Cell::new(0),
            faults: Cell::new(0),
        });

        let ticker = Rc::new(RefCell::new(Ticker {
            target: Rc::downgrade(target),
            per_frame: Box::new(per_frame),
            render: Box::new(render),
            limiter: options.max_fps.map(FrameLimiter::from_fps),
        }));

        request_next(&state, ticker);
        AnimationHandle { state }
    }
}

fn request_next<T: 'static>(state: &Rc<LoopState>, ticker: Rc<RefCell<Ticker<T>>>) {
    let loop_state = Rc::clone(state);
    let id = state.scheduler.request_frame(Box::new(move |now| {
        loop_state.pending.set(None);
        if loop_state.cancelled.get() {
            return;
        }

        ticker.borrow_mut().tick(&loop_state, now);

        // A callback may have cancelled this loop; never reschedule after that.
        if !loop_state.cancelled.get() {
            request_next(&loop_state, ticker);
        }
    }));
    state.pending.set(Some(id));
}
