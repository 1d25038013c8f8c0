use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{FrameCallback, FrameRequestId, FrameScheduler};

/// Deterministic frame queue.
///
/// The host calls [`run_frame`](Self::run_frame) once per display frame (or
/// once per simulated frame in tests). Only requests queued before the frame
/// began run in it; requests made by callbacks land in the next frame.
/// Cancelling removes the request from the queue, so a cancelled loop never
/// sees another tick.
#[derive(Default)]
pub struct FrameQueue {
    inner: RefCell<QueueState>,
}

#[derive(Default)]
struct QueueState {
    next_id: u64,
    pending: BTreeMap<FrameRequestId, FrameCallback>,
    frames_run: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Number of frames executed so far.
    pub fn frames_run(&self) -> u64 {
        self.inner.borrow().frames_run
    }

    /// Runs one frame at timestamp `now` and returns how many callbacks ran.
    pub fn run_frame(&self, now: Duration) -> usize {
        let batch: Vec<FrameRequestId> = {
            let mut state = self.inner.borrow_mut();
            state.frames_run += 1;
            state.pending.keys().copied().collect()
        };

        let mut ran = 0;
        for id in batch {
            // Re-checked per request: an earlier callback may have cancelled it.
            let callback = self.inner.borrow_mut().pending.remove(&id);
            if let Some(callback) = callback {
                callback(now);
                ran += 1;
            }
        }
        ran
    }

    /// Drops every pending request without running it.
    pub fn clear(&self) {
        // Callbacks may own loop state whose drop touches the queue; drop them unborrowed.
        let drained = std::mem::take(&mut self.inner.borrow_mut().pending);
        drop(drained);
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let mut state = self.inner.borrow_mut();
        let id = FrameRequestId(state.next_id);
        state.next_id += 1;
        state.pending.insert(id, callback);
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let removed = self.inner.borrow_mut().pending.remove(&id);
        drop(removed);
    }
}
