//! Next-frame scheduling.
//!
//! Every frame loop in the pool is driven through the [`FrameScheduler`]
//! capability rather than a platform primitive, so the same loops run against
//! a real display cadence or a deterministic test clock.
//!
//! All scheduling happens on one thread; callbacks are `FnOnce` and never run
//! concurrently with each other.

mod queue;

pub use queue::FrameQueue;

use std::fmt;
use std::time::Duration;

/// Identifies one pending frame request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FrameRequestId(pub(crate) u64);

impl fmt::Display for FrameRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Callback run on the next frame with that frame's timestamp.
pub type FrameCallback = Box<dyn FnOnce(Duration)>;

/// "Run this on the next frame" capability.
pub trait FrameScheduler {
    /// Queues `callback` for the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Removes a pending request. Unknown or already-run ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}
