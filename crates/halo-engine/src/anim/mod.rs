//! Per-context frame loops.
//!
//! Each live context runs one loop scheduled through the injected
//! [`FrameScheduler`](crate::schedule::FrameScheduler). Loops are independent:
//! a failing or panicking callback is logged and the loop keeps going.

mod driver;

pub use driver::{AnimationDriver, AnimationHandle, AnimationOptions, BEACON_TARGET_FPS, FrameFn};
