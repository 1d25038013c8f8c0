//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! - `FrameClock`: per-loop delta time for hosts driving the frame queue
//! - `FrameLimiter`: frame-rate ceiling applied by capped animation loops

mod frame_clock;
mod frame_limiter;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_limiter::FrameLimiter;
