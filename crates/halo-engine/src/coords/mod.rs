//! Coordinate types shared between the host and the context pool.
//!
//! Canonical CPU space is logical pixels (DPI-aware); drawing buffers are sized
//! in physical pixels.

mod viewport;

pub use viewport::Viewport;
