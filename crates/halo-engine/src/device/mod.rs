//! Rendering-context creation.
//!
//! This module is responsible for:
//! - the capability profiles contexts are created with
//! - drawing surfaces and their context-loss signal
//! - the `RenderContext`/`ContextFactory` seam and its wgpu implementation

mod context;
mod gpu;
mod profile;
mod surface;

pub use context::{ContextFactory, RenderContext};
pub use gpu::{DeviceLossFlag, TARGET_FORMAT, WgpuContext, WgpuContextFactory};
pub use profile::CapabilityProfile;
pub use surface::{ContextEvent, ContextSignal, DrawingSurface, ListenerId};
