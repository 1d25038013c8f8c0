use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::graph::RenderGraph;

use super::{CapabilityProfile, DrawingSurface};

/// A native rendering context bound to one drawing surface.
///
/// The pool owns each context exclusively and drives it from a single thread.
pub trait RenderContext {
    /// Current drawing-buffer size in physical pixels.
    fn size(&self) -> PhysicalSize<u32>;

    /// Resizes the drawing buffer. Zero-sized requests are remembered but not applied.
    fn set_size(&mut self, size: PhysicalSize<u32>);

    /// Issues one draw of `graph` into the drawing buffer.
    fn render(&mut self, graph: &RenderGraph) -> Result<()>;

    /// Releases the context's own GPU allocations.
    fn dispose(&mut self) -> Result<()>;

    /// Gives the underlying hardware context back to the platform now rather
    /// than whenever the last reference is dropped.
    fn force_context_loss(&mut self) -> Result<()>;

    fn is_context_lost(&self) -> bool;
}

/// Creates native contexts.
///
/// Failure is always an `Err`; a factory never hands back a context that
/// cannot render.
pub trait ContextFactory {
    fn create_context(
        &mut self,
        surface: &DrawingSurface,
        profile: &CapabilityProfile,
    ) -> Result<Box<dyn RenderContext>>;
}
