use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::anim::AnimationHandle;
use crate::device::{ContextEvent, DrawingSurface, RenderContext};
use crate::dispose;
use crate::graph::RenderGraph;

/// Shared handle to a live entry.
///
/// The pool keeps one strong reference per live entry; frame loops only hold
/// weak ones.
pub type EntryRef = Rc<RefCell<RenderContextEntry>>;

/// One live rendering context (the background or a beacon) and everything it owns.
pub struct RenderContextEntry {
    id: Option<String>,
    label: String,
    surface: DrawingSurface,
    context: Box<dyn RenderContext>,
    /// Scene/camera drawn every frame. Callers populate and mutate it freely.
    pub graph: RenderGraph,
    animation: Option<AnimationHandle>,
    auxiliary: Option<Box<dyn Any>>,
    loss_reported: bool,
    released: bool,
}

impl RenderContextEntry {
    pub(crate) fn new(
        id: Option<String>,
        surface: DrawingSurface,
        context: Box<dyn RenderContext>,
        graph: RenderGraph,
    ) -> Self {
        let label = id.clone().unwrap_or_else(|| "background".to_string());
        Self {
            id,
            label,
            surface,
            context,
            graph,
            animation: None,
            auxiliary: None,
            loss_reported: false,
            released: false,
        }
    }

    /// Beacon identifier; `None` for the background.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Name used in logs: the beacon id, or `"background"`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn context(&self) -> &dyn RenderContext {
        self.context.as_ref()
    }

    pub(crate) fn context_mut(&mut self) -> &mut dyn RenderContext {
        self.context.as_mut()
    }

    pub fn animation(&self) -> Option<&AnimationHandle> {
        self.animation.as_ref()
    }

    pub(crate) fn set_animation(&mut self, handle: AnimationHandle) {
        if let Some(old) = self.animation.replace(handle) {
            old.cancel();
        }
    }

    pub(crate) fn cancel_animation(&mut self) {
        if let Some(handle) = &self.animation {
            handle.cancel();
        }
    }

    /// Issues one draw call of the entry's graph.
    ///
    /// A context that lost its device on its own is reported once as
    /// [`ContextEvent::Lost`] on the surface signal.
    pub fn draw(&mut self) -> Result<()> {
        anyhow::ensure!(!self.released, "`{}` has been disposed", self.label);
        if !self.context.is_context_lost() {
            self.loss_reported = false;
            return self.context.render(&self.graph);
        }

        if !self.loss_reported {
            self.loss_reported = true;
            self.surface.signal().fire(ContextEvent::Lost);
        }
        anyhow::bail!("`{}` context is lost", self.label)
    }

    pub(crate) fn resize(&mut self, size: PhysicalSize<u32>) {
        self.context.set_size(size);
        self.surface.set_size(size);
    }

    /// Stores caller-defined data alongside the entry. The pool never reads it.
    pub fn set_auxiliary<T: Any>(&mut self, value: T) {
        self.auxiliary = Some(Box::new(value));
    }

    pub fn auxiliary<T: Any>(&self) -> Option<&T> {
        self.auxiliary.as_ref()?.downcast_ref()
    }

    pub fn auxiliary_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.auxiliary.as_mut()?.downcast_mut()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn mark_released(&mut self) {
        self.surface.release();
        self.auxiliary = None;
        self.released = true;
    }
}

impl std::fmt::Debug for RenderContextEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContextEntry")
            .field("label", &self.label)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for RenderContextEntry {
    fn drop(&mut self) {
        // Last handle went away without going through the pool.
        if !self.released {
            dispose::release_context(self);
        }
    }
}
