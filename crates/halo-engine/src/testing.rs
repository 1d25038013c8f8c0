//! Recording fakes for exercising the pool without a GPU.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Result, bail};
use winit::dpi::PhysicalSize;

use crate::device::{CapabilityProfile, ContextFactory, DrawingSurface, RenderContext};
use crate::graph::{GpuResource, RenderGraph};

/// Resource that counts its releases. Clones share the counter.
#[derive(Clone, Default)]
pub(crate) struct CountingResource {
    releases: Rc<Cell<usize>>,
    fail: bool,
}

impl CountingResource {
    pub(crate) fn failing() -> Self {
        Self { releases: Rc::default(), fail: true }
    }

    pub(crate) fn releases(&self) -> usize {
        self.releases.get()
    }
}

impl GpuResource for CountingResource {
    fn release(&mut self) -> Result<()> {
        self.releases.set(self.releases.get() + 1);
        if self.fail {
            bail!("driver refused");
        }
        Ok(())
    }
}

/// What happened to one fake context.
#[derive(Default)]
pub(crate) struct ContextLog {
    pub(crate) label: String,
    pub(crate) profile: RefCell<Option<CapabilityProfile>>,
    pub(crate) size: Cell<PhysicalSize<u32>>,
    pub(crate) renders: Cell<usize>,
    pub(crate) disposed: Cell<usize>,
    pub(crate) forced_loss: Cell<usize>,
    pub(crate) lost: Cell<bool>,
    pub(crate) fail_render: Cell<bool>,
    pub(crate) fail_dispose: Cell<bool>,
}

struct FakeContext {
    log: Rc<ContextLog>,
}

impl RenderContext for FakeContext {
    fn size(&self) -> PhysicalSize<u32> {
        self.log.size.get()
    }

    fn set_size(&mut self, size: PhysicalSize<u32>) {
        self.log.size.set(size);
    }

    fn render(&mut self, _graph: &RenderGraph) -> Result<()> {
        if self.log.fail_render.get() {
            bail!("draw call rejected");
        }
        self.log.renders.set(self.log.renders.get() + 1);
        Ok(())
    }

    fn dispose(&mut self) -> Result<()> {
        self.log.disposed.set(self.log.disposed.get() + 1);
        if self.log.fail_dispose.get() {
            bail!("dispose threw");
        }
        Ok(())
    }

    fn force_context_loss(&mut self) -> Result<()> {
        self.log.forced_loss.set(self.log.forced_loss.get() + 1);
        self.log.lost.set(true);
        Ok(())
    }

    fn is_context_lost(&self) -> bool {
        self.log.lost.get()
    }
}

/// Factory handing out [`FakeContext`]s. Clones share state, so a test keeps
/// one clone while the manager owns the other.
#[derive(Clone, Default)]
pub(crate) struct FakeFactory {
    contexts: Rc<RefCell<Vec<Rc<ContextLog>>>>,
    fail_next: Rc<Cell<bool>>,
}

impl FakeFactory {
    pub(crate) fn created(&self) -> usize {
        self.contexts.borrow().len()
    }

    pub(crate) fn context(&self, index: usize) -> Rc<ContextLog> {
        Rc::clone(&self.contexts.borrow()[index])
    }

    pub(crate) fn last(&self) -> Rc<ContextLog> {
        let contexts = self.contexts.borrow();
        Rc::clone(contexts.last().expect("no context created"))
    }

    pub(crate) fn by_label(&self, label: &str) -> Vec<Rc<ContextLog>> {
        self.contexts
            .borrow()
            .iter()
            .filter(|c| c.label == label)
            .cloned()
            .collect()
    }

    pub(crate) fn fail_next(&self) {
        self.fail_next.set(true);
    }
}

impl ContextFactory for FakeFactory {
    fn create_context(
        &mut self,
        surface: &DrawingSurface,
        profile: &CapabilityProfile,
    ) -> Result<Box<dyn RenderContext>> {
        if self.fail_next.replace(false) {
            bail!("no hardware context available for `{}`", surface.label());
        }
        let log = Rc::new(ContextLog {
            label: surface.label().to_string(),
            profile: RefCell::new(Some(profile.clone())),
            size: Cell::new(surface.size()),
            ..ContextLog::default()
        });
        self.contexts.borrow_mut().push(Rc::clone(&log));
        Ok(Box::new(FakeContext { log }))
    }
}
