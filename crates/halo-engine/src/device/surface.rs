use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use winit::dpi::PhysicalSize;

/// Hardware notification about a context bound to a surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ContextEvent {
    /// GPU resources of the context are gone.
    Lost,
    /// The context can be used again; GPU-resident state must be recreated.
    Restored,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(ContextEvent)>;

/// Event channel between the platform and whoever manages a surface's context.
///
/// Cloning yields another handle to the same channel. The platform side keeps a
/// clone and calls [`fire`](Self::fire); the pool attaches listeners.
#[derive(Clone, Default)]
pub struct ContextSignal {
    inner: Rc<RefCell<SignalState>>,
}

#[derive(Default)]
struct SignalState {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
    dispatching: bool,
    detached: Vec<ListenerId>,
}

impl ContextSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen(&self, listener: impl FnMut(ContextEvent) + 'static) -> ListenerId {
        let mut state = self.inner.borrow_mut();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.push((id, Box::new(listener)));
        id
    }

    /// Detaches a listener. Safe to call from inside a listener.
    pub fn unlisten(&self, id: ListenerId) {
        let mut state = self.inner.borrow_mut();
        let before = state.listeners.len();
        state.listeners.retain(|(lid, _)| *lid != id);
        if state.listeners.len() == before && state.dispatching {
            state.detached.push(id);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Delivers `event` to every attached listener and returns how many ran.
    pub fn fire(&self, event: ContextEvent) -> usize {
        let mut listeners = {
            let mut state = self.inner.borrow_mut();
            if state.dispatching {
                log::warn!("nested context event {event:?} ignored");
                return 0;
            }
            state.dispatching = true;
            std::mem::take(&mut state.listeners)
        };

        for (_, listener) in listeners.iter_mut() {
            listener(event);
        }
        let ran = listeners.len();

        let mut state = self.inner.borrow_mut();
        let detached = std::mem::take(&mut state.detached);
        listeners.retain(|(id, _)| !detached.contains(id));
        // Listeners attached during dispatch go after the existing ones.
        listeners.append(&mut state.listeners);
        state.listeners = listeners;
        state.dispatching = false;
        ran
    }
}

impl fmt::Debug for ContextSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSignal")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// A drawing surface handed to the pool for one context.
///
/// Exclusively owned by the entry it is bound to; listeners attached through it
/// are detached when the entry is disposed.
#[derive(Debug)]
pub struct DrawingSurface {
    label: String,
    size: PhysicalSize<u32>,
    signal: ContextSignal,
    attached: Vec<ListenerId>,
    released: bool,
}

impl DrawingSurface {
    pub fn new(label: impl Into<String>, size: PhysicalSize<u32>) -> Self {
        Self::with_signal(label, size, ContextSignal::new())
    }

    /// Creates a surface whose context events arrive through `signal`.
    pub fn with_signal(
        label: impl Into<String>,
        size: PhysicalSize<u32>,
        signal: ContextSignal,
    ) -> Self {
        Self {
            label: label.into(),
            size,
            signal,
            attached: Vec::new(),
            released: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Drawing-buffer size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn signal(&self) -> &ContextSignal {
        &self.signal
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn set_size(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
    }

    pub(crate) fn on_context_event(&mut self, listener: impl FnMut(ContextEvent) + 'static) {
        let id = self.signal.listen(listener);
        self.attached.push(id);
    }

    /// Detaches every listener this surface attached. Idempotent.
    pub(crate) fn release(&mut self) {
        for id in self.attached.drain(..) {
            self.signal.unlisten(id);
        }
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn fire_reaches_every_listener() {
        let signal = ContextSignal::new();
        let hits = Rc::new(Cell::new(0));
        for _ in 0..2 {
            let h = Rc::clone(&hits);
            signal.listen(move |_| h.set(h.get() + 1));
        }
        assert_eq!(signal.fire(ContextEvent::Lost), 2);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn released_surface_detaches_its_listeners() {
        let signal = ContextSignal::new();
        let mut surface = DrawingSurface::with_signal("s", PhysicalSize::new(8, 8), signal.clone());
        surface.on_context_event(|_| {});
        surface.on_context_event(|_| {});
        assert_eq!(signal.listener_count(), 2);

        surface.release();
        surface.release();
        assert_eq!(signal.listener_count(), 0);
        assert!(surface.is_released());
        assert_eq!(signal.fire(ContextEvent::Restored), 0);
    }

    #[test]
    fn listener_can_detach_itself_during_dispatch() {
        let signal = ContextSignal::new();
        let own_id = Rc::new(Cell::new(None));
        let s = signal.clone();
        let id_slot = Rc::clone(&own_id);
        let id = signal.listen(move |_| {
            if let Some(id) = id_slot.get() {
                s.unlisten(id);
            }
        });
        own_id.set(Some(id));

        assert_eq!(signal.fire(ContextEvent::Lost), 1);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn listener_attached_during_dispatch_is_kept() {
        let signal = ContextSignal::new();
        let s = signal.clone();
        let attached = Rc::new(Cell::new(false));
        let a = Rc::clone(&attached);
        signal.listen(move |_| {
            if !a.replace(true) {
                s.listen(|_| {});
            }
        });

        signal.fire(ContextEvent::Lost);
        assert_eq!(signal.listener_count(), 2);
    }
}
