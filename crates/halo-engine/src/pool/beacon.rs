use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::anim::{AnimationDriver, AnimationHandle, AnimationOptions};
use crate::device::{CapabilityProfile, ContextEvent, ContextFactory, DrawingSurface};
use crate::dispose;
use crate::graph::{PerspectiveCamera, RenderGraph};
use crate::schedule::FrameScheduler;

use super::config::clamp_max_beacons;
use super::{AllocationError, EntryRef, Ledger, RenderContextEntry};

/// Component name used when a caller does not give one.
pub const UNKNOWN_COMPONENT: &str = "unknown";

struct PooledBeacon {
    entry: EntryRef,
    animation: AnimationHandle,
}

/// Capped set of small, independently animated contexts keyed by id.
///
/// `len() <= max_beacons()` holds after every admission. Lowering the ceiling
/// never evicts; it only affects later admissions.
pub struct BeaconPool {
    beacons: BTreeMap<String, PooledBeacon>,
    ledger: Ledger,
    max_beacons: usize,
    frame_rate: u32,
    profile: CapabilityProfile,
    scheduler: Rc<dyn FrameScheduler>,
}

impl BeaconPool {
    pub(crate) fn new(
        scheduler: Rc<dyn FrameScheduler>,
        profile: CapabilityProfile,
        max_beacons: usize,
        frame_rate: u32,
    ) -> Self {
        Self {
            beacons: BTreeMap::new(),
            ledger: Ledger::new(),
            max_beacons: clamp_max_beacons(max_beacons),
            frame_rate,
            profile,
            scheduler,
        }
    }

    /// Records `component`'s request and returns how many slots are free for it now.
    ///
    /// The result is a hint derived from the current live count; nothing is
    /// reserved.
    pub fn register(&mut self, component: &str, requested: usize) -> usize {
        let available = self.available_slots();
        let granted = requested.min(available);
        self.ledger.record_registration(component, requested, granted);
        log::info!(
            "{component} registered: requested {requested}, allocated {granted} ({available} available)"
        );
        granted
    }

    /// Creates a beacon of `size`×`size` physical pixels.
    ///
    /// Refused without side effects when `surface` is `None` or the pool is
    /// full. A live beacon with the same id is disposed before the new one is
    /// created.
    pub fn create(
        &mut self,
        factory: &mut dyn ContextFactory,
        id: &str,
        surface: Option<DrawingSurface>,
        size: u32,
        animate: impl FnMut(&mut RenderContextEntry) -> Result<()> + 'static,
        component: &str,
    ) -> Result<EntryRef, AllocationError> {
        let Some(mut surface) = surface else {
            return Err(AllocationError::MissingSurface);
        };

        if self.beacons.len() >= self.max_beacons {
            log::warn!(
                "maximum beacon limit ({}) reached, cannot create beacon: {id}",
                self.max_beacons
            );
            return Err(AllocationError::CapacityExhausted { max: self.max_beacons });
        }

        if self.beacons.contains_key(id) {
            log::info!("reusing beacon: {id}");
            self.dispose(id);
        }

        let component = if component.is_empty() { UNKNOWN_COMPONENT } else { component };
        log::info!(
            "creating beacon: {id} ({}/{}) for {component}",
            self.beacons.len() + 1,
            self.max_beacons
        );

        surface.set_size(PhysicalSize::new(size, size));
        let context = factory.create_context(&surface, &self.profile).map_err(|err| {
            log::warn!("beacon {id} context creation failed: {err:#}");
            AllocationError::ContextCreationFailed(err)
        })?;

        // Beacons do not recover by themselves; the owner decides what to do.
        let label = id.to_string();
        surface.on_context_event(move |event| match event {
            ContextEvent::Lost => log::warn!("beacon {label} context lost"),
            ContextEvent::Restored => log::info!("beacon {label} context restored"),
        });

        let graph = RenderGraph::empty(PerspectiveCamera::beacon_default());
        let entry = Rc::new(RefCell::new(RenderContextEntry::new(
            Some(id.to_string()),
            surface,
            context,
            graph,
        )));

        let animation = AnimationDriver::start(
            id,
            &self.scheduler,
            &entry,
            animate,
            RenderContextEntry::draw,
            AnimationOptions::capped(self.frame_rate),
        );
        entry.borrow_mut().set_animation(animation.clone());

        self.beacons.insert(
            id.to_string(),
            PooledBeacon { entry: Rc::clone(&entry), animation },
        );
        self.ledger.attribute(component, id);
        Ok(entry)
    }

    pub fn get(&self, id: &str) -> Option<EntryRef> {
        self.beacons.get(id).map(|beacon| Rc::clone(&beacon.entry))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.beacons.contains_key(id)
    }

    /// Disposes one beacon. Returns `false` if `id` was not live.
    pub fn dispose(&mut self, id: &str) -> bool {
        let Some(beacon) = self.beacons.remove(id) else {
            return false;
        };
        log::info!("disposing beacon: {id}");

        beacon.animation.cancel();
        match beacon.entry.try_borrow_mut() {
            Ok(mut entry) => {
                dispose::release_context(&mut entry);
            }
            Err(_) => log::warn!("beacon {id} is in use; release deferred to its last handle"),
        }

        self.ledger.release(id);
        log::info!(
            "beacon {id} disposed. Remaining: {}/{}",
            self.beacons.len(),
            self.max_beacons
        );
        true
    }

    /// Disposes every beacon attributed to `component` and drops its record.
    pub fn dispose_component(&mut self, component: &str) -> usize {
        let ids = self.ledger.owned_ids(component);
        log::info!("disposing {} beacons for component: {component}", ids.len());

        let mut disposed = 0;
        for id in &ids {
            if self.dispose(id) {
                disposed += 1;
            }
        }
        self.ledger.remove(component);
        disposed
    }

    /// Disposes every live beacon whose id contains `pattern` literally.
    pub fn dispose_matching(&mut self, pattern: &str) -> usize {
        let ids: Vec<String> = self
            .beacons
            .keys()
            .filter(|id| id.contains(pattern))
            .cloned()
            .collect();
        log::info!("disposing beacons matching pattern {pattern:?}: {ids:?}");

        ids.iter().map(|id| self.dispose(id)).filter(|disposed| *disposed).count()
    }

    /// Disposes every beacon and clears the ledger.
    pub fn dispose_all(&mut self) -> usize {
        let ids: Vec<String> = self.beacons.keys().cloned().collect();
        let disposed = ids.iter().map(|id| self.dispose(id)).filter(|disposed| *disposed).count();
        self.ledger.clear();
        disposed
    }

    /// Sets the ceiling, clamped to `[1, 16]`, and returns the applied value.
    pub fn set_max_beacons(&mut self, requested: usize) -> usize {
        self.max_beacons = clamp_max_beacons(requested);
        log::info!("max beacons set to: {}", self.max_beacons);
        if self.beacons.len() > self.max_beacons {
            log::debug!(
                "{} beacons live above the new ceiling; no new beacons until some are disposed",
                self.beacons.len()
            );
        }
        self.max_beacons
    }

    pub fn max_beacons(&self) -> usize {
        self.max_beacons
    }

    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    pub fn available_slots(&self) -> usize {
        self.max_beacons.saturating_sub(self.beacons.len())
    }

    /// Live ids in lexical order.
    pub fn ids(&self) -> Vec<String> {
        self.beacons.keys().cloned().collect()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
