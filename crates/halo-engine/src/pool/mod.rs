//! Bounded rendering-context pool.
//!
//! | Type | Role |
//! |------|------|
//! | [`ContextManager`] | façade owned by the composition root |
//! | [`BackgroundSlot`] | the one shared full-screen context |
//! | [`BeaconPool`] | capped per-widget contexts keyed by id |
//! | [`Ledger`] | component → beacon attribution |
//!
//! Everything runs on one thread. Entries are handed out as [`EntryRef`]s so
//! callers can populate render graphs directly.

mod background;
mod beacon;
mod config;
mod entry;
mod error;
mod ledger;
mod manager;
mod stats;

pub use background::{BackgroundSlot, BackgroundState};
pub use beacon::{BeaconPool, UNKNOWN_COMPONENT};
pub use config::{DEFAULT_MAX_BEACONS, MAX_BEACONS, MIN_BEACONS, PoolConfig, clamp_max_beacons};
pub use entry::{EntryRef, RenderContextEntry};
pub use error::AllocationError;
pub use ledger::{Allocation, Ledger};
pub use manager::ContextManager;
pub use stats::PoolStats;
