//! Halo engine crate.
//!
//! Owns every GPU rendering context of a page-style application: one shared
//! full-screen background and a capped pool of small per-widget "beacons",
//! each driven by its own frame loop and torn down deterministically.
//!
//! | Module | Role |
//! |--------|------|
//! | [`pool`] | admission, lifecycle, ledger, stats |
//! | [`device`] | context factories, capability profiles, drawing surfaces |
//! | [`graph`] | scene nodes, cameras, releasable GPU resources |
//! | [`anim`] | frame loops with optional frame-rate ceiling |
//! | [`schedule`] | injectable frame scheduler |
//! | [`dispose`] | release order for graphs and contexts |

pub mod anim;
pub mod coords;
pub mod device;
pub mod dispose;
pub mod graph;
pub mod logging;
pub mod paint;
pub mod pool;
pub mod render;
pub mod schedule;
pub mod time;

#[cfg(test)]
mod testing;
