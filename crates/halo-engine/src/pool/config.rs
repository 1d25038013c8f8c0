use crate::anim::BEACON_TARGET_FPS;
use crate::device::CapabilityProfile;

/// Smallest admissible beacon ceiling.
pub const MIN_BEACONS: usize = 1;
/// Largest admissible beacon ceiling.
pub const MAX_BEACONS: usize = 16;
pub const DEFAULT_MAX_BEACONS: usize = 10;

/// Clamps a requested beacon ceiling to `[MIN_BEACONS, MAX_BEACONS]`.
#[inline]
pub fn clamp_max_beacons(requested: usize) -> usize {
    requested.clamp(MIN_BEACONS, MAX_BEACONS)
}

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Initial beacon ceiling; clamped when the manager is built.
    pub max_beacons: usize,

    /// Frame-rate ceiling for beacon loops.
    pub beacon_fps: u32,

    pub background_profile: CapabilityProfile,
    pub beacon_profile: CapabilityProfile,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_beacons: DEFAULT_MAX_BEACONS,
            beacon_fps: BEACON_TARGET_FPS,
            background_profile: CapabilityProfile::background(),
            beacon_profile: CapabilityProfile::beacon(),
        }
    }
}
