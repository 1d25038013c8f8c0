use std::collections::BTreeMap;
use std::fmt;

/// Point-in-time snapshot of the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub background_live: bool,
    pub beacon_count: usize,
    pub max_beacons: usize,
    pub beacon_ids: Vec<String>,
    /// Owned beacon count per registered component.
    pub component_breakdown: BTreeMap<String, usize>,
    pub context_lost: bool,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "background={} beacons={}/{} lost={}",
            if self.background_live { "live" } else { "off" },
            self.beacon_count,
            self.max_beacons,
            self.context_lost
        )?;
        for (component, count) in &self.component_breakdown {
            write!(f, " {component}:{count}")?;
        }
        Ok(())
    }
}
