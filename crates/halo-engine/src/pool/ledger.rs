use std::collections::BTreeMap;

/// Allocation record of one owning component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Slots asked for at registration.
    pub requested: usize,
    /// `min(requested, free slots)` at registration. Advisory only.
    pub granted: usize,
    /// Live beacon ids attributed to the component, in creation order.
    pub owned: Vec<String>,
}

/// Component → allocation bookkeeping.
///
/// Pure bookkeeping: capacity is enforced by the beacon pool at creation time,
/// never here.
#[derive(Debug, Default)]
pub struct Ledger {
    records: BTreeMap<String, Allocation>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a registration. Ids already attributed to the component are kept.
    pub fn record_registration(&mut self, component: &str, requested: usize, granted: usize) {
        let record = self.records.entry(component.to_string()).or_default();
        record.requested = requested;
        record.granted = granted;
    }

    /// Attributes a live beacon to `component`, creating the record if needed.
    pub fn attribute(&mut self, component: &str, id: &str) {
        let record = self.records.entry(component.to_string()).or_default();
        if !record.owned.iter().any(|owned| owned == id) {
            record.owned.push(id.to_string());
        }
    }

    /// Removes `id` from the first record that owns it and returns that component.
    pub fn release(&mut self, id: &str) -> Option<&str> {
        for (component, record) in self.records.iter_mut() {
            if let Some(pos) = record.owned.iter().position(|owned| owned == id) {
                record.owned.remove(pos);
                return Some(component.as_str());
            }
        }
        None
    }

    /// Drops a component's record entirely.
    pub fn remove(&mut self, component: &str) -> Option<Allocation> {
        self.records.remove(component)
    }

    pub fn get(&self, component: &str) -> Option<&Allocation> {
        self.records.get(component)
    }

    /// Snapshot of the ids owned by `component`.
    pub fn owned_ids(&self, component: &str) -> Vec<String> {
        self.records
            .get(component)
            .map(|record| record.owned.clone())
            .unwrap_or_default()
    }

    /// Owned-id count per component.
    pub fn breakdown(&self) -> BTreeMap<String, usize> {
        self.records
            .iter()
            .map(|(component, record)| (component.clone(), record.owned.len()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Allocation)> {
        self.records.iter().map(|(component, record)| (component.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
