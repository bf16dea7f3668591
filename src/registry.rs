//! Bounded source registry
//!
//! Fixed-capacity table of tracked capture sources. Entries are tombstoned
//! on removal and their slots reused by later registrations, so the table
//! never grows past its capacity and per-tick scans stay cheap. All access
//! is serialized by the engine's registry mutex.

use tracing::warn;

use crate::sources::{CaptureSource, SourceDescriptor};

pub struct SourceRegistry {
    slots: Vec<CaptureSource>,
    capacity: usize,
}

impl SourceRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Find-or-create an entry by name, (re)extracting the target app from
    /// the descriptor. Returns `None` when the table is full; the source is
    /// then simply not tracked.
    pub fn register(
        &mut self,
        name: &str,
        descriptor: &SourceDescriptor,
    ) -> Option<&mut CaptureSource> {
        if let Some(idx) = self.position(name) {
            let entry = &mut self.slots[idx];
            entry.target_app = descriptor.target_app();
            entry.active = descriptor.active;
            entry.hooked = false;
            return Some(entry);
        }

        // Reuse a tombstoned slot before growing the table.
        let idx = match self.slots.iter().position(|slot| !slot.in_use) {
            Some(idx) => idx,
            None if self.slots.len() < self.capacity => {
                self.slots.push(CaptureSource {
                    name: String::new(),
                    target_app: String::new(),
                    hooked: false,
                    active: false,
                    in_use: false,
                });
                self.slots.len() - 1
            }
            None => {
                warn!(
                    "Source table full ({} entries); not tracking '{}'",
                    self.capacity, name
                );
                return None;
            }
        };

        self.slots[idx] = CaptureSource {
            name: name.to_string(),
            target_app: descriptor.target_app(),
            hooked: false,
            active: descriptor.active,
            in_use: true,
        };
        Some(&mut self.slots[idx])
    }

    /// Mark a tracked source active/inactive. Unknown names are ignored.
    pub fn set_active(&mut self, name: &str, active: bool) {
        if let Some(idx) = self.position(name) {
            self.slots[idx].active = active;
        }
    }

    /// Tombstone a tracked source. Unknown names are ignored.
    pub fn remove(&mut self, name: &str) {
        if let Some(idx) = self.position(name) {
            self.slots[idx].in_use = false;
        }
    }

    pub fn get(&self, name: &str) -> Option<&CaptureSource> {
        self.position(name).map(|idx| &self.slots[idx])
    }

    /// Iterate over the in-use entries mutably (poller's hooked updates)
    pub fn in_use_mut(&mut self) -> impl Iterator<Item = &mut CaptureSource> {
        self.slots.iter_mut().filter(|slot| slot.in_use)
    }

    /// Clone the in-use entries, in slot order
    pub fn snapshot(&self) -> Vec<CaptureSource> {
        self.slots
            .iter()
            .filter(|slot| slot.in_use)
            .cloned()
            .collect()
    }

    /// Aggregate presence: any source both active and hooked
    pub fn any_hooked(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.in_use && slot.hooked && slot.active)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.in_use && slot.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window_descriptor(target: &str) -> SourceDescriptor {
        SourceDescriptor::new("window_capture", json!({ "window": target }))
    }

    #[test]
    fn test_register_and_snapshot() {
        let mut registry = SourceRegistry::new(4);
        registry.register("S1", &window_descriptor("Code.exe")).unwrap();
        registry.register("S2", &window_descriptor("firefox")).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "S1");
        assert_eq!(snapshot[0].target_app, "Code.exe");
        assert!(!snapshot[0].hooked);
        assert!(!snapshot[0].active);
    }

    #[test]
    fn test_reregister_updates_target_and_resets_hooked() {
        let mut registry = SourceRegistry::new(4);
        registry.register("S1", &window_descriptor("Code.exe")).unwrap();
        registry.in_use_mut().for_each(|s| s.hooked = true);

        registry.register("S1", &window_descriptor("firefox")).unwrap();
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].target_app, "firefox");
        assert!(!snapshot[0].hooked);
    }

    #[test]
    fn test_capacity_overflow_drops_silently() {
        let mut registry = SourceRegistry::new(2);
        assert!(registry.register("S1", &window_descriptor("a")).is_some());
        assert!(registry.register("S2", &window_descriptor("b")).is_some());
        assert!(registry.register("S3", &window_descriptor("c")).is_none());

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.iter().all(|s| s.name != "S3"));
    }

    #[test]
    fn test_tombstoned_slot_is_reused() {
        let mut registry = SourceRegistry::new(2);
        registry.register("S1", &window_descriptor("a")).unwrap();
        registry.register("S2", &window_descriptor("b")).unwrap();

        registry.remove("S1");
        assert!(registry.get("S1").is_none());

        // The freed slot accepts a new source even though the table was full.
        assert!(registry.register("S3", &window_descriptor("c")).is_some());
        let names: Vec<_> = registry.snapshot().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["S3", "S2"]);
    }

    #[test]
    fn test_tombstoned_entries_do_not_contribute_to_aggregate() {
        let mut registry = SourceRegistry::new(2);
        registry.register("S1", &window_descriptor("a")).unwrap();
        registry.set_active("S1", true);
        registry.in_use_mut().for_each(|s| s.hooked = true);
        assert!(registry.any_hooked());

        registry.remove("S1");
        assert!(!registry.any_hooked());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn test_set_active_unknown_name_is_ignored() {
        let mut registry = SourceRegistry::new(2);
        registry.set_active("ghost", true);
        assert!(registry.snapshot().is_empty());
    }
}
