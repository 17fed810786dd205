//! The in-memory volume registry.
//!
//! [`VolumeRegistry`] is the authoritative store of known volumes and their
//! mount state, guarded by a single reader/writer lock shared by the whole
//! registry.  There are no per-volume locks: all mutating lifecycle operations
//! serialize through the one write lock, which keeps same-name operations
//! linearized at the cost of cross-volume throughput.  The expected call
//! volume is orchestrator-triggered lifecycle events, not a hot data path.
//!
//! The lifecycle engine acquires a guard via [`VolumeRegistry::read`] /
//! [`VolumeRegistry::write`] and holds it for the full duration of an
//! operation, so precondition checks and the subsequent mutation happen in one
//! critical section.

use std::collections::HashMap;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::types::Volume;

/// The map of volumes keyed by name, accessed through a registry guard.
///
/// `get` and `list` hand out independent copies of the stored volumes.  This
/// copy-on-read discipline is load-bearing: callers can never observe or
/// corrupt registry-internal state through an aliased reference, and a volume
/// snapshot never changes mid-iteration while another task mutates the map.
#[derive(Debug, Default)]
pub struct VolumeMap {
    volumes: HashMap<String, Volume>,
}

impl VolumeMap {
    /// Copy of the volume with the given name, if present.
    pub fn get(&self, name: &str) -> Option<Volume> {
        self.volumes.get(name).cloned()
    }

    /// Whether a volume with the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.volumes.contains_key(name)
    }

    /// Copies of all stored volumes, in no particular order.
    pub fn list(&self) -> Vec<Volume> {
        self.volumes.values().cloned().collect()
    }

    /// Number of stored volumes.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Whether the registry holds no volumes.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Store a volume under its name, replacing any previous entry.
    pub fn insert(&mut self, volume: Volume) {
        self.volumes.insert(volume.name.clone(), volume);
    }

    /// Remove and return the volume with the given name.
    pub fn remove(&mut self, name: &str) -> Option<Volume> {
        self.volumes.remove(name)
    }

    /// Overwrite the mountpoint of a stored volume.
    ///
    /// Returns `false` if no volume with that name exists; the caller checked
    /// the precondition under the same write guard, so `false` here indicates
    /// a concurrency-discipline bug rather than an expected condition.
    pub fn set_mountpoint(&mut self, name: &str, mountpoint: impl Into<String>) -> bool {
        match self.volumes.get_mut(name) {
            Some(volume) => {
                volume.mountpoint = mountpoint.into();
                true
            }
            None => false,
        }
    }
}

/// Concurrency-safe registry of volumes, scoped to one engine instance.
#[derive(Debug, Default)]
pub struct VolumeRegistry {
    inner: RwLock<VolumeMap>,
}

impl VolumeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the shared read guard.  Read-only operations (`path`,
    /// `get_volume`, `list_volumes`, the cleanup intersection) use this.
    pub async fn read(&self) -> RwLockReadGuard<'_, VolumeMap> {
        self.inner.read().await
    }

    /// Acquire the exclusive write guard.  Mutating operations hold this for
    /// their full duration, including the backend call.
    pub async fn write(&self) -> RwLockWriteGuard<'_, VolumeMap> {
        self.inner.write().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VolumeOpts;
    use std::collections::HashMap;

    #[tokio::test]
    async fn insert_get_remove() {
        let registry = VolumeRegistry::new();

        {
            let mut vols = registry.write().await;
            vols.insert(Volume::new("v1", VolumeOpts::new()));
            assert!(vols.contains("v1"));
        }

        {
            let vols = registry.read().await;
            assert_eq!(vols.len(), 1);
            assert_eq!(vols.get("v1").unwrap().name, "v1");
            assert!(vols.get("missing").is_none());
        }

        {
            let mut vols = registry.write().await;
            let removed = vols.remove("v1").unwrap();
            assert_eq!(removed.name, "v1");
            assert!(vols.is_empty());
        }
    }

    #[tokio::test]
    async fn get_returns_independent_copy() {
        let registry = VolumeRegistry::new();
        registry
            .write()
            .await
            .insert(Volume::new("v1", HashMap::from([("k".into(), "v".into())])));

        // Mutating the copy must not affect the stored volume.
        let mut copy = registry.read().await.get("v1").unwrap();
        copy.mountpoint = "/mnt/hijack".into();
        copy.opts.insert("k".into(), "changed".into());

        let stored = registry.read().await.get("v1").unwrap();
        assert!(stored.mountpoint.is_empty());
        assert_eq!(stored.opts["k"], "v");
    }

    #[tokio::test]
    async fn list_returns_independent_copies() {
        let registry = VolumeRegistry::new();
        registry.write().await.insert(Volume::new("v1", VolumeOpts::new()));

        let mut listed = registry.read().await.list();
        listed[0].mountpoint = "/mnt/hijack".into();

        assert!(registry.read().await.get("v1").unwrap().mountpoint.is_empty());
    }

    #[tokio::test]
    async fn set_mountpoint_updates_stored_volume() {
        let registry = VolumeRegistry::new();
        registry.write().await.insert(Volume::new("v1", VolumeOpts::new()));

        {
            let mut vols = registry.write().await;
            assert!(vols.set_mountpoint("v1", "/mnt/v1"));
            assert!(!vols.set_mountpoint("missing", "/mnt/missing"));
        }

        assert_eq!(registry.read().await.get("v1").unwrap().mountpoint, "/mnt/v1");
    }

    #[tokio::test]
    async fn insert_replaces_previous_entry() {
        let registry = VolumeRegistry::new();
        let mut vols = registry.write().await;
        vols.insert(Volume::new("v1", VolumeOpts::new()));
        vols.insert(Volume {
            name: "v1".into(),
            opts: VolumeOpts::new(),
            mountpoint: "/mnt/v1".into(),
        });
        assert_eq!(vols.len(), 1);
        assert_eq!(vols.get("v1").unwrap().mountpoint, "/mnt/v1");
    }
}
