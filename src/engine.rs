//! The volume lifecycle engine.
//!
//! [`VolumeEngine`] validates and executes each lifecycle operation against
//! the registry, delegating storage side effects to the injected
//! [`VolumeBackend`].  Every mutating operation runs under the registry's
//! write lock for its full duration, backend call included, so operations on
//! the same name are linearized: two concurrent mounts cannot interleave, one
//! of them deterministically observes "already mounted".
//!
//! Commit ordering is asymmetric and deliberate:
//!
//! * `create` calls the backend *before* inserting — a volume the backend
//!   failed to provision must never enter the registry, or it would accept
//!   later mount/remove calls against nothing.
//! * `remove`, `mount` and `unmount` commit the registry change even when the
//!   backend call fails — once a volume exists, the protocol contract with
//!   the orchestrator requires the local view of mount state to move so a
//!   retrying caller is not permanently blocked by a stale precondition
//!   check.  Backend errors are still surfaced to the caller.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::backend::VolumeBackend;
use crate::catalog::RuntimeCatalog;
use crate::error::PluginError;
use crate::reconcile;
use crate::registry::VolumeRegistry;
use crate::types::{RemoveVolumeAttempt, Volume, VolumeOpts};

/// Lifecycle state machine over a [`VolumeRegistry`], with storage and
/// catalog capabilities injected at construction.
pub struct VolumeEngine {
    driver_name: String,
    registry: VolumeRegistry,
    backend: Arc<dyn VolumeBackend>,
    catalog: Arc<dyn RuntimeCatalog>,
}

impl VolumeEngine {
    /// Create an engine with an empty registry.
    ///
    /// `driver_name` is the identity this plugin is registered under with the
    /// runtime; cleanup only touches catalog volumes recorded for it.
    pub fn new(
        driver_name: impl Into<String>,
        backend: Arc<dyn VolumeBackend>,
        catalog: Arc<dyn RuntimeCatalog>,
    ) -> Self {
        Self {
            driver_name: driver_name.into(),
            registry: VolumeRegistry::new(),
            backend,
            catalog,
        }
    }

    /// The driver identity this engine reconciles under.
    pub fn driver_name(&self) -> &str {
        &self.driver_name
    }

    /// Create a volume.  The backend provisions storage first; the registry
    /// is not mutated when provisioning fails.
    #[instrument(skip(self, opts))]
    pub async fn create(&self, name: &str, opts: VolumeOpts) -> Result<(), PluginError> {
        let mut volumes = self.registry.write().await;
        if volumes.contains(name) {
            return Err(PluginError::AlreadyExists(name.to_owned()));
        }
        self.backend.create(name, &opts).await?;
        volumes.insert(Volume::new(name, opts));
        info!(%name, "volume created");
        Ok(())
    }

    /// Remove a volume.  The entry is dropped from the registry before the
    /// backend call commits; a failed backend removal is surfaced to the
    /// caller but does not restore the entry.
    #[instrument(skip(self))]
    pub async fn remove(&self, name: &str) -> Result<(), PluginError> {
        let mut volumes = self.registry.write().await;
        let volume = volumes
            .remove(name)
            .ok_or_else(|| PluginError::NotFound(name.to_owned()))?;
        self.backend
            .remove(&volume.name, &volume.opts, &volume.mountpoint)
            .await?;
        info!(%name, "volume removed");
        Ok(())
    }

    /// Current mount path of a volume; empty while unmounted.
    #[instrument(skip(self))]
    pub async fn path(&self, name: &str) -> Result<String, PluginError> {
        let volumes = self.registry.read().await;
        volumes
            .get(name)
            .map(|volume| volume.mountpoint)
            .ok_or_else(|| PluginError::NotFound(name.to_owned()))
    }

    /// Mount a volume and return its mount path.
    ///
    /// The mountpoint the backend returns is recorded in the registry even
    /// when the backend call also fails, so the failure error carries the
    /// partial path back to the caller.
    #[instrument(skip(self))]
    pub async fn mount(&self, name: &str) -> Result<String, PluginError> {
        let mut volumes = self.registry.write().await;
        let volume = volumes
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_owned()))?;
        if volume.is_mounted() {
            return Err(PluginError::AlreadyMounted {
                name: volume.name,
                mountpoint: volume.mountpoint,
            });
        }
        match self.backend.mount(&volume.name, &volume.opts).await {
            Ok(mountpoint) => {
                volumes.set_mountpoint(name, mountpoint.clone());
                info!(%name, %mountpoint, "volume mounted");
                Ok(mountpoint)
            }
            Err(PluginError::MountFailed {
                mountpoint, reason, ..
            }) => {
                volumes.set_mountpoint(name, mountpoint.clone());
                warn!(%name, %mountpoint, %reason, "backend mount failed");
                Err(PluginError::MountFailed {
                    name: name.to_owned(),
                    mountpoint,
                    reason,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Unmount a volume.  The registry's mountpoint is cleared before the
    /// backend call; a backend failure is surfaced after the clear and is not
    /// rolled back.
    #[instrument(skip(self))]
    pub async fn unmount(&self, name: &str) -> Result<(), PluginError> {
        let mut volumes = self.registry.write().await;
        let volume = volumes
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_owned()))?;
        if !volume.is_mounted() {
            return Err(PluginError::NotMounted(name.to_owned()));
        }
        volumes.set_mountpoint(name, "");
        self.backend
            .unmount(&volume.name, &volume.opts, &volume.mountpoint)
            .await?;
        info!(%name, "volume unmounted");
        Ok(())
    }

    /// Snapshot of a single volume.
    #[instrument(skip(self))]
    pub async fn get_volume(&self, name: &str) -> Result<Volume, PluginError> {
        let volumes = self.registry.read().await;
        volumes
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_owned()))
    }

    /// Snapshot of all volumes, in no particular order.
    pub async fn list_volumes(&self) -> Vec<Volume> {
        self.registry.read().await.list()
    }

    /// Reconcile against the runtime's catalog: delete every volume known to
    /// both sides from the catalog, best-effort, one attempt record each.
    #[instrument(skip(self))]
    pub async fn cleanup(&self) -> Result<Vec<RemoveVolumeAttempt>, PluginError> {
        reconcile::run(&self.driver_name, &self.registry, self.catalog.as_ref()).await
    }
}
