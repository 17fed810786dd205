//! Pluggable storage backends.
//!
//! [`VolumeBackend`] is the capability the lifecycle engine delegates actual
//! storage operations to.  The engine owns all bookkeeping; a backend only
//! provisions, mounts, unmounts and removes storage.  Test doubles implement
//! the same trait, enabling deterministic engine tests without real storage.

pub mod localdir;

use async_trait::async_trait;

use crate::error::PluginError;
use crate::types::VolumeOpts;

/// Storage operations delegated by the lifecycle engine.
///
/// `opts` on every method is the map captured when the volume was created;
/// `mountpoint` on `remove`/`unmount` is the path recorded at mount time
/// (empty if the volume was never mounted).
#[async_trait]
pub trait VolumeBackend: Send + Sync {
    /// Provision storage for a new volume.
    async fn create(&self, name: &str, opts: &VolumeOpts) -> Result<(), PluginError>;

    /// Release the storage behind a volume.
    async fn remove(
        &self,
        name: &str,
        opts: &VolumeOpts,
        mountpoint: &str,
    ) -> Result<(), PluginError>;

    /// Mount the volume and return its mount path.
    ///
    /// A backend that fails after it already assigned a mount path should
    /// return [`PluginError::MountFailed`] carrying that path: the engine
    /// records a non-empty path in the registry even when the call fails.
    async fn mount(&self, name: &str, opts: &VolumeOpts) -> Result<String, PluginError>;

    /// Unmount the volume from the given path.
    async fn unmount(
        &self,
        name: &str,
        opts: &VolumeOpts,
        mountpoint: &str,
    ) -> Result<(), PluginError>;
}
