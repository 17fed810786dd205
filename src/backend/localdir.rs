//! Directory-per-volume backend on the local filesystem.
//!
//! [`LocalDirBackend`] keeps each volume as a sub-directory of a configurable
//! root.  "Mounting" resolves to the volume's directory path, which is enough
//! for plugins that hand the orchestrator a host path to bind into containers.
//!
//! # On-disk layout
//!
//! ```text
//! <root>/
//!   <volume-name>/     # data directory, doubles as the mount path
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::backend::VolumeBackend;
use crate::error::PluginError;
use crate::types::VolumeOpts;

/// Local-filesystem backend storing each volume under `root`.
pub struct LocalDirBackend {
    root: PathBuf,
}

impl LocalDirBackend {
    /// Create a backend rooted at `root`.  The directory is created lazily on
    /// the first volume create.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the on-disk directory for a volume.
    fn volume_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn path_string(path: &Path) -> Result<String, PluginError> {
        path.to_str()
            .map(str::to_owned)
            .ok_or_else(|| PluginError::internal(format!("non-UTF8 volume path: {}", path.display())))
    }
}

#[async_trait]
impl VolumeBackend for LocalDirBackend {
    #[instrument(skip(self, opts))]
    async fn create(&self, name: &str, opts: &VolumeOpts) -> Result<(), PluginError> {
        let path = self.volume_path(name);
        if path.exists() {
            return Err(PluginError::Backend(format!(
                "volume directory already exists: {}",
                path.display()
            )));
        }
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| PluginError::Backend(format!("create dir {}: {e}", path.display())))?;
        info!(path = %path.display(), ?opts, "volume directory created");
        Ok(())
    }

    #[instrument(skip(self, _opts))]
    async fn remove(
        &self,
        name: &str,
        _opts: &VolumeOpts,
        _mountpoint: &str,
    ) -> Result<(), PluginError> {
        let path = self.volume_path(name);
        if !path.exists() {
            debug!(path = %path.display(), "volume directory already gone");
            return Ok(());
        }
        tokio::fs::remove_dir_all(&path)
            .await
            .map_err(|e| PluginError::Backend(format!("remove dir {}: {e}", path.display())))?;
        info!(path = %path.display(), "volume directory removed");
        Ok(())
    }

    #[instrument(skip(self, _opts))]
    async fn mount(&self, name: &str, _opts: &VolumeOpts) -> Result<String, PluginError> {
        let path = self.volume_path(name);
        let mountpoint = Self::path_string(&path)?;
        if !path.is_dir() {
            return Err(PluginError::MountFailed {
                name: name.to_owned(),
                mountpoint: String::new(),
                reason: format!("volume directory missing: {}", path.display()),
            });
        }
        debug!(%mountpoint, "volume mounted");
        Ok(mountpoint)
    }

    #[instrument(skip(self, _opts))]
    async fn unmount(
        &self,
        name: &str,
        _opts: &VolumeOpts,
        mountpoint: &str,
    ) -> Result<(), PluginError> {
        if !Path::new(mountpoint).is_dir() {
            return Err(PluginError::Backend(format!(
                "mountpoint missing: {mountpoint}"
            )));
        }
        debug!(%mountpoint, "volume unmounted");
        Ok(())
    }
}
