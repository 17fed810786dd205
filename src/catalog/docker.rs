//! Docker daemon catalog client.
//!
//! [`DockerCatalog`] implements [`RuntimeCatalog`] against a local Docker
//! daemon via `bollard`, using the same environment-driven connection rules
//! as the Docker CLI (`DOCKER_HOST` when set, the default socket otherwise).

use async_trait::async_trait;
use bollard::Docker;
use bollard::volume::ListVolumesOptions;
use tracing::{debug, instrument};

use crate::catalog::RuntimeCatalog;
use crate::error::PluginError;
use crate::types::CatalogVolume;

/// Catalog backed by the local Docker daemon.
pub struct DockerCatalog {
    docker: Docker,
}

impl DockerCatalog {
    /// Connect using the daemon's local defaults (honors `DOCKER_HOST`).
    pub fn from_env() -> Result<Self, PluginError> {
        let docker = Docker::connect_with_local_defaults().map_err(PluginError::catalog)?;
        Ok(Self { docker })
    }

    /// Wrap an existing `bollard` client.
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl RuntimeCatalog for DockerCatalog {
    #[instrument(skip(self))]
    async fn list_volumes(&self) -> Result<Vec<CatalogVolume>, PluginError> {
        let response = self
            .docker
            .list_volumes(None::<ListVolumesOptions<String>>)
            .await
            .map_err(PluginError::catalog)?;

        let volumes: Vec<CatalogVolume> = response
            .volumes
            .unwrap_or_default()
            .into_iter()
            .map(|v| CatalogVolume {
                name: v.name,
                driver: v.driver,
            })
            .collect();
        debug!(count = volumes.len(), "catalog volumes listed");
        Ok(volumes)
    }

    #[instrument(skip(self))]
    async fn delete_volume(&self, name: &str) -> Result<(), PluginError> {
        self.docker
            .remove_volume(name, None)
            .await
            .map_err(PluginError::catalog)?;
        debug!(%name, "catalog volume deleted");
        Ok(())
    }
}
