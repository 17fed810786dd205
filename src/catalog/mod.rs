//! Clients of the container runtime's volume catalog.
//!
//! The runtime keeps its own list of volumes per plugin; it is the external
//! authority the reconciler cross-checks the local registry against.
//! [`RuntimeCatalog`] is the capability boundary; [`docker::DockerCatalog`]
//! talks to a local Docker daemon, and test doubles implement the same trait.

pub mod docker;

use async_trait::async_trait;

use crate::error::PluginError;
use crate::types::CatalogVolume;

/// Query/delete access to the runtime's volume catalog.
#[async_trait]
pub trait RuntimeCatalog: Send + Sync {
    /// All volumes the runtime knows about, across every driver.  The caller
    /// filters by driver identity.
    async fn list_volumes(&self) -> Result<Vec<CatalogVolume>, PluginError>;

    /// Delete a volume from the runtime's catalog by name.
    async fn delete_volume(&self, name: &str) -> Result<(), PluginError>;
}
