//! Reconciliation between the local registry and the runtime's catalog.
//!
//! The runtime's catalog is the authoritative list of volumes it believes
//! belong to this plugin.  Cleanup deletes from the catalog every volume known
//! to *both* sides: catalog records for other drivers are ignored, and catalog
//! records with no local entry are left alone.  Deletes are best-effort — a
//! single failure never aborts the sweep; the caller receives one
//! [`RemoveVolumeAttempt`] per intersected volume either way.
//!
//! The registry is only read here.  Local entries for volumes the sweep
//! deleted stay in the registry for a later `remove` or a process restart to
//! collect.

use tracing::{debug, info, instrument, warn};

use crate::catalog::RuntimeCatalog;
use crate::error::PluginError;
use crate::registry::VolumeRegistry;
use crate::types::RemoveVolumeAttempt;

/// Run one cleanup sweep.
///
/// Returns every attempt record on success; when any catalog delete fails the
/// records travel inside [`PluginError::Cleanup`] instead, so the caller still
/// sees the full per-volume outcome.  A failure to *list* the catalog aborts
/// with [`PluginError::Catalog`] before any delete is attempted.
#[instrument(skip(registry, catalog))]
pub(crate) async fn run(
    driver_name: &str,
    registry: &VolumeRegistry,
    catalog: &dyn RuntimeCatalog,
) -> Result<Vec<RemoveVolumeAttempt>, PluginError> {
    let catalog_volumes = catalog.list_volumes().await?;

    // Intersect the catalog's view with ours, holding the read lock only for
    // this step and copying the matching entries out.
    let volumes = {
        let known = registry.read().await;
        catalog_volumes
            .into_iter()
            .filter(|record| record.driver == driver_name)
            .filter_map(|record| known.get(&record.name))
            .collect::<Vec<_>>()
    };
    debug!(count = volumes.len(), "volumes eligible for cleanup");

    let mut attempts = Vec::with_capacity(volumes.len());
    let mut failed = 0;
    for volume in volumes {
        let error = match catalog.delete_volume(&volume.name).await {
            Ok(()) => None,
            Err(e) => {
                warn!(name = %volume.name, error = %e, "catalog delete failed");
                failed += 1;
                Some(e.to_string())
            }
        };
        attempts.push(RemoveVolumeAttempt { volume, error });
    }

    if failed > 0 {
        return Err(PluginError::Cleanup { attempts, failed });
    }
    info!(count = attempts.len(), "cleanup complete");
    Ok(attempts)
}
