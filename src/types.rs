//! Core volume-plugin types: volumes, requests, and catalog records.
//!
//! These types form the data model shared by the lifecycle engine, the
//! transport layer, and the backend/catalog capabilities.  They are all
//! [`Serialize`]/[`Deserialize`] so they can be transmitted over QUIC as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Capability string advertised during the activation handshake.
pub const VOLUME_DRIVER_CAPABILITY: &str = "VolumeDriver";

/// Backend-specific creation parameters, e.g. size or filesystem type.
///
/// Captured once at creation time; every later backend call for the volume
/// receives this exact map, never opts supplied afterwards.
pub type VolumeOpts = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Volume
// ---------------------------------------------------------------------------

/// A named, backend-provisioned storage unit tracked by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Unique volume name, immutable after creation.
    pub name: String,
    /// Creation parameters, immutable after creation.
    #[serde(default)]
    pub opts: VolumeOpts,
    /// Current mount path; empty while the volume is not mounted.
    #[serde(default)]
    pub mountpoint: String,
}

impl Volume {
    /// A freshly created, unmounted volume.
    pub fn new(name: impl Into<String>, opts: VolumeOpts) -> Self {
        Self {
            name: name.into(),
            opts,
            mountpoint: String::new(),
        }
    }

    /// Whether the volume is currently mounted.
    pub fn is_mounted(&self) -> bool {
        !self.mountpoint.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Requests & responses
// ---------------------------------------------------------------------------

/// Request to create a new volume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateVolumeRequest {
    /// Name for the new volume.
    pub name: String,
    /// Parameters forwarded to the backend on every call for this volume.
    #[serde(default)]
    pub opts: VolumeOpts,
}

/// Payload of the activation handshake: the plugin roles this process
/// implements.  Stateless and idempotent; the orchestrator issues it once
/// after discovering the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateResponse {
    /// Advertised plugin roles.
    pub implements: Vec<String>,
}

impl Default for ActivateResponse {
    fn default() -> Self {
        Self {
            implements: vec![VOLUME_DRIVER_CAPABILITY.to_owned()],
        }
    }
}

// ---------------------------------------------------------------------------
// Cleanup records
// ---------------------------------------------------------------------------

/// Outcome of one catalog delete attempted during cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveVolumeAttempt {
    /// The volume the delete was attempted for, as known locally.
    pub volume: Volume,
    /// Failure reason, if the catalog delete failed.
    #[serde(default)]
    pub error: Option<String>,
}

/// A volume record as reported by the container runtime's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogVolume {
    /// Volume name in the runtime's catalog.
    pub name: String,
    /// Name of the driver the runtime recorded for this volume.
    pub driver: String,
}
