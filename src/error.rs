//! Volume-plugin error types.
//!
//! All errors in the crate are represented by the [`PluginError`] enum, which
//! derives [`thiserror::Error`] for ergonomic error handling and also
//! implements [`Serialize`]/[`Deserialize`] so errors can travel across the
//! QUIC transport layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::RemoveVolumeAttempt;

/// Unified error type for volume-plugin operations.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// A volume with this name was already created.
    #[error("volume already created: {0}")]
    AlreadyExists(String),

    /// The volume is already mounted; it must be unmounted first.
    #[error("volume already mounted: {name} at {mountpoint}")]
    AlreadyMounted {
        /// Name of the volume.
        name: String,
        /// Path it is currently mounted at.
        mountpoint: String,
    },

    /// No volume with this name exists in the registry.
    #[error("volume does not exist: {0}")]
    NotFound(String),

    /// The volume is not mounted, so it cannot be unmounted.
    #[error("volume not mounted: {0}")]
    NotMounted(String),

    /// The backend failed to mount the volume.
    ///
    /// `mountpoint` carries the path the backend had already assigned when it
    /// failed, if any; the registry records a non-empty path regardless of the
    /// failure, so a retrying caller is not blocked by a stale state check.
    #[error("mount failed for {name}: {reason}")]
    MountFailed {
        /// Name of the volume.
        name: String,
        /// Partially assigned mount path, empty if none was assigned.
        mountpoint: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The storage backend returned an error.
    #[error("backend error: {0}")]
    Backend(String),

    /// The runtime catalog could not be queried.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// One or more catalog deletes failed during cleanup.
    ///
    /// Bundles every attempt record, including the successful ones, so the
    /// caller still receives the full per-volume outcome list.
    #[error("cleanup failed for {failed} of {} volumes", .attempts.len())]
    Cleanup {
        /// One record per volume the cleanup touched.
        attempts: Vec<RemoveVolumeAttempt>,
        /// How many of those attempts failed.
        failed: usize,
    },

    /// A request could not be decoded or was missing a required parameter.
    /// Raised at the transport boundary; never reaches the lifecycle engine.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A QUIC / transport-level error.
    #[error("transport error: {0}")]
    Transport(String),

    /// An unclassified internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PluginError {
    /// Create a [`PluginError::Backend`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn backend<E: std::fmt::Display>(e: E) -> Self {
        Self::Backend(e.to_string())
    }

    /// Create a [`PluginError::Catalog`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn catalog<E: std::fmt::Display>(e: E) -> Self {
        Self::Catalog(e.to_string())
    }

    /// Create a [`PluginError::Transport`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn transport<E: std::fmt::Display>(e: E) -> Self {
        Self::Transport(e.to_string())
    }

    /// Create a [`PluginError::Internal`] from anything that implements
    /// [`std::fmt::Display`].
    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Volume;

    #[test]
    fn error_display() {
        let err = PluginError::NotFound("v1".into());
        assert_eq!(err.to_string(), "volume does not exist: v1");

        let err = PluginError::AlreadyMounted {
            name: "v1".into(),
            mountpoint: "/mnt/v1".into(),
        };
        assert_eq!(err.to_string(), "volume already mounted: v1 at /mnt/v1");
    }

    #[test]
    fn cleanup_display_counts_attempts() {
        let vol = Volume::new("v1", Default::default());
        let err = PluginError::Cleanup {
            attempts: vec![
                RemoveVolumeAttempt {
                    volume: vol.clone(),
                    error: Some("boom".into()),
                },
                RemoveVolumeAttempt {
                    volume: vol,
                    error: None,
                },
            ],
            failed: 1,
        };
        assert_eq!(err.to_string(), "cleanup failed for 1 of 2 volumes");
    }

    #[test]
    fn error_serde_roundtrip() {
        let err = PluginError::MountFailed {
            name: "v1".into(),
            mountpoint: "/mnt/v1".into(),
            reason: "permission denied".into(),
        };
        let json = serde_json::to_string(&err).expect("serialize");
        let de: PluginError = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(err, de);
    }
}
