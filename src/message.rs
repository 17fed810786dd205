//! Volume-plugin protocol messages transmitted over QUIC.
//!
//! [`PluginMessage`] is the top-level envelope for all request and response
//! variants exchanged between the orchestrator-side client and the plugin
//! server via QUIC bi-directional streams.  Decoding is schema-validated: a
//! request missing a required field fails to deserialize and is rejected at
//! the transport boundary before it can reach the lifecycle engine.

use serde::{Deserialize, Serialize};

use crate::error::PluginError;
use crate::types::{ActivateResponse, CreateVolumeRequest, RemoveVolumeAttempt, Volume};

/// Top-level message envelope for the volume-plugin protocol.
///
/// Each QUIC bi-stream carries exactly one request followed by one response.
/// The client sends a *request* variant and the server replies with the
/// corresponding *response* variant (or [`PluginMessage::Error`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PluginMessage {
    // ----- Requests --------------------------------------------------------
    /// Activation handshake: ask which plugin roles this process implements.
    Activate,
    /// Create a named volume.
    Create(CreateVolumeRequest),
    /// Remove a volume.
    Remove {
        /// Volume to remove.
        name: String,
    },
    /// Query the current mount path of a volume.
    Path {
        /// Volume to query.
        name: String,
    },
    /// Mount a volume and return its mount path.
    Mount {
        /// Volume to mount.
        name: String,
    },
    /// Unmount a volume.
    Unmount {
        /// Volume to unmount.
        name: String,
    },
    /// Fetch a single volume's state.
    GetVolume {
        /// Volume to fetch.
        name: String,
    },
    /// List all volumes.
    ListVolumes,
    /// Reconcile against the runtime's catalog.
    Cleanup,

    // ----- Responses -------------------------------------------------------
    /// Generic success acknowledgement (no payload).
    Ok,
    /// Activation result.
    Activated(ActivateResponse),
    /// A mount path (for `Path` and `Mount`; may be empty for `Path`).
    Mountpoint(String),
    /// A single volume's state.
    VolumeInfo(Volume),
    /// All known volumes.
    VolumeList(Vec<Volume>),
    /// Per-volume outcomes of a fully successful cleanup sweep.  A sweep with
    /// failures comes back as [`PluginMessage::Error`] carrying
    /// [`PluginError::Cleanup`], which bundles the same records.
    CleanupResult(Vec<RemoveVolumeAttempt>),
    /// An error occurred.
    Error(PluginError),
}

impl PluginMessage {
    /// Reject requests whose required volume name is empty.
    ///
    /// Serde already rejects a *missing* name during decode; this covers the
    /// explicitly empty one, with the same generic error either way.
    pub fn validate(&self) -> Result<(), PluginError> {
        let name = match self {
            Self::Create(req) => Some(&req.name),
            Self::Remove { name }
            | Self::Path { name }
            | Self::Mount { name }
            | Self::Unmount { name }
            | Self::GetVolume { name } => Some(name),
            _ => None,
        };
        match name {
            Some(name) if name.is_empty() => Err(PluginError::MalformedRequest(
                "missing required parameter: name".to_owned(),
            )),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for PluginMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activate => f.write_str("Activate"),
            Self::Create(req) => write!(f, "Create(name={})", req.name),
            Self::Remove { name } => write!(f, "Remove({name})"),
            Self::Path { name } => write!(f, "Path({name})"),
            Self::Mount { name } => write!(f, "Mount({name})"),
            Self::Unmount { name } => write!(f, "Unmount({name})"),
            Self::GetVolume { name } => write!(f, "GetVolume({name})"),
            Self::ListVolumes => f.write_str("ListVolumes"),
            Self::Cleanup => f.write_str("Cleanup"),
            Self::Ok => f.write_str("Ok"),
            Self::Activated(resp) => {
                write!(f, "Activated(implements={})", resp.implements.join(","))
            }
            Self::Mountpoint(mountpoint) => write!(f, "Mountpoint({mountpoint})"),
            Self::VolumeInfo(volume) => write!(f, "VolumeInfo({})", volume.name),
            Self::VolumeList(volumes) => write!(f, "VolumeList(count={})", volumes.len()),
            Self::CleanupResult(attempts) => {
                write!(f, "CleanupResult(count={})", attempts.len())
            }
            Self::Error(e) => write!(f, "Error({e})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VolumeOpts;
    use std::collections::HashMap;

    #[test]
    fn message_serde_roundtrip() {
        let msg = PluginMessage::Create(CreateVolumeRequest {
            name: "v1".into(),
            opts: HashMap::from([("size".into(), "10g".into())]),
        });
        let json = serde_json::to_string(&msg).expect("serialize");
        let de: PluginMessage = serde_json::from_str(&json).expect("deserialize");
        assert!(matches!(de, PluginMessage::Create(req) if req.name == "v1"));
    }

    #[test]
    fn error_message_roundtrip() {
        let msg = PluginMessage::Error(PluginError::NotFound("v1".into()));
        let json = serde_json::to_string(&msg).expect("serialize");
        let de: PluginMessage = serde_json::from_str(&json).expect("deserialize");
        assert!(matches!(
            de,
            PluginMessage::Error(PluginError::NotFound(_))
        ));
    }

    #[test]
    fn decode_rejects_missing_name() {
        // Schema-validated decode: `name` is required, so the legacy untyped
        // "coerce whatever arrives" behavior cannot resurface here.
        let result = serde_json::from_str::<PluginMessage>(r#"{"Remove":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_empty_name() {
        let msg = PluginMessage::Mount { name: String::new() };
        let err = msg.validate().unwrap_err();
        assert!(matches!(err, PluginError::MalformedRequest(_)));

        let msg = PluginMessage::Create(CreateVolumeRequest {
            name: String::new(),
            opts: VolumeOpts::new(),
        });
        assert!(msg.validate().is_err());
    }

    #[test]
    fn validate_accepts_nameless_requests() {
        assert!(PluginMessage::Activate.validate().is_ok());
        assert!(PluginMessage::ListVolumes.validate().is_ok());
        assert!(PluginMessage::Cleanup.validate().is_ok());
    }

    #[test]
    fn display_formatting() {
        assert_eq!(PluginMessage::Ok.to_string(), "Ok");
        assert_eq!(
            PluginMessage::Mount { name: "v1".into() }.to_string(),
            "Mount(v1)"
        );
        assert_eq!(
            PluginMessage::Activated(ActivateResponse::default()).to_string(),
            "Activated(implements=VolumeDriver)"
        );
    }
}
