//! QUIC client used by an orchestrator (or tests) to issue volume-plugin
//! requests.

use std::net::SocketAddr;
use std::sync::Arc;

use quinn::crypto::rustls::QuicClientConfig;
use tracing::{debug, instrument};

use crate::error::PluginError;
use crate::message::PluginMessage;
use crate::types::{ActivateResponse, CreateVolumeRequest, RemoveVolumeAttempt, Volume, VolumeOpts};

/// Upper bound on a single response payload.
const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// A lightweight plugin client that sends [`PluginMessage`] requests over a
/// single QUIC connection and returns the server's response.
///
/// The typed wrappers ([`create`](Self::create), [`mount`](Self::mount), …)
/// cover the whole operation surface; [`request`](Self::request) remains
/// available for raw envelope exchanges.
pub struct PluginClient {
    connection: quinn::Connection,
}

impl PluginClient {
    /// Establish a new QUIC connection to the plugin server at `addr`.
    ///
    /// * `addr` — socket address of the remote plugin server
    /// * `server_name` — TLS SNI name that must match a SAN in the server's
    ///   certificate
    /// * `tls_config` — client TLS configuration
    pub async fn connect(
        addr: SocketAddr,
        server_name: &str,
        tls_config: rustls::ClientConfig,
    ) -> Result<Self, PluginError> {
        let quic_client_config = QuicClientConfig::try_from(tls_config)
            .map_err(|e| PluginError::Transport(format!("invalid TLS config: {e}")))?;
        let client_config = quinn::ClientConfig::new(Arc::new(quic_client_config));

        let mut endpoint = quinn::Endpoint::client(
            "0.0.0.0:0"
                .parse()
                .map_err(PluginError::internal)?,
        )
        .map_err(PluginError::transport)?;
        endpoint.set_default_client_config(client_config);

        let connection = endpoint
            .connect(addr, server_name)
            .map_err(PluginError::transport)?
            .await
            .map_err(PluginError::transport)?;

        debug!(%addr, %server_name, "plugin connection established");
        Ok(Self { connection })
    }

    /// Send a request and wait for the corresponding response.
    ///
    /// Each call opens a new bi-directional QUIC stream, writes the
    /// JSON-serialized request, finishes the send side, then reads the full
    /// response and deserializes it.
    #[instrument(skip(self), fields(msg = %msg))]
    pub async fn request(&self, msg: &PluginMessage) -> Result<PluginMessage, PluginError> {
        let (mut send, mut recv) = self
            .connection
            .open_bi()
            .await
            .map_err(PluginError::transport)?;

        let payload = serde_json::to_vec(msg).map_err(PluginError::internal)?;
        send.write_all(&payload)
            .await
            .map_err(PluginError::transport)?;
        send.finish().map_err(PluginError::transport)?;

        let buf = recv
            .read_to_end(MAX_MESSAGE_BYTES)
            .await
            .map_err(PluginError::transport)?;

        let response: PluginMessage =
            serde_json::from_slice(&buf).map_err(PluginError::transport)?;
        debug!(%response, "plugin response received");
        Ok(response)
    }

    /// Run the activation handshake.
    pub async fn activate(&self) -> Result<ActivateResponse, PluginError> {
        match self.request(&PluginMessage::Activate).await? {
            PluginMessage::Activated(resp) => Ok(resp),
            other => Self::unexpected(other),
        }
    }

    /// Create a volume with the given creation parameters.
    pub async fn create(&self, name: &str, opts: VolumeOpts) -> Result<(), PluginError> {
        let request = PluginMessage::Create(CreateVolumeRequest {
            name: name.to_owned(),
            opts,
        });
        match self.request(&request).await? {
            PluginMessage::Ok => Ok(()),
            other => Self::unexpected(other),
        }
    }

    /// Remove a volume.
    pub async fn remove(&self, name: &str) -> Result<(), PluginError> {
        let request = PluginMessage::Remove {
            name: name.to_owned(),
        };
        match self.request(&request).await? {
            PluginMessage::Ok => Ok(()),
            other => Self::unexpected(other),
        }
    }

    /// Current mount path of a volume; empty while unmounted.
    pub async fn path(&self, name: &str) -> Result<String, PluginError> {
        let request = PluginMessage::Path {
            name: name.to_owned(),
        };
        match self.request(&request).await? {
            PluginMessage::Mountpoint(mountpoint) => Ok(mountpoint),
            other => Self::unexpected(other),
        }
    }

    /// Mount a volume and return its mount path.
    pub async fn mount(&self, name: &str) -> Result<String, PluginError> {
        let request = PluginMessage::Mount {
            name: name.to_owned(),
        };
        match self.request(&request).await? {
            PluginMessage::Mountpoint(mountpoint) => Ok(mountpoint),
            other => Self::unexpected(other),
        }
    }

    /// Unmount a volume.
    pub async fn unmount(&self, name: &str) -> Result<(), PluginError> {
        let request = PluginMessage::Unmount {
            name: name.to_owned(),
        };
        match self.request(&request).await? {
            PluginMessage::Ok => Ok(()),
            other => Self::unexpected(other),
        }
    }

    /// Fetch a single volume's state.
    pub async fn get_volume(&self, name: &str) -> Result<Volume, PluginError> {
        let request = PluginMessage::GetVolume {
            name: name.to_owned(),
        };
        match self.request(&request).await? {
            PluginMessage::VolumeInfo(volume) => Ok(volume),
            other => Self::unexpected(other),
        }
    }

    /// List all volumes.
    pub async fn list_volumes(&self) -> Result<Vec<Volume>, PluginError> {
        match self.request(&PluginMessage::ListVolumes).await? {
            PluginMessage::VolumeList(volumes) => Ok(volumes),
            other => Self::unexpected(other),
        }
    }

    /// Run a cleanup sweep.  On partial failure the returned
    /// [`PluginError::Cleanup`] carries every attempt record.
    pub async fn cleanup(&self) -> Result<Vec<RemoveVolumeAttempt>, PluginError> {
        match self.request(&PluginMessage::Cleanup).await? {
            PluginMessage::CleanupResult(attempts) => Ok(attempts),
            other => Self::unexpected(other),
        }
    }

    /// Close the underlying QUIC connection gracefully.
    pub fn close(&self) {
        self.connection
            .close(quinn::VarInt::from_u32(0), b"client shutdown");
    }

    fn unexpected<T>(message: PluginMessage) -> Result<T, PluginError> {
        match message {
            PluginMessage::Error(e) => Err(e),
            other => Err(PluginError::Transport(format!(
                "unexpected response: {other}"
            ))),
        }
    }
}
