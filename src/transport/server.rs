//! QUIC server that accepts orchestrator connections and dispatches incoming
//! requests to the lifecycle engine.

use std::net::SocketAddr;
use std::sync::Arc;

use quinn::crypto::rustls::QuicServerConfig;
use tracing::{debug, error, info, instrument, warn};

use crate::engine::VolumeEngine;
use crate::error::PluginError;
use crate::message::PluginMessage;
use crate::types::ActivateResponse;

/// Upper bound on a single request or response payload.
const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// A volume-plugin server that accepts QUIC connections and dispatches
/// [`PluginMessage`] requests to a [`VolumeEngine`].
pub struct PluginServer {
    endpoint: quinn::Endpoint,
    engine: Arc<VolumeEngine>,
}

impl PluginServer {
    /// Create a new server bound to `addr`.
    pub fn new(
        addr: SocketAddr,
        tls_config: rustls::ServerConfig,
        engine: Arc<VolumeEngine>,
    ) -> Result<Self, PluginError> {
        let quic_server_config = QuicServerConfig::try_from(tls_config)
            .map_err(|e| PluginError::Transport(format!("invalid TLS config: {e}")))?;
        let server_config = quinn::ServerConfig::with_crypto(Arc::new(quic_server_config));
        let endpoint =
            quinn::Endpoint::server(server_config, addr).map_err(PluginError::transport)?;
        info!(%addr, "volume plugin server listening");
        Ok(Self { endpoint, engine })
    }

    /// Accept connections in a loop until the endpoint is closed.
    ///
    /// Each accepted connection spawns a Tokio task, and each bi-stream
    /// within a connection is handled concurrently.
    pub async fn serve(&self) -> Result<(), PluginError> {
        while let Some(incoming) = self.endpoint.accept().await {
            let engine = Arc::clone(&self.engine);
            tokio::spawn(async move {
                match incoming.await {
                    Ok(conn) => {
                        let remote = conn.remote_address();
                        debug!(%remote, "plugin connection accepted");
                        if let Err(e) = Self::handle_connection(conn, engine).await {
                            warn!(%remote, error = %e, "plugin connection error");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "incoming connection failed");
                    }
                }
            });
        }
        Ok(())
    }

    /// Handle all bi-streams on a single connection.
    async fn handle_connection(
        conn: quinn::Connection,
        engine: Arc<VolumeEngine>,
    ) -> Result<(), PluginError> {
        loop {
            let (send, recv) = match conn.accept_bi().await {
                Ok(stream) => stream,
                Err(quinn::ConnectionError::ApplicationClosed(_)) => return Ok(()),
                Err(e) => return Err(PluginError::transport(e)),
            };

            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                if let Err(e) = Self::handle_stream(send, recv, &engine).await {
                    error!(error = %e, "plugin stream handler error");
                }
            });
        }
    }

    /// Process a single bi-stream: read request → dispatch → write response.
    #[instrument(skip_all)]
    async fn handle_stream(
        mut send: quinn::SendStream,
        mut recv: quinn::RecvStream,
        engine: &VolumeEngine,
    ) -> Result<(), PluginError> {
        let buf = recv
            .read_to_end(MAX_MESSAGE_BYTES)
            .await
            .map_err(PluginError::transport)?;

        // Schema-validated decode: a payload missing required fields never
        // reaches the engine, it is answered with a MalformedRequest error.
        let response = match serde_json::from_slice::<PluginMessage>(&buf) {
            Ok(request) => {
                debug!(%request, "plugin request received");
                Self::dispatch(engine, request).await
            }
            Err(e) => PluginMessage::Error(PluginError::MalformedRequest(e.to_string())),
        };

        let payload = serde_json::to_vec(&response).map_err(PluginError::internal)?;
        send.write_all(&payload)
            .await
            .map_err(PluginError::transport)?;
        send.finish().map_err(PluginError::transport)?;
        Ok(())
    }

    /// Map a [`PluginMessage`] request to the correct engine call and wrap
    /// the result in a response [`PluginMessage`].
    async fn dispatch(engine: &VolumeEngine, request: PluginMessage) -> PluginMessage {
        if let Err(e) = request.validate() {
            return PluginMessage::Error(e);
        }
        match request {
            // Stateless handshake; the registry is not involved.
            PluginMessage::Activate => PluginMessage::Activated(ActivateResponse::default()),

            PluginMessage::Create(req) => match engine.create(&req.name, req.opts).await {
                Ok(()) => PluginMessage::Ok,
                Err(e) => PluginMessage::Error(e),
            },
            PluginMessage::Remove { name } => match engine.remove(&name).await {
                Ok(()) => PluginMessage::Ok,
                Err(e) => PluginMessage::Error(e),
            },
            PluginMessage::Path { name } => match engine.path(&name).await {
                Ok(mountpoint) => PluginMessage::Mountpoint(mountpoint),
                Err(e) => PluginMessage::Error(e),
            },
            PluginMessage::Mount { name } => match engine.mount(&name).await {
                Ok(mountpoint) => PluginMessage::Mountpoint(mountpoint),
                // A MountFailed error still carries the partial mountpoint.
                Err(e) => PluginMessage::Error(e),
            },
            PluginMessage::Unmount { name } => match engine.unmount(&name).await {
                Ok(()) => PluginMessage::Ok,
                Err(e) => PluginMessage::Error(e),
            },
            PluginMessage::GetVolume { name } => match engine.get_volume(&name).await {
                Ok(volume) => PluginMessage::VolumeInfo(volume),
                Err(e) => PluginMessage::Error(e),
            },
            PluginMessage::ListVolumes => {
                PluginMessage::VolumeList(engine.list_volumes().await)
            }
            PluginMessage::Cleanup => match engine.cleanup().await {
                Ok(attempts) => PluginMessage::CleanupResult(attempts),
                Err(e) => PluginMessage::Error(e),
            },

            // Response variants should never arrive as requests.
            other => {
                warn!(msg = %other, "unexpected message variant received as request");
                PluginMessage::Error(PluginError::MalformedRequest(format!(
                    "unexpected message: {other}"
                )))
            }
        }
    }

    /// The underlying QUIC endpoint, useful for obtaining the local address
    /// or shutting down.
    pub fn endpoint(&self) -> &quinn::Endpoint {
        &self.endpoint
    }
}
