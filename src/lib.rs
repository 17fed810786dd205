//! # libvolume — volume-plugin protocol server for container runtimes
//!
//! `libvolume` implements the server side of a storage-plugin activation and
//! volume-lifecycle protocol: an orchestrator discovers the plugin, runs the
//! activation handshake, then drives named volumes through create, mount,
//! path, unmount and remove against a single long-lived process.  The process
//! keeps an authoritative, concurrency-safe registry of volumes and their
//! mount state, delegates storage work to a pluggable [`VolumeBackend`], and
//! can reconcile its view against the runtime's own volume catalog on demand.
//! Transport uses QUIC (via [`quinn`]) with a JSON message envelope, and the
//! crate follows Tokio async conventions with `tracing` for observability and
//! `thiserror` for structured errors.
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |---|---|
//! | [`types`] | Core data model: `Volume`, requests, cleanup records. |
//! | [`error`] | [`PluginError`] enum covering all failure modes. |
//! | [`registry`] | Lock-disciplined in-memory store of volume state. |
//! | [`engine`] | [`VolumeEngine`] — the lifecycle state machine. |
//! | [`backend`] | [`VolumeBackend`] trait and the local-directory backend. |
//! | [`catalog`] | [`RuntimeCatalog`] trait and the Docker daemon client. |
//! | [`message`] | [`PluginMessage`] protocol envelope for QUIC transport. |
//! | [`transport`] | QUIC client/server built on `quinn`. |

pub mod backend;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod message;
mod reconcile;
pub mod registry;
pub mod transport;
pub mod types;

// Re-export the most commonly used items at crate root for convenience.
pub use backend::VolumeBackend;
pub use catalog::RuntimeCatalog;
pub use engine::VolumeEngine;
pub use error::PluginError;
pub use message::PluginMessage;
pub use registry::VolumeRegistry;
pub use transport::{PluginClient, PluginServer};
pub use types::*;
