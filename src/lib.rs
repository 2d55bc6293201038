//! `volumio-http` is an async HTTP client for the Volumio REST API.
//!
//! Every player operation is encoded into a single request against
//! `/api/v1/` and executed with bounded exponential backoff:
//! - [`VolumioClient`] exposes one method per operation
//! - [`Command`] maps an operation to its [`RequestDescriptor`]
//! - [`RequestEngine`] runs the retry loop over a [`Transport`]

mod client;
mod command;
mod config;
mod engine;
mod error;
mod params;
mod transport;
mod wire;

pub use client::VolumioClient;
pub use command::{Command, RequestBody, RequestDescriptor};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT};
pub use engine::{backoff_delay, RequestEngine};
pub use error::{TransportError, VolumioError};
pub use params::{BrowseOptions, Switch, Volume};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use wire::{QueueItem, ReplaceAndPlay};

pub use tokio_util::sync::CancellationToken;

/// Decoded response body. The schema differs per operation.
pub type ApiResult = serde_json::Value;

pub type Result<T> = std::result::Result<T, VolumioError>;
