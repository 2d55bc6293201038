use std::{future::Future, time::Duration};

use reqwest::header::HeaderMap;

use crate::{RequestDescriptor, Result, TransportError, VolumioError};

/// Response that completed transport-level delivery, whatever its status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Capability used by [`crate::RequestEngine`] to put one request on the wire.
///
/// Implementations perform a single attempt and never retry on their own.
/// `headers` carries the configured header set and must be sent as-is.
pub trait Transport: Send + Sync {
    /// Sends `request` to `url` with `headers`, giving up after `timeout`.
    fn send(
        &self,
        url: &str,
        request: &RequestDescriptor,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> impl Future<Output = std::result::Result<TransportResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport. The connection pool is shared by every clone.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(VolumioError::Client)?;
        Ok(Self { http })
    }

    /// Wraps an existing client, e.g. one with custom TLS settings.
    ///
    /// The configured headers are still applied to every request.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        request: &RequestDescriptor,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        // Applied after `.json()` so a configured Content-Type wins.
        let builder = builder.headers(headers.clone()).timeout(timeout);

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}
