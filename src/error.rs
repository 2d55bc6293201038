/// Failure to deliver a request and receive any response.
///
/// Every variant is treated as transient by the request engine.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network, timeout or body-read error from `reqwest`.
    #[error("{0}")]
    Reqwest(#[from] reqwest::Error),
    /// Failure reported by a non-`reqwest` transport.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Builds a transport error from a free-form message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Returns `true` when the attempt ran into the per-attempt timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Reqwest(err) => err.is_timeout(),
            Self::Other(_) => false,
        }
    }
}

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum VolumioError {
    /// Every permitted attempt failed at the transport level.
    #[error("volumio request failed after {attempts} attempts: {source}")]
    ExhaustedRetries {
        /// Number of attempts issued.
        attempts: usize,
        /// Cause of the last failed attempt.
        #[source]
        source: TransportError,
    },
    /// The caller cancelled the request before it completed.
    #[error("volumio request cancelled after {attempts} attempts")]
    Cancelled { attempts: usize },
    /// Volume level outside `0..=100`.
    #[error("invalid volume level {0}: expected 0-100")]
    InvalidVolume(u8),
    /// Missing or malformed configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The underlying HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(reqwest::Error),
}
