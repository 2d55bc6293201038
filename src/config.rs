use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::{Result, VolumioError};

/// Base address used when `VOLUMIO_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Attempt count used when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Connection settings for one Volumio device.
///
/// Built once and handed to [`crate::RequestEngine`], which never mutates it.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    max_attempts: usize,
    headers: HeaderMap,
}

impl ClientConfig {
    /// Creates a config for `base_url` with default timeout, attempts and headers.
    ///
    /// Trailing slashes are stripped, so `http://volumio.local/` and
    /// `http://volumio.local` are equivalent.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.as_ref()),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            headers: default_headers(),
        }
    }

    /// Creates a config from environment variables.
    ///
    /// Reads:
    /// - `VOLUMIO_API_URL`: device address (default `http://localhost:3000`)
    /// - `VOLUMIO_API_TIMEOUT`: per-attempt timeout in seconds (default 10)
    /// - `VOLUMIO_API_RETRIES`: total attempt count (default 3)
    ///
    /// Returns an error if a variable is set but empty or unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup("VOLUMIO_API_URL") {
            Some(url) if url.trim().is_empty() => {
                return Err(VolumioError::Config(
                    "VOLUMIO_API_URL is set but empty".to_owned(),
                ))
            }
            Some(url) => url,
            None => DEFAULT_BASE_URL.to_owned(),
        };

        let mut config = Self::new(base_url);

        if let Some(raw) = lookup("VOLUMIO_API_TIMEOUT") {
            let secs = parse_number::<u64>("VOLUMIO_API_TIMEOUT", &raw)?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(raw) = lookup("VOLUMIO_API_RETRIES") {
            let attempts = parse_number::<usize>("VOLUMIO_API_RETRIES", &raw)?;
            config = config.with_max_attempts(attempts)?;
        }

        Ok(config)
    }

    /// Sets the timeout applied to each individual attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the total number of attempts per call, including the first one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Result<Self> {
        if max_attempts == 0 {
            return Err(VolumioError::Config(
                "max attempts must be at least 1".to_owned(),
            ));
        }
        self.max_attempts = max_attempts;
        Ok(self)
    }

    /// Adds a header sent with every request, replacing any existing value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_owned()
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VolumioError::Config(format!("{key} is set but empty")));
    }
    trimmed
        .parse()
        .map_err(|_| VolumioError::Config(format!("{key} must be a number, got '{trimmed}'")))
}
