use std::{future::Future, time::Duration};

use serde_json::{Map, Value};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    ApiResult, ClientConfig, Command, HttpTransport, Result, Transport, TransportError,
    VolumioError,
};

/// Unit of the exponential backoff: attempt `n` waits `2^n` units.
const BACKOFF_UNIT_MS: u64 = 100;

/// Result of a single attempt inside the retry loop.
#[derive(Debug)]
enum AttemptOutcome {
    Success(ApiResult),
    Retryable(TransportError),
    Fatal(TransportError),
}

/// Executes commands against one device with bounded retries.
///
/// Holds no per-call state, so one engine serves any number of concurrent
/// calls through `&self`.
#[derive(Clone, Debug)]
pub struct RequestEngine<T = HttpTransport> {
    transport: T,
    config: ClientConfig,
}

impl RequestEngine<HttpTransport> {
    /// Creates an engine with a `reqwest` transport built from `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T> RequestEngine<T> {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl<T: Transport> RequestEngine<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { transport, config }
    }

    /// Encodes and sends `command`, retrying transport failures.
    ///
    /// Any response that reaches the client is returned as a result, including
    /// 4xx and 5xx replies. Only transport failures are retried.
    pub async fn execute(&self, command: &Command) -> Result<ApiResult> {
        self.run(command, None).await
    }

    /// Like [`RequestEngine::execute`], but aborts the in-flight attempt or
    /// pending backoff as soon as `cancel` fires.
    pub async fn execute_with_cancellation(
        &self,
        command: &Command,
        cancel: &CancellationToken,
    ) -> Result<ApiResult> {
        self.run(command, Some(cancel)).await
    }

    async fn run(
        &self,
        command: &Command,
        cancel: Option<&CancellationToken>,
    ) -> Result<ApiResult> {
        let request = command.encode();
        let url = format!("{}{}", self.config.base_url(), request.path_and_query());
        let max_attempts = self.config.max_attempts();
        let mut attempt = 1usize;

        loop {
            let send = self.transport.send(
                &url,
                &request,
                self.config.headers(),
                self.config.timeout(),
            );
            let outcome = match until_cancelled(cancel, send).await {
                Some(Ok(response)) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        "volumio {} answered with status {}",
                        command.name(),
                        response.status
                    );
                    AttemptOutcome::Success(decode_body(&response.body))
                }
                Some(Err(cause)) if attempt < max_attempts => AttemptOutcome::Retryable(cause),
                Some(Err(cause)) => AttemptOutcome::Fatal(cause),
                None => return Err(VolumioError::Cancelled { attempts: attempt }),
            };

            match outcome {
                AttemptOutcome::Success(result) => return Ok(result),
                AttemptOutcome::Retryable(cause) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        "volumio {} failed (attempt {attempt}/{max_attempts}): {cause}",
                        command.name()
                    );
                    #[cfg(not(feature = "tracing"))]
                    let _ = cause;

                    let delay = backoff_delay(attempt);

                    #[cfg(feature = "tracing")]
                    tracing::debug!("retrying volumio request after {} ms", delay.as_millis());

                    if until_cancelled(cancel, sleep(delay)).await.is_none() {
                        return Err(VolumioError::Cancelled { attempts: attempt });
                    }
                    attempt += 1;
                }
                AttemptOutcome::Fatal(cause) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(
                        "volumio {} failed (attempt {attempt}/{max_attempts}), giving up: {cause}",
                        command.name()
                    );
                    return Err(VolumioError::ExhaustedRetries {
                        attempts: attempt,
                        source: cause,
                    });
                }
            }
        }
    }
}

/// Wait before the attempt following failed attempt `attempt` (1-indexed).
///
/// Exponents past 63 are clamped and the product saturates, so the delay keeps
/// growing monotonically up to `u64::MAX` milliseconds.
pub fn backoff_delay(attempt: usize) -> Duration {
    let exp = attempt.min(63) as u32;
    let multiplier = 1u64 << exp;
    Duration::from_millis(BACKOFF_UNIT_MS.saturating_mul(multiplier))
}

/// Decodes a response body, degrading to an empty object on anything that is
/// not a non-null JSON document.
pub(crate) fn decode_body(body: &str) -> ApiResult {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => Value::Object(Map::new()),
        Ok(value) => value,
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("volumio response is not JSON, using empty result: {_err}");
            Value::Object(Map::new())
        }
    }
}

async fn until_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    future: F,
) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => None,
            output = future => Some(output),
        },
        None => Some(future.await),
    }
}
