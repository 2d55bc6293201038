use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde_json::json;
use tokio::time::Instant;
use volumio_http::{
    backoff_delay, CancellationToken, ClientConfig, Command, RequestDescriptor, RequestEngine,
    Transport, TransportError, TransportResponse, VolumioClient, VolumioError,
};

type Reply = Result<TransportResponse, TransportError>;

/// Replays scripted replies in order, failing once the script runs out.
#[derive(Clone)]
struct ScriptedTransport {
    script: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    fn new(script: Vec<Reply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for ScriptedTransport {
    async fn send(
        &self,
        _url: &str,
        _request: &RequestDescriptor,
        _headers: &HeaderMap,
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .expect("script mutex must not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::other("connection refused")))
    }
}

/// Never answers.
struct HangingTransport;

impl Transport for HangingTransport {
    async fn send(
        &self,
        _url: &str,
        _request: &RequestDescriptor,
        _headers: &HeaderMap,
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        std::future::pending().await
    }
}

/// Fails every request whose URL contains `failing_path`.
#[derive(Clone, Default)]
struct PathTransport {
    failing_path: &'static str,
    urls: Arc<Mutex<Vec<String>>>,
}

impl Transport for PathTransport {
    async fn send(
        &self,
        url: &str,
        _request: &RequestDescriptor,
        _headers: &HeaderMap,
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.urls
            .lock()
            .expect("url log mutex must not be poisoned")
            .push(url.to_owned());
        tokio::time::sleep(Duration::from_millis(10)).await;
        if url.contains(self.failing_path) {
            Err(TransportError::other("connection reset"))
        } else {
            Ok(ok(r#"{"status":"play"}"#))
        }
    }
}

/// Records the headers handed over on each attempt.
#[derive(Clone, Default)]
struct HeaderRecordingTransport {
    seen: Arc<Mutex<Vec<HeaderMap>>>,
}

impl Transport for HeaderRecordingTransport {
    async fn send(
        &self,
        _url: &str,
        _request: &RequestDescriptor,
        headers: &HeaderMap,
        _timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.seen
            .lock()
            .expect("header log mutex must not be poisoned")
            .push(headers.clone());
        Ok(ok("{}"))
    }
}

fn ok(body: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        body: body.to_owned(),
    }
}

fn refused() -> Reply {
    Err(TransportError::other("connection refused"))
}

fn config(max_attempts: usize) -> ClientConfig {
    ClientConfig::new("http://volumio.test/")
        .with_max_attempts(max_attempts)
        .expect("attempts must be valid")
}

fn total_backoff(failed_attempts: usize) -> Duration {
    (1..=failed_attempts).map(backoff_delay).sum()
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_k_minus_one_transient_failures() {
    for k in 1..=4 {
        let mut script: Vec<Reply> = (1..k).map(|_| refused()).collect();
        script.push(Ok(ok(r#"{"status":"play"}"#)));
        let transport = ScriptedTransport::new(script);
        let engine = RequestEngine::with_transport(config(k), transport.clone());

        let started = Instant::now();
        let result = engine
            .execute(&Command::GetState)
            .await
            .expect("last attempt must succeed");

        assert_eq!(result, json!({"status": "play"}));
        assert_eq!(transport.calls(), k, "k = {k}");
        assert!(started.elapsed() >= total_backoff(k - 1), "k = {k}");
    }
}

#[tokio::test(start_paused = true)]
async fn always_failing_transport_exhausts_after_k_attempts() {
    for k in 1..=4 {
        let transport = ScriptedTransport::new(Vec::new());
        let engine = RequestEngine::with_transport(config(k), transport.clone());

        let started = Instant::now();
        let err = engine
            .execute(&Command::Toggle)
            .await
            .expect_err("every attempt fails");

        match err {
            VolumioError::ExhaustedRetries { attempts, source } => {
                assert_eq!(attempts, k);
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("expected exhausted retries, got {other:?}"),
        }
        assert_eq!(transport.calls(), k, "k = {k}");
        assert!(started.elapsed() >= total_backoff(k - 1), "k = {k}");
    }
}

#[tokio::test(start_paused = true)]
async fn backoff_waits_exactly_between_attempts() {
    let transport = ScriptedTransport::new(vec![refused(), refused(), Ok(ok("{}"))]);
    let engine = RequestEngine::with_transport(config(3), transport.clone());

    let started = Instant::now();
    engine
        .execute(&Command::Pause)
        .await
        .expect("third attempt must succeed");

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(200 + 400), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(200 + 400 + 800), "{elapsed:?}");
    assert_eq!(transport.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn any_delivered_response_ends_the_loop() {
    let transport = ScriptedTransport::new(vec![Ok(TransportResponse {
        status: 500,
        body: r#"{"error":"x"}"#.to_owned(),
    })]);
    let volumio = VolumioClient::with_transport(config(3), transport.clone());

    let result = volumio.next().await.expect("5xx is a result, not an error");

    assert_eq!(result, json!({"error": "x"}));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_during_backoff_stops_retrying() {
    let transport = ScriptedTransport::new(Vec::new());
    let token = CancellationToken::new();
    let volumio = VolumioClient::with_transport(config(5), transport.clone())
        .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        token.cancel();
    });

    let err = volumio.get_queue().await.expect_err("call must be cancelled");
    canceller.await.expect("canceller must finish");

    assert!(matches!(err, VolumioError::Cancelled { attempts: 2 }));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_aborts_in_flight_attempt() {
    let token = CancellationToken::new();
    let engine = RequestEngine::with_transport(config(3), HangingTransport);

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        })
    };

    let err = engine
        .execute_with_cancellation(&Command::GetState, &token)
        .await
        .expect_err("call must be cancelled");
    canceller.await.expect("canceller must finish");

    assert!(matches!(err, VolumioError::Cancelled { attempts: 1 }));
}

#[tokio::test]
async fn pre_cancelled_token_never_touches_transport() {
    let transport = ScriptedTransport::new(vec![Ok(ok("{}"))]);
    let token = CancellationToken::new();
    token.cancel();
    let volumio =
        VolumioClient::with_transport(config(3), transport.clone()).with_cancellation(token);

    let err = volumio.ping().await.expect_err("call must be cancelled");

    assert!(matches!(err, VolumioError::Cancelled { .. }));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_keep_separate_retry_state() {
    let transport = PathTransport {
        failing_path: "getQueue",
        ..PathTransport::default()
    };
    let volumio = VolumioClient::with_transport(config(3), transport.clone());

    let (state, queue) = tokio::join!(volumio.get_state(), volumio.get_queue());

    assert_eq!(state.expect("get_state must succeed"), json!({"status": "play"}));
    assert!(matches!(
        queue,
        Err(VolumioError::ExhaustedRetries { attempts: 3, .. })
    ));

    let urls = transport.urls.lock().expect("url log mutex must not be poisoned");
    let state_calls = urls.iter().filter(|url| url.ends_with("/getState")).count();
    let queue_calls = urls.iter().filter(|url| url.ends_with("/getQueue")).count();
    assert_eq!(state_calls, 1);
    assert_eq!(queue_calls, 3);
    assert!(urls.iter().all(|url| url.starts_with("http://volumio.test/api/v1/")));
}

#[tokio::test]
async fn custom_transport_receives_configured_headers() {
    let transport = HeaderRecordingTransport::default();
    let config = config(1)
        .with_header(header::ACCEPT, HeaderValue::from_static("text/plain"))
        .with_header(
            HeaderName::from_static("x-volumio-client"),
            HeaderValue::from_static("tests"),
        );
    let volumio = VolumioClient::with_transport(config, transport.clone());

    volumio.get_state().await.expect("get_state must succeed");
    volumio
        .add_push_notification_url("http://hook.local/cb")
        .await
        .expect("add must succeed");

    let seen = transport.seen.lock().expect("header log mutex must not be poisoned");
    assert_eq!(seen.len(), 2);
    for headers in seen.iter() {
        assert_eq!(headers[header::ACCEPT], "text/plain");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers["x-volumio-client"], "tests");
    }
}
