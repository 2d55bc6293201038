use std::{fmt, sync::Arc};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::{
    ApiResult, BrowseOptions, ClientConfig, Command, HttpTransport, QueueItem, ReplaceAndPlay,
    RequestEngine, Result, Switch, Transport, Volume,
};

/// Async client for the Volumio REST API of a single device.
///
/// Cloning is cheap: clones share one [`RequestEngine`] and its connection
/// pool.
pub struct VolumioClient<T = HttpTransport> {
    engine: Arc<RequestEngine<T>>,
    cancel: Option<CancellationToken>,
}

impl<T> Clone for VolumioClient<T> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            cancel: self.cancel.clone(),
        }
    }
}

impl<T> fmt::Debug for VolumioClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VolumioClient")
            .field("base_url", &self.engine.config().base_url())
            .field("timeout", &self.engine.config().timeout())
            .field("max_attempts", &self.engine.config().max_attempts())
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

impl VolumioClient<HttpTransport> {
    /// Creates a client for the device at `base_url` with default settings.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use volumio_http::VolumioClient;
    ///
    /// let volumio = VolumioClient::new("http://volumio.local").expect("client must build");
    /// ```
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_engine(RequestEngine::new(config)?))
    }

    /// Creates a client from `VOLUMIO_API_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`] for the variables read.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use volumio_http::VolumioClient;
    ///
    /// let volumio = VolumioClient::from_env().expect("invalid VOLUMIO_API_* env vars");
    /// ```
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }
}

impl<T: Transport> VolumioClient<T> {
    /// Creates a client that sends through a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self::from_engine(RequestEngine::with_transport(config, transport))
    }

    pub fn from_engine(engine: RequestEngine<T>) -> Self {
        Self {
            engine: Arc::new(engine),
            cancel: None,
        }
    }

    /// Returns a handle whose calls abort with [`crate::VolumioError::Cancelled`]
    /// once `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            cancel: Some(token),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.engine.config()
    }

    /// Sends any [`Command`] and returns the decoded body.
    pub async fn send(&self, command: Command) -> Result<ApiResult> {
        match &self.cancel {
            Some(token) => self.engine.execute_with_cancellation(&command, token).await,
            None => self.engine.execute(&command).await,
        }
    }

    /// Returns the current player state.
    pub async fn get_state(&self) -> Result<ApiResult> {
        self.send(Command::GetState).await
    }

    pub async fn get_queue(&self) -> Result<ApiResult> {
        self.send(Command::GetQueue).await
    }

    /// Toggles between play and pause.
    pub async fn toggle(&self) -> Result<ApiResult> {
        self.send(Command::Toggle).await
    }

    pub async fn pause(&self) -> Result<ApiResult> {
        self.send(Command::Pause).await
    }

    pub async fn next(&self) -> Result<ApiResult> {
        self.send(Command::Next).await
    }

    pub async fn previous(&self) -> Result<ApiResult> {
        self.send(Command::Previous).await
    }

    pub async fn stop(&self) -> Result<ApiResult> {
        self.send(Command::Stop).await
    }

    /// Sets an absolute level or applies a symbolic adjustment.
    pub async fn set_volume(&self, volume: Volume) -> Result<ApiResult> {
        self.send(Command::SetVolume(volume)).await
    }

    pub async fn volume_up(&self) -> Result<ApiResult> {
        self.set_volume(Volume::Plus).await
    }

    pub async fn volume_down(&self) -> Result<ApiResult> {
        self.set_volume(Volume::Minus).await
    }

    pub async fn mute(&self) -> Result<ApiResult> {
        self.set_volume(Volume::Mute).await
    }

    pub async fn unmute(&self) -> Result<ApiResult> {
        self.set_volume(Volume::Unmute).await
    }

    /// Plays the queue entry at `position`; `0` is the head of the queue.
    pub async fn play(&self, position: i64) -> Result<ApiResult> {
        self.send(Command::Play { position }).await
    }

    pub async fn clear_queue(&self) -> Result<ApiResult> {
        self.send(Command::ClearQueue).await
    }

    /// Sets repeat mode. Accepts a [`Switch`], a `bool` or an `Option<bool>`
    /// where `None` toggles.
    pub async fn repeat(&self, value: impl Into<Switch>) -> Result<ApiResult> {
        self.send(Command::Repeat(value.into())).await
    }

    /// Sets random mode, with the same argument rules as [`VolumioClient::repeat`].
    pub async fn random(&self, value: impl Into<Switch>) -> Result<ApiResult> {
        self.send(Command::Random(value.into())).await
    }

    pub async fn list_playlists(&self) -> Result<ApiResult> {
        self.send(Command::ListPlaylists).await
    }

    pub async fn play_playlist(&self, name: impl Into<String>) -> Result<ApiResult> {
        self.send(Command::PlayPlaylist { name: name.into() }).await
    }

    /// Lists a library location. `BrowseOptions::default()` lists the root.
    pub async fn browse(&self, options: BrowseOptions) -> Result<ApiResult> {
        self.send(Command::Browse(options)).await
    }

    pub async fn search(&self, query: impl Into<String>) -> Result<ApiResult> {
        self.send(Command::Search {
            query: query.into(),
        })
        .await
    }

    pub async fn add_to_queue<I>(&self, items: I) -> Result<ApiResult>
    where
        I: IntoIterator<Item = QueueItem>,
    {
        self.send(Command::AddToQueue(items.into_iter().collect())).await
    }

    /// Replaces the queue and starts playback.
    pub async fn replace_and_play(&self, request: impl Into<ReplaceAndPlay>) -> Result<ApiResult> {
        self.send(Command::ReplaceAndPlay(request.into())).await
    }

    pub async fn get_collection_stats(&self) -> Result<ApiResult> {
        self.send(Command::GetCollectionStats).await
    }

    pub async fn get_zones(&self) -> Result<ApiResult> {
        self.send(Command::GetZones).await
    }

    /// Pings the device.
    ///
    /// Returns the `response` field of the reply, or `"pong"` when the reply
    /// has none.
    pub async fn ping(&self) -> Result<String> {
        let result = self.send(Command::Ping).await?;
        Ok(ping_response(&result))
    }

    pub async fn get_system_version(&self) -> Result<ApiResult> {
        self.send(Command::GetSystemVersion).await
    }

    pub async fn get_system_info(&self) -> Result<ApiResult> {
        self.send(Command::GetSystemInfo).await
    }

    pub async fn get_push_notification_urls(&self) -> Result<ApiResult> {
        self.send(Command::GetPushNotificationUrls).await
    }

    /// Registers `url` to receive state change callbacks.
    pub async fn add_push_notification_url(&self, url: impl Into<String>) -> Result<ApiResult> {
        self.send(Command::AddPushNotificationUrl { url: url.into() }).await
    }

    pub async fn remove_push_notification_url(&self, url: impl Into<String>) -> Result<ApiResult> {
        self.send(Command::RemovePushNotificationUrl { url: url.into() }).await
    }
}

fn ping_response(result: &ApiResult) -> String {
    match result.get("response") {
        None | Some(Value::Null) => "pong".to_owned(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
