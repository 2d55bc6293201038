//! Mapping from player operations to wire requests.
//!
//! Encoding is pure: a [`Command`] becomes a [`RequestDescriptor`] without
//! touching the network. Arguments are passed through untransformed, apart
//! from URL-encoding of query values when the descriptor is rendered.

use reqwest::Method;
use serde::Serialize;
use url::form_urlencoded;

use crate::{
    wire::{QueueItem, ReplaceAndPlay},
    BrowseOptions, Switch, Volume,
};

const COMMANDS_PATH: &str = "/api/v1/commands/";
const PUSH_NOTIFICATION_URLS_PATH: &str = "/api/v1/pushNotificationUrls";

/// A single Volumio REST operation with its arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    GetState,
    GetQueue,
    Toggle,
    Pause,
    Next,
    Previous,
    Stop,
    SetVolume(Volume),
    /// Play the queue entry at `position`. The device validates the index.
    Play { position: i64 },
    ClearQueue,
    Repeat(Switch),
    Random(Switch),
    ListPlaylists,
    PlayPlaylist { name: String },
    Browse(BrowseOptions),
    Search { query: String },
    AddToQueue(Vec<QueueItem>),
    ReplaceAndPlay(ReplaceAndPlay),
    GetCollectionStats,
    GetZones,
    Ping,
    GetSystemVersion,
    GetSystemInfo,
    GetPushNotificationUrls,
    AddPushNotificationUrl { url: String },
    RemovePushNotificationUrl { url: String },
}

/// JSON payload of a `POST` request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    QueueItems(Vec<QueueItem>),
    ReplaceAndPlay(ReplaceAndPlay),
    PushNotificationUrl { url: String },
}

/// Method, path, query and body of one wire request.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: &'static str,
    /// Unencoded query pairs, in wire order.
    pub query: Vec<(&'static str, String)>,
    pub body: Option<RequestBody>,
}

impl RequestDescriptor {
    fn get(path: &'static str) -> Self {
        Self {
            method: Method::GET,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    fn command(cmd: &str) -> Self {
        Self::get(COMMANDS_PATH).param("cmd", cmd)
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.query.push((name, value.into()));
        self
    }

    fn optional_param<T: ToString>(self, name: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.param(name, value.to_string()),
            None => self,
        }
    }

    /// Path with the form-encoded query string appended, if any.
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            return self.path.to_owned();
        }

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.query {
            serializer.append_pair(name, value);
        }
        format!("{}?{}", self.path, serializer.finish())
    }
}

impl Command {
    /// Operation name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetState => "getState",
            Self::GetQueue => "getQueue",
            Self::Toggle => "toggle",
            Self::Pause => "pause",
            Self::Next => "next",
            Self::Previous => "previous",
            Self::Stop => "stop",
            Self::SetVolume(_) => "setVolume",
            Self::Play { .. } => "play",
            Self::ClearQueue => "clearQueue",
            Self::Repeat(_) => "repeat",
            Self::Random(_) => "random",
            Self::ListPlaylists => "listPlaylists",
            Self::PlayPlaylist { .. } => "playPlaylist",
            Self::Browse(_) => "browse",
            Self::Search { .. } => "search",
            Self::AddToQueue(_) => "addToQueue",
            Self::ReplaceAndPlay(_) => "replaceAndPlay",
            Self::GetCollectionStats => "getCollectionStats",
            Self::GetZones => "getZones",
            Self::Ping => "ping",
            Self::GetSystemVersion => "getSystemVersion",
            Self::GetSystemInfo => "getSystemInfo",
            Self::GetPushNotificationUrls => "getPushNotificationUrls",
            Self::AddPushNotificationUrl { .. } => "addPushNotificationUrl",
            Self::RemovePushNotificationUrl { .. } => "removePushNotificationUrl",
        }
    }

    /// Builds the wire request for this operation.
    pub fn encode(&self) -> RequestDescriptor {
        match self {
            Self::GetState => RequestDescriptor::get("/api/v1/getState"),
            Self::GetQueue => RequestDescriptor::get("/api/v1/getQueue"),
            Self::Toggle => RequestDescriptor::command("toggle"),
            Self::Pause => RequestDescriptor::command("pause"),
            Self::Next => RequestDescriptor::command("next"),
            Self::Previous => RequestDescriptor::command("prev"),
            Self::Stop => RequestDescriptor::command("stop"),
            Self::SetVolume(volume) => {
                RequestDescriptor::command("volume").param("volume", volume.as_query_value())
            }
            Self::Play { position } => {
                RequestDescriptor::command("play").param("N", position.to_string())
            }
            Self::ClearQueue => RequestDescriptor::command("clearQueue"),
            Self::Repeat(switch) => RequestDescriptor::command("repeat")
                .optional_param("value", switch.as_query_value()),
            Self::Random(switch) => RequestDescriptor::command("random")
                .optional_param("value", switch.as_query_value()),
            Self::ListPlaylists => RequestDescriptor::get("/api/v1/listplaylists"),
            Self::PlayPlaylist { name } => {
                RequestDescriptor::command("playplaylist").param("name", name.as_str())
            }
            Self::Browse(options) => RequestDescriptor::get("/api/v1/browse")
                .optional_param("uri", options.uri.as_deref())
                .optional_param("limit", options.limit)
                .optional_param("offset", options.offset),
            Self::Search { query } => {
                RequestDescriptor::get("/api/v1/search").param("query", query.as_str())
            }
            Self::AddToQueue(items) => RequestDescriptor {
                method: Method::POST,
                path: "/api/v1/addToQueue",
                query: Vec::new(),
                body: Some(RequestBody::QueueItems(items.clone())),
            },
            Self::ReplaceAndPlay(request) => RequestDescriptor {
                method: Method::POST,
                path: "/api/v1/replaceAndPlay",
                query: Vec::new(),
                body: Some(RequestBody::ReplaceAndPlay(request.clone())),
            },
            Self::GetCollectionStats => RequestDescriptor::get("/api/v1/collectionstats"),
            Self::GetZones => RequestDescriptor::get("/api/v1/getzones"),
            Self::Ping => RequestDescriptor::get("/api/v1/ping"),
            Self::GetSystemVersion => RequestDescriptor::get("/api/v1/getSystemVersion"),
            Self::GetSystemInfo => RequestDescriptor::get("/api/v1/getSystemInfo"),
            Self::GetPushNotificationUrls => RequestDescriptor::get(PUSH_NOTIFICATION_URLS_PATH),
            Self::AddPushNotificationUrl { url } => RequestDescriptor {
                method: Method::POST,
                path: PUSH_NOTIFICATION_URLS_PATH,
                query: Vec::new(),
                body: Some(RequestBody::PushNotificationUrl { url: url.clone() }),
            },
            Self::RemovePushNotificationUrl { url } => RequestDescriptor {
                method: Method::DELETE,
                ..RequestDescriptor::get(PUSH_NOTIFICATION_URLS_PATH)
            }
            .param("url", url.as_str()),
        }
    }
}
