use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Playable item accepted by `addToQueue` and `replaceAndPlay`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub uri: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, rename = "albumart", skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Device-specific fields forwarded untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QueueItem {
    pub fn new(uri: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Body of `replaceAndPlay`: a single item, or an item within a list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplaceAndPlay {
    List {
        item: QueueItem,
        list: Vec<QueueItem>,
        index: usize,
    },
    Item(QueueItem),
}

impl From<QueueItem> for ReplaceAndPlay {
    fn from(item: QueueItem) -> Self {
        Self::Item(item)
    }
}
