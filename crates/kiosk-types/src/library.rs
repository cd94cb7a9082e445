use serde::{Deserialize, Serialize};

use crate::de::{lenient_string, lenient_u64, null_default};

/// One entry of the play queue as pushed by `pushQueue`.
///
/// Queue entries have no stable identity on the wire; the backend addresses
/// them by their current index.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    #[serde(default, deserialize_with = "null_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "null_default")]
    pub service: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// Some plugins send `title` instead of, or next to, `name`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_default")]
    pub album: String,
    #[serde(default, deserialize_with = "null_default")]
    pub albumart: String,
    /// Length in seconds.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub duration: u64,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub item_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub track_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub samplerate: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bitdepth: Option<String>,
}

impl QueueItem {
    /// `name`, falling back to `title` when the plugin left it empty.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.title.as_deref().unwrap_or("")
        } else {
            &self.name
        }
    }
}

/// One row of a browse listing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BrowseItem {
    #[serde(default, deserialize_with = "null_default")]
    pub service: String,
    /// `folder`, `song`, `playlist`, `radio-category`, ...
    #[serde(default, rename = "type", deserialize_with = "null_default")]
    pub item_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub albumart: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub duration: u64,
}

impl BrowseItem {
    /// Items the backend can play directly rather than descend into.
    pub fn is_playable(&self) -> bool {
        matches!(
            self.item_type.as_str(),
            "song" | "track" | "webradio" | "mywebradio" | "cuesong"
        )
    }
}

/// A titled group of items inside one browse node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BrowseList {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub available_list_views: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub items: Vec<BrowseItem>,
}

/// Back pointer of a browse node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowsePrev {
    #[serde(default, deserialize_with = "null_default")]
    pub uri: String,
}

/// One node of the backend's virtual filesystem.
///
/// On the wire the node is wrapped in a `navigation` object; callers unwrap it
/// before deserializing.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrowseResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub lists: Vec<BrowseList>,
    #[serde(default)]
    pub prev: Option<BrowsePrev>,
}

impl BrowseResponse {
    /// Total number of items across all lists.
    pub fn item_count(&self) -> usize {
        self.lists.iter().map(|list| list.items.len()).sum()
    }
}

/// Top-level browse root (music library, web radio, playlists, ...).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BrowseSource {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub uri: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plugin_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plugin_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub albumart: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Album {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub albumart: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub albumart: String,
    #[serde(default)]
    pub duration: u64,
}

/// Target of a context menu, playlist selector or track-info modal.
///
/// The discriminant travels with the payload so consumers never guess the
/// kind from the shape of the fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "itemType", content = "item", rename_all = "camelCase")]
pub enum ContextMenuItem {
    Browse(BrowseItem),
    Queue(QueueItem),
    Album(Album),
    Track(Track),
}

impl ContextMenuItem {
    pub fn item_type(&self) -> &'static str {
        match self {
            ContextMenuItem::Browse(_) => "browse",
            ContextMenuItem::Queue(_) => "queue",
            ContextMenuItem::Album(_) => "album",
            ContextMenuItem::Track(_) => "track",
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            ContextMenuItem::Browse(item) => &item.uri,
            ContextMenuItem::Queue(item) => &item.uri,
            ContextMenuItem::Album(item) => &item.uri,
            ContextMenuItem::Track(item) => &item.uri,
        }
    }

    pub fn service(&self) -> &str {
        match self {
            ContextMenuItem::Browse(item) => &item.service,
            ContextMenuItem::Queue(item) => &item.service,
            ContextMenuItem::Album(item) => &item.service,
            ContextMenuItem::Track(item) => &item.service,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ContextMenuItem::Browse(item) => &item.title,
            ContextMenuItem::Queue(item) => item.display_name(),
            ContextMenuItem::Album(item) => &item.title,
            ContextMenuItem::Track(item) => &item.title,
        }
    }

    /// Backend item type used by `replaceAndPlay`/`addToQueue`.
    pub fn wire_type(&self) -> &str {
        match self {
            ContextMenuItem::Browse(item) => &item.item_type,
            ContextMenuItem::Queue(item) => item.item_type.as_deref().unwrap_or("song"),
            ContextMenuItem::Album(_) => "folder",
            ContextMenuItem::Track(_) => "song",
        }
    }
}
