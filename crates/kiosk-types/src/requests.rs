//! Outbound request payloads.

use serde::Serialize;

/// `{ "value": ... }` payload used by many verbs (`play`, `seek`, `search`, ...).
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ValueRequest<T> {
    pub value: T,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct UriRequest {
    pub uri: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepeatRequest {
    pub value: bool,
    pub repeat_single: bool,
}

/// Item reference for `replaceAndPlay` and `addToQueue`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ItemRequest {
    pub service: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    pub uri: String,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PlaylistItemRequest {
    pub name: String,
    pub service: String,
    pub uri: String,
}

/// Favourite add/remove; all fields empty means "the current track".
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct FavouriteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
