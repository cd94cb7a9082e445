use serde::{Deserialize, Deserializer, Serialize};

use crate::de::{lenient_opt_u64, lenient_string, lenient_u64, null_default};

/// Transport state reported by the backend.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Play,
    Pause,
    #[default]
    Stop,
}

impl<'de> Deserialize<'de> for PlaybackStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(match raw.as_deref().map(str::trim) {
            Some("play") => PlaybackStatus::Play,
            Some("pause") => PlaybackStatus::Pause,
            _ => PlaybackStatus::Stop,
        })
    }
}

/// Full player snapshot carried by every `pushState`.
///
/// The backend is authoritative: a new snapshot replaces the previous one
/// wholesale. `seek` is in milliseconds, `duration` in seconds.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    #[serde(default)]
    pub status: PlaybackStatus,
    /// Queue index of the current track, if any.
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub position: Option<u64>,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub artist: String,
    #[serde(default, deserialize_with = "null_default")]
    pub album: String,
    #[serde(default, deserialize_with = "null_default")]
    pub uri: String,
    /// Cover art; may be relative to the backend asset host on the wire.
    #[serde(default, deserialize_with = "null_default")]
    pub albumart: String,
    #[serde(default, deserialize_with = "null_default")]
    pub service: String,
    /// Elapsed position in milliseconds.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub seek: u64,
    /// Track length in seconds; `0` when unknown (streams).
    #[serde(default, deserialize_with = "lenient_u64")]
    pub duration: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub track_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub samplerate: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bitdepth: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub random: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub repeat: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub repeat_single: bool,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub volume: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub mute: bool,
}

/// Network announcement pushed on connect and on interface changes.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkStatus {
    /// `None` when the backend did not say; treated as online.
    #[serde(default)]
    pub online: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: Option<String>,
    /// Interface kind, e.g. `wired` or `wireless`.
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ssid: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub signal: Option<u64>,
}

/// Backend build information pushed in answer to `getVersion`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    #[serde(default, rename = "systemversion", deserialize_with = "null_default")]
    pub system_version: String,
    #[serde(default, rename = "builddate", deserialize_with = "null_default")]
    pub build_date: String,
    #[serde(default, deserialize_with = "null_default")]
    pub variant: String,
    #[serde(default, deserialize_with = "null_default")]
    pub hardware: String,
}

/// Answer to a favourite lookup for the current track.
///
/// `favourite` stays `None` when the message omits it; consumers must not
/// read a missing flag as either value.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavouriteStatus {
    #[serde(default)]
    pub favourite: Option<bool>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}
