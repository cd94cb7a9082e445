//! Values computed from store snapshots for the render layer.
//!
//! Derivation is pure: the hub collects a [`Snapshot`] and
//! [`ViewModel::derive`] turns it into display-ready fields.

use kiosk_types::{NetworkStatus, PlayerState};

use crate::stores::{
    FavoritesState, QueueState, UiState, is_playing, network_online, progress_percent,
    track_quality,
};
use crate::transport::{ConnectionState, ConnectionStatus};

/// Read-only copies of every input the view model depends on.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub connection: ConnectionStatus,
    pub player: PlayerState,
    pub queue: QueueState,
    pub browse_loading: bool,
    pub favorites: FavoritesState,
    pub network: Option<NetworkStatus>,
    pub ui: UiState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionIndicator {
    Online,
    #[default]
    Connecting,
    Offline,
    /// Connected to the backend, but the backend has no network.
    NoNetwork,
}

impl ConnectionIndicator {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionIndicator::Online => "online",
            ConnectionIndicator::Connecting => "connecting",
            ConnectionIndicator::Offline => "offline",
            ConnectionIndicator::NoNetwork => "no network",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewModel {
    pub is_playing: bool,
    pub progress_percent: f64,
    pub elapsed_label: String,
    pub duration_label: String,
    pub track_quality: String,
    pub albumart: String,
    pub connection: ConnectionIndicator,
    pub any_modal_open: bool,
    pub queue_len: usize,
    pub browse_loading: bool,
    pub is_favorite: bool,
}

impl ViewModel {
    pub fn derive(snapshot: &Snapshot) -> Self {
        let player = &snapshot.player;
        Self {
            is_playing: is_playing(player),
            progress_percent: progress_percent(player),
            elapsed_label: format_duration(player.seek / 1000),
            duration_label: format_duration(player.duration),
            track_quality: track_quality(player),
            albumart: player.albumart.clone(),
            connection: connection_indicator(&snapshot.connection, snapshot.network.as_ref()),
            any_modal_open: snapshot.ui.any_modal_open(),
            queue_len: snapshot.queue.items.len(),
            browse_loading: snapshot.browse_loading,
            is_favorite: snapshot.favorites.is_favorite,
        }
    }
}

fn connection_indicator(
    connection: &ConnectionStatus,
    network: Option<&NetworkStatus>,
) -> ConnectionIndicator {
    match connection.state {
        ConnectionState::Open if network_online(network) => ConnectionIndicator::Online,
        ConnectionState::Open => ConnectionIndicator::NoNetwork,
        ConnectionState::Connecting => ConnectionIndicator::Connecting,
        ConnectionState::Closed => ConnectionIndicator::Offline,
    }
}

/// `m:ss` below an hour, `h:mm:ss` above; empty for zero.
pub fn format_duration(seconds: u64) -> String {
    if seconds == 0 {
        return String::new();
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}
