//! Domain stores and the registry that owns them.
//!
//! Each store owns one slice of state in a [`crate::cell::StateCell`], subscribes to its
//! push events through the [`EventRouter`], and turns actions into outbound
//! requests. Stores never write to each other's cells.

mod browse;
mod device;
mod favorites;
mod network;
mod player;
mod playlists;
mod queue;
mod ui;
mod version;

pub use browse::{BrowseRequest, BrowseState, BrowseStore};
pub use device::{DeviceKind, DeviceState, DeviceStore, ResizeDebouncer, Viewport};
pub use favorites::{FavoritesState, FavoritesStore};
pub use network::{NetworkStore, network_online};
pub use player::{PlayerStore, is_playing, progress_percent, track_quality};
pub use playlists::{PlaylistsState, PlaylistsStore};
pub use queue::{QueueState, QueueStore};
pub use ui::{
    ContextMenuState, Overlay, PlaylistSelectorState, Position, TrackInfoState, UiState, UiStore,
};
pub use version::VersionStore;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::assets::AssetResolver;
use crate::router::{EventRouter, SubscriptionId};
use crate::transport::Emitter;

/// Router subscriptions held by one store.
///
/// Arming twice is a no-op, so repeated `init` calls never double-register.
#[derive(Default)]
pub(crate) struct Registrations {
    ids: Mutex<Vec<SubscriptionId>>,
}

impl Registrations {
    pub(crate) fn is_armed(&self) -> bool {
        self.ids.lock().map(|ids| !ids.is_empty()).unwrap_or(false)
    }

    pub(crate) fn arm(
        &self,
        router: &mut EventRouter,
        register: impl FnOnce(&mut EventRouter) -> Vec<SubscriptionId>,
    ) -> bool {
        let mut ids = self.ids.lock().unwrap_or_else(|err| err.into_inner());
        if !ids.is_empty() {
            return false;
        }
        *ids = register(router);
        true
    }

    pub(crate) fn disarm(&self, router: &mut EventRouter) {
        let mut ids = self.ids.lock().unwrap_or_else(|err| err.into_inner());
        for id in ids.drain(..) {
            router.unregister(id);
        }
    }
}

/// Serialize a request payload; only fails for non-JSON types, which none
/// of the request structs are.
pub(crate) fn emit_json<T: Serialize>(emitter: &dyn Emitter, event: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => emitter.emit(event, value),
        Err(err) => tracing::error!(event, "encode request payload: {err}"),
    }
}

/// Decode a push payload, logging instead of failing.
pub(crate) fn decode_push<T: DeserializeOwned>(event: &str, payload: &Value) -> Option<T> {
    match serde_json::from_value(payload.clone()) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(event, "ignoring malformed push: {err}");
            None
        }
    }
}

/// The one place every store instance lives.
///
/// Constructed once at startup and shared with front ends; replaces
/// per-module singletons and `initialized` flags.
pub struct Stores {
    pub player: PlayerStore,
    pub queue: QueueStore,
    pub browse: BrowseStore,
    pub favorites: FavoritesStore,
    pub playlists: PlaylistsStore,
    pub network: NetworkStore,
    pub version: VersionStore,
    pub device: DeviceStore,
    pub ui: UiStore,
}

impl Stores {
    pub fn new(emitter: Arc<dyn Emitter>, assets: AssetResolver, resize_debounce: Duration) -> Self {
        Self {
            player: PlayerStore::new(emitter.clone(), assets.clone()),
            queue: QueueStore::new(emitter.clone(), assets.clone()),
            browse: BrowseStore::new(emitter.clone(), assets),
            favorites: FavoritesStore::new(emitter.clone()),
            playlists: PlaylistsStore::new(emitter.clone()),
            network: NetworkStore::new(),
            version: VersionStore::new(emitter),
            device: DeviceStore::new(resize_debounce),
            ui: UiStore::new(),
        }
    }

    pub fn init_all(&self, router: &mut EventRouter) {
        self.player.init(router);
        self.queue.init(router);
        self.browse.init(router);
        self.favorites.init(router);
        self.playlists.init(router);
        self.network.init(router);
        self.version.init(router);
    }

    pub fn cleanup_all(&self, router: &mut EventRouter) {
        self.player.cleanup(router);
        self.queue.cleanup(router);
        self.browse.cleanup(router);
        self.favorites.cleanup(router);
        self.playlists.cleanup(router);
        self.network.cleanup(router);
        self.version.cleanup(router);
    }

    /// Rebuild backend-owned state after a (re)connect.
    pub fn resync(&self) {
        tracing::info!("resyncing state from backend");
        self.player.refresh();
        self.queue.refresh();
        self.version.refresh();
        self.playlists.refresh();
        self.browse.resync();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use crate::transport::Emitter;

    /// Records every outbound request instead of sending it.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingEmitter {
        sent: Arc<Mutex<Vec<(String, Value)>>>,
    }

    impl RecordingEmitter {
        pub(crate) fn take(&self) -> Vec<(String, Value)> {
            std::mem::take(&mut *self.sent.lock().unwrap())
        }

        pub(crate) fn names(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
        }
    }

    impl Emitter for RecordingEmitter {
        fn emit(&self, event: &str, payload: Value) {
            self.sent.lock().unwrap().push((event.to_string(), payload));
        }
    }

    pub(crate) fn emitter() -> (RecordingEmitter, Arc<dyn Emitter>) {
        let rec = RecordingEmitter::default();
        let shared: Arc<dyn Emitter> = Arc::new(rec.clone());
        (rec, shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_types::events::push;

    fn stores() -> (testing::RecordingEmitter, Stores) {
        let (rec, emitter) = testing::emitter();
        let stores = Stores::new(
            emitter,
            AssetResolver::new("http://host:3000"),
            Duration::from_millis(150),
        );
        (rec, stores)
    }

    #[test]
    fn repeated_init_registers_each_handler_once() {
        let (_rec, stores) = stores();
        let mut router = EventRouter::new();
        for _ in 0..3 {
            stores.init_all(&mut router);
        }
        assert_eq!(router.handler_count(push::QUEUE), 1);
        assert_eq!(router.handler_count(push::VERSION), 1);
        assert_eq!(router.handler_count(push::NETWORK_STATUS), 1);
        assert_eq!(router.handler_count(push::URI_FAVOURITES), 1);
        assert_eq!(router.handler_count(push::LIST_PLAYLIST), 1);
        // player and favorites both follow the full state push
        assert_eq!(router.handler_count(push::STATE), 2);
        // browse: node replacement plus request bookkeeping
        assert_eq!(router.handler_count(push::BROWSE_LIBRARY), 2);
    }

    #[test]
    fn cleanup_releases_everything_and_allows_reinit() {
        let (_rec, stores) = stores();
        let mut router = EventRouter::new();
        stores.init_all(&mut router);
        stores.cleanup_all(&mut router);
        assert_eq!(router.total_handlers(), 0);
        assert!(!stores.queue.is_initialized());
        stores.init_all(&mut router);
        assert_eq!(router.handler_count(push::QUEUE), 1);
    }

    #[test]
    fn resync_requests_backend_owned_state() {
        let (rec, stores) = stores();
        stores.resync();
        let names = rec.names();
        for expected in ["getState", "getQueue", "getVersion", "listPlaylist"] {
            assert!(names.iter().any(|n| n == expected), "missing {expected}");
        }
    }
}
