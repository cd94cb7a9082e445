//! Favourite flag for the track that is currently playing.

use std::sync::Arc;

use kiosk_types::events::{push, request};
use kiosk_types::requests::FavouriteRequest;
use kiosk_types::{FavouriteStatus, PlayerState};
use serde_json::Value;

use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::{Registrations, decode_push, emit_json};
use crate::transport::Emitter;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FavoritesState {
    pub is_favorite: bool,
    /// Track the flag belongs to, taken from `pushState`.
    pub track_uri: Option<String>,
}

pub struct FavoritesStore {
    state: StateCell<FavoritesState>,
    emitter: Arc<dyn Emitter>,
    registrations: Registrations,
}

impl FavoritesStore {
    pub fn new(emitter: Arc<dyn Emitter>) -> Self {
        Self {
            state: StateCell::default(),
            emitter,
            registrations: Registrations::default(),
        }
    }

    pub fn init(&self, router: &mut EventRouter) {
        let flag_state = self.state.clone();
        let track_state = self.state.clone();
        self.registrations.arm(router, |router| {
            vec![
                router.register(push::URI_FAVOURITES, move |payload| {
                    apply_favourite(&flag_state, payload);
                }),
                router.register(push::STATE, move |payload| {
                    follow_track(&track_state, payload);
                }),
            ]
        });
    }

    pub fn cleanup(&self, router: &mut EventRouter) {
        self.registrations.disarm(router);
    }

    pub fn is_initialized(&self) -> bool {
        self.registrations.is_armed()
    }

    pub fn state(&self) -> &StateCell<FavoritesState> {
        &self.state
    }

    /// Add or remove the current track. The flag itself only flips when the
    /// backend confirms with `urifavourites`.
    pub fn toggle_current(&self) {
        let event = if self.state.with(|s| s.is_favorite) {
            request::REMOVE_FROM_FAVOURITES
        } else {
            request::ADD_TO_FAVOURITES
        };
        emit_json(&*self.emitter, event, &FavouriteRequest::default());
    }

    pub fn add(&self, service: &str, uri: &str, title: Option<&str>) {
        emit_json(
            &*self.emitter,
            request::ADD_TO_FAVOURITES,
            &FavouriteRequest {
                service: Some(service.to_string()),
                uri: Some(uri.to_string()),
                title: title.map(str::to_string),
            },
        );
    }

    pub fn remove(&self, service: &str, uri: &str) {
        emit_json(
            &*self.emitter,
            request::REMOVE_FROM_FAVOURITES,
            &FavouriteRequest {
                service: Some(service.to_string()),
                uri: Some(uri.to_string()),
                title: None,
            },
        );
    }

    pub fn play_all(&self) {
        self.emitter.emit(request::PLAY_FAVOURITES, Value::Null);
    }
}

fn apply_favourite(state: &StateCell<FavoritesState>, payload: &Value) {
    let Some(status) = decode_push::<FavouriteStatus>(push::URI_FAVOURITES, payload) else {
        return;
    };
    let Some(favourite) = status.favourite else {
        return;
    };
    state.update(|s| {
        let stale = match (&status.uri, &s.track_uri) {
            (Some(msg_uri), Some(current)) => msg_uri != current,
            _ => false,
        };
        if stale {
            tracing::debug!("ignoring favourite flag for a previous track");
        } else {
            s.is_favorite = favourite;
        }
    });
}

fn follow_track(state: &StateCell<FavoritesState>, payload: &Value) {
    let Some(player) = decode_push::<PlayerState>(push::STATE, payload) else {
        return;
    };
    let uri = Some(player.uri).filter(|uri| !uri.is_empty());
    if state.with(|s| s.track_uri == uri) {
        return;
    }
    // the flag only moves on an explicit urifavourites message
    state.update(|s| s.track_uri = uri);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing;
    use serde_json::json;

    fn store() -> (testing::RecordingEmitter, FavoritesStore, EventRouter) {
        let (rec, emitter) = testing::emitter();
        let store = FavoritesStore::new(emitter);
        let mut router = EventRouter::new();
        store.init(&mut router);
        (rec, store, router)
    }

    #[test]
    fn only_explicit_flags_update_state() {
        let (_rec, store, mut router) = store();
        router.dispatch(push::URI_FAVOURITES, &json!({ "favourite": true }));
        assert!(store.state().get().is_favorite);
        router.dispatch(push::URI_FAVOURITES, &json!({ "uri": "x" }));
        assert!(store.state().get().is_favorite);
        router.dispatch(push::URI_FAVOURITES, &json!({ "favourite": false }));
        assert!(!store.state().get().is_favorite);
    }

    #[test]
    fn toggle_current_emits_without_flipping() {
        let (rec, store, mut router) = store();
        store.toggle_current();
        router.dispatch(push::URI_FAVOURITES, &json!({ "favourite": true }));
        store.toggle_current();
        assert_eq!(
            rec.take(),
            vec![
                ("addToFavourites".to_string(), json!({})),
                ("removeFromFavourites".to_string(), json!({})),
            ]
        );
        assert!(store.state().get().is_favorite);
    }

    #[test]
    fn track_change_keeps_flag_until_told_and_filters_stale_answers() {
        let (rec, store, mut router) = store();
        router.dispatch(push::STATE, &json!({ "uri": "a" }));
        router.dispatch(push::URI_FAVOURITES, &json!({ "uri": "a", "favourite": true }));
        assert!(store.state().get().is_favorite);

        // same track, new position: flag survives
        router.dispatch(push::STATE, &json!({ "uri": "a", "seek": 1000 }));
        assert!(store.state().get().is_favorite);

        router.dispatch(push::STATE, &json!({ "uri": "b" }));
        let state = store.state().get();
        assert!(state.is_favorite);
        assert_eq!(state.track_uri.as_deref(), Some("b"));

        // a late answer for the previous track is ignored
        router.dispatch(push::URI_FAVOURITES, &json!({ "uri": "a", "favourite": false }));
        assert!(store.state().get().is_favorite);

        router.dispatch(push::URI_FAVOURITES, &json!({ "uri": "b", "favourite": false }));
        assert!(!store.state().get().is_favorite);
        assert!(rec.take().is_empty());
    }

    #[test]
    fn explicit_add_carries_the_item() {
        let (rec, store, _router) = store();
        store.add("webradio", "http://radio/stream", Some("Radio"));
        store.remove("webradio", "http://radio/stream");
        store.play_all();
        assert_eq!(
            rec.take(),
            vec![
                (
                    "addToFavourites".to_string(),
                    json!({ "service": "webradio", "uri": "http://radio/stream", "title": "Radio" })
                ),
                (
                    "removeFromFavourites".to_string(),
                    json!({ "service": "webradio", "uri": "http://radio/stream" })
                ),
                ("playFavourites".to_string(), Value::Null),
            ]
        );
    }
}
