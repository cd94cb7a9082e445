//! Play queue mirror.
//!
//! The backend addresses queue entries by their current index, so the local
//! sequence is never reordered or trimmed here; it only changes when a new
//! `pushQueue` arrives. Callers must read the index from the latest snapshot
//! right before calling an index-addressed action.

use std::sync::Arc;

use kiosk_types::events::{push, request};
use kiosk_types::requests::{ItemRequest, MoveRequest, NameRequest, ValueRequest};
use kiosk_types::{ContextMenuItem, QueueItem};
use serde_json::Value;

use crate::assets::AssetResolver;
use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::{Registrations, decode_push, emit_json};
use crate::transport::Emitter;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueState {
    pub items: Vec<QueueItem>,
    /// Set by `refresh`, cleared by the next `pushQueue`.
    pub loading: bool,
}

pub struct QueueStore {
    state: StateCell<QueueState>,
    emitter: Arc<dyn Emitter>,
    assets: AssetResolver,
    registrations: Registrations,
}

impl QueueStore {
    pub fn new(emitter: Arc<dyn Emitter>, assets: AssetResolver) -> Self {
        Self {
            state: StateCell::default(),
            emitter,
            assets,
            registrations: Registrations::default(),
        }
    }

    pub fn init(&self, router: &mut EventRouter) {
        let state = self.state.clone();
        let assets = self.assets.clone();
        self.registrations.arm(router, |router| {
            vec![router.register(push::QUEUE, move |payload| {
                apply_queue(&state, &assets, payload);
            })]
        });
    }

    pub fn cleanup(&self, router: &mut EventRouter) {
        self.registrations.disarm(router);
    }

    pub fn is_initialized(&self) -> bool {
        self.registrations.is_armed()
    }

    pub fn state(&self) -> &StateCell<QueueState> {
        &self.state
    }

    pub fn refresh(&self) {
        self.state.update(|s| s.loading = true);
        self.emitter.emit(request::GET_QUEUE, Value::Null);
    }

    pub fn play(&self, index: usize) {
        emit_json(&*self.emitter, request::PLAY, &ValueRequest { value: index });
    }

    pub fn remove(&self, index: usize) {
        emit_json(
            &*self.emitter,
            request::REMOVE_FROM_QUEUE,
            &ValueRequest { value: index },
        );
    }

    pub fn move_item(&self, from: usize, to: usize) {
        emit_json(&*self.emitter, request::MOVE_QUEUE, &MoveRequest { from, to });
    }

    pub fn clear(&self) {
        self.emitter.emit(request::CLEAR_QUEUE, Value::Null);
    }

    pub fn save_to_playlist(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            tracing::debug!("ignoring save of queue without a playlist name");
            return;
        }
        emit_json(
            &*self.emitter,
            request::SAVE_QUEUE_TO_PLAYLIST,
            &NameRequest { name: name.to_string() },
        );
    }

    pub fn add(&self, item: &ContextMenuItem) {
        emit_json(&*self.emitter, request::ADD_TO_QUEUE, &item_request(item));
    }

    /// Replace the whole queue with `item` and start playing it.
    pub fn replace_and_play(&self, item: &ContextMenuItem) {
        emit_json(&*self.emitter, request::REPLACE_AND_PLAY, &item_request(item));
    }
}

fn item_request(item: &ContextMenuItem) -> ItemRequest {
    ItemRequest {
        service: item.service().to_string(),
        item_type: item.wire_type().to_string(),
        title: item.title().to_string(),
        uri: item.uri().to_string(),
    }
}

fn apply_queue(state: &StateCell<QueueState>, assets: &AssetResolver, payload: &Value) {
    let items = if payload.is_null() {
        Some(Vec::new())
    } else {
        decode_push::<Vec<QueueItem>>(push::QUEUE, payload)
    };
    let Some(mut items) = items else {
        state.update(|s| s.loading = false);
        return;
    };
    for item in &mut items {
        item.albumart = assets.resolve(&item.albumart);
    }
    tracing::debug!(len = items.len(), "queue replaced");
    state.replace(QueueState { items, loading: false });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing;
    use kiosk_types::BrowseItem;
    use serde_json::json;

    fn store() -> (testing::RecordingEmitter, QueueStore, EventRouter) {
        let (rec, emitter) = testing::emitter();
        let store = QueueStore::new(emitter, AssetResolver::new("http://host:3000"));
        let mut router = EventRouter::new();
        store.init(&mut router);
        (rec, store, router)
    }

    fn queue_payload() -> Value {
        json!([
            { "uri": "mnt/a.flac", "name": "A", "albumart": "/albumart?path=a" },
            { "uri": "mnt/b.flac", "name": "B", "albumart": "https://cdn/b.jpg" },
        ])
    }

    #[test]
    fn push_replaces_queue_with_resolved_art_and_is_idempotent() {
        let (_rec, store, mut router) = store();
        store.refresh();
        assert!(store.state().get().loading);

        router.dispatch(push::QUEUE, &queue_payload());
        let first = store.state().get();
        router.dispatch(push::QUEUE, &queue_payload());
        let second = store.state().get();

        assert_eq!(first, second);
        assert!(!second.loading);
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.items[0].albumart, "http://host:3000/albumart?path=a");
        assert_eq!(second.items[1].albumart, "https://cdn/b.jpg");
    }

    #[test]
    fn index_actions_emit_without_local_mutation() {
        let (rec, store, mut router) = store();
        router.dispatch(push::QUEUE, &queue_payload());
        let before = store.state().get();

        store.remove(1);
        store.move_item(0, 1);
        store.play(0);

        assert_eq!(store.state().get(), before);
        assert_eq!(
            rec.take(),
            vec![
                ("removeFromQueue".to_string(), json!({ "value": 1 })),
                ("moveQueue".to_string(), json!({ "from": 0, "to": 1 })),
                ("play".to_string(), json!({ "value": 0 })),
            ]
        );

        router.dispatch(push::QUEUE, &json!([{ "uri": "mnt/a.flac", "name": "A" }]));
        assert_eq!(store.state().get().items.len(), 1);
    }

    #[test]
    fn items_carrying_both_name_and_title_are_accepted() {
        let (_rec, store, mut router) = store();
        store.refresh();
        router.dispatch(
            push::QUEUE,
            &json!([
                { "uri": "spotify:1", "name": "Blue in Green", "title": "Blue in Green" },
                { "uri": "spotify:2", "title": "So What" },
            ]),
        );
        let state = store.state().get();
        assert!(!state.loading);
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.items[1].display_name(), "So What");
    }

    #[test]
    fn null_push_means_empty_queue() {
        let (_rec, store, mut router) = store();
        router.dispatch(push::QUEUE, &queue_payload());
        router.dispatch(push::QUEUE, &Value::Null);
        assert!(store.state().get().items.is_empty());
    }

    #[test]
    fn malformed_push_clears_loading_but_keeps_items() {
        let (_rec, store, mut router) = store();
        router.dispatch(push::QUEUE, &queue_payload());
        store.refresh();
        router.dispatch(push::QUEUE, &json!({ "not": "a list" }));
        let state = store.state().get();
        assert!(!state.loading);
        assert_eq!(state.items.len(), 2);
    }

    #[test]
    fn replace_and_play_sends_item_reference() {
        let (rec, store, _router) = store();
        let item = ContextMenuItem::Browse(BrowseItem {
            service: "mpd".into(),
            item_type: "song".into(),
            title: "A".into(),
            uri: "mnt/a.flac".into(),
            ..BrowseItem::default()
        });
        store.replace_and_play(&item);
        store.save_to_playlist("  ");
        store.save_to_playlist("Mix");
        assert_eq!(
            rec.take(),
            vec![
                (
                    "replaceAndPlay".to_string(),
                    json!({ "service": "mpd", "type": "song", "title": "A", "uri": "mnt/a.flac" })
                ),
                ("saveQueueToPlaylist".to_string(), json!({ "name": "Mix" })),
            ]
        );
    }
}
