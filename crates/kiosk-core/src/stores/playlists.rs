//! Playlist names for the playlist selector.

use std::sync::Arc;

use kiosk_types::events::{push, request};
use kiosk_types::requests::{NameRequest, PlaylistItemRequest};
use kiosk_types::ContextMenuItem;
use serde_json::Value;

use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::{Registrations, decode_push, emit_json};
use crate::transport::Emitter;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaylistsState {
    pub names: Vec<String>,
    pub loading: bool,
}

pub struct PlaylistsStore {
    state: StateCell<PlaylistsState>,
    emitter: Arc<dyn Emitter>,
    registrations: Registrations,
}

impl PlaylistsStore {
    pub fn new(emitter: Arc<dyn Emitter>) -> Self {
        Self {
            state: StateCell::default(),
            emitter,
            registrations: Registrations::default(),
        }
    }

    pub fn init(&self, router: &mut EventRouter) {
        let state = self.state.clone();
        self.registrations.arm(router, |router| {
            vec![router.register(push::LIST_PLAYLIST, move |payload| {
                let names = decode_push::<Vec<String>>(push::LIST_PLAYLIST, payload);
                state.update(|s| {
                    s.loading = false;
                    if let Some(names) = names {
                        s.names = names;
                    }
                });
            })]
        });
    }

    pub fn cleanup(&self, router: &mut EventRouter) {
        self.registrations.disarm(router);
    }

    pub fn is_initialized(&self) -> bool {
        self.registrations.is_armed()
    }

    pub fn state(&self) -> &StateCell<PlaylistsState> {
        &self.state
    }

    pub fn refresh(&self) {
        self.state.update(|s| s.loading = true);
        self.emitter.emit(request::LIST_PLAYLIST, Value::Null);
    }

    pub fn create(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        emit_json(
            &*self.emitter,
            request::CREATE_PLAYLIST,
            &NameRequest { name: name.to_string() },
        );
    }

    pub fn add_item(&self, playlist: &str, item: &ContextMenuItem) {
        emit_json(
            &*self.emitter,
            request::ADD_TO_PLAYLIST,
            &PlaylistItemRequest {
                name: playlist.to_string(),
                service: item.service().to_string(),
                uri: item.uri().to_string(),
            },
        );
    }
}
