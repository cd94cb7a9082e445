//! Current browse node.
//!
//! Only the node last answered by the backend is held; going back re-fetches
//! the parent through `prev.uri`. Search results arrive on the same push as
//! browse results and are stored the same way.

use std::sync::Arc;

use kiosk_types::events::{push, request};
use kiosk_types::requests::{UriRequest, ValueRequest};
use kiosk_types::{BrowseResponse, BrowseSource};
use serde_json::Value;

use crate::assets::AssetResolver;
use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::{Registrations, decode_push, emit_json};
use crate::transport::Emitter;

/// What the UI last asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BrowseRequest {
    Browse(String),
    Search(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BrowseState {
    pub node: BrowseResponse,
    pub sources: Vec<BrowseSource>,
    pub loading: bool,
    pub error: Option<String>,
    /// Request still waiting for its push.
    pub pending: Option<BrowseRequest>,
    /// Request the current node answered.
    pub current: Option<BrowseRequest>,
}

pub struct BrowseStore {
    state: StateCell<BrowseState>,
    emitter: Arc<dyn Emitter>,
    assets: AssetResolver,
    registrations: Registrations,
}

impl BrowseStore {
    pub fn new(emitter: Arc<dyn Emitter>, assets: AssetResolver) -> Self {
        Self {
            state: StateCell::default(),
            emitter,
            assets,
            registrations: Registrations::default(),
        }
    }

    pub fn init(&self, router: &mut EventRouter) {
        let node_state = self.state.clone();
        let bookkeeping_state = self.state.clone();
        let sources_state = self.state.clone();
        let assets = self.assets.clone();
        let source_assets = self.assets.clone();
        self.registrations.arm(router, |router| {
            vec![
                router.register(push::BROWSE_LIBRARY, move |payload| {
                    apply_node(&node_state, &assets, payload);
                }),
                router.register(push::BROWSE_LIBRARY, move |_| {
                    bookkeeping_state.update(|s| {
                        s.loading = false;
                        // a rejected payload answered nothing; the old node stays current
                        let answered = s.pending.take();
                        if s.error.is_none() {
                            s.current = answered;
                        }
                    });
                }),
                router.register(push::BROWSE_SOURCES, move |payload| {
                    apply_sources(&sources_state, &source_assets, payload);
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

    pub fn state(&self) -> &StateCell<BrowseState> {
        &self.state
    }

    pub fn browse(&self, uri: &str) {
        let uri = uri.trim().to_string();
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
            s.pending = Some(BrowseRequest::Browse(uri.clone()));
        });
        emit_json(&*self.emitter, request::BROWSE_LIBRARY, &UriRequest { uri });
    }

    pub fn search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("ignoring empty search");
            return;
        }
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
            s.pending = Some(BrowseRequest::Search(query.to_string()));
        });
        emit_json(
            &*self.emitter,
            request::SEARCH,
            &ValueRequest { value: query.to_string() },
        );
    }

    /// Browse the parent node, or return to the source list at the root.
    pub fn go_back(&self) {
        let prev = self.state.with(|s| {
            s.node
                .prev
                .as_ref()
                .map(|p| p.uri.trim().to_string())
                .filter(|uri| !uri.is_empty() && uri != "/")
        });
        match prev {
            Some(uri) => self.browse(&uri),
            None => {
                self.state.update(|s| {
                    s.node = BrowseResponse::default();
                    s.current = None;
                    s.pending = None;
                    s.loading = false;
                    s.error = None;
                });
                self.load_sources();
            }
        }
    }

    pub fn load_sources(&self) {
        self.emitter.emit(request::GET_BROWSE_SOURCES, Value::Null);
    }

    /// Re-issue a request that was still loading when the connection dropped.
    pub fn resync(&self) {
        self.load_sources();
        match self.state.with(|s| s.pending.clone()) {
            Some(BrowseRequest::Browse(uri)) => self.browse(&uri),
            Some(BrowseRequest::Search(query)) => self.search(&query),
            None => {}
        }
    }
}

/// Accept both the `{navigation: {...}}` envelope and a bare node.
fn unwrap_navigation(payload: &Value) -> &Value {
    payload.get("navigation").unwrap_or(payload)
}

fn apply_node(state: &StateCell<BrowseState>, assets: &AssetResolver, payload: &Value) {
    let node = unwrap_navigation(payload);
    let parsed = if node.is_object() {
        serde_json::from_value::<BrowseResponse>(node.clone()).map_err(|e| e.to_string())
    } else {
        Err(format!("expected an object, got {node}"))
    };
    match parsed {
        Ok(mut node) => {
            for list in &mut node.lists {
                for item in &mut list.items {
                    item.albumart = assets.resolve_opt(item.albumart.as_deref());
                    item.icon = item.icon.take().filter(|s| !s.trim().is_empty());
                }
            }
            tracing::debug!(items = node.item_count(), "browse node replaced");
            state.update(|s| {
                s.node = node;
                s.error = None;
            });
        }
        Err(err) => {
            tracing::warn!("invalid browse response: {err}");
            state.update(|s| s.error = Some(format!("invalid browse response: {err}")));
        }
    }
}

fn apply_sources(state: &StateCell<BrowseState>, assets: &AssetResolver, payload: &Value) {
    let Some(mut sources) = decode_push::<Vec<BrowseSource>>(push::BROWSE_SOURCES, payload) else {
        return;
    };
    for source in &mut sources {
        source.albumart = assets.resolve_opt(source.albumart.as_deref());
    }
    state.update(|s| s.sources = sources);
}
