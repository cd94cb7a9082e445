use std::sync::Arc;

use kiosk_types::VersionInfo;
use kiosk_types::events::{push, request};
use serde_json::Value;

use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::{Registrations, decode_push};
use crate::transport::Emitter;

/// Backend version, announced on connect and on `getVersion`.
pub struct VersionStore {
    state: StateCell<Option<VersionInfo>>,
    emitter: Arc<dyn Emitter>,
    registrations: Registrations,
}

impl VersionStore {
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
            vec![router.register(push::VERSION, move |payload| {
                if let Some(info) = decode_push::<VersionInfo>(push::VERSION, payload) {
                    tracing::info!(version = %info.system_version, variant = %info.variant, "backend version");
                    state.replace(Some(info));
                }
            })]
        });
    }

    pub fn cleanup(&self, router: &mut EventRouter) {
        self.registrations.disarm(router);
    }

    pub fn is_initialized(&self) -> bool {
        self.registrations.is_armed()
    }

    pub fn state(&self) -> &StateCell<Option<VersionInfo>> {
        &self.state
    }

    pub fn refresh(&self) {
        self.emitter.emit(request::GET_VERSION, Value::Null);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing;
    use serde_json::json;

    #[test]
    fn init_is_idempotent_and_push_is_stored() {
        let (rec, emitter) = testing::emitter();
        let store = VersionStore::new(emitter);
        let mut router = EventRouter::new();
        store.init(&mut router);
        store.init(&mut router);
        assert_eq!(router.handler_count(push::VERSION), 1);
        store.refresh();
        assert_eq!(rec.names(), vec!["getVersion".to_string()]);
        router.dispatch(push::VERSION, &json!({ "systemversion": "3.779", "hardware": "pi" }));
        assert_eq!(store.state().get().unwrap().system_version, "3.779");
    }
}
