use kiosk_types::NetworkStatus;
use kiosk_types::events::push;

use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::{Registrations, decode_push};

/// Backend network announcement; `None` until the first push.
#[derive(Default)]
pub struct NetworkStore {
    state: StateCell<Option<NetworkStatus>>,
    registrations: Registrations,
}

impl NetworkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&self, router: &mut EventRouter) {
        let state = self.state.clone();
        self.registrations.arm(router, |router| {
            vec![router.register(push::NETWORK_STATUS, move |payload| {
                if let Some(status) = decode_push::<NetworkStatus>(push::NETWORK_STATUS, payload) {
                    state.replace(Some(status));
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

    pub fn state(&self) -> &StateCell<Option<NetworkStatus>> {
        &self.state
    }
}

/// The backend is online unless it explicitly said otherwise.
pub fn network_online(status: Option<&NetworkStatus>) -> bool {
    status.and_then(|s| s.online).unwrap_or(true)
}
