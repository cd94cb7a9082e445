//! Store registry plus the event loop that feeds it.
//!
//! The hub owns the router and the stores. Transport events, UI changes and
//! pending resizes are all handled on one task, so store mutations happen in
//! the order their causes arrived.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::assets::AssetResolver;
use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::Stores;
use crate::transport::{ConnectionStatus, Emitter, TransportEvent};
use crate::view_model::{Snapshot, ViewModel};

pub struct Hub {
    router: EventRouter,
    stores: Arc<Stores>,
    connection: StateCell<ConnectionStatus>,
    view: StateCell<ViewModel>,
}

impl Hub {
    /// Build every store and register its push handlers.
    pub fn new(emitter: Arc<dyn Emitter>, assets: AssetResolver, resize_debounce: Duration) -> Self {
        let mut router = EventRouter::new();
        let stores = Arc::new(Stores::new(emitter, assets, resize_debounce));
        stores.init_all(&mut router);
        let hub = Self {
            router,
            stores,
            connection: StateCell::default(),
            view: StateCell::default(),
        };
        hub.refresh_view();
        hub
    }

    pub fn stores(&self) -> Arc<Stores> {
        self.stores.clone()
    }

    pub fn connection(&self) -> StateCell<ConnectionStatus> {
        self.connection.clone()
    }

    pub fn view(&self) -> StateCell<ViewModel> {
        self.view.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            connection: self.connection.get(),
            player: self.stores.player.state().get(),
            queue: self.stores.queue.state().get(),
            browse_loading: self.stores.browse.state().with(|s| s.loading),
            favorites: self.stores.favorites.state().get(),
            network: self.stores.network.state().get(),
            ui: self.stores.ui.state().get(),
        }
    }

    /// Apply one transport event and recompute the view model.
    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Status(status) => {
                let was_open = self.connection.with(ConnectionStatus::is_open);
                let now_open = status.is_open();
                tracing::debug!(state = ?status.state, retry = status.retry_count, "connection status");
                self.connection.replace(status);
                if now_open && !was_open {
                    self.stores.resync();
                }
            }
            TransportEvent::Push { name, payload } => {
                let handled = self.router.dispatch(&name, &payload);
                if handled == 0 {
                    tracing::trace!(event = %name, "unhandled push");
                }
            }
        }
        self.refresh_view();
    }

    fn refresh_view(&self) {
        let next = ViewModel::derive(&self.snapshot());
        if self.view.with(|current| *current != next) {
            self.view.replace(next);
        }
    }

    /// Run until shutdown or until the transport hangs up.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<TransportEvent>,
        shutdown: CancellationToken,
    ) {
        let mut ui_changes = self.stores.ui.state().subscribe();
        let mut browse_changes = self.stores.browse.state().subscribe();
        let wake = self.stores.device.wake();

        loop {
            let deadline = self.stores.device.next_deadline();
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("hub shutting down");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle(event);
                        continue;
                    }
                    None => {
                        tracing::info!("transport closed its event channel");
                        break;
                    }
                },
                Ok(()) = ui_changes.changed() => {}
                Ok(()) = browse_changes.changed() => {}
                _ = wake.notified() => {}
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.stores.device.apply_due(Instant::now());
                }
            }
            self.refresh_view();
        }

        self.stores.cleanup_all(&mut self.router);
    }
}
