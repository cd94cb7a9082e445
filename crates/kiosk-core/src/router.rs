//! Push-event fan-out.
//!
//! Handlers are keyed by event name. Several handlers may share a name; each
//! inbound frame reaches all of them, in registration order, synchronously.
//! The router lives outside the socket, so subscriptions outlive reconnects.

use std::collections::HashMap;

use serde_json::Value;

pub type Handler = Box<dyn FnMut(&Value) + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventRouter {
    handlers: HashMap<String, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        event: &str,
        handler: impl FnMut(&Value) + Send + 'static,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push((id, Box::new(handler)));
        tracing::trace!(event, id = id.0, "handler registered");
        id
    }

    /// Remove one handler. Returns `false` if it was already gone.
    pub fn unregister(&mut self, id: SubscriptionId) -> bool {
        let mut removed = false;
        self.handlers.retain(|_, list| {
            let before = list.len();
            list.retain(|(sub, _)| *sub != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Deliver a frame; returns how many handlers ran.
    pub fn dispatch(&mut self, event: &str, payload: &Value) -> usize {
        let Some(list) = self.handlers.get_mut(event) else {
            tracing::trace!(event, "no handlers for push event");
            return 0;
        };
        for (_, handler) in list.iter_mut() {
            handler(payload);
        }
        list.len()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map(Vec::len).unwrap_or(0)
    }

    pub fn total_handlers(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[test]
    fn fans_out_to_every_handler_in_registration_order() {
        let mut router = EventRouter::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let calls = calls.clone();
            router.register("pushBrowseLibrary", move |_| calls.lock().unwrap().push(tag));
        }
        let ran = router.dispatch("pushBrowseLibrary", &json!({}));
        assert_eq!(ran, 2);
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unknown_events_are_ignored() {
        let mut router = EventRouter::new();
        assert_eq!(router.dispatch("pushNothing", &Value::Null), 0);
    }

    #[test]
    fn unregister_removes_only_that_handler() {
        let mut router = EventRouter::new();
        let hits = Arc::new(Mutex::new(0));
        let a = router.register("pushQueue", |_| {});
        let counter = hits.clone();
        router.register("pushQueue", move |_| *counter.lock().unwrap() += 1);
        assert!(router.unregister(a));
        assert!(!router.unregister(a));
        assert_eq!(router.handler_count("pushQueue"), 1);
        router.dispatch("pushQueue", &json!([]));
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn handlers_receive_the_payload() {
        let mut router = EventRouter::new();
        let seen = Arc::new(Mutex::new(Value::Null));
        let sink = seen.clone();
        router.register("pushVersion", move |v| *sink.lock().unwrap() = v.clone());
        router.dispatch("pushVersion", &json!({ "systemversion": "3" }));
        assert_eq!(seen.lock().unwrap()["systemversion"], "3");
    }
}
