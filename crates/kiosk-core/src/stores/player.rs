//! Current playback snapshot and transport controls.
//!
//! Actions only emit requests. The snapshot changes exclusively when the
//! backend pushes a new `pushState`, so optimistic and authoritative state
//! never diverge.

use std::sync::Arc;

use kiosk_types::events::{push, request};
use kiosk_types::requests::{RepeatRequest, ValueRequest};
use kiosk_types::{PlaybackStatus, PlayerState};
use serde_json::Value;

use crate::assets::AssetResolver;
use crate::cell::StateCell;
use crate::router::EventRouter;
use crate::stores::{Registrations, decode_push, emit_json};
use crate::transport::Emitter;

pub struct PlayerStore {
    state: StateCell<PlayerState>,
    emitter: Arc<dyn Emitter>,
    assets: AssetResolver,
    registrations: Registrations,
}

impl PlayerStore {
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
            vec![router.register(push::STATE, move |payload| {
                apply_state(&state, &assets, payload);
            })]
        });
    }

    pub fn cleanup(&self, router: &mut EventRouter) {
        self.registrations.disarm(router);
    }

    pub fn is_initialized(&self) -> bool {
        self.registrations.is_armed()
    }

    pub fn state(&self) -> &StateCell<PlayerState> {
        &self.state
    }

    pub fn refresh(&self) {
        self.emitter.emit(request::GET_STATE, Value::Null);
    }

    pub fn play(&self) {
        self.emitter.emit(request::PLAY, Value::Null);
    }

    pub fn pause(&self) {
        self.emitter.emit(request::PAUSE, Value::Null);
    }

    /// Play or pause depending on the last pushed status.
    pub fn toggle(&self) {
        if self.state.with(|s| s.status == PlaybackStatus::Play) {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn stop(&self) {
        self.emitter.emit(request::STOP, Value::Null);
    }

    pub fn prev(&self) {
        self.emitter.emit(request::PREV, Value::Null);
    }

    pub fn next(&self) {
        self.emitter.emit(request::NEXT, Value::Null);
    }

    /// Seek to an absolute position in seconds.
    pub fn seek_to(&self, seconds: u64) {
        emit_json(&*self.emitter, request::SEEK, &ValueRequest { value: seconds });
    }

    pub fn toggle_shuffle(&self) {
        let random = self.state.with(|s| s.random);
        emit_json(&*self.emitter, request::SET_RANDOM, &ValueRequest { value: !random });
    }

    pub fn set_repeat(&self, repeat: bool, repeat_single: bool) {
        emit_json(
            &*self.emitter,
            request::SET_REPEAT,
            &RepeatRequest {
                value: repeat,
                repeat_single: repeat && repeat_single,
            },
        );
    }

    /// off -> all -> one -> off
    pub fn cycle_repeat(&self) {
        let (repeat, single) = self.state.with(|s| (s.repeat, s.repeat_single));
        match (repeat, single) {
            (false, _) => self.set_repeat(true, false),
            (true, false) => self.set_repeat(true, true),
            (true, true) => self.set_repeat(false, false),
        }
    }

    pub fn set_volume(&self, volume: u64) {
        emit_json(
            &*self.emitter,
            request::VOLUME,
            &ValueRequest { value: volume.min(100) },
        );
    }

    pub fn toggle_mute(&self) {
        if self.state.with(|s| s.mute) {
            self.emitter.emit(request::UNMUTE, Value::Null);
        } else {
            self.emitter.emit(request::MUTE, Value::Null);
        }
    }
}

fn apply_state(state: &StateCell<PlayerState>, assets: &AssetResolver, payload: &Value) {
    let Some(mut next) = decode_push::<PlayerState>(push::STATE, payload) else {
        return;
    };
    next.albumart = assets.resolve(&next.albumart);
    state.replace(next);
}

pub fn is_playing(state: &PlayerState) -> bool {
    state.status == PlaybackStatus::Play
}

/// Elapsed share of the track, clamped to `0..=100`; `0` for unknown length.
pub fn progress_percent(state: &PlayerState) -> f64 {
    if state.duration == 0 {
        return 0.0;
    }
    let pct = state.seek as f64 / (state.duration as f64 * 1000.0) * 100.0;
    pct.clamp(0.0, 100.0)
}

/// Label such as `FLAC • 24 bit • 96 kHz`; empty when nothing is known.
pub fn track_quality(state: &PlayerState) -> String {
    let track_type = state
        .track_type
        .as_deref()
        .map(|t| t.trim().to_ascii_uppercase());
    [
        track_type,
        state.bitdepth.as_deref().map(|s| s.trim().to_string()),
        state.samplerate.as_deref().map(|s| s.trim().to_string()),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" • ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing;
    use serde_json::json;

    fn store() -> (testing::RecordingEmitter, PlayerStore, EventRouter) {
        let (rec, emitter) = testing::emitter();
        let store = PlayerStore::new(emitter, AssetResolver::new("http://host:3000"));
        let mut router = EventRouter::new();
        store.init(&mut router);
        (rec, store, router)
    }

    #[test]
    fn push_replaces_snapshot_and_resolves_albumart() {
        let (_rec, store, mut router) = store();
        router.dispatch(
            push::STATE,
            &json!({ "status": "play", "title": "A", "random": true, "albumart": "/albumart?path=x" }),
        );
        router.dispatch(push::STATE, &json!({ "status": "pause", "title": "B" }));
        let state = store.state().get();
        assert_eq!(state.title, "B");
        assert_eq!(state.status, PlaybackStatus::Pause);
        // wholesale replacement: fields missing from the newer push are reset
        assert!(!state.random);
        assert_eq!(state.albumart, "");

        router.dispatch(push::STATE, &json!({ "albumart": "/albumart?path=x" }));
        assert_eq!(store.state().get().albumart, "http://host:3000/albumart?path=x");
    }

    #[test]
    fn malformed_push_keeps_previous_snapshot() {
        let (_rec, store, mut router) = store();
        router.dispatch(push::STATE, &json!({ "title": "Kept" }));
        router.dispatch(push::STATE, &json!("garbage"));
        assert_eq!(store.state().get().title, "Kept");
    }

    #[test]
    fn actions_emit_without_touching_state() {
        let (rec, store, mut router) = store();
        router.dispatch(push::STATE, &json!({ "status": "play", "random": false }));
        let before = store.state().get();

        store.toggle();
        store.next();
        store.seek_to(42);
        store.toggle_shuffle();
        store.set_volume(150);

        assert_eq!(store.state().get(), before);
        assert_eq!(
            rec.take(),
            vec![
                ("pause".to_string(), Value::Null),
                ("next".to_string(), Value::Null),
                ("seek".to_string(), json!({ "value": 42 })),
                ("setRandom".to_string(), json!({ "value": true })),
                ("volume".to_string(), json!({ "value": 100 })),
            ]
        );
    }

    #[test]
    fn cycle_repeat_walks_off_all_one() {
        let (rec, store, mut router) = store();
        store.cycle_repeat();
        router.dispatch(push::STATE, &json!({ "repeat": true }));
        store.cycle_repeat();
        router.dispatch(push::STATE, &json!({ "repeat": true, "repeatSingle": true }));
        store.cycle_repeat();
        let payloads: Vec<Value> = rec.take().into_iter().map(|(_, v)| v).collect();
        assert_eq!(
            payloads,
            vec![
                json!({ "value": true, "repeatSingle": false }),
                json!({ "value": true, "repeatSingle": true }),
                json!({ "value": false, "repeatSingle": false }),
            ]
        );
    }

    #[test]
    fn progress_is_clamped_and_handles_missing_duration() {
        let mut state = PlayerState { seek: 30_000, duration: 120, ..PlayerState::default() };
        assert_eq!(progress_percent(&state), 25.0);
        state.seek = 500_000;
        assert_eq!(progress_percent(&state), 100.0);
        state.duration = 0;
        assert_eq!(progress_percent(&state), 0.0);
    }

    #[test]
    fn quality_label_joins_known_parts() {
        let state = PlayerState {
            track_type: Some("flac".into()),
            bitdepth: Some("24 bit".into()),
            samplerate: Some("96 kHz".into()),
            ..PlayerState::default()
        };
        assert_eq!(track_quality(&state), "FLAC • 24 bit • 96 kHz");
        let state = PlayerState { samplerate: Some("44.1 kHz".into()), ..PlayerState::default() };
        assert_eq!(track_quality(&state), "44.1 kHz");
        assert_eq!(track_quality(&PlayerState::default()), "");
    }
}
