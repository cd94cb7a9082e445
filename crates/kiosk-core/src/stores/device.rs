//! Local device classification from the viewport.
//!
//! Nothing here talks to the backend. Resize notifications are collapsed by
//! [`ResizeDebouncer`] and applied by the hub loop once the quiet period
//! has passed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::cell::StateCell;

const PHONE_MAX_WIDTH: u32 = 768;
const TABLET_MAX_WIDTH: u32 = 1200;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceKind {
    Phone,
    Tablet,
    #[default]
    Desktop,
}

impl DeviceKind {
    pub fn from_width(width: u32) -> Self {
        if width < PHONE_MAX_WIDTH {
            DeviceKind::Phone
        } else if width < TABLET_MAX_WIDTH {
            DeviceKind::Tablet
        } else {
            DeviceKind::Desktop
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub viewport: Viewport,
    pub kind: DeviceKind,
}

impl DeviceState {
    pub fn from_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            kind: DeviceKind::from_width(viewport.width),
        }
    }
}

/// Keeps the latest viewport and the instant it may be applied.
///
/// Every push restarts the quiet period; only the last viewport survives.
#[derive(Debug)]
pub struct ResizeDebouncer {
    delay: Duration,
    pending: Option<(Viewport, Instant)>,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn push(&mut self, viewport: Viewport, now: Instant) {
        self.pending = Some((viewport, now + self.delay));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    pub fn take_due(&mut self, now: Instant) -> Option<Viewport> {
        match self.pending {
            Some((viewport, at)) if at <= now => {
                self.pending = None;
                Some(viewport)
            }
            _ => None,
        }
    }
}

pub struct DeviceStore {
    state: StateCell<DeviceState>,
    debouncer: Mutex<ResizeDebouncer>,
    wake: Arc<Notify>,
}

impl DeviceStore {
    pub fn new(resize_debounce: Duration) -> Self {
        Self {
            state: StateCell::default(),
            debouncer: Mutex::new(ResizeDebouncer::new(resize_debounce)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn state(&self) -> &StateCell<DeviceState> {
        &self.state
    }

    /// Apply a viewport immediately, e.g. the size known at startup.
    pub fn set_viewport(&self, width: u32, height: u32) {
        self.state
            .replace(DeviceState::from_viewport(Viewport::new(width, height)));
    }

    /// Record a resize; it lands after the debounce period.
    pub fn viewport_changed(&self, width: u32, height: u32) {
        let mut debouncer = self.debouncer.lock().unwrap_or_else(|err| err.into_inner());
        debouncer.push(Viewport::new(width, height), Instant::now());
        drop(debouncer);
        self.wake.notify_one();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.lock().ok().and_then(|d| d.deadline())
    }

    /// Apply a pending resize whose quiet period has passed. Returns whether
    /// the device state changed.
    pub fn apply_due(&self, now: Instant) -> bool {
        let due = self
            .debouncer
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .take_due(now);
        let Some(viewport) = due else {
            return false;
        };
        let next = DeviceState::from_viewport(viewport);
        if self.state.with(|s| *s == next) {
            return false;
        }
        tracing::debug!(width = viewport.width, height = viewport.height, kind = ?next.kind, "viewport applied");
        self.state.replace(next);
        true
    }

    pub(crate) fn wake(&self) -> Arc<Notify> {
        self.wake.clone()
    }
}
