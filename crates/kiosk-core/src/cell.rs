//! Observable state container shared between a store and its readers.

use std::sync::Arc;

use tokio::sync::watch;

/// A single-writer, many-reader value with change notification.
///
/// Only the owning store mutates it; everybody else reads snapshots or
/// subscribes for changes.
pub struct StateCell<T> {
    tx: Arc<watch::Sender<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<T: Clone> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Clone the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub(crate) fn replace(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }
}

impl<T: Clone + Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_replacements() {
        let cell = StateCell::new(1u32);
        let mut rx = cell.subscribe();
        cell.replace(2);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);
        cell.update(|v| *v += 1);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn writes_without_subscribers_are_kept() {
        let cell = StateCell::new(String::new());
        cell.replace("x".into());
        assert_eq!(cell.with(|s| s.len()), 1);
    }
}
