//! Overlay state: context menu, playlist selector, track info, status drawer.
//!
//! The four overlays are separate flags. Opening the playlist selector or the
//! track info from the context menu closes the menu; nothing else is
//! exclusive, so the status drawer can stay open over any of them. Backend
//! events never touch this store.

use kiosk_types::ContextMenuItem;

use crate::cell::StateCell;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContextMenuState {
    pub is_open: bool,
    pub item: Option<ContextMenuItem>,
    pub position: Position,
    /// Queue index for index-addressed queue actions.
    pub item_index: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaylistSelectorState {
    pub is_open: bool,
    pub item: Option<ContextMenuItem>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackInfoState {
    pub is_open: bool,
    pub item: Option<ContextMenuItem>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    ContextMenu,
    PlaylistSelector,
    TrackInfo,
    StatusDrawer,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
    pub context_menu: ContextMenuState,
    pub playlist_selector: PlaylistSelectorState,
    pub track_info: TrackInfoState,
    pub status_drawer_open: bool,
}

impl UiState {
    pub fn any_modal_open(&self) -> bool {
        self.context_menu.is_open
            || self.playlist_selector.is_open
            || self.track_info.is_open
            || self.status_drawer_open
    }

    /// The overlay an outside click dismisses, topmost first.
    pub fn active_overlay(&self) -> Option<Overlay> {
        if self.playlist_selector.is_open {
            Some(Overlay::PlaylistSelector)
        } else if self.track_info.is_open {
            Some(Overlay::TrackInfo)
        } else if self.context_menu.is_open {
            Some(Overlay::ContextMenu)
        } else if self.status_drawer_open {
            Some(Overlay::StatusDrawer)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct UiStore {
    state: StateCell<UiState>,
}

impl UiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &StateCell<UiState> {
        &self.state
    }

    pub fn open_context_menu(
        &self,
        item: ContextMenuItem,
        position: Position,
        item_index: Option<usize>,
    ) {
        self.state.update(|s| {
            s.context_menu = ContextMenuState {
                is_open: true,
                item: Some(item),
                position,
                item_index,
            };
        });
    }

    pub fn close_context_menu(&self) {
        self.state.update(|s| s.context_menu = ContextMenuState::default());
    }

    /// Closes the context menu first, then opens the selector.
    pub fn open_playlist_selector(&self, item: ContextMenuItem) {
        self.state.update(|s| {
            s.context_menu = ContextMenuState::default();
            s.playlist_selector = PlaylistSelectorState {
                is_open: true,
                item: Some(item),
            };
        });
    }

    pub fn close_playlist_selector(&self) {
        self.state
            .update(|s| s.playlist_selector = PlaylistSelectorState::default());
    }

    /// Closes the context menu first, then opens the track info modal.
    pub fn open_track_info(&self, item: ContextMenuItem) {
        self.state.update(|s| {
            s.context_menu = ContextMenuState::default();
            s.track_info = TrackInfoState {
                is_open: true,
                item: Some(item),
            };
        });
    }

    pub fn close_track_info(&self) {
        self.state.update(|s| s.track_info = TrackInfoState::default());
    }

    /// Hand the context menu's target to the playlist selector. No-op when
    /// the menu has no item.
    pub fn context_menu_to_playlist_selector(&self) {
        if let Some(item) = self.state.with(|s| s.context_menu.item.clone()) {
            self.open_playlist_selector(item);
        }
    }

    pub fn context_menu_to_track_info(&self) {
        if let Some(item) = self.state.with(|s| s.context_menu.item.clone()) {
            self.open_track_info(item);
        }
    }

    pub fn open_status_drawer(&self) {
        self.state.update(|s| s.status_drawer_open = true);
    }

    pub fn close_status_drawer(&self) {
        self.state.update(|s| s.status_drawer_open = false);
    }

    pub fn toggle_status_drawer(&self) {
        self.state.update(|s| s.status_drawer_open = !s.status_drawer_open);
    }

    /// Dismiss the topmost overlay, as an outside click does.
    pub fn dismiss_active(&self) {
        match self.state.with(UiState::active_overlay) {
            Some(Overlay::PlaylistSelector) => self.close_playlist_selector(),
            Some(Overlay::TrackInfo) => self.close_track_info(),
            Some(Overlay::ContextMenu) => self.close_context_menu(),
            Some(Overlay::StatusDrawer) => self.close_status_drawer(),
            None => {}
        }
    }

    pub fn close_all_modals(&self) {
        self.state.replace(UiState::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_types::{QueueItem, Track};

    fn track() -> ContextMenuItem {
        ContextMenuItem::Track(Track {
            title: "So What".into(),
            uri: "mnt/so-what.flac".into(),
            ..Track::default()
        })
    }

    fn assert_consistent(state: &UiState) {
        let expected = state.context_menu.is_open
            || state.playlist_selector.is_open
            || state.track_info.is_open
            || state.status_drawer_open;
        assert_eq!(state.any_modal_open(), expected);
        assert_eq!(state.active_overlay().is_some(), expected);
    }

    #[test]
    fn selector_from_open_menu_closes_the_menu() {
        let ui = UiStore::new();
        ui.open_context_menu(track(), Position { x: 10.0, y: 20.0 }, None);
        assert!(ui.state().get().context_menu.is_open);
        ui.open_playlist_selector(track());
        let state = ui.state().get();
        assert!(!state.context_menu.is_open);
        assert!(state.playlist_selector.is_open);
        assert_eq!(state.active_overlay(), Some(Overlay::PlaylistSelector));
        assert_consistent(&state);
    }

    #[test]
    fn subscribers_never_see_both_menu_and_track_info_open() {
        let ui = UiStore::new();
        ui.open_context_menu(track(), Position::default(), None);
        let mut rx = ui.state().subscribe();
        let _ = rx.borrow_and_update();
        ui.context_menu_to_track_info();
        let state = rx.borrow_and_update().clone();
        assert!(!state.context_menu.is_open);
        assert!(state.track_info.is_open);
        assert_eq!(state.track_info.item, Some(track()));
    }

    #[test]
    fn queue_menu_keeps_item_index() {
        let ui = UiStore::new();
        let item = ContextMenuItem::Queue(QueueItem {
            name: "Freddie Freeloader".into(),
            ..QueueItem::default()
        });
        ui.open_context_menu(item, Position { x: 1.0, y: 2.0 }, Some(3));
        assert_eq!(ui.state().get().context_menu.item_index, Some(3));
        ui.close_context_menu();
        assert_eq!(ui.state().get().context_menu, ContextMenuState::default());
    }

    #[test]
    fn close_all_from_any_combination() {
        let ui = UiStore::new();
        ui.open_status_drawer();
        ui.open_context_menu(track(), Position::default(), Some(0));
        ui.open_track_info(track());
        ui.open_playlist_selector(track());
        let state = ui.state().get();
        // only the menu is exclusive; the rest can stack
        assert!(state.status_drawer_open && state.track_info.is_open);
        assert!(state.playlist_selector.is_open);
        assert!(!state.context_menu.is_open);
        assert_consistent(&state);

        ui.close_all_modals();
        let state = ui.state().get();
        assert!(!state.any_modal_open());
        assert!(!state.context_menu.is_open);
        assert!(!state.playlist_selector.is_open);
        assert!(!state.track_info.is_open);
        assert!(!state.status_drawer_open);
    }

    #[test]
    fn dismiss_closes_topmost_first() {
        let ui = UiStore::new();
        ui.toggle_status_drawer();
        ui.open_track_info(track());
        ui.dismiss_active();
        let state = ui.state().get();
        assert!(!state.track_info.is_open);
        assert!(state.status_drawer_open);
        ui.dismiss_active();
        assert!(!ui.state().get().any_modal_open());
    }

    #[test]
    fn menu_transition_without_item_is_a_noop() {
        let ui = UiStore::new();
        ui.context_menu_to_playlist_selector();
        assert_consistent(&ui.state().get());
        assert!(!ui.state().get().any_modal_open());
    }
}
