//! Event names used on the backend socket.

/// Unsolicited server-to-client pushes.
pub mod push {
    pub const STATE: &str = "pushState";
    pub const QUEUE: &str = "pushQueue";
    pub const BROWSE_LIBRARY: &str = "pushBrowseLibrary";
    pub const BROWSE_SOURCES: &str = "pushBrowseSources";
    pub const NETWORK_STATUS: &str = "pushNetworkStatus";
    pub const VERSION: &str = "pushVersion";
    pub const URI_FAVOURITES: &str = "urifavourites";
    pub const LIST_PLAYLIST: &str = "pushListPlaylist";
}

/// Fire-and-forget client requests.
pub mod request {
    pub const GET_STATE: &str = "getState";
    pub const PLAY: &str = "play";
    pub const PAUSE: &str = "pause";
    pub const STOP: &str = "stop";
    pub const PREV: &str = "prev";
    pub const NEXT: &str = "next";
    pub const SEEK: &str = "seek";
    pub const SET_RANDOM: &str = "setRandom";
    pub const SET_REPEAT: &str = "setRepeat";
    pub const VOLUME: &str = "volume";
    pub const MUTE: &str = "mute";
    pub const UNMUTE: &str = "unmute";

    pub const GET_QUEUE: &str = "getQueue";
    pub const REMOVE_FROM_QUEUE: &str = "removeFromQueue";
    pub const MOVE_QUEUE: &str = "moveQueue";
    pub const CLEAR_QUEUE: &str = "clearQueue";
    pub const SAVE_QUEUE_TO_PLAYLIST: &str = "saveQueueToPlaylist";
    pub const ADD_TO_QUEUE: &str = "addToQueue";
    pub const REPLACE_AND_PLAY: &str = "replaceAndPlay";

    pub const BROWSE_LIBRARY: &str = "browseLibrary";
    pub const GET_BROWSE_SOURCES: &str = "getBrowseSources";
    pub const SEARCH: &str = "search";

    pub const LIST_PLAYLIST: &str = "listPlaylist";
    pub const CREATE_PLAYLIST: &str = "createPlaylist";
    pub const ADD_TO_PLAYLIST: &str = "addToPlaylist";

    pub const ADD_TO_FAVOURITES: &str = "addToFavourites";
    pub const REMOVE_FROM_FAVOURITES: &str = "removeFromFavourites";
    pub const PLAY_FAVOURITES: &str = "playFavourites";

    pub const GET_VERSION: &str = "getVersion";
}
