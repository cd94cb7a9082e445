//! Wire types shared between the kiosk core and its front ends.
//!
//! Everything here mirrors the JSON the playback backend pushes or expects.
//! Fields the backend is known to omit or send as `null` deserialize to their
//! defaults instead of failing the whole payload.

mod de;
pub mod events;
mod library;
mod player;
pub mod requests;

pub use library::{
    Album, BrowseItem, BrowseList, BrowsePrev, BrowseResponse, BrowseSource, ContextMenuItem,
    QueueItem, Track,
};
pub use player::{FavouriteStatus, NetworkStatus, PlaybackStatus, PlayerState, VersionInfo};
