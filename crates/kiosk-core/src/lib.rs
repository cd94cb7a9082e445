//! State synchronization core for a kiosk remote control.
//!
//! A [`transport`] keeps one websocket to the backend alive, the [`hub`]
//! routes its pushes into the domain [`stores`], and [`view_model`] derives
//! display values from them.

pub mod assets;
pub mod cell;
pub mod config;
pub mod hub;
pub mod protocol;
pub mod router;
pub mod stores;
pub mod transport;
pub mod view_model;

pub use assets::AssetResolver;
pub use cell::StateCell;
pub use hub::Hub;
pub use router::{EventRouter, SubscriptionId};
pub use stores::Stores;
pub use transport::{
    ConnectionState, ConnectionStatus, Emitter, ReconnectPolicy, TransportEvent, TransportHandle,
};
pub use view_model::{ConnectionIndicator, Snapshot, ViewModel, format_duration};
