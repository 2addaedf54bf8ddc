//! WebSocket upgrade, framing, and the Broadcast Registry. See crate docs §4.7-§4.8.

mod frame;
mod handshake;

pub mod connection;
pub mod peer;
pub mod registry;

pub use handshake::build_accept_response;
pub use peer::WebsocketPeer;
pub use registry::BroadcastRegistry;
