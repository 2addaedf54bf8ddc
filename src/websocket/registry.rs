//! Broadcast Registry (§4.8): the set of currently-connected WebSocket peers a server can
//! broadcast a message to, or disconnect all at once.
//!
//! The peer set is guarded by a single mutex, but the lock is only ever held long enough to take
//! a snapshot or apply a removal list - the actual writes to each peer happen outside the lock, so
//! one slow or wedged peer never blocks registration of new connections or a concurrent broadcast.

use crate::error::Error;
use crate::websocket::frame::{Frame, Opcode};
use crate::websocket::peer::WebsocketPeer;
use std::sync::Mutex;

/// The live set of WebSocket peers attached to a server.
#[derive(Debug, Default)]
pub struct BroadcastRegistry {
  peers: Mutex<Vec<WebsocketPeer>>,
}

impl BroadcastRegistry {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `peer`, making it a target of subsequent [`Self::broadcast`] calls.
  pub fn add(&self, peer: WebsocketPeer) {
    crate::util::unwrap_poison(self.peers.lock()).map(|mut guard| guard.push(peer)).ok();
  }

  /// Removes the peer registered under `id`, if any. Called once a connection's read loop ends,
  /// and internally whenever a broadcast or disconnect discovers a peer is no longer reachable.
  pub fn remove(&self, id: u128) {
    crate::util::unwrap_poison(self.peers.lock()).map(|mut guard| guard.retain(|p| p.id() != id)).ok();
  }

  /// The number of currently registered peers.
  pub fn len(&self) -> usize {
    crate::util::unwrap_poison(self.peers.lock()).map(|guard| guard.len()).unwrap_or(0)
  }

  /// Encodes `text` as a single text frame once, then writes that same frame to every registered,
  /// not-yet-closed peer. A peer whose write fails is dropped from the registry; if `on_failure` is
  /// given it is invoked with the peer's id and the error first, otherwise the failure is silently
  /// dropped.
  pub fn broadcast(&self, text: impl AsRef<str>, mut on_failure: Option<&mut dyn FnMut(u128, &Error)>) {
    let snapshot = match crate::util::unwrap_poison(self.peers.lock()) {
      Ok(guard) => guard.clone(),
      Err(_) => return,
    };

    let frame = Frame::new(Opcode::Text, text.as_ref().as_bytes().to_vec());
    let bytes: Vec<u8> = frame.into();

    let mut dead = Vec::new();
    for peer in &snapshot {
      if peer.is_closed() {
        dead.push(peer.id());
        continue;
      }

      if let Err(err) = peer.send_encoded(&bytes) {
        if let Some(callback) = on_failure.as_deref_mut() {
          callback(peer.id(), &err);
        }
        dead.push(peer.id());
      }
    }

    if !dead.is_empty() {
      if let Ok(mut guard) = crate::util::unwrap_poison(self.peers.lock()) {
        guard.retain(|p| !dead.contains(&p.id()));
      }
    }
  }

  /// Sends a normal-closure close frame to every registered peer and empties the registry.
  pub fn disconnect(&self) {
    let drained = match crate::util::unwrap_poison(self.peers.lock()) {
      Ok(mut guard) => std::mem::take(&mut *guard),
      Err(_) => return,
    };

    for peer in drained {
      let _ = peer.send_close();
    }
  }
}
