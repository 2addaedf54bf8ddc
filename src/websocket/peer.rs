//! A cloneable handle to one accepted WebSocket connection's write side, held by the Broadcast
//! Registry (§4.8) and by the connection's own read loop.

use crate::error::Result;
use crate::stream::ConnectionStreamWrite;
use crate::websocket::frame::{Frame, Opcode};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One registered WebSocket peer. Cloning yields a new handle to the same connection and the
/// same closed-flag, so any clone observes a close made through another.
pub struct WebsocketPeer {
  id: u128,
  stream: Box<dyn ConnectionStreamWrite>,
  closed: Arc<AtomicBool>,
}

impl WebsocketPeer {
  pub(crate) fn new(id: u128, stream: Box<dyn ConnectionStreamWrite>, closed: Arc<AtomicBool>) -> Self {
    Self { id, stream, closed }
  }

  /// The process-unique id this peer was registered under.
  pub fn id(&self) -> u128 {
    self.id
  }

  /// Whether this peer's connection has already sent or received a close frame.
  pub fn is_closed(&self) -> bool {
    self.closed.load(Ordering::SeqCst)
  }

  /// Sends a text message to this peer.
  pub fn send_text(&self, text: impl AsRef<str>) -> Result<()> {
    self.send_frame(Frame::new(Opcode::Text, text.as_ref().as_bytes().to_vec()))
  }

  /// Sends the already-encoded bytes of a pre-built frame, used by the Broadcast Registry to
  /// encode a broadcast message once and reuse the bytes across every peer.
  pub(crate) fn send_encoded(&self, bytes: &[u8]) -> Result<()> {
    self.stream.write_all(bytes)?;
    self.stream.flush()
  }

  pub(crate) fn send_pong(&self, payload: Vec<u8>) -> Result<()> {
    self.send_frame(Frame::new(Opcode::Pong, payload))
  }

  /// Sends a close frame with the normal-closure status code (1000) and marks this peer closed.
  pub fn send_close(&self) -> Result<()> {
    self.closed.store(true, Ordering::SeqCst);
    self.send_frame(Frame::new(Opcode::Close, vec![0x03, 0xe8]))
  }

  fn send_frame(&self, frame: Frame) -> Result<()> {
    let bytes: Vec<u8> = frame.into();
    self.send_encoded(&bytes)
  }
}

impl Clone for WebsocketPeer {
  fn clone(&self) -> Self {
    Self { id: self.id, stream: self.stream.new_ref_stream_write(), closed: self.closed.clone() }
  }
}

impl Debug for WebsocketPeer {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WebsocketPeer").field("id", &self.id).field("closed", &self.is_closed()).finish()
  }
}
