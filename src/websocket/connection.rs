//! The per-connection driver that runs after a successful handshake: registers the new peer with
//! the Broadcast Registry, then applies the frame policy (§4.7) until the connection closes.

use crate::error::Result;
use crate::stream::ConnectionStream;
use crate::trace_log;
use crate::websocket::frame::{Frame, Opcode};
use crate::websocket::peer::WebsocketPeer;
use crate::websocket::registry::BroadcastRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Runs a single upgraded WebSocket connection to completion.
///
/// Ping frames are answered with a pong echoing the same payload; a close frame is echoed back
/// and ends the loop. Text, binary, and pong frames are logged and otherwise ignored - this core
/// does not route application data frames to handlers, see crate docs §4.7.
pub fn serve(id: u128, stream: Box<dyn ConnectionStream>, registry: &BroadcastRegistry) -> Result<()> {
  let closed = Arc::new(AtomicBool::new(false));
  let peer = WebsocketPeer::new(id, stream.new_ref_stream_write(), closed.clone());
  registry.add(peer.clone());

  let result = read_loop(stream.as_ref(), &peer, closed.as_ref());

  registry.remove(id);
  result
}

fn read_loop(stream: &dyn ConnectionStream, peer: &WebsocketPeer, closed: &AtomicBool) -> Result<()> {
  loop {
    if closed.load(Ordering::SeqCst) {
      return Ok(());
    }

    let frame = match Frame::from_stream(stream) {
      Ok(frame) => frame,
      Err(_) => return Ok(()),
    };

    match frame.opcode {
      Opcode::Ping => peer.send_pong(frame.payload)?,
      Opcode::Close => {
        peer.send_close()?;
        return Ok(());
      }
      Opcode::Text | Opcode::Binary | Opcode::Continuation | Opcode::Pong => {
        trace_log!(
          "knot: websocket peer {} sent a {:?} frame ({} bytes), ignoring",
          peer.id(),
          frame.opcode,
          frame.payload.len()
        );
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stream::boxed;
  use std::sync::{Arc as StdArc, Mutex};

  #[derive(Clone)]
  struct SharedBuf(StdArc<Mutex<Vec<u8>>>);
  impl std::io::Write for SharedBuf {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(data);
      Ok(data.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  fn ping_frame() -> Vec<u8> {
    Frame::new(Opcode::Ping, b"hi".to_vec()).into()
  }

  fn close_frame() -> Vec<u8> {
    Frame::new(Opcode::Close, vec![0x03, 0xe8]).into()
  }

  #[test]
  fn ping_is_answered_with_a_pong_echoing_the_payload() {
    let mut incoming = ping_frame();
    incoming.extend_from_slice(&close_frame());

    let buf = StdArc::new(Mutex::new(Vec::new()));
    let stream = boxed::new(Box::new(std::io::Cursor::new(incoming)), Box::new(SharedBuf(buf.clone())));
    let registry = BroadcastRegistry::new();

    serve(1, stream, &registry).unwrap();

    let written = buf.lock().unwrap().clone();
    let response_stream =
      boxed::new(Box::new(std::io::Cursor::new(written)), Box::new(std::io::sink()));
    let pong = Frame::from_stream(response_stream.as_ref()).unwrap();
    assert_eq!(pong.opcode, Opcode::Pong);
    assert_eq!(pong.payload, b"hi");
    assert_eq!(registry.len(), 0);
  }
}
