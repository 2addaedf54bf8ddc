//! §8 scenario 8: broadcasting to a connected WebSocket peer delivers an unmasked text frame
//! carrying the exact payload, performing the opening handshake of RFC 6455 §1.3 for real over a
//! `TcpStream` first. The "dead peer is dropped and does not panic the broadcast" half of the
//! scenario is covered deterministically at the unit level in `websocket::registry`, since there
//! is no public API to observe registry membership from outside the crate and racing a real
//! socket close against a broadcast call would only buy flakiness.

mod common;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use knot::server::ServerBuilder;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::thread;
use std::time::Duration;

fn handshake(port: u16) -> TcpStream {
  let mut stream = TcpStream::connect(("127.0.0.1", port)).expect("connect to test server");
  stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();

  let key = STANDARD.encode(b"0123456789012345");
  let request = format!(
    "GET /ws HTTP/1.1\r\nHost: x\r\nConnection: Upgrade\r\nUpgrade: websocket\r\nSec-WebSocket-Version: 13\r\nSec-WebSocket-Key: {key}\r\n\r\n"
  );
  stream.write_all(request.as_bytes()).unwrap();

  let mut response = [0u8; 4096];
  let read = stream.read(&mut response).unwrap();
  let response = String::from_utf8_lossy(&response[..read]);
  assert!(response.starts_with("HTTP/1.1 101"), "expected a successful upgrade, got: {response}");

  stream
}

/// Reads one unmasked, unfragmented server-to-client text frame and returns its payload.
fn read_text_frame(stream: &mut TcpStream) -> Vec<u8> {
  let mut header = [0u8; 2];
  stream.read_exact(&mut header).unwrap();
  assert_eq!(header[0] & 0b0000_1111, 0x1, "expected a text frame opcode");
  assert_eq!(header[1] & 0b1000_0000, 0, "server-to-client frames must not be masked");

  let len = (header[1] & 0b0111_1111) as usize;
  let mut payload = vec![0u8; len];
  stream.read_exact(&mut payload).unwrap();
  payload
}

#[test]
fn broadcast_delivers_the_exact_payload_to_a_connected_peer() {
  let server = ServerBuilder::default().build();
  let port = server.start(0).unwrap();

  let mut peer = handshake(port);

  // Give the connection's own thread time to register the peer with the broadcast registry
  // before this thread asks for a broadcast; the handshake response racing the registry add is
  // the only non-determinism here.
  thread::sleep(Duration::from_millis(100));

  server.broadcast("hello");

  let payload = read_text_frame(&mut peer);
  assert_eq!(payload, b"hello");

  server.stop().unwrap();
}
