#![allow(dead_code)]
//! Shared helpers for the scenario tests in this directory: sending a raw HTTP/1.1 request over a
//! real `TcpStream` to a `Server` bound on an ephemeral port and reading back the raw response.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Sends `raw_request` to `port` on loopback and returns everything read back before the peer
/// closes the connection. Always sends `Connection: close` semantics by relying on the caller's
/// request already asking for that, since every scenario here is a single request/response.
pub fn send(port: u16, raw_request: &str) -> String {
  let mut stream = TcpStream::connect(("127.0.0.1", port)).expect("connect to test server");
  stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
  stream.write_all(raw_request.as_bytes()).unwrap();
  stream.shutdown(std::net::Shutdown::Write).unwrap();

  let mut response = String::new();
  stream.read_to_string(&mut response).unwrap();
  response
}

/// Splits a raw HTTP response into `(status_line, headers_and_body)` for easier assertions.
pub fn status_line(response: &str) -> &str {
  response.lines().next().unwrap_or_default()
}

/// Returns the body of a raw HTTP response, i.e. everything after the blank line.
pub fn body(response: &str) -> &str {
  response.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or_default()
}
