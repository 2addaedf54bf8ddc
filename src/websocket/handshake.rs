//! RFC 6455 §1.3 opening handshake: turns a validated upgrade request into the
//! `101 Switching Protocols` response that completes it.

use crate::error::{Error, Result};
use crate::http::request_context::Request;
use crate::http::response::Response;
use crate::http::status::StatusCode;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};
use std::io::ErrorKind;

/// The GUID every `Sec-WebSocket-Accept` is derived from, fixed by RFC 6455 §1.3.
const MAGIC_STRING: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Computes the `Sec-WebSocket-Accept` value for a given `Sec-WebSocket-Key`.
fn accept_key(client_key: &str) -> String {
  let mut hasher = Sha1::new();
  hasher.update(client_key.as_bytes());
  hasher.update(MAGIC_STRING.as_bytes());
  STANDARD.encode(hasher.finalize())
}

/// Builds the `101 Switching Protocols` response completing the handshake for `request`, or an
/// error if the request is missing the `Sec-WebSocket-Key` header a valid upgrade must carry.
pub fn build_accept_response(request: &Request) -> Result<Response> {
  let client_key = request
    .headers()
    .get("Sec-WebSocket-Key")
    .ok_or_else(|| Error::new_io(ErrorKind::InvalidInput, "missing Sec-WebSocket-Key header"))?;

  let accept = accept_key(client_key);

  Ok(
    Response::new(StatusCode::SwitchingProtocols)
      .with_header("Upgrade", "websocket")
      .with_header("Connection", "Upgrade")
      .with_header("Sec-WebSocket-Accept", accept),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  // RFC 6455 §1.3's own worked example.
  #[test]
  fn matches_rfc_example() {
    assert_eq!(accept_key("dGhlIHNhbXBsZSBub25jZQ=="), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
  }
}
