//! The per-connection request context and the immutable [`Request`] view handlers actually see.
//! See crate docs §4.4-§4.5.

use crate::error::{RequestParsingError, Result};
use crate::http::headers::{HeaderName, Headers};
use crate::http::method::Method;
use crate::http::request::{HttpVersion, RequestHead};
use crate::stream::ConnectionStreamRead;
use crate::util::next_id;
use std::collections::HashMap;

/// Maximum number of body bytes read regardless of a (possibly forged) `Content-Length`. Chosen
/// generously; applications expecting larger bodies should stream over a raw `ConnectionStream`
/// of their own outside this crate's request/response model.
const MAX_BODY_SIZE: u64 = 64 * 1024 * 1024;

/// Everything read off the wire for a single request: the parsed head plus its (possibly
/// truncated, see [`RequestContext::read`]) body. Built once per request by the connection
/// loop and handed to the Conductor, which wraps it in a [`Request`] once routing parameters
/// are known.
#[derive(Debug)]
pub struct RequestContext {
  id: u128,
  peer_address: String,
  head: RequestHead,
  body: Vec<u8>,
}

impl RequestContext {
  /// Reads a full request (head plus body) from `stream`.
  ///
  /// The body is read up to the declared `Content-Length` or until the stream reaches EOF,
  /// whichever comes first - it is never an error for fewer bytes to arrive than declared. That
  /// mismatch is instead surfaced by the Conductor's length check (§4.6 step 1), which turns it
  /// into a clean `400` response rather than a transport-level failure.
  pub fn read(stream: &dyn ConnectionStreamRead, peer_address: String) -> Result<Self> {
    let head = RequestHead::read_from(stream)?;
    let declared_length = head.content_length()?;

    let mut body = Vec::new();
    if let Some(declared) = declared_length {
      let capped = declared.min(MAX_BODY_SIZE);
      body = read_body(stream, capped)?;
    }

    Ok(Self { id: next_id(), peer_address, head, body })
  }

  /// A process-unique identifier for this request, used to correlate log lines.
  pub fn id(&self) -> u128 {
    self.id
  }

  /// The remote peer's address, as reported by the underlying transport.
  pub fn peer_address(&self) -> &str {
    self.peer_address.as_str()
  }

  /// The parsed request head.
  pub fn head(&self) -> &RequestHead {
    &self.head
  }

  /// The request body, as received. May be shorter than any declared `Content-Length`.
  pub fn body(&self) -> &[u8] {
    self.body.as_slice()
  }

  /// Whether the declared `Content-Length` (if any) matches the number of body bytes actually
  /// received. Checked explicitly by the Conductor rather than inside [`Self::read`] so a
  /// mismatch becomes a `400` response instead of an I/O error.
  pub fn content_length_matches(&self) -> Result<bool> {
    Ok(self.content_length_mismatch()?.is_none())
  }

  /// Returns the [`RequestParsingError::ContentLengthMismatch`] describing the discrepancy
  /// between the declared `Content-Length` and the number of body bytes actually received, or
  /// `None` if they agree. Separate from [`Self::content_length_matches`] so the Conductor can
  /// report `declared`/`received` in the `400` it sends back (§7).
  pub fn content_length_mismatch(&self) -> Result<Option<RequestParsingError>> {
    let received = self.body.len() as u64;
    Ok(match self.head.content_length()? {
      Some(declared) if declared.min(MAX_BODY_SIZE) != received => {
        Some(RequestParsingError::ContentLengthMismatch { declared, received })
      }
      Some(_) => None,
      None if received == 0 => None,
      None => Some(RequestParsingError::ContentLengthMismatch { declared: 0, received }),
    })
  }

  /// Whether this request asks to be upgraded to a WebSocket connection: `GET`, `Connection:
  /// Upgrade`, `Upgrade: websocket`. See crate docs §6.1.
  pub fn is_upgrade_request(&self) -> bool {
    if *self.head.method() != Method::Get {
      return false;
    }

    header_contains_token(&self.head, HeaderName::Connection, "upgrade")
      && header_contains_token(&self.head, HeaderName::Upgrade, "websocket")
  }
}

fn header_contains_token(head: &RequestHead, name: HeaderName, token: &str) -> bool {
  head
    .headers()
    .iter()
    .filter(|header| header.name == name)
    .any(|header| header.value.split(',').any(|part| part.trim().eq_ignore_ascii_case(token)))
}

fn read_body(stream: &dyn ConnectionStreamRead, declared: u64) -> Result<Vec<u8>> {
  let mut body = vec![0u8; declared as usize];
  let mut read_total = 0usize;

  while read_total < body.len() {
    let n = stream.read(&mut body[read_total..])?;
    if n == 0 {
      break;
    }
    read_total += n;
  }

  body.truncate(read_total);
  Ok(body)
}

/// The immutable, routed view of a request a [`crate::handler::Handler`] actually operates on:
/// the request context plus the path parameters and unmatched path tail the router resolved.
#[derive(Debug)]
pub struct Request {
  context: RequestContext,
  path_params: HashMap<String, String>,
  remaining_path: String,
}

impl Request {
  /// Wraps `context` with the routing results that apply to it.
  pub fn new(context: RequestContext, path_params: HashMap<String, String>, remaining_path: String) -> Self {
    Self { context, path_params, remaining_path }
  }

  /// The underlying request context, including its process-unique id and peer address.
  pub fn context(&self) -> &RequestContext {
    &self.context
  }

  /// The HTTP version this request was made over.
  pub fn version(&self) -> HttpVersion {
    self.context.head.version()
  }

  /// The request method.
  pub fn method(&self) -> &Method {
    self.context.head.method()
  }

  /// The percent-decoded path the request was routed on.
  pub fn path(&self) -> &str {
    self.context.head.path()
  }

  /// The unmatched tail of the path beyond the matched route, used by servants and by handlers
  /// registered to act as their own sub-router.
  pub fn remaining_path(&self) -> &str {
    self.remaining_path.as_str()
  }

  /// The request body.
  pub fn body(&self) -> &[u8] {
    self.context.body()
  }

  /// The request body, decoded as UTF-8.
  pub fn body_str(&self) -> std::result::Result<&str, std::str::Utf8Error> {
    std::str::from_utf8(self.context.body())
  }

  /// The path parameter captured under `name`, if the matched route bound one.
  pub fn path_param(&self, name: impl AsRef<str>) -> Option<&str> {
    self.path_params.get(name.as_ref()).map(String::as_str)
  }

  /// All path parameters captured by the matched route.
  pub fn path_params(&self) -> &HashMap<String, String> {
    &self.path_params
  }

  /// The query parameter matching `key`, if any. Last occurrence wins when the key repeats.
  pub fn query_param(&self, key: impl AsRef<str>) -> Option<&str> {
    self.context.head.query_param(key)
  }

  /// All query parameters, in the order they appeared.
  pub fn query_params(&self) -> &[(String, String)] {
    self.context.head.query()
  }

  /// The request's headers.
  pub fn headers(&self) -> &Headers {
    self.context.head.headers()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stream::boxed;
  use std::io::Cursor;

  fn read_context(raw: &'static str) -> Result<RequestContext> {
    let stream = boxed::new(Box::new(Cursor::new(raw.as_bytes().to_vec())), Box::new(std::io::sink()));
    RequestContext::read(stream.as_ref(), "127.0.0.1:1234".to_string())
  }

  #[test]
  fn reads_body_matching_content_length() {
    let ctx = read_context("POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello").unwrap();
    assert_eq!(ctx.body(), b"hello");
    assert!(ctx.content_length_matches().unwrap());
  }

  #[test]
  fn truncated_body_does_not_error_but_is_flagged() {
    let ctx = read_context("POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\nhi").unwrap();
    assert_eq!(ctx.body(), b"hi");
    assert!(!ctx.content_length_matches().unwrap());
  }

  #[test]
  fn recognizes_websocket_upgrade_request() {
    let ctx =
      read_context("GET /ws HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\n").unwrap();
    assert!(ctx.is_upgrade_request());
  }

  #[test]
  fn non_get_is_never_an_upgrade_request() {
    let ctx =
      read_context("POST /ws HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\r\n").unwrap();
    assert!(!ctx.is_upgrade_request());
  }

  #[test]
  fn request_exposes_path_params_and_remaining_path() {
    let ctx = read_context("GET /users/42/more HTTP/1.1\r\n\r\n").unwrap();
    let mut params = HashMap::new();
    params.insert("id".to_string(), "42".to_string());
    let request = Request::new(ctx, params, "more".to_string());
    assert_eq!(request.path_param("id"), Some("42"));
    assert_eq!(request.remaining_path(), "more");
  }
}
