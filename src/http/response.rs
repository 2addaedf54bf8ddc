//! Response construction and wire serialization. Bodies are always fully buffered in memory;
//! streaming response bodies are out of scope for this core (see crate docs, Non-goals).

use crate::error::Result;
use crate::http::headers::{HeaderLike, HeaderName, Headers};
use crate::http::mime::MimeType;
use crate::http::request::HttpVersion;
use crate::http::status::StatusCode;
use crate::stream::ConnectionStreamWrite;
use serde::Serialize;

/// A response to a request, fully assembled in memory before it is written to the wire.
#[derive(Debug, Clone)]
pub struct Response {
  status: StatusCode,
  headers: Headers,
  body: Vec<u8>,
}

impl Response {
  /// Creates a response with the given status and an empty body.
  pub fn new(status: StatusCode) -> Self {
    Self { status, headers: Headers::new(), body: Vec::new() }
  }

  /// A `200 OK` response with the given body and `Content-Type`.
  pub fn ok(body: impl Into<Vec<u8>>, content_type: MimeType) -> Self {
    Self::new(StatusCode::OK).with_body(body, content_type)
  }

  /// A `200 OK` response whose body is `value` serialized as JSON, with
  /// `Content-Type: application/json`.
  pub fn json<T: Serialize>(value: &T) -> Result<Self> {
    let body = serde_json::to_vec(value).map_err(|e| crate::error::Error::Other(Box::new(e)))?;
    Ok(Self::ok(body, MimeType::ApplicationJson))
  }

  /// Sets the body and `Content-Type` header, also recomputing `Content-Length`.
  pub fn with_body(mut self, body: impl Into<Vec<u8>>, content_type: MimeType) -> Self {
    self.body = body.into();
    self.headers.set(HeaderName::ContentType, content_type.as_str());
    self
  }

  /// Adds or replaces a header.
  pub fn with_header(mut self, name: impl HeaderLike, value: impl AsRef<str>) -> Self {
    self.headers.set(name, value);
    self
  }

  /// The status code of this response.
  pub fn status(&self) -> &StatusCode {
    &self.status
  }

  /// The response headers, prior to the implicit `Content-Length`/`Connection` additions made at
  /// write time.
  pub fn headers(&self) -> &Headers {
    &self.headers
  }

  /// The response headers, mutably.
  pub fn headers_mut(&mut self) -> &mut Headers {
    &mut self.headers
  }

  /// The response body.
  pub fn body(&self) -> &[u8] {
    self.body.as_slice()
  }

  /// A bare-bones `{"reason": "..."}` JSON error body, per the error-body convention used for
  /// malformed requests, routing misses, and handler failures alike.
  pub fn error(status: StatusCode, reason: impl Into<String>) -> Self {
    #[derive(Serialize)]
    struct ErrorBody {
      reason: String,
    }
    let body = serde_json::to_vec(&ErrorBody { reason: reason.into() }).unwrap_or_default();
    Self::new(status).with_body(body, MimeType::ApplicationJson)
  }

  /// A `{"path": "...", "reason": "..."}` JSON error body, used for routing misses where the
  /// requested path is useful context for the client.
  pub fn error_with_path(status: StatusCode, path: impl Into<String>, reason: impl Into<String>) -> Self {
    #[derive(Serialize)]
    struct ErrorBody {
      path: String,
      reason: String,
    }
    let body =
      serde_json::to_vec(&ErrorBody { path: path.into(), reason: reason.into() }).unwrap_or_default();
    Self::new(status).with_body(body, MimeType::ApplicationJson)
  }

  /// Writes this response to `stream` as `version` permits. HTTP/0.9 responses are just the raw
  /// body: no status line, no headers.
  pub fn write_to(&self, stream: &dyn ConnectionStreamWrite, version: HttpVersion, keep_alive: bool) -> Result<()> {
    if version == HttpVersion::Http09 {
      stream.write_all(&self.body)?;
      return Ok(());
    }

    // A `101 Switching Protocols` response owns its `Connection` header verbatim (RFC 6455
    // requires the literal value `Upgrade`) instead of the keep-alive/close value every other
    // status gets computed for it.
    let is_protocol_switch = self.status == StatusCode::SwitchingProtocols;

    let mut head = Vec::with_capacity(256 + self.headers.len() * 32);
    head.extend_from_slice(version.as_net_str().as_bytes());
    head.push(b' ');
    head.extend_from_slice(self.status.code_as_utf());
    head.push(b' ');
    head.extend_from_slice(self.status.status_line().as_bytes());
    head.extend_from_slice(b"\r\n");

    for header in self.headers.iter() {
      if header.name == HeaderName::ContentLength {
        continue;
      }
      if header.name == HeaderName::Connection && !is_protocol_switch {
        continue;
      }
      head.extend_from_slice(header.name.to_str().as_bytes());
      head.extend_from_slice(b": ");
      head.extend_from_slice(header.value.as_bytes());
      head.extend_from_slice(b"\r\n");
    }

    head.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
    if !is_protocol_switch {
      head.extend_from_slice(
        format!("Connection: {}\r\n", if keep_alive { "keep-alive" } else { "close" }).as_bytes(),
      );
    }
    head.extend_from_slice(b"\r\n");

    stream.write_all(&head)?;
    if !self.body.is_empty() {
      stream.write_all(&self.body)?;
    }
    stream.flush()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stream::boxed;
  use std::sync::{Arc, Mutex};

  // A tiny shared-buffer writer so tests can inspect what was written without a real socket.
  #[derive(Clone)]
  struct SharedBuf(Arc<Mutex<Vec<u8>>>);
  impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn writes_status_line_and_headers() {
    let resp = Response::ok(b"hello".to_vec(), MimeType::TextPlain);
    let buf = Arc::new(Mutex::new(Vec::new()));
    let stream = boxed::new(Box::new(std::io::empty()), Box::new(SharedBuf(buf.clone())));
    resp.write_to(stream.as_ref(), HttpVersion::Http11, true).unwrap();
    let text = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("Content-Type: text/plain\r\n"));
    assert!(text.contains("Content-Length: 5\r\n"));
    assert!(text.ends_with("\r\n\r\nhello"));
  }

  #[test]
  fn switching_protocols_keeps_its_own_connection_header() {
    let resp = Response::new(StatusCode::SwitchingProtocols)
      .with_header(HeaderName::Upgrade, "websocket")
      .with_header(HeaderName::Connection, "Upgrade");
    let buf = Arc::new(Mutex::new(Vec::new()));
    let stream = boxed::new(Box::new(std::io::empty()), Box::new(SharedBuf(buf.clone())));
    resp.write_to(stream.as_ref(), HttpVersion::Http11, false).unwrap();
    let text = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
    assert!(text.starts_with("HTTP/1.1 101 "));
    assert!(text.contains("Connection: Upgrade\r\n"));
    assert!(!text.contains("Connection: close"));
  }

  #[test]
  fn http09_writes_body_only() {
    let resp = Response::ok(b"hi".to_vec(), MimeType::TextHtml);
    let buf = Arc::new(Mutex::new(Vec::new()));
    let stream = boxed::new(Box::new(std::io::empty()), Box::new(SharedBuf(buf.clone())));
    resp.write_to(stream.as_ref(), HttpVersion::Http09, false).unwrap();
    assert_eq!(buf.lock().unwrap().clone(), b"hi");
  }
}
