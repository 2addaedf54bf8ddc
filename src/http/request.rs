//! Parsing of the request head: status line, headers, and the query string.

use crate::error::{RequestParsingError, Result};
use crate::http::headers::{HeaderName, Headers};
use crate::http::method::Method;
use crate::stream::ConnectionStreamRead;
use crate::util::unwrap_some;
use crate::warn_log;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;

/// The HTTP version used on the wire for a given request.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum HttpVersion {
  /// No headers, no body, `GET` only. Triggered e.g. by `echo -ne 'GET /\r\n' | nc host port`.
  Http09,
  /// Has headers and bodies, but one request per connection.
  Http10,
  /// The version this crate is built around.
  Http11,
}

impl HttpVersion {
  /// The printable name of this version, e.g. for logging.
  pub fn as_str(&self) -> &'static str {
    match self {
      HttpVersion::Http09 => "HTTP/0.9",
      HttpVersion::Http10 => "HTTP/1.0",
      HttpVersion::Http11 => "HTTP/1.1",
    }
  }

  /// The bytes as they appear on the status line. HTTP/0.9 has no suffix at all.
  pub fn as_net_str(&self) -> &'static str {
    match self {
      HttpVersion::Http09 => "",
      HttpVersion::Http10 => "HTTP/1.0",
      HttpVersion::Http11 => "HTTP/1.1",
    }
  }

  /// Parses the version suffix of a status line. An empty string is HTTP/0.9, which has none.
  pub fn try_from_net_str<T: AsRef<str>>(value: T) -> std::result::Result<Self, T> {
    match value.as_ref() {
      "HTTP/1.0" => Ok(HttpVersion::Http10),
      "HTTP/1.1" => Ok(HttpVersion::Http11),
      "" => Ok(HttpVersion::Http09),
      _ => Err(value),
    }
  }
}

impl Display for HttpVersion {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The maximum number of bytes read while scanning for a single line of the request head
/// (status line or one header line) before giving up with [`RequestParsingError::MalformedStatusLine`].
pub const MAX_HEAD_LINE_SIZE: usize = 1024 * 64;

fn validate_raw_path(raw_path: &str) -> Result<()> {
  // https://datatracker.ietf.org/doc/html/rfc3986#section-3.3
  for n in raw_path.bytes() {
    match n {
      b'/' | b'-' | b'.' | b'_' | b'~' | b'!' | b'$' | b'\'' | b'(' | b')' | b'*' | b'+' | b','
      | b';' | b'=' | b':' | b'@' | b'%' | b'\\' => {}
      _ => {
        if !n.is_ascii_alphanumeric() {
          return Err(RequestParsingError::MalformedStatusLine(raw_path.to_string()).into());
        }
      }
    }
  }
  Ok(())
}

fn parse_status_line(start_line_buf: &[u8]) -> Result<&str> {
  for n in start_line_buf {
    match *n {
      b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b'/' | b':' | b';' | b'='
      | b'?' | b'@' | b'[' | b']' | b'-' | b'.' | b'_' | b'~' | b'%' | b' ' | b'\\' | b'\r'
      | b'\n' => {}
      other => {
        if !other.is_ascii_alphanumeric() {
          return Err(
            RequestParsingError::MalformedStatusLine(String::from_utf8_lossy(start_line_buf).to_string())
              .into(),
          );
        }
      }
    }
  }

  std::str::from_utf8(start_line_buf)
    .map_err(|_| RequestParsingError::MalformedStatusLine(String::from_utf8_lossy(start_line_buf).to_string()).into())
}

fn parse_raw_query(raw_query: &str) -> Result<Vec<(String, String)>> {
  if raw_query.is_empty() {
    return Ok(Vec::new());
  }

  let err = || RequestParsingError::MalformedStatusLine(format!("bad query string: {raw_query}"));

  let mut query = Vec::new();
  let mut current_key = Vec::new();
  let mut current_value = Vec::new();
  let mut matching_value = false;

  let flush = |current_key: &mut Vec<u8>, current_value: &mut Vec<u8>| -> Result<(String, String)> {
    let key = urlencoding::decode(std::str::from_utf8(current_key).map_err(|_| err())?)
      .map_err(|_| err())?
      .to_string();
    let value = urlencoding::decode(std::str::from_utf8(current_value).map_err(|_| err())?)
      .map_err(|_| err())?
      .to_string();
    Ok((key, value))
  };

  for n in raw_query.as_bytes() {
    match *n {
      b'=' => {
        if matching_value {
          return Err(err().into());
        }
        matching_value = true;
      }
      b'&' => {
        if !matching_value {
          return Err(err().into());
        }
        query.push(flush(&mut current_key, &mut current_value)?);
        matching_value = false;
        current_key.clear();
        current_value.clear();
      }
      b'!' | b'$' | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b'-' | b'.' | b'/' | b':' | b';'
      | b'@' | b'_' | b'~' | b'%' => {
        if matching_value {
          current_value.push(*n);
        } else {
          current_key.push(*n);
        }
      }
      other => {
        if !other.is_ascii_alphanumeric() {
          return Err(err().into());
        }
        if matching_value {
          current_value.push(*n);
        } else {
          current_key.push(*n);
        }
      }
    }
  }

  if !matching_value {
    return Err(err().into());
  }

  query.push(flush(&mut current_key, &mut current_value)?);
  query.retain(|(key, _)| !key.is_empty());
  Ok(query)
}

/// The parsed request head: method, path, query, version, and headers. Produced by the
/// Request Assembler before the body (if any) is read.
#[derive(Clone, Debug)]
pub struct RequestHead {
  method: Method,
  version: HttpVersion,
  status_line: String,
  path: String,
  query: Vec<(String, String)>,
  headers: Headers,
}

impl RequestHead {
  /// Reads and parses one request head from `stream`. Each line (status line, each header line)
  /// is capped at [`MAX_HEAD_LINE_SIZE`] bytes to bound memory use against a client that never
  /// sends a newline.
  pub fn read_from(stream: &dyn ConnectionStreamRead) -> Result<Self> {
    let mut start_line_buf: Vec<u8> = Vec::with_capacity(256);
    let count = stream.read_until(b'\n', MAX_HEAD_LINE_SIZE, &mut start_line_buf)?;

    if count == 0 {
      return Err(crate::error::Error::new_io(ErrorKind::UnexpectedEof, "connection closed before a request was sent"));
    }

    if count == MAX_HEAD_LINE_SIZE {
      return Err(
        RequestParsingError::MalformedStatusLine("status line exceeded maximum length".to_string()).into(),
      );
    }

    let start_line_string = parse_status_line(&start_line_buf)?;
    let status_line = start_line_string
      .strip_suffix("\r\n")
      .ok_or_else(|| RequestParsingError::MalformedStatusLine(start_line_string.to_string()))?;

    let mut parts = status_line.split(' ');
    let method = Method::from_name(unwrap_some(parts.next()));

    let mut uri_iter = parts
      .next()
      .ok_or_else(|| RequestParsingError::MalformedStatusLine(status_line.to_string()))?
      .splitn(2, '?');

    let version = parts
      .next()
      .map(HttpVersion::try_from_net_str)
      .unwrap_or(Ok(HttpVersion::Http09))
      .map_err(|v| RequestParsingError::MalformedStatusLine(format!("unsupported http version {v}")))?;

    if parts.next().is_some() {
      return Err(RequestParsingError::MalformedStatusLine(status_line.to_string()).into());
    }

    let raw_path = unwrap_some(uri_iter.next());
    validate_raw_path(raw_path)?;

    let path = urlencoding::decode(raw_path)
      .map_err(|_| RequestParsingError::InvalidUriEncoding(raw_path.to_string()))?
      .to_string();

    let raw_query = uri_iter.next().unwrap_or("");
    let query = parse_raw_query(raw_query)?;

    let mut headers = Headers::new();

    if version == HttpVersion::Http09 {
      if method != Method::Get {
        return Err(
          RequestParsingError::MalformedStatusLine(format!("http/0.9 only supports GET, got {method}")).into(),
        );
      }

      return Ok(Self { method, path, query, version, headers, status_line: status_line.to_string() });
    }

    loop {
      let mut line_buf: Vec<u8> = Vec::with_capacity(256);
      let count = stream.read_until(b'\n', MAX_HEAD_LINE_SIZE, &mut line_buf)?;

      if count == MAX_HEAD_LINE_SIZE {
        return Err(RequestParsingError::MalformedStatusLine("header line too long".to_string()).into());
      }

      let line = std::str::from_utf8(&line_buf)
        .map_err(|_| RequestParsingError::MalformedStatusLine("header line is not valid utf-8".to_string()))?;

      if line == "\r\n" {
        break;
      }

      let line = line
        .strip_suffix("\r\n")
        .ok_or_else(|| RequestParsingError::MalformedStatusLine("header line missing CRLF".to_string()))?;

      let mut line_parts = line.splitn(2, ':');
      let name = unwrap_some(line_parts.next()).trim();

      if name.is_empty() {
        return Err(RequestParsingError::MalformedStatusLine("empty header name".to_string()).into());
      }

      let value = line_parts
        .next()
        .ok_or_else(|| RequestParsingError::MalformedStatusLine(format!("header {name} has no value")))?
        .trim();

      if value.is_empty() {
        warn_log!("request to '{}' has empty header value for '{}'", path.as_str(), name);
      }

      headers.add(HeaderName::from(name), value);
    }

    Ok(Self { method, path, query, version, headers, status_line: status_line.to_string() })
  }

  /// The HTTP version the client used.
  pub fn version(&self) -> HttpVersion {
    self.version
  }

  /// The method of the request.
  pub fn method(&self) -> &Method {
    &self.method
  }

  /// The raw status line, CRLF stripped.
  pub fn raw_status_line(&self) -> &str {
    self.status_line.as_str()
  }

  /// The percent-decoded path the request will be routed on.
  pub fn path(&self) -> &str {
    self.path.as_str()
  }

  /// The percent-decoded query parameters, in the order they appeared.
  pub fn query(&self) -> &[(String, String)] {
    self.query.as_slice()
  }

  /// The query parameter matching `key`, if any. When the query string repeats a key, the last
  /// occurrence wins.
  pub fn query_param(&self, key: impl AsRef<str>) -> Option<&str> {
    let key = key.as_ref();
    self.query.iter().rfind(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  /// The request's headers.
  pub fn headers(&self) -> &Headers {
    &self.headers
  }

  /// The declared `Content-Length`, if present and well-formed. Per the Request Assembler's
  /// contract (see crate docs, §4.4) this counts raw bytes, never decoded text length.
  pub fn content_length(&self) -> Result<Option<u64>> {
    match self.headers.get(HeaderName::ContentLength) {
      None => Ok(None),
      Some(raw) => raw
        .trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| RequestParsingError::InvalidContentLength(raw.to_string()).into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stream::boxed;
  use std::io::Cursor;

  fn head_from(raw: &'static str) -> Result<RequestHead> {
    let stream = boxed::new(Box::new(Cursor::new(raw.as_bytes().to_vec())), Box::new(std::io::sink()));
    RequestHead::read_from(stream.as_ref())
  }

  #[test]
  fn parses_simple_get() {
    let head = head_from("GET /foo/bar?a=1&b=2 HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
    assert_eq!(head.method(), &Method::Get);
    assert_eq!(head.path(), "/foo/bar");
    assert_eq!(head.version(), HttpVersion::Http11);
    assert_eq!(head.query_param("a"), Some("1"));
    assert_eq!(head.query_param("b"), Some("2"));
    assert_eq!(head.headers().get(HeaderName::Host), Some("example.com"));
  }

  #[test]
  fn decodes_percent_encoded_path() {
    let head = head_from("GET /foo%20bar HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(head.path(), "/foo bar");
  }

  #[test]
  fn http09_has_no_headers_and_only_allows_get() {
    let head = head_from("GET /\r\n").unwrap();
    assert_eq!(head.version(), HttpVersion::Http09);
    assert!(head.headers().is_empty());

    let err = head_from("POST /\r\n");
    assert!(err.is_err());
  }

  #[test]
  fn invalid_content_length_is_rejected() {
    let head = head_from("GET / HTTP/1.1\r\nContent-Length: not-a-number\r\n\r\n").unwrap();
    assert!(head.content_length().is_err());
  }

  #[test]
  fn missing_content_length_is_none() {
    let head = head_from("GET / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(head.content_length().unwrap(), None);
  }

  #[test]
  fn repeated_query_key_last_one_wins() {
    let head = head_from("GET /foo?a=1&a=2 HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(head.query_param("a"), Some("2"));
  }
}
