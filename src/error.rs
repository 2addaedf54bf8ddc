//! The crate's error taxonomy. Every fallible operation returns [`Result`], which composes with
//! `?` across module boundaries the same way `std::io::Result` does.

use std::error::Error as StdError;
use std::fmt::{Debug, Display, Formatter};
use std::io;
use std::io::ErrorKind;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed request heads: bad content-length, undecodable URI, truncated status line.
#[derive(Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum RequestParsingError {
  /// `Content-Length` did not match the number of body bytes actually received.
  ContentLengthMismatch { declared: u64, received: u64 },
  /// The request URI could not be percent-decoded as UTF-8.
  InvalidUriEncoding(String),
  /// The status line was missing a method, path, or version.
  MalformedStatusLine(String),
  /// The `Content-Length` header value was not a valid non-negative integer.
  InvalidContentLength(String),
}

impl Display for RequestParsingError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    Debug::fmt(self, f)
  }
}
impl StdError for RequestParsingError {}

/// Errors raised while registering routes on a [`crate::routing::Node`].
#[derive(Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum RoutingError {
  /// A resolution was attempted against an empty path.
  EmptyPath,
  /// An attempt was made to register a child beneath a terminal servant node.
  ChildBeneathServant(String),
  /// Two routes registered the same path with conflicting parameter names at the same depth.
  ConflictingParameterName { existing: String, new: String },
}

impl Display for RoutingError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    Debug::fmt(self, f)
  }
}
impl StdError for RoutingError {}

/// Lifecycle misuse: `start`/`stop` called from the wrong state.
#[derive(Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum LifecycleError {
  /// `start` was called while the server was not `Idle` or `StartError`.
  NotIdle,
  /// `stop` was called while the server was not `Started` or `StartError`.
  NotRunning,
}

impl Display for LifecycleError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      LifecycleError::NotIdle => f.write_str("server is not idle"),
      LifecycleError::NotRunning => f.write_str("server is not started nor failed to start"),
    }
  }
}
impl StdError for LifecycleError {}

/// The full error taxonomy, see module docs.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
  /// §7 malformed-request.
  RequestParsing(RequestParsingError),
  /// §7 routing-miss at registration time (not at request time - a routing miss at request time
  /// is a 404 [`crate::http::Response`], not an [`Error`]).
  Routing(RoutingError),
  /// §7 handler-failure: a handler, filter, or middleware returned an error.
  HandlerFailure(Box<dyn StdError + Send + Sync>),
  /// §7 lifecycle-misuse.
  Lifecycle(LifecycleError),
  /// §7 transport-failure, and any other I/O failure.
  Io(io::Error),
  /// Anything else, boxed opaquely.
  Other(Box<dyn StdError + Send + Sync>),
}

impl Error {
  /// Construct an [`Error::Io`] directly, mirroring [`io::Error::new`].
  pub fn new_io<E: Into<Box<dyn StdError + Send + Sync>>>(kind: ErrorKind, message: E) -> Error {
    io::Error::new(kind, message).into()
  }

  /// The [`ErrorKind`] this error maps to, for interop with `std::io`-based call sites.
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Io(io) => io.kind(),
      Error::RequestParsing(_) => ErrorKind::InvalidData,
      Error::Lifecycle(_) => ErrorKind::Other,
      _ => ErrorKind::Other,
    }
  }

  /// Attempts to downcast the inner error to a concrete type.
  pub fn downcast_ref<T: StdError + Send + Sync + 'static>(&self) -> Option<&T> {
    match self {
      Error::Io(err) => (err as &dyn StdError).downcast_ref::<T>(),
      Error::RequestParsing(err) => (err as &dyn StdError).downcast_ref::<T>(),
      Error::Routing(err) => (err as &dyn StdError).downcast_ref::<T>(),
      Error::Lifecycle(err) => (err as &dyn StdError).downcast_ref::<T>(),
      Error::HandlerFailure(err) => err.downcast_ref::<T>(),
      Error::Other(err) => err.downcast_ref::<T>(),
    }
  }

  /// Consumes `self`, returning the boxed inner error.
  pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
    match self {
      Error::Io(err) => Box::new(err),
      Error::RequestParsing(err) => Box::new(err),
      Error::Routing(err) => Box::new(err),
      Error::Lifecycle(err) => Box::new(err),
      Error::HandlerFailure(err) => err,
      Error::Other(err) => err,
    }
  }
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Error::Io(err) => Display::fmt(err, f),
      Error::RequestParsing(err) => Display::fmt(err, f),
      Error::Routing(err) => Display::fmt(err, f),
      Error::Lifecycle(err) => Display::fmt(err, f),
      Error::HandlerFailure(err) => Display::fmt(err, f),
      Error::Other(err) => Display::fmt(err, f),
    }
  }
}

impl StdError for Error {}

impl From<io::Error> for Error {
  fn from(value: io::Error) -> Self {
    Error::Io(value)
  }
}

impl From<RequestParsingError> for Error {
  fn from(value: RequestParsingError) -> Self {
    Error::RequestParsing(value)
  }
}

impl From<RoutingError> for Error {
  fn from(value: RoutingError) -> Self {
    Error::Routing(value)
  }
}

impl From<LifecycleError> for Error {
  fn from(value: LifecycleError) -> Self {
    Error::Lifecycle(value)
  }
}

impl From<Error> for io::Error {
  fn from(value: Error) -> Self {
    match value {
      Error::Io(io) => io,
      err => io::Error::new(err.kind(), err.into_inner()),
    }
  }
}

/// Wraps an arbitrary handler error as [`Error::HandlerFailure`]. Handlers return
/// `Result<Response, E>` for any `E: std::error::Error + Send + Sync + 'static`; the
/// Conductor converts that into this variant and then into a 500 response (§4.6 step 6).
pub fn handler_failure<E: StdError + Send + Sync + 'static>(err: E) -> Error {
  Error::HandlerFailure(Box::new(err))
}
