//! The application-facing handler contract. See crate docs §4.4.

use crate::error::Result;
use crate::http::request_context::Request;
use crate::http::response::Response;

/// Answers a single request. Implemented by ordinary closures via the blanket impl below; most
/// applications never name this trait directly.
pub trait Handler: Send + Sync {
  /// Produces the response for `request`.
  fn handle(&self, request: &Request) -> Result<Response>;
}

/// Converts a handler's return value into the [`Result<Response>`] the Conductor expects.
///
/// Implemented for `Response` directly (an infallible handler) and for `Result<Response>` (a
/// handler that may fail, with the Conductor turning any error into `500` per §4.6 step 6).
pub trait IntoHandlerResult {
  /// Performs the conversion.
  fn into_handler_result(self) -> Result<Response>;
}

impl IntoHandlerResult for Response {
  fn into_handler_result(self) -> Result<Response> {
    Ok(self)
  }
}

impl IntoHandlerResult for Result<Response> {
  fn into_handler_result(self) -> Result<Response> {
    self
  }
}

impl<F, R> Handler for F
where
  F: Fn(&Request) -> R + Send + Sync,
  R: IntoHandlerResult,
{
  fn handle(&self, request: &Request) -> Result<Response> {
    self(request).into_handler_result()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::request_context::RequestContext;
  use crate::http::status::StatusCode;
  use crate::stream::boxed;

  fn make_request() -> Request {
    let raw = b"GET /ping HTTP/1.1\r\nHost: x\r\n\r\n".to_vec();
    let stream = boxed::new(Box::new(std::io::Cursor::new(raw)), Box::new(std::io::sink()));
    let ctx = RequestContext::read(stream.as_ref(), "test".to_string()).unwrap();
    Request::new(ctx, Default::default(), String::new())
  }

  #[test]
  fn infallible_closure_handler() {
    let handler: &dyn Handler = &(|_: &Request| Response::new(StatusCode::OK));
    let request = make_request();
    assert_eq!(handler.handle(&request).unwrap().status(), &StatusCode::OK);
  }

  #[test]
  fn fallible_closure_handler() {
    let handler: &dyn Handler = &(|_: &Request| -> Result<Response> { Ok(Response::new(StatusCode::Created)) });
    let request = make_request();
    assert_eq!(handler.handle(&request).unwrap().status(), &StatusCode::Created);
  }
}
