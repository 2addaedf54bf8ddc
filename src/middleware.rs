//! Middleware hooks the Conductor runs around routing and handler dispatch. See crate docs §9.
//!
//! Middleware is a tagged sum type rather than a trait hierarchy: most applications need one or
//! two hooks, not a whole object implementing a multi-method interface, and a closure is the
//! natural shape for "run this before/after every request".

use crate::error::Result;
use crate::http::request_context::Request;
use crate::http::response::Response;
use std::fmt::{Debug, Formatter};

type OnRequestFn = Box<dyn Fn(&Request) -> Result<Option<Response>> + Send + Sync>;
type OnResponseFn = Box<dyn Fn(&Request, &mut Response) + Send + Sync>;
type OnUpgradeFn = Box<dyn Fn(&Request) -> Result<Option<Response>> + Send + Sync>;

/// A single middleware hook, run by the Conductor at one of three points in the dispatch
/// pipeline (§4.6).
pub enum Middleware {
  /// Runs before routing. Returning `Ok(Some(response))` short-circuits the request, skipping
  /// routing and the handler entirely; `Ok(None)` lets dispatch continue.
  OnRequest(OnRequestFn),
  /// Runs after the handler (or a servant) produced a response, and may mutate it in place
  /// before it is written to the wire.
  OnResponse(OnResponseFn),
  /// Runs when a WebSocket upgrade is requested, before the handshake is performed. Returning
  /// `Ok(Some(response))` short-circuits the upgrade, sending that response instead of completing
  /// the handshake; `Ok(None)` lets the upgrade proceed.
  OnUpgrade(OnUpgradeFn),
}

impl Middleware {
  /// Builds an [`Middleware::OnRequest`] hook from a closure.
  pub fn on_request<F>(f: F) -> Self
  where
    F: Fn(&Request) -> Result<Option<Response>> + Send + Sync + 'static,
  {
    Middleware::OnRequest(Box::new(f))
  }

  /// Builds an [`Middleware::OnResponse`] hook from a closure.
  pub fn on_response<F>(f: F) -> Self
  where
    F: Fn(&Request, &mut Response) + Send + Sync + 'static,
  {
    Middleware::OnResponse(Box::new(f))
  }

  /// Builds an [`Middleware::OnUpgrade`] hook from a closure.
  pub fn on_upgrade<F>(f: F) -> Self
  where
    F: Fn(&Request) -> Result<Option<Response>> + Send + Sync + 'static,
  {
    Middleware::OnUpgrade(Box::new(f))
  }
}

impl Debug for Middleware {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Middleware::OnRequest(_) => "OnRequest",
      Middleware::OnResponse(_) => "OnResponse",
      Middleware::OnUpgrade(_) => "OnUpgrade",
    };
    f.debug_tuple("Middleware").field(&name).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::status::StatusCode;

  #[test]
  fn debug_shows_variant_name() {
    let middleware = Middleware::on_response(|_, _| {});
    assert_eq!(format!("{middleware:?}"), "Middleware(\"OnResponse\")");
  }

  #[test]
  fn on_request_can_short_circuit() {
    let middleware = Middleware::on_request(|_| Ok(Some(Response::new(StatusCode::Forbidden))));
    match middleware {
      Middleware::OnRequest(f) => {
        let stream = crate::stream::boxed::new(Box::new(std::io::empty()), Box::new(std::io::sink()));
        let ctx = crate::http::request_context::RequestContext::read(
          {
            let raw = b"GET / HTTP/1.1\r\n\r\n".to_vec();
            &*crate::stream::boxed::new(Box::new(std::io::Cursor::new(raw)), Box::new(std::io::sink()))
          },
          "t".to_string(),
        )
        .unwrap();
        let _ = stream;
        let request = Request::new(ctx, Default::default(), String::new());
        let response = f(&request).unwrap().unwrap();
        assert_eq!(response.status(), &StatusCode::Forbidden);
      }
      _ => panic!("expected OnRequest"),
    }
  }
}
