//! Orchestrates a single request end-to-end: the glue between the Request Assembler, the
//! Routing Tree, the Middleware Chain, and the WebSocket upgrade path. See crate docs §4.6.

use crate::error::Result;
use crate::handler::Handler;
use crate::http::method::Method;
use crate::http::request_context::{Request, RequestContext};
use crate::http::response::Response;
use crate::http::status::StatusCode;
use crate::middleware::Middleware;
use crate::routing::{Destination, Node};
use crate::trace_log;
use std::collections::HashMap;

/// What should happen with a request that asked for a WebSocket upgrade.
pub enum UpgradeOutcome {
  /// A middleware (or a malformed handshake) rejected the upgrade; `response` is sent as an
  /// ordinary HTTP response and the connection proceeds as HTTP (§4.7, §7).
  Rejected(Response),
  /// The upgrade should proceed: `response` is the `101 Switching Protocols` handshake response
  /// to write, after which the connection's I/O passes to the WebSocket frame handler.
  Accepted(Response),
}

/// Runs every request through routing, middleware, and the matched handler or servant.
///
/// Holds no mutable state of its own beyond what [`Node`] and the middleware closures capture;
/// a `Conductor` is built once, after the routing tree and middleware chain are final, and is
/// then shared read-only across every connection's worker thread (§5, "Shared resources").
pub struct Conductor {
  root: Node,
  middleware: Vec<Middleware>,
}

impl Conductor {
  /// Builds a conductor from a finished routing tree and middleware chain.
  pub fn new(root: Node, middleware: Vec<Middleware>) -> Self {
    Self { root, middleware }
  }

  /// Runs the ordinary (non-upgrade) request pipeline of §4.6 steps 1-8.
  ///
  /// Returns the response to write to the wire plus whether the connection's state is now
  /// ambiguous enough that it must be closed afterward regardless of what keep-alive would
  /// otherwise allow - true exactly when a middleware hook or the handler itself failed
  /// (§4.5, §4.6 step 6).
  pub fn dispatch(&self, context: RequestContext) -> Result<(Response, bool)> {
    if let Some(mismatch) = context.content_length_mismatch()? {
      return Ok((Response::error(StatusCode::BadRequest, mismatch.to_string()), false));
    }

    let method = context.head().method().clone();
    let path = context.head().path().to_string();

    let resolution = match self.root.resolve(&method, &path) {
      Ok(resolution) => resolution,
      Err(err) => {
        trace_log!("knot: routing resolution failed for {} {}: {}", method, path, err);
        None
      }
    };

    let resolution = match resolution {
      Some(resolution) => resolution,
      // No handler bound for OPTIONS specifically, but the path is registered under some other
      // method: answer the blanket pre-flight 204 rather than 404 (§4.6 step 3). A path with an
      // explicit OPTIONS handler skips this branch entirely and runs that handler below, letting
      // an embedder override the default when it needs a non-empty pre-flight response.
      None if method == Method::Options && self.root.path_exists(&path).unwrap_or(false) => {
        // `Response::write_to` always recomputes `Content-Length` from the body, which is empty
        // here, so the wire already carries `Content-Length: 0` without setting it explicitly.
        return Ok((Response::new(StatusCode::NoContent), false));
      }
      None => {
        return Ok((Response::error_with_path(StatusCode::NotFound, path, "no route matches this path"), false));
      }
    };

    let (params, remaining, outcome) = match resolution {
      Destination::Handler { handler, params, remaining } => {
        (params, remaining, HandlerOutcome::Application(handler))
      }
      Destination::File { servant, remaining } => (HashMap::new(), remaining, HandlerOutcome::File(servant)),
      Destination::Zip { servant, remaining } => (HashMap::new(), remaining, HandlerOutcome::Zip(servant)),
    };

    let request = Request::new(context, params, remaining);

    for middleware in &self.middleware {
      if let Middleware::OnRequest(hook) = middleware {
        match hook(&request) {
          Ok(Some(response)) => return Ok((response, false)),
          Ok(None) => {}
          Err(err) => return Ok((Response::error(StatusCode::InternalServerError, err.to_string()), true)),
        }
      }
    }

    let (mut response, force_close) = match outcome {
      HandlerOutcome::Application(handler) => match handler.handle(&request) {
        Ok(response) => (response, false),
        Err(err) => {
          crate::error_log!("knot: handler failed for {} {}: {}", request.method(), request.path(), err);
          (Response::error(StatusCode::InternalServerError, err.to_string()), true)
        }
      },
      HandlerOutcome::File(servant) => (servant.resolve(request.remaining_path()), false),
      HandlerOutcome::Zip(servant) => (servant.resolve(request.remaining_path()), false),
    };

    for middleware in &self.middleware {
      if let Middleware::OnResponse(hook) = middleware {
        hook(&request, &mut response);
      }
    }

    Ok((response, force_close))
  }

  /// Runs the on-upgrade middleware chain for a request that asked to become a WebSocket
  /// connection, then builds the handshake response (§4.7) if nothing short-circuited it.
  pub fn dispatch_upgrade(&self, request: &Request) -> Result<UpgradeOutcome> {
    for middleware in &self.middleware {
      if let Middleware::OnUpgrade(hook) = middleware {
        match hook(request) {
          Ok(Some(response)) => return Ok(UpgradeOutcome::Rejected(response)),
          Ok(None) => {}
          Err(err) => return Ok(UpgradeOutcome::Rejected(Response::error(StatusCode::InternalServerError, err.to_string()))),
        }
      }
    }

    match crate::websocket::build_accept_response(request) {
      Ok(response) => Ok(UpgradeOutcome::Accepted(response)),
      Err(_) => Ok(UpgradeOutcome::Rejected(Response::error(
        StatusCode::BadRequest,
        "malformed websocket upgrade request",
      ))),
    }
  }
}

enum HandlerOutcome<'a> {
  Application(&'a dyn Handler),
  File(&'a crate::routing::FileServant),
  Zip(&'a crate::routing::ZipServant),
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::method::Method;
  use crate::stream::boxed;

  fn context_for(raw: &'static str) -> RequestContext {
    let stream = boxed::new(Box::new(std::io::Cursor::new(raw.as_bytes().to_vec())), Box::new(std::io::sink()));
    RequestContext::read(stream.as_ref(), "test".to_string()).unwrap()
  }

  #[test]
  fn dispatches_registered_handler() {
    let mut root = Node::root();
    root
      .register(
        "/hello",
        Method::Get,
        Box::new(|_: &Request| Response::json(&serde_json::json!({"message": "Hello, World!"}))),
      )
      .unwrap();
    let conductor = Conductor::new(root, Vec::new());

    let (response, force_close) = conductor.dispatch(context_for("GET /hello HTTP/1.1\r\n\r\n")).unwrap();
    assert_eq!(response.status(), &StatusCode::OK);
    assert_eq!(response.body(), br#"{"message":"Hello, World!"}"#);
    assert!(!force_close);
  }

  #[test]
  fn missing_route_is_404_with_path_in_body() {
    let conductor = Conductor::new(Node::root(), Vec::new());
    let (response, _) = conductor.dispatch(context_for("GET /nonexistent HTTP/1.1\r\n\r\n")).unwrap();
    assert_eq!(response.status(), &StatusCode::NotFound);
    let body = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(body.contains("/nonexistent"));
  }

  #[test]
  fn options_short_circuits_to_204() {
    let mut root = Node::root();
    root.register("/hello", Method::Get, Box::new(|_: &Request| Response::new(StatusCode::OK))).unwrap();
    let conductor = Conductor::new(root, Vec::new());

    let (response, _) = conductor.dispatch(context_for("OPTIONS /hello HTTP/1.1\r\n\r\n")).unwrap();
    assert_eq!(response.status(), &StatusCode::NoContent);
    assert_eq!(response.body().len(), 0);
  }

  #[test]
  fn mismatched_content_length_is_400() {
    let conductor = Conductor::new(Node::root(), Vec::new());
    let (response, _) =
      conductor.dispatch(context_for("POST /x HTTP/1.1\r\nContent-Length: 10\r\n\r\nhi")).unwrap();
    assert_eq!(response.status(), &StatusCode::BadRequest);
  }

  #[test]
  fn handler_failure_becomes_500_and_forces_connection_close() {
    let mut root = Node::root();
    root
      .register(
        "/boom",
        Method::Get,
        Box::new(|_: &Request| -> Result<Response> {
          Err(crate::error::Error::new_io(std::io::ErrorKind::Other, "kaboom"))
        }),
      )
      .unwrap();
    let conductor = Conductor::new(root, Vec::new());

    let (response, force_close) = conductor.dispatch(context_for("GET /boom HTTP/1.1\r\n\r\n")).unwrap();
    assert_eq!(response.status(), &StatusCode::InternalServerError);
    assert!(force_close);
  }

  #[test]
  fn on_request_middleware_can_short_circuit() {
    let mut root = Node::root();
    root.register("/hello", Method::Get, Box::new(|_: &Request| Response::new(StatusCode::OK))).unwrap();
    let middleware = vec![Middleware::on_request(|_| Ok(Some(Response::new(StatusCode::Forbidden))))];
    let conductor = Conductor::new(root, middleware);

    let (response, _) = conductor.dispatch(context_for("GET /hello HTTP/1.1\r\n\r\n")).unwrap();
    assert_eq!(response.status(), &StatusCode::Forbidden);
  }

  #[test]
  fn on_response_middleware_can_mutate_the_response() {
    let mut root = Node::root();
    root.register("/hello", Method::Get, Box::new(|_: &Request| Response::new(StatusCode::OK))).unwrap();
    let middleware = vec![Middleware::on_response(|_, response| {
      response.headers_mut().set("X-Knot", "1");
    })];
    let conductor = Conductor::new(root, middleware);

    let (response, _) = conductor.dispatch(context_for("GET /hello HTTP/1.1\r\n\r\n")).unwrap();
    assert_eq!(response.headers().get("X-Knot"), Some("1"));
  }

  #[test]
  fn path_parameters_reach_the_handler() {
    let mut root = Node::root();
    root
      .register(
        "/v/:name",
        Method::Get,
        Box::new(|req: &Request| {
          Response::ok(format!("Hello, {}", req.path_param("name").unwrap_or("")), crate::http::mime::MimeType::TextPlain)
        }),
      )
      .unwrap();
    let conductor = Conductor::new(root, Vec::new());

    let (response, _) = conductor.dispatch(context_for("GET /v/Alice HTTP/1.1\r\n\r\n")).unwrap();
    assert_eq!(response.body(), b"Hello, Alice");
  }
}
