//! `knot` is a small, embeddable HTTP/1.1 server core: an application declares REST routes,
//! serves files from disk or from an in-memory zip archive, upgrades selected requests to
//! WebSocket, and broadcasts text frames to every connected peer. It is meant to be linked
//! directly into a host process — an interactive desktop tool exposing a local control API is
//! the motivating case — not run as a standalone web server.
//!
//! # Scope
//!
//! In scope: the dispatch pipeline. That is (§4.1-§4.3) the routing tree that maps a
//! method+path to a handler, a parameter node, a file directory, or a zip-backed static set;
//! (§4.4-§4.6) the request lifecycle from byte-stream assembly through middleware into a
//! handler and back out as a response; (§4.7-§4.8) the WebSocket upgrade path and the broadcast
//! registry; and the response/content helpers in [`http`] whose semantics are observable on the
//! wire.
//!
//! Out of scope, treated only as collaborators at their contracts: the choice of I/O
//! multiplexer, TLS, HTTP/2, cookies, sessions, authentication, chunked-transfer encoding
//! beyond simple assembly, persistent storage, and virtual-host routing. This core does not
//! implement pluggable HTTP parsers, streaming response bodies (every [`http::Response`] is
//! materialized in full before it is written), content negotiation, or a default CORS policy.
//!
//! These exclusions bind *features* only; the ambient engineering every production server of
//! this shape carries regardless of feature scope is still here: structured logging behind the
//! [`trace_log`], [`debug_log`], [`info_log`], [`warn_log`], and [`error_log`] macros; the
//! [`error::Error`] taxonomy; and [`server::ServerBuilder`]'s consuming configuration surface.
//!
//! # Layout
//!
//! - [`routing`] — the routing tree ([`routing::Node`]) and its two terminal servants,
//!   [`routing::FileServant`] and [`routing::ZipServant`] (§4.1-§4.3).
//! - [`http`] — request/response types, headers, methods, status codes, and MIME detection
//!   (§4.4, §3).
//! - [`handler`] — the [`handler::Handler`] trait a route or `ServerBuilder` method binds to.
//! - [`middleware`] — the three interceptor kinds the [`conductor::Conductor`] runs around
//!   dispatch (§4.5).
//! - [`conductor`] — orchestrates one request end-to-end (§4.6).
//! - [`websocket`] — the upgrade handshake, frame handling, and [`websocket::BroadcastRegistry`]
//!   (§4.7-§4.8).
//! - [`server`] — [`server::Server`] and [`server::ServerBuilder`]: binds a listener, drives the
//!   accept loop, and shuts down orderly (§4.9, §4.12).
//! - [`error`] — the crate-wide [`error::Error`] taxonomy and [`error::Result`] alias (§4.11,
//!   §7).
//!
//! # Example
//!
//! ```no_run
//! use knot::http::Response;
//! use knot::server::ServerBuilder;
//!
//! let server = ServerBuilder::default()
//!   .get("/hello", |_: &knot::http::Request| {
//!     Response::json(&serde_json::json!({"message": "Hello, World!"}))
//!   })
//!   .unwrap()
//!   .build();
//!
//! let port = server.start(0).unwrap();
//! println!("listening on 127.0.0.1:{port}");
//! server.stop().unwrap();
//! ```

#![warn(missing_docs)]

pub mod conductor;
pub mod error;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod routing;
pub mod server;
pub mod stream;
mod util;
pub mod websocket;

pub use error::{Error, Result};
pub use server::{Server, ServerBuilder};
