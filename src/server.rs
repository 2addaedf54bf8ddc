//! Server Lifecycle and Configuration Surface (§4.9, §4.12): binds a listener, spawns one worker
//! per accepted connection, and shuts down orderly. See crate docs §5 for the concurrency model
//! this realizes and §9 for why a thread-per-connection model stands in for the source material's
//! cooperative event loop.

use crate::conductor::{Conductor, UpgradeOutcome};
use crate::error::{LifecycleError, Result};
use crate::handler::Handler;
use crate::http::headers::HeaderName;
use crate::http::method::Method;
use crate::http::request::HttpVersion;
use crate::http::request_context::{Request, RequestContext};
use crate::middleware::Middleware;
use crate::routing::Node;
use crate::stream::{ConnectionStream, IntoConnectionStream};
use crate::util::unwrap_poison;
use crate::websocket::{connection, BroadcastRegistry};
use crate::{error_log, warn_log};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Spawns the closure that will drive one accepted connection to completion.
///
/// The default implementation ([`NativeThreadAdapter`]) spawns a plain OS thread per connection,
/// matching the teacher's `extras/tcp_app.rs`. An embedder wanting a bounded worker pool instead
/// of unbounded thread-per-connection can install their own adapter via
/// [`ServerBuilder::thread_adapter`].
pub trait ThreadAdapter: Send + Sync {
  /// Runs `task` to completion on some thread. Must not block the calling thread waiting for
  /// `task` to finish.
  fn spawn(&self, task: Box<dyn FnOnce() + Send>);
}

/// The default [`ThreadAdapter`]: one OS thread per connection, never reclaimed into a pool.
#[derive(Debug, Default)]
pub struct NativeThreadAdapter;

impl ThreadAdapter for NativeThreadAdapter {
  fn spawn(&self, task: Box<dyn FnOnce() + Send>) {
    thread::spawn(task);
  }
}

/// The server's lifecycle state (§4.9). `start`/`stop` transition it under a single mutex; every
/// other state transition is rejected with [`LifecycleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerState {
  Idle,
  Starting,
  Started,
  StartError,
  Stopping,
}

/// The resources tied to one successful `start()` call, torn down by the matching `stop()`.
struct Running {
  shutdown: Arc<AtomicBool>,
  addr: std::net::SocketAddr,
  accept_thread: thread::JoinHandle<()>,
  active_connections: Arc<AtomicUsize>,
}

/// A built, immutable HTTP/1.1 server. Construction-time mutability lives entirely in
/// [`ServerBuilder`]; once `build()` returns a `Server`, its routing tree and middleware chain
/// never change (§5, "Shared resources").
pub struct Server {
  conductor: Arc<Conductor>,
  registry: Arc<BroadcastRegistry>,
  thread_adapter: Arc<dyn ThreadAdapter>,
  bind_address: IpAddr,
  connection_timeout: Option<Duration>,
  read_timeout: Option<Duration>,
  write_timeout: Option<Duration>,
  shutdown_drain_timeout: Duration,
  state: Mutex<ServerState>,
  running: Mutex<Option<Running>>,
}

impl Server {
  /// Starts a new builder.
  pub fn builder() -> ServerBuilder {
    ServerBuilder::default()
  }

  /// Binds to `port` (0 = any free port) and starts accepting connections, returning the port
  /// actually bound.
  ///
  /// Fails with [`LifecycleError::NotIdle`] unless the server is currently `Idle` or
  /// `StartError` - i.e. it has never been started, or its last start attempt failed.
  pub fn start(&self, port: u16) -> Result<u16> {
    {
      let mut state = unwrap_poison(self.state.lock())?;
      match *state {
        ServerState::Idle | ServerState::StartError => *state = ServerState::Starting,
        _ => return Err(LifecycleError::NotIdle.into()),
      }
    }

    let listener = match TcpListener::bind((self.bind_address, port)) {
      Ok(listener) => listener,
      Err(err) => {
        *unwrap_poison(self.state.lock())? = ServerState::StartError;
        return Err(err.into());
      }
    };

    let local_addr = match listener.local_addr() {
      Ok(addr) => addr,
      Err(err) => {
        *unwrap_poison(self.state.lock())? = ServerState::StartError;
        return Err(err.into());
      }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let conductor = self.conductor.clone();
    let registry = self.registry.clone();
    let thread_adapter = self.thread_adapter.clone();
    let connection_timeout = self.connection_timeout;
    let read_timeout = self.read_timeout;
    let write_timeout = self.write_timeout;
    let accept_shutdown = shutdown.clone();
    let accept_active = active_connections.clone();

    let accept_thread = thread::spawn(move || {
      for incoming in listener.incoming() {
        if accept_shutdown.load(Ordering::SeqCst) {
          break;
        }

        let stream = match incoming {
          Ok(stream) => stream,
          Err(err) => {
            warn_log!("knot: accept failed: {}", err);
            continue;
          }
        };

        let conductor = conductor.clone();
        let registry = registry.clone();
        let active = accept_active.clone();
        active.fetch_add(1, Ordering::SeqCst);

        thread_adapter.spawn(Box::new(move || {
          let result =
            handle_connection(stream, conductor.as_ref(), registry.as_ref(), connection_timeout, read_timeout, write_timeout);
          if let Err(err) = result {
            error_log!("knot: connection handling failed: {}", err);
          }
          active.fetch_sub(1, Ordering::SeqCst);
        }));
      }
    });

    *unwrap_poison(self.running.lock())? =
      Some(Running { shutdown, addr: local_addr, accept_thread, active_connections });
    *unwrap_poison(self.state.lock())? = ServerState::Started;

    Ok(local_addr.port())
  }

  /// Shuts down the server: disconnects every WebSocket peer, closes the listening socket, and
  /// waits (up to [`ServerBuilder::shutdown_drain_timeout`]) for in-flight connections to finish.
  ///
  /// Fails with [`LifecycleError::NotRunning`] unless the server is currently `Started` or
  /// `StartError`.
  pub fn stop(&self) -> Result<()> {
    {
      let mut state = unwrap_poison(self.state.lock())?;
      match *state {
        ServerState::Started | ServerState::StartError => *state = ServerState::Stopping,
        _ => return Err(LifecycleError::NotRunning.into()),
      }
    }

    self.registry.disconnect();

    let running = unwrap_poison(self.running.lock())?.take();
    if let Some(running) = running {
      running.shutdown.store(true, Ordering::SeqCst);
      // Wake the blocking `incoming()` iterator the same way the teacher's tcp_app does:
      // connect a dummy socket to our own listener so `accept` returns once more.
      let _ = TcpStream::connect(running.addr);

      let deadline = Instant::now() + self.shutdown_drain_timeout;
      while running.active_connections.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(10));
      }

      if let Err(e) = running.accept_thread.join() {
        warn_log!("knot: accept thread panicked while stopping: {:?}", e);
      }
    }

    *unwrap_poison(self.state.lock())? = ServerState::Idle;
    Ok(())
  }

  /// Broadcasts `text` as a single WebSocket text frame to every currently connected peer.
  /// Failures on individual peers are logged and silently drop that peer; see
  /// [`BroadcastRegistry::broadcast`].
  pub fn broadcast(&self, text: impl AsRef<str>) {
    self.registry.broadcast(text, Some(&mut |id, err| {
      warn_log!("knot: dropping websocket peer {} after broadcast failure: {}", id, err);
    }));
  }
}

impl Drop for Server {
  fn drop(&mut self) {
    let _ = self.stop();
  }
}

/// Runs the keep-alive request loop for one accepted TCP connection, handing off to the
/// WebSocket frame handler if the first request on it asks to be upgraded.
fn handle_connection(
  stream: TcpStream,
  conductor: &Conductor,
  registry: &BroadcastRegistry,
  connection_timeout: Option<Duration>,
  read_timeout: Option<Duration>,
  write_timeout: Option<Duration>,
) -> Result<()> {
  let peer_address = stream.peer_addr().map(|a| a.to_string()).unwrap_or_else(|_| "unknown".to_string());
  let stream = stream.into_connection_stream();
  stream.set_read_timeout(connection_timeout)?;
  stream.set_write_timeout(write_timeout)?;

  loop {
    stream.set_read_timeout(read_timeout)?;

    let context = match RequestContext::read(stream.as_ref(), peer_address.clone()) {
      Ok(context) => context,
      Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(()),
      Err(err) => return Err(err),
    };

    let version = context.head().version();

    if context.is_upgrade_request() {
      let keep_alive_requested = connection_header_requests(&context, "keep-alive");
      let _ = keep_alive_requested; // upgraded connections never return to the HTTP loop.
      let request = Request::new(context, HashMap::new(), String::new());

      return match conductor.dispatch_upgrade(&request)? {
        UpgradeOutcome::Accepted(response) => {
          response.write_to(stream.as_ref(), version, false)?;
          connection::serve(request.context().id(), stream, registry)
        }
        UpgradeOutcome::Rejected(response) => {
          response.write_to(stream.as_ref(), version, false)?;
          Ok(())
        }
      };
    }

    let keep_alive_requested =
      version == HttpVersion::Http11 && connection_header_requests(&context, "keep-alive");

    let (response, force_close) = conductor.dispatch(context)?;
    let keep_alive = keep_alive_requested && !force_close;

    response.write_to(stream.as_ref(), version, keep_alive)?;

    if !keep_alive {
      return Ok(());
    }
  }
}

fn connection_header_requests(context: &RequestContext, token: &str) -> bool {
  context
    .head()
    .headers()
    .get(HeaderName::Connection)
    .map(|value| value.split(',').any(|part| part.trim().eq_ignore_ascii_case(token)))
    .unwrap_or(false)
}

/// Accumulates routes, middleware, and server-level options before producing an immutable
/// [`Server`] (§4.12). Mirrors the teacher's `RouterBuilder` -> `Router` / builder -> `Server`
/// split: every method here takes `self` by value and returns it, so configuration reads as a
/// chain and nothing is mutable once `build()` is called.
pub struct ServerBuilder {
  root: Node,
  middleware: Vec<Middleware>,
  bind_address: IpAddr,
  connection_timeout: Option<Duration>,
  read_timeout: Option<Duration>,
  write_timeout: Option<Duration>,
  shutdown_drain_timeout: Duration,
  thread_adapter: Arc<dyn ThreadAdapter>,
}

impl Default for ServerBuilder {
  fn default() -> Self {
    Self {
      root: Node::root(),
      middleware: Vec::new(),
      bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
      connection_timeout: None,
      read_timeout: None,
      write_timeout: None,
      shutdown_drain_timeout: Duration::from_secs(30),
      thread_adapter: Arc::new(NativeThreadAdapter),
    }
  }
}

impl ServerBuilder {
  /// Registers `handler` to answer `method` requests at `path`. See [`Node::register`] for the
  /// path syntax and registration-time error conditions.
  pub fn route(mut self, method: Method, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.root.register(path, method, Box::new(handler))?;
    Ok(self)
  }

  /// Convenience alias for `route(Method::Get, ...)`.
  pub fn get(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Get, path, handler)
  }

  /// Convenience alias for `route(Method::Post, ...)`.
  pub fn post(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Post, path, handler)
  }

  /// Convenience alias for `route(Method::Put, ...)`.
  pub fn put(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Put, path, handler)
  }

  /// Convenience alias for `route(Method::Delete, ...)`.
  pub fn delete(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Delete, path, handler)
  }

  /// Convenience alias for `route(Method::Patch, ...)`.
  pub fn patch(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Patch, path, handler)
  }

  /// Convenience alias for `route(Method::Head, ...)`.
  pub fn head(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Head, path, handler)
  }

  /// Convenience alias for `route(Method::Options, ...)`. `OPTIONS` is already answered with a
  /// blanket `204` by the Conductor (§4.6 step 3); registering one explicitly is only useful if
  /// a non-default response is required for a specific path.
  pub fn options(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Options, path, handler)
  }

  /// Convenience alias for `route(Method::Trace, ...)`.
  pub fn trace(self, path: &str, handler: impl Handler + 'static) -> Result<Self> {
    self.route(Method::Trace, path, handler)
  }

  /// Attaches a [`crate::routing::FileServant`] rooted at `directory` to serve `GET` requests
  /// under `path`.
  pub fn file(mut self, path: &str, directory: impl Into<PathBuf>) -> Result<Self> {
    self.root.file(path, directory)?;
    Ok(self)
  }

  /// Attaches a [`crate::routing::ZipServant`] decoded from `archive_bytes` to serve `GET`
  /// requests under `path`.
  pub fn zip(mut self, path: &str, archive_bytes: impl AsRef<[u8]>) -> Result<Self> {
    self.root.zip(path, archive_bytes)?;
    Ok(self)
  }

  /// Appends a middleware hook to the chain, run in registration order (§4.5).
  pub fn middleware(mut self, middleware: Middleware) -> Self {
    self.middleware.push(middleware);
    self
  }

  /// Sets the address the listening socket binds to. Defaults to the IPv4 loopback address.
  pub fn bind_address(mut self, addr: IpAddr) -> Self {
    self.bind_address = addr;
    self
  }

  /// Sets the read timeout applied while waiting for the very first byte of a new connection.
  pub fn connection_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.connection_timeout = timeout;
    self
  }

  /// Sets the read timeout applied while reading a request head and body, including subsequent
  /// keep-alive requests on the same connection.
  pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.read_timeout = timeout;
    self
  }

  /// Sets the write timeout applied to every response write.
  pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
    self.write_timeout = timeout;
    self
  }

  /// Sets how long [`Server::stop`] waits for in-flight connections to finish before giving up
  /// and joining the accept thread regardless. Defaults to 30 seconds.
  pub fn shutdown_drain_timeout(mut self, timeout: Duration) -> Self {
    self.shutdown_drain_timeout = timeout;
    self
  }

  /// Installs a custom [`ThreadAdapter`], e.g. a bounded worker pool instead of the default
  /// one-thread-per-connection behavior.
  pub fn thread_adapter(mut self, adapter: impl ThreadAdapter + 'static) -> Self {
    self.thread_adapter = Arc::new(adapter);
    self
  }

  /// Builds the immutable [`Server`]. The routing tree and middleware chain are frozen from this
  /// point on; registering further routes requires a new builder (§5, "Shared resources").
  pub fn build(self) -> Server {
    Server {
      conductor: Arc::new(Conductor::new(self.root, self.middleware)),
      registry: Arc::new(BroadcastRegistry::new()),
      thread_adapter: self.thread_adapter,
      bind_address: self.bind_address,
      connection_timeout: self.connection_timeout,
      read_timeout: self.read_timeout,
      write_timeout: self.write_timeout,
      shutdown_drain_timeout: self.shutdown_drain_timeout,
      state: Mutex::new(ServerState::Idle),
      running: Mutex::new(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::response::Response;
  use crate::http::status::StatusCode;
  use std::io::{Read, Write};

  #[test]
  fn lifecycle_start_stop_start_stop_succeeds() {
    let server = ServerBuilder::default().build();
    let port = server.start(0).unwrap();
    assert_ne!(port, 0);
    server.stop().unwrap();

    let port2 = server.start(0).unwrap();
    assert_ne!(port2, 0);
    server.stop().unwrap();
  }

  #[test]
  fn start_while_already_started_fails() {
    let server = ServerBuilder::default().build();
    server.start(0).unwrap();
    let err = server.start(0);
    assert!(err.is_err());
    server.stop().unwrap();
  }

  #[test]
  fn stop_while_idle_fails() {
    let server = ServerBuilder::default().build();
    assert!(server.stop().is_err());
  }

  #[test]
  fn serves_a_registered_route_over_a_real_socket() {
    let server = ServerBuilder::default()
      .get("/hello", |_: &Request| Response::json(&serde_json::json!({"message": "Hello, World!"})))
      .unwrap()
      .build();
    let port = server.start(0).unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(b"GET /hello HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.ends_with(r#"{"message":"Hello, World!"}"#));

    server.stop().unwrap();
  }

  #[test]
  fn not_found_route_over_a_real_socket_is_404() {
    let server = ServerBuilder::default().build();
    let port = server.start(0).unwrap();

    let mut stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
    stream.write_all(b"GET /nope HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n").unwrap();
    stream.shutdown(std::net::Shutdown::Write).unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();
    assert!(response.starts_with("HTTP/1.1 404 "));

    server.stop().unwrap();
  }

  #[test]
  fn unwrap_some_status_ok_is_distinct_from_created() {
    assert_ne!(StatusCode::OK, StatusCode::Created);
  }
}
