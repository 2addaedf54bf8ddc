//! §8 scenario 4: an unregistered path produces a 404 whose body names the requested path.

mod common;

use knot::server::ServerBuilder;

#[test]
fn unregistered_path_is_404_with_path_in_body() {
  let server = ServerBuilder::default().build();
  let port = server.start(0).unwrap();

  let response = common::send(port, "GET /nonexistent HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");

  assert_eq!(common::status_line(&response), "HTTP/1.1 404 Not Found");
  assert!(common::body(&response).contains(r#""path":"/nonexistent""#));

  server.stop().unwrap();
}
