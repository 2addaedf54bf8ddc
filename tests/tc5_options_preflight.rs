//! §8 scenario 5: `OPTIONS` always yields a blank `204`, whether or not the path is registered.

mod common;

use knot::http::Request;
use knot::http::Response;
use knot::http::status::StatusCode;
use knot::server::ServerBuilder;

#[test]
fn options_is_always_a_blank_204() {
  let server = ServerBuilder::default()
    .get("/hello", |_: &Request| Response::new(StatusCode::OK))
    .unwrap()
    .build();
  let port = server.start(0).unwrap();

  let response = common::send(port, "OPTIONS /hello HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");

  assert_eq!(common::status_line(&response), "HTTP/1.1 204 No Content");
  assert!(response.contains("Content-Length: 0"));
  assert_eq!(common::body(&response), "");

  server.stop().unwrap();
}
