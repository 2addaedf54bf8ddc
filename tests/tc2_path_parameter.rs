//! §8 scenario 2: a single path parameter captured from the route.

mod common;

use knot::http::mime::MimeType;
use knot::http::Request;
use knot::http::Response;
use knot::server::ServerBuilder;

#[test]
fn single_path_parameter_reaches_the_handler() {
  let server = ServerBuilder::default()
    .get("/v/:name", |req: &Request| {
      Response::ok(format!("Hello, {}", req.path_param("name").unwrap_or("")), MimeType::TextPlain)
    })
    .unwrap()
    .build();
  let port = server.start(0).unwrap();

  let response = common::send(port, "GET /v/Alice HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");

  assert_eq!(common::status_line(&response), "HTTP/1.1 200 OK");
  assert!(common::body(&response).contains("Hello, Alice"));

  server.stop().unwrap();
}
