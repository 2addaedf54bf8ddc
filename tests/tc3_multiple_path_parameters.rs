//! §8 scenario 3: two path parameters captured at different depths of the same route.

mod common;

use knot::http::mime::MimeType;
use knot::http::Request;
use knot::http::Response;
use knot::server::ServerBuilder;

#[test]
fn two_path_parameters_reach_the_handler() {
  let server = ServerBuilder::default()
    .get("/r/:value1/:value2", |req: &Request| {
      Response::ok(
        format!(
          "Hello, {} and {}",
          req.path_param("value1").unwrap_or(""),
          req.path_param("value2").unwrap_or("")
        ),
        MimeType::TextPlain,
      )
    })
    .unwrap()
    .build();
  let port = server.start(0).unwrap();

  let response = common::send(port, "GET /r/Alice/Bob HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");

  assert_eq!(common::status_line(&response), "HTTP/1.1 200 OK");
  assert!(common::body(&response).contains("Hello, Alice and Bob"));

  server.stop().unwrap();
}
