//! §8 scenario 6 (wire-reachable half): a `ZipServant` serves an archive entry by exact path and
//! falls back to a directory's `index.html` for an implicit directory. The fragment-based SPA
//! fallback itself is exercised at the unit level in `routing::zip_servant` - a URL fragment is
//! never sent by a real client, so there is nothing to drive over an actual socket for it (§8
//! scenario 6's `#` case, crate docs §4.3).

mod common;

use knot::server::ServerBuilder;
use std::io::{Cursor, Write};
use zip::write::FileOptions;

fn build_archive() -> Vec<u8> {
  let mut buf = Vec::new();
  let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
  let options = FileOptions::default();
  writer.add_directory("admin/", options).unwrap();
  writer.start_file("admin/index.html", options).unwrap();
  writer.write_all(b"<admin-dashboard/>").unwrap();
  writer.start_file("app.js", options).unwrap();
  writer.write_all(b"console.log(1)").unwrap();
  writer.finish().unwrap();
  drop(writer);
  buf
}

#[test]
fn exact_entry_is_served_with_its_mime_type() {
  let server = ServerBuilder::default().zip("/static", build_archive()).unwrap().build();
  let port = server.start(0).unwrap();

  let response = common::send(port, "GET /static/app.js HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");

  assert_eq!(common::status_line(&response), "HTTP/1.1 200 OK");
  assert!(response.contains("Content-Type: text/javascript"));
  assert_eq!(common::body(&response), "console.log(1)");

  server.stop().unwrap();
}

#[test]
fn implicit_directory_falls_back_to_its_index() {
  let server = ServerBuilder::default().zip("/static", build_archive()).unwrap().build();
  let port = server.start(0).unwrap();

  let response = common::send(port, "GET /static/admin HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");

  assert_eq!(common::status_line(&response), "HTTP/1.1 200 OK");
  assert!(response.contains("Content-Type: text/html"));
  assert_eq!(common::body(&response), "<admin-dashboard/>");

  server.stop().unwrap();
}
