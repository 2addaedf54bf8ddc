//! §8 scenario 7: `..` segments are stripped before lookup, so a traversal attempt against a
//! `ZipServant` can only ever miss, never escape the archive.

mod common;

use knot::server::ServerBuilder;
use std::io::{Cursor, Write};
use zip::write::FileOptions;

fn build_archive() -> Vec<u8> {
  let mut buf = Vec::new();
  let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
  writer.start_file("app.js", FileOptions::default()).unwrap();
  writer.write_all(b"console.log(1)").unwrap();
  writer.finish().unwrap();
  drop(writer);
  buf
}

#[test]
fn traversal_attempt_is_stripped_and_misses() {
  let server = ServerBuilder::default().zip("/static", build_archive()).unwrap().build();
  let port = server.start(0).unwrap();

  let response =
    common::send(port, "GET /static/../../etc/passwd HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n");

  assert_eq!(common::status_line(&response), "HTTP/1.1 404 Not Found");

  server.stop().unwrap();
}
