//! Serves a directory tree out of an in-memory zip archive. See crate docs §4.3.

use crate::error::Result;
use crate::http::mime::MimeType;
use crate::http::response::Response;
use crate::http::status::StatusCode;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// A servant backed by a zip archive decoded once at registration time and held entirely in
/// memory thereafter.
pub struct ZipServant {
  // Normalized entry name (no leading `/`, no trailing `/` for files) -> file bytes, or `None`
  // for directory entries (kept so implicit-directory lookups can be answered without a scan).
  entries: HashMap<String, Option<Vec<u8>>>,
}

impl Debug for ZipServant {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ZipServant").field("entry_count", &self.entries.len()).finish()
  }
}

impl ZipServant {
  /// Decodes `archive_bytes` as a zip archive and loads every entry into memory.
  pub fn load(archive_bytes: impl AsRef<[u8]>) -> Result<Self> {
    let mut archive =
      ZipArchive::new(Cursor::new(archive_bytes.as_ref())).map_err(|e| crate::error::Error::Other(Box::new(e)))?;

    let mut entries = HashMap::with_capacity(archive.len());
    for i in 0..archive.len() {
      let mut file = archive.by_index(i).map_err(|e| crate::error::Error::Other(Box::new(e)))?;
      let name = normalize(file.name());
      if file.is_dir() {
        entries.insert(name, None);
      } else {
        let mut body = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut body)?;
        entries.insert(name, Some(body));
      }
    }

    Ok(Self { entries })
  }

  /// Resolves `remaining` against the archive. See crate docs §4.3 for the exact algorithm: an
  /// exact file match wins; failing that, directory and SPA-fallback rules apply before giving
  /// up with a `404`.
  pub fn resolve(&self, remaining: &str) -> Response {
    let sanitized = sanitize(remaining);

    if let Some(body) = self.find_file(&sanitized) {
      return self.serve(&sanitized, body);
    }

    if sanitized.is_empty() {
      if let Some(body) = self.find_file("index.html") {
        return self.serve("index.html", body);
      }
    }

    let (directory_path, has_fragment) = match sanitized.find('#') {
      Some(hash_idx) => (sanitized[..hash_idx].trim_end_matches('/').to_string(), true),
      None => (sanitized.trim_end_matches('/').to_string(), false),
    };

    if sanitized.ends_with('/') || has_fragment {
      if let Some(body) = self.find_index_in_directory(&directory_path) {
        return self.serve(&format!("{directory_path}/index.html"), body);
      }
    }

    if self.is_implicit_directory(&sanitized) {
      if let Some(body) = self.find_index_in_directory(&sanitized) {
        return self.serve(&format!("{sanitized}/index.html"), body);
      }
    }

    Response::error_with_path(StatusCode::NotFound, remaining, "not found")
  }

  /// §4.3 `findFile(p)`: tries the keys `p`, `./p`, `/p` in that order, matching only
  /// non-directory entries.
  fn find_file(&self, p: &str) -> Option<Vec<u8>> {
    for key in [p.to_string(), format!("./{p}"), format!("/{p}")] {
      if let Some(Some(body)) = self.entries.get(&key) {
        return Some(body.clone());
      }
    }
    None
  }

  /// §4.3 `findIndexInDirectory(d)`.
  fn find_index_in_directory(&self, d: &str) -> Option<Vec<u8>> {
    let target = if d.is_empty() { "index.html".to_string() } else { format!("{d}/index.html") };
    self.find_file(&target)
  }

  /// §4.3 `isImplicitDirectory(p)`: true iff some stored key begins with `p + "/"`.
  fn is_implicit_directory(&self, p: &str) -> bool {
    let prefix = format!("{p}/");
    self.entries.keys().any(|key| key.starts_with(&prefix))
  }

  fn serve(&self, name: &str, body: Vec<u8>) -> Response {
    let mime = name.rsplit('.').next().map(MimeType::from_extension).unwrap_or(MimeType::ApplicationOctetStream);
    Response::ok(body, mime)
  }
}

/// Drops a leading `/`, any `?query` suffix, and `..`/`.` path segments.
fn sanitize(path: &str) -> String {
  let path = path.strip_prefix('/').unwrap_or(path);
  let path = path.split('?').next().unwrap_or(path);

  path
    .split('/')
    .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
    .collect::<Vec<_>>()
    .join("/")
}

/// Normalizes a raw zip entry name: strips a leading `/`, then a leading `./`, then a trailing
/// `/` (directory entries are stored with their trailing slash already split off). See crate
/// docs §3, §4.3.
fn normalize(name: &str) -> String {
  let name = name.trim_start_matches('/');
  let name = name.strip_prefix("./").unwrap_or(name);
  name.trim_end_matches('/').to_string()
}
