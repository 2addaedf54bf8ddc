//! Serves files out of a directory on disk. See crate docs §4.2.

use crate::http::mime::MimeType;
use crate::http::response::Response;
use crate::http::status::StatusCode;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A servant rooted at a directory on disk.
///
/// Hidden files and directories - any path component starting with `.` - are never served, even
/// if directly addressed. `..` path components are stripped before resolution, so a request can
/// never escape the root directory.
pub struct FileServant {
  root: PathBuf,
}

impl Debug for FileServant {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FileServant").field("root", &self.root).finish()
  }
}

impl FileServant {
  /// Roots a new servant at `directory`. The directory is not required to exist yet; a missing
  /// or unreadable root simply yields `404` responses.
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self { root: directory.into() }
  }

  /// Resolves `remaining` (the request path beyond this servant's mount point) against the
  /// filesystem and produces the response to send.
  ///
  /// Resolution order (§4.2): sanitize away `..` components; 404 if the target does not exist;
  /// 403 if any path component from the root down is hidden (a dotfile); for a directory, serve
  /// `index.html` if present else 403; otherwise serve the file with a MIME type derived from
  /// its extension.
  pub fn resolve(&self, remaining: &str) -> Response {
    let sanitized = sanitize(remaining);

    if has_hidden_component(&sanitized) {
      return Response::error_with_path(StatusCode::Forbidden, remaining, "hidden file");
    }

    let full = self.root.join(&sanitized);

    if !full.exists() {
      return Response::error_with_path(StatusCode::NotFound, remaining, "not found");
    }

    let target = if full.is_dir() {
      let index = full.join("index.html");
      if !index.is_file() {
        return Response::error_with_path(StatusCode::Forbidden, remaining, "directory has no index.html");
      }
      index
    } else {
      full
    };

    match fs::read(&target) {
      Ok(body) => {
        let mime = target
          .extension()
          .and_then(|ext| ext.to_str())
          .map(MimeType::from_extension)
          .unwrap_or(MimeType::ApplicationOctetStream);
        Response::ok(body, mime)
      }
      Err(_) => Response::error_with_path(StatusCode::NotFound, remaining, "not found"),
    }
  }
}

/// Strips `..`/`.`/root components, keeping only the normal path segments. Does not reject
/// hidden segments - see [`has_hidden_component`], checked separately so a missing file still
/// reports `404` rather than masking it behind `403`.
fn sanitize(path: &str) -> PathBuf {
  let mut out = PathBuf::new();
  for component in Path::new(path).components() {
    if let Component::Normal(seg) = component {
      out.push(seg);
    }
  }
  out
}

/// True if any component of `path` is a dotfile/dot-directory (POSIX hidden-file convention,
/// see crate docs §9's resolution of the `isHidden` open question).
fn has_hidden_component(path: &Path) -> bool {
  path.components().any(|c| matches!(c, Component::Normal(seg) if seg.to_str().is_some_and(|s| s.starts_with('.'))))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;

  fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("knot-file-servant-test-{name}-{}", crate::util::next_id()));
    fs::create_dir_all(&dir).unwrap();
    dir
  }

  #[test]
  fn serves_existing_file() {
    let dir = scratch_dir("existing");
    fs::write(dir.join("hello.txt"), b"hi").unwrap();
    let servant = FileServant::new(&dir);
    let response = servant.resolve("hello.txt");
    assert_eq!(response.status(), &StatusCode::OK);
    assert_eq!(response.body(), b"hi");
  }

  #[test]
  fn falls_back_to_index_html_for_directories() {
    let dir = scratch_dir("index-fallback");
    fs::create_dir_all(dir.join("sub")).unwrap();
    fs::write(dir.join("sub/index.html"), b"<html></html>").unwrap();
    let servant = FileServant::new(&dir);
    let response = servant.resolve("sub");
    assert_eq!(response.status(), &StatusCode::OK);
    assert_eq!(response.body(), b"<html></html>");
  }

  #[test]
  fn rejects_path_traversal() {
    let dir = scratch_dir("traversal");
    let servant = FileServant::new(&dir);
    let response = servant.resolve("../../etc/passwd");
    assert_eq!(response.status(), &StatusCode::NotFound);
  }

  #[test]
  fn rejects_dotfiles() {
    let dir = scratch_dir("dotfiles");
    fs::write(dir.join(".secret"), b"nope").unwrap();
    let servant = FileServant::new(&dir);
    let response = servant.resolve(".secret");
    assert_eq!(response.status(), &StatusCode::Forbidden);
  }

  #[test]
  fn rejects_file_behind_hidden_directory() {
    let dir = scratch_dir("hidden-parent");
    fs::create_dir_all(dir.join(".git")).unwrap();
    fs::write(dir.join(".git/config"), b"nope").unwrap();
    let servant = FileServant::new(&dir);
    let response = servant.resolve(".git/config");
    assert_eq!(response.status(), &StatusCode::Forbidden);
  }

  #[test]
  fn directory_without_index_is_403() {
    let dir = scratch_dir("no-index");
    fs::create_dir_all(dir.join("sub")).unwrap();
    let servant = FileServant::new(&dir);
    let response = servant.resolve("sub");
    assert_eq!(response.status(), &StatusCode::Forbidden);
  }

  #[test]
  fn missing_file_is_404() {
    let dir = scratch_dir("missing");
    let servant = FileServant::new(&dir);
    let response = servant.resolve("nope.txt");
    assert_eq!(response.status(), &StatusCode::NotFound);
  }
}
