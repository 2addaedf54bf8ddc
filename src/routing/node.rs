//! The routing tree itself: registration and request-time resolution. See crate docs §4.1.

use crate::error::{Result, RoutingError};
use crate::handler::Handler;
use crate::http::method::Method;
use crate::routing::file_servant::FileServant;
use crate::routing::zip_servant::ZipServant;
use std::collections::HashMap;
use std::path::PathBuf;

enum NodeKind {
  Literal,
  Parameter(String),
  FileRoot(FileServant),
  ZipRoot(ZipServant),
}

/// One vertex of the routing tree. The root is created empty via [`Node::root`] and grown by
/// [`Node::register`], [`Node::file`], and [`Node::zip`].
pub struct Node {
  segment: String,
  kind: NodeKind,
  children: Vec<Node>,
  handlers: HashMap<Method, Box<dyn Handler>>,
}

/// What a resolved path points to: an application handler with its captured path parameters, or
/// a terminal servant that will answer from the unmatched tail of the path itself.
pub enum Destination<'a> {
  /// A registered application handler.
  Handler {
    /// The handler bound at this node for the request method.
    handler: &'a dyn Handler,
    /// Path parameters captured along the way, keyed by `:name`.
    params: HashMap<String, String>,
    /// The unmatched suffix of the path, empty when the handler's own node was reached exactly.
    remaining: String,
  },
  /// A [`FileServant`] that will serve from `remaining`.
  File {
    /// The matched servant.
    servant: &'a FileServant,
    /// The path beyond the servant's mount point.
    remaining: String,
  },
  /// A [`ZipServant`] that will serve from `remaining`.
  Zip {
    /// The matched servant.
    servant: &'a ZipServant,
    /// The path beyond the servant's mount point.
    remaining: String,
  },
}

impl Node {
  /// Creates the empty root of a routing tree.
  pub fn root() -> Self {
    Self { segment: String::new(), kind: NodeKind::Literal, children: Vec::new(), handlers: HashMap::new() }
  }

  fn leaf(segment: String, kind: NodeKind) -> Self {
    Self { segment, kind, children: Vec::new(), handlers: HashMap::new() }
  }

  /// Registers `handler` to answer `method` requests at `path`.
  ///
  /// `path` is split on `/`; a segment prefixed with `:` binds a path parameter of that name for
  /// every descendant of the resulting node. Registering a second, differently-named parameter
  /// segment at the same depth is rejected with [`RoutingError::ConflictingParameterName`].
  pub fn register(&mut self, path: &str, method: Method, handler: Box<dyn Handler>) -> Result<()> {
    let segments = split_segments(path)?;
    let node = self.walk_create(&segments)?;
    node.handlers.insert(method, handler);
    Ok(())
  }

  /// Attaches a [`FileServant`] rooted at `directory` to answer `GET` requests under `path`.
  pub fn file(&mut self, path: &str, directory: impl Into<PathBuf>) -> Result<()> {
    let segments = split_segments(path)?;
    let node = self.walk_create(&segments)?;
    node.kind = NodeKind::FileRoot(FileServant::new(directory));
    Ok(())
  }

  /// Attaches a [`ZipServant`] decoded from `archive_bytes` to answer `GET` requests under `path`.
  pub fn zip(&mut self, path: &str, archive_bytes: impl AsRef<[u8]>) -> Result<()> {
    let servant = ZipServant::load(archive_bytes)?;
    let segments = split_segments(path)?;
    let node = self.walk_create(&segments)?;
    node.kind = NodeKind::ZipRoot(servant);
    Ok(())
  }

  fn walk_create(&mut self, segments: &[&str]) -> Result<&mut Node> {
    let mut current = self;

    for seg in segments {
      if matches!(current.kind, NodeKind::FileRoot(_) | NodeKind::ZipRoot(_)) {
        return Err(RoutingError::ChildBeneathServant((*seg).to_string()).into());
      }

      if let Some(name) = seg.strip_prefix(':') {
        if let Some(existing) = current.children.iter().find(|c| matches!(&c.kind, NodeKind::Parameter(_))) {
          if existing.segment != *seg {
            return Err(
              RoutingError::ConflictingParameterName { existing: existing.segment.clone(), new: name.to_string() }
                .into(),
            );
          }
        }
      }

      let pos = current.children.iter().position(|c| c.segment == *seg);
      let idx = match pos {
        Some(i) => i,
        None => {
          let kind = match seg.strip_prefix(':') {
            Some(name) => NodeKind::Parameter(name.to_string()),
            None => NodeKind::Literal,
          };
          current.children.push(Node::leaf((*seg).to_string(), kind));
          current.children.len() - 1
        }
      };

      current = &mut current.children[idx];
    }

    Ok(current)
  }

  /// Resolves `path` for `method`, descending literal children first, then parameter children,
  /// then terminal servants (`GET` only), falling back to the deepest node with a handler bound
  /// for `method` along the path actually walked.
  pub fn resolve(&self, method: &Method, path: &str) -> Result<Option<Destination<'_>>> {
    let segments = split_segments(path)?;
    let mut params = HashMap::new();
    Ok(Self::resolve_segments(self, method, &segments, 0, &mut params))
  }

  fn resolve_segments<'a>(
    node: &'a Node,
    method: &Method,
    segments: &[&str],
    idx: usize,
    params: &mut HashMap<String, String>,
  ) -> Option<Destination<'a>> {
    if idx < segments.len() {
      let seg = segments[idx];

      for child in node.children.iter().filter(|c| matches!(c.kind, NodeKind::Literal)) {
        if child.segment.eq_ignore_ascii_case(seg) {
          if let Some(found) = Self::resolve_segments(child, method, segments, idx + 1, params) {
            return Some(found);
          }
        }
      }

      if !seg.is_empty() {
        for child in node.children.iter() {
          if let NodeKind::Parameter(name) = &child.kind {
            params.insert(name.clone(), seg.to_string());
            if let Some(found) = Self::resolve_segments(child, method, segments, idx + 1, params) {
              return Some(found);
            }
            params.remove(name);
          }
        }
      }

      if *method == Method::Get {
        for child in node.children.iter() {
          if !child.segment.eq_ignore_ascii_case(seg) {
            continue;
          }
          match &child.kind {
            NodeKind::FileRoot(servant) => {
              return Some(Destination::File { servant, remaining: segments[idx + 1..].join("/") });
            }
            NodeKind::ZipRoot(servant) => {
              return Some(Destination::Zip { servant, remaining: segments[idx + 1..].join("/") });
            }
            NodeKind::Literal | NodeKind::Parameter(_) => {}
          }
        }
      }
    }

    node.handlers.get(method).map(|handler| Destination::Handler {
      handler: handler.as_ref(),
      params: params.clone(),
      remaining: segments.get(idx..).unwrap_or(&[]).join("/"),
    })
  }

  /// True if `path` resolves to *some* node bound to *any* method, or to a terminal servant,
  /// regardless of which method is actually requested.
  ///
  /// Used only for the `OPTIONS` pre-flight of §4.6 step 3: the blanket `204` response applies
  /// to any path an embedder has registered under some method, not only ones with an explicit
  /// `OPTIONS` handler (mirrors the teacher's `get_handler`, which matches routes by path alone).
  pub fn path_exists(&self, path: &str) -> Result<bool> {
    let segments = split_segments(path)?;
    Ok(Self::exists_segments(self, &segments, 0))
  }

  fn exists_segments(node: &Node, segments: &[&str], idx: usize) -> bool {
    if idx < segments.len() {
      let seg = segments[idx];

      for child in node.children.iter().filter(|c| matches!(c.kind, NodeKind::Literal)) {
        if child.segment.eq_ignore_ascii_case(seg) && Self::exists_segments(child, segments, idx + 1) {
          return true;
        }
      }

      if !seg.is_empty() {
        for child in node.children.iter().filter(|c| matches!(c.kind, NodeKind::Parameter(_))) {
          if Self::exists_segments(child, segments, idx + 1) {
            return true;
          }
        }
      }

      return node.children.iter().any(|child| {
        child.segment.eq_ignore_ascii_case(seg) && matches!(child.kind, NodeKind::FileRoot(_) | NodeKind::ZipRoot(_))
      });
    }

    !node.handlers.is_empty() || matches!(node.kind, NodeKind::FileRoot(_) | NodeKind::ZipRoot(_))
  }
}

fn split_segments(path: &str) -> Result<Vec<&str>> {
  if path.is_empty() {
    return Err(RoutingError::EmptyPath.into());
  }

  let mut parts: Vec<&str> = path.split('/').collect();
  if parts.first() == Some(&"") {
    parts.remove(0);
  }

  Ok(parts)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::request_context::Request;
  use crate::http::response::Response;
  use crate::http::status::StatusCode;

  fn ok_handler(_: &Request) -> crate::error::Result<Response> {
    Ok(Response::new(StatusCode::OK))
  }

  #[test]
  fn resolves_literal_path() {
    let mut root = Node::root();
    root.register("/v1/health", Method::Get, Box::new(ok_handler)).unwrap();

    let destination = root.resolve(&Method::Get, "/v1/health").unwrap().unwrap();
    assert!(matches!(destination, Destination::Handler { remaining, .. } if remaining.is_empty()));
  }

  #[test]
  fn resolves_path_parameter() {
    let mut root = Node::root();
    root.register("/v/:name", Method::Get, Box::new(ok_handler)).unwrap();

    match root.resolve(&Method::Get, "/v/Alice").unwrap().unwrap() {
      Destination::Handler { params, .. } => assert_eq!(params.get("name"), Some(&"Alice".to_string())),
      _ => panic!("expected a handler destination"),
    }
  }

  #[test]
  fn literal_is_preferred_over_parameter() {
    let mut root = Node::root();
    root.register("/v/static", Method::Get, Box::new(ok_handler)).unwrap();
    root.register("/v/:name", Method::Get, Box::new(|_: &Request| Ok(Response::new(StatusCode::Created)))).unwrap();

    match root.resolve(&Method::Get, "/v/static").unwrap().unwrap() {
      Destination::Handler { params, .. } => assert!(params.is_empty()),
      _ => panic!("expected a handler destination"),
    }
  }

  #[test]
  fn conflicting_parameter_names_are_rejected() {
    let mut root = Node::root();
    root.register("/v/:name", Method::Get, Box::new(ok_handler)).unwrap();
    let err = root.register("/v/:id", Method::Post, Box::new(ok_handler));
    assert!(err.is_err());
  }

  #[test]
  fn unmatched_path_resolves_to_none() {
    let mut root = Node::root();
    root.register("/v1/health", Method::Get, Box::new(ok_handler)).unwrap();
    assert!(root.resolve(&Method::Get, "/v1/missing").unwrap().is_none());
  }

  #[test]
  fn non_get_method_does_not_match_servant() {
    let mut root = Node::root();
    root.file("/static", std::env::temp_dir()).unwrap();
    assert!(root.resolve(&Method::Post, "/static/x").unwrap().is_none());
  }

  #[test]
  fn servant_strips_its_own_mount_segment_from_remaining() {
    let mut root = Node::root();
    root.file("/static", std::env::temp_dir()).unwrap();

    match root.resolve(&Method::Get, "/static/app.js").unwrap().unwrap() {
      Destination::File { remaining, .. } => assert_eq!(remaining, "app.js"),
      _ => panic!("expected a file destination"),
    }
  }

  #[test]
  fn servant_does_not_catch_requests_for_an_unrelated_sibling_prefix() {
    let mut root = Node::root();
    root.file("/static", std::env::temp_dir()).unwrap();
    root.register("/api/health", Method::Get, Box::new(ok_handler)).unwrap();

    assert!(root.resolve(&Method::Get, "/unrelated/path").unwrap().is_none());
  }
}
