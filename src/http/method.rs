//! Provides functionality for handling HTTP methods.

use std::fmt::Display;

/// Represents an HTTP method.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Method {
  /// The `GET` method.
  Get,
  /// The `POST` method.
  Post,
  /// The `PUT` method.
  Put,
  /// The `PATCH` method.
  Patch,
  /// The `DELETE` method.
  Delete,
  /// The `HEAD` method.
  Head,
  /// The `OPTIONS` method.
  Options,
  /// The `TRACE` method.
  Trace,
  /// Anything else your heart desires.
  Custom(String),
}

impl Method {
  /// Attempts to convert from the HTTP verb into an enum variant.
  ///
  /// ## Example
  /// ```
  /// let method = knot::http::Method::from_name("GET");
  /// assert_eq!(method, knot::http::Method::Get);
  /// ```
  pub fn from_name(name: &str) -> Self {
    match name {
      "GET" => Self::Get,
      "POST" => Self::Post,
      "PUT" => Self::Put,
      "PATCH" => Self::Patch,
      "DELETE" => Self::Delete,
      "HEAD" => Self::Head,
      "OPTIONS" => Self::Options,
      "TRACE" => Self::Trace,
      _ => Self::Custom(name.to_string()),
    }
  }
}

impl Display for Method {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      match self {
        Method::Get => "GET",
        Method::Post => "POST",
        Method::Put => "PUT",
        Method::Patch => "PATCH",
        Method::Delete => "DELETE",
        Method::Head => "HEAD",
        Method::Options => "OPTIONS",
        Method::Trace => "TRACE",
        Method::Custom(name) => name.as_str(),
      }
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn round_trips_well_known_methods() {
    for (name, method) in [
      ("GET", Method::Get),
      ("POST", Method::Post),
      ("PUT", Method::Put),
      ("PATCH", Method::Patch),
      ("DELETE", Method::Delete),
      ("HEAD", Method::Head),
      ("OPTIONS", Method::Options),
      ("TRACE", Method::Trace),
    ] {
      assert_eq!(Method::from_name(name), method);
      assert_eq!(method.to_string(), name);
    }
  }

  #[test]
  fn unknown_verb_becomes_custom() {
    assert_eq!(Method::from_name("PROPFIND"), Method::Custom("PROPFIND".to_string()));
  }
}
