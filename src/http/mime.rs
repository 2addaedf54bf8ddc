//! Provides functionality for handling MIME types.
//!
//! This is a trimmed descendant of a much larger content-negotiation-aware MIME model; since
//! this core has no `Accept` negotiation (see crate docs, Non-goals), all that's kept is the part
//! actually observable on the wire: turning a file extension into a `Content-Type` value.

use std::fmt::{Display, Formatter};

/// A MIME type, as used for the `Content-Type` response header.
///
/// Unlike a full content-negotiation model this only ever needs to go one direction: from a file
/// extension (FileServant, ZipServant) or from application code (`Response::ok`) to a wire string.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum MimeType {
  /// text/plain
  TextPlain,
  /// text/html
  TextHtml,
  /// text/css
  TextCss,
  /// text/javascript
  TextJavaScript,
  /// text/csv
  TextCsv,
  /// text/markdown
  TextMarkdown,
  /// text/xml
  TextXml,
  /// application/json
  ApplicationJson,
  /// application/xml
  ApplicationXml,
  /// application/pdf
  ApplicationPdf,
  /// application/zip
  ApplicationZip,
  /// application/gzip
  ApplicationGzip,
  /// application/octet-stream
  ApplicationOctetStream,
  /// application/wasm
  ApplicationWasm,
  /// application/x-www-form-urlencoded
  ApplicationFormUrlEncoded,
  /// image/png
  ImagePng,
  /// image/jpeg
  ImageJpeg,
  /// image/gif
  ImageGif,
  /// image/svg+xml
  ImageSvg,
  /// image/webp
  ImageWebp,
  /// image/x-icon
  ImageIcon,
  /// image/bmp
  ImageBmp,
  /// audio/mpeg
  AudioMpeg,
  /// audio/ogg
  AudioOgg,
  /// audio/wav
  AudioWav,
  /// video/mp4
  VideoMp4,
  /// video/webm
  VideoWebm,
  /// video/ogg
  VideoOgg,
  /// font/ttf
  FontTtf,
  /// font/otf
  FontOtf,
  /// font/woff
  FontWoff,
  /// font/woff2
  FontWoff2,
  /// Any MIME type not enumerated above, verbatim.
  Custom(String),
}

impl MimeType {
  /// Converts from a file extension without the `.` to the enum variant.
  /// If the MIME type cannot be inferred from the extension, returns `MimeType::ApplicationOctetStream`.
  pub fn from_extension(extension: impl AsRef<str>) -> Self {
    match extension.as_ref().to_ascii_lowercase().as_str() {
      "txt" => MimeType::TextPlain,
      "html" | "htm" => MimeType::TextHtml,
      "css" => MimeType::TextCss,
      "js" | "mjs" => MimeType::TextJavaScript,
      "csv" => MimeType::TextCsv,
      "md" | "markdown" => MimeType::TextMarkdown,
      "xml" => MimeType::TextXml,
      "json" => MimeType::ApplicationJson,
      "pdf" => MimeType::ApplicationPdf,
      "zip" => MimeType::ApplicationZip,
      "gz" => MimeType::ApplicationGzip,
      "bin" => MimeType::ApplicationOctetStream,
      "wasm" => MimeType::ApplicationWasm,
      "png" => MimeType::ImagePng,
      "jpg" | "jpeg" => MimeType::ImageJpeg,
      "gif" => MimeType::ImageGif,
      "svg" => MimeType::ImageSvg,
      "webp" => MimeType::ImageWebp,
      "ico" => MimeType::ImageIcon,
      "bmp" => MimeType::ImageBmp,
      "mp3" => MimeType::AudioMpeg,
      "oga" => MimeType::AudioOgg,
      "wav" => MimeType::AudioWav,
      "mp4" => MimeType::VideoMp4,
      "webm" => MimeType::VideoWebm,
      "ogv" => MimeType::VideoOgg,
      "ttf" => MimeType::FontTtf,
      "otf" => MimeType::FontOtf,
      "woff" => MimeType::FontWoff,
      "woff2" => MimeType::FontWoff2,
      _ => MimeType::ApplicationOctetStream,
    }
  }

  /// Returns the wire representation of this MIME type, e.g. `text/html`.
  pub fn as_str(&self) -> &str {
    match self {
      MimeType::TextPlain => "text/plain",
      MimeType::TextHtml => "text/html",
      MimeType::TextCss => "text/css",
      MimeType::TextJavaScript => "text/javascript",
      MimeType::TextCsv => "text/csv",
      MimeType::TextMarkdown => "text/markdown",
      MimeType::TextXml => "text/xml",
      MimeType::ApplicationJson => "application/json",
      MimeType::ApplicationXml => "application/xml",
      MimeType::ApplicationPdf => "application/pdf",
      MimeType::ApplicationZip => "application/zip",
      MimeType::ApplicationGzip => "application/gzip",
      MimeType::ApplicationOctetStream => "application/octet-stream",
      MimeType::ApplicationWasm => "application/wasm",
      MimeType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
      MimeType::ImagePng => "image/png",
      MimeType::ImageJpeg => "image/jpeg",
      MimeType::ImageGif => "image/gif",
      MimeType::ImageSvg => "image/svg+xml",
      MimeType::ImageWebp => "image/webp",
      MimeType::ImageIcon => "image/x-icon",
      MimeType::ImageBmp => "image/bmp",
      MimeType::AudioMpeg => "audio/mpeg",
      MimeType::AudioOgg => "audio/ogg",
      MimeType::AudioWav => "audio/wav",
      MimeType::VideoMp4 => "video/mp4",
      MimeType::VideoWebm => "video/webm",
      MimeType::VideoOgg => "video/ogg",
      MimeType::FontTtf => "font/ttf",
      MimeType::FontOtf => "font/otf",
      MimeType::FontWoff => "font/woff",
      MimeType::FontWoff2 => "font/woff2",
      MimeType::Custom(raw) => raw.as_str(),
    }
  }
}

impl Display for MimeType {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl AsRef<str> for MimeType {
  fn as_ref(&self) -> &str {
    self.as_str()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_extensions_map_to_expected_mime() {
    assert_eq!(MimeType::from_extension("html"), MimeType::TextHtml);
    assert_eq!(MimeType::from_extension("HTML"), MimeType::TextHtml);
    assert_eq!(MimeType::from_extension("js"), MimeType::TextJavaScript);
    assert_eq!(MimeType::from_extension("png"), MimeType::ImagePng);
  }

  #[test]
  fn unknown_extension_falls_back_to_octet_stream() {
    assert_eq!(MimeType::from_extension("qux"), MimeType::ApplicationOctetStream);
    assert_eq!(MimeType::from_extension(""), MimeType::ApplicationOctetStream);
  }
}
