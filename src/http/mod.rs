//! HTTP/1.1 types: headers, methods, status codes, MIME types, request parsing, and response
//! serialization. See crate docs §4.4-§4.5.

pub mod headers;
pub mod method;
pub mod mime;
pub mod request;
pub mod request_context;
pub mod response;
pub mod status;

pub use headers::{Header, HeaderLike, HeaderName, Headers};
pub use method::Method;
pub use mime::MimeType;
pub use request::{HttpVersion, RequestHead};
pub use request_context::{Request, RequestContext};
pub use response::Response;
pub use status::StatusCode;
