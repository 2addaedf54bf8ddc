//! The routing tree: registration, request-time resolution, and the two servant kinds that can
//! terminate a route (file-system and zip-archive backed). See crate docs §4.

mod file_servant;
mod node;
mod zip_servant;

pub use file_servant::FileServant;
pub use node::{Destination, Node};
pub use zip_servant::ZipServant;
