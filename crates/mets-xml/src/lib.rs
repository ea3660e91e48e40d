//! XML building blocks for METS documents.
//!
//! - [`Namespace`]: the fixed prefix/URI table used by every document
//! - [`XmlElement`]: an owned element tree, used for metadata payloads
//! - [`XmlSink`]: an incremental writer that streams the document

pub mod element;
pub mod error;
pub mod namespace;
pub mod sink;

pub use element::{XmlElement, XmlNode};
pub use error::{XmlError, XmlResult};
pub use namespace::Namespace;
pub use sink::XmlSink;
