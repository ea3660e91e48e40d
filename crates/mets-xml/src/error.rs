//! Error types for XML reading and writing.

use thiserror::Error;

/// Errors raised while parsing or writing XML.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed XML: {0}")]
    Malformed(String),

    #[error("document has no root element")]
    NoRootElement,

    #[error("no open element to close")]
    NothingToClose,

    /// The document was finished while elements were still open.
    #[error("unclosed elements at end of document: {0:?}")]
    Unclosed(Vec<String>),
}

pub type XmlResult<T> = Result<T, XmlError>;
