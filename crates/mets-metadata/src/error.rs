//! Error types for metadata records.

use std::path::PathBuf;

use mets_types::TypeError;
use mets_xml::XmlError;
use thiserror::Error;

/// Errors raised while building metadata records.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("invalid imported metadata: {0}")]
    Xml(#[from] XmlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("given path '{}' is not a file", path.display())]
    NotAFile {
        /// The path as resolved on disk.
        path: PathBuf,
    },

    #[error("no data path or data string given")]
    MissingImportSource,

    #[error("both data path and data string given")]
    AmbiguousImportSource,

    /// A mandatory value was not given, or was given as `(:unav)`.
    #[error("missing metadata value for key '{field}', given value was '{value}'")]
    MissingValue {
        /// The mandatory field.
        field: &'static str,
        /// What was given instead, possibly empty.
        value: String,
    },

    #[error("byte order missing from TIFF image metadata")]
    MissingByteOrder,

    #[error("'{value}' is not a valid number for '{field}'")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },

    /// A link or relationship pointed at the wrong kind of metadata.
    #[error("expected {expected} metadata, got {found}")]
    WrongKind {
        /// The kind the link requires.
        expected: &'static str,
        /// The kind of the record that was given.
        found: &'static str,
    },
}

/// Result alias for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;
