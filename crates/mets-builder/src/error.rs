//! Error types for building and serializing METS documents.

use mets_metadata::MetadataError;
use mets_structure::StructureError;
use mets_types::TypeError;
use mets_xml::XmlError;

/// Errors raised by the METS aggregate and its serializer.
#[derive(Debug, thiserror::Error)]
pub enum MetsError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither a catalog version nor a specification version was given.
    #[error("either catalog_version or specification has to be set")]
    MissingVersion,

    /// The document references metadata that has no section placement yet.
    #[error("serializing {kind} metadata is not supported")]
    Unsupported {
        /// The metadata type that has no section placement.
        kind: &'static str,
    },

    #[error("invalid serializer configuration: {0}")]
    Config(String),
}

/// Convenience alias for METS results.
pub type MetsResult<T> = Result<T, MetsError>;
