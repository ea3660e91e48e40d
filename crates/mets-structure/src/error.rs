//! Error types for package structure operations.

use mets_metadata::MetadataError;
use mets_types::TypeError;

use crate::tree::DivId;

/// Errors raised while assembling digital objects, division trees and file
/// references.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// A digital object path is absolute, empty or escapes the package root.
    #[error("given package file path '{path}' {reason}")]
    InvalidPath {
        /// The path as given by the caller.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Descriptive metadata belongs on a division, never on a file.
    #[error(
        "added metadata is descriptive metadata; descriptive metadata should be \
         added to a div in a structural map"
    )]
    DescriptiveMetadata,

    /// The division is already a child of another division.
    #[error("div {0} already has a parent div")]
    AlreadyParented(DivId),

    /// The division, or one of its descendants, is already in the target tree.
    #[error("div {0} contains or is itself a div that already exists in the div tree")]
    DivConflict(DivId),

    /// A digital object would appear twice in one division tree.
    #[error("digital object '{path}' already exists in the div tree")]
    DigitalObjectConflict {
        /// Package path of the conflicting object.
        path: String,
    },

    /// A structural map was given a division that has a parent.
    #[error("div {0} is not a root div")]
    NotARoot(DivId),

    /// A division id does not belong to this tree.
    #[error("div {0} not found")]
    DivNotFound(DivId),

    /// An operation that needs at least one digital object got none.
    #[error("no digital objects given, cannot {action}")]
    NoDigitalObjects {
        /// The operation that was attempted.
        action: &'static str,
    },
}

/// Convenience alias for structure results.
pub type StructureResult<T> = Result<T, StructureError>;
