//! Error types for value validation.

use thiserror::Error;

/// Errors produced while validating METS values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A string could not be parsed into a controlled vocabulary.
    #[error("'{value}' is not a valid {kind}")]
    InvalidValue {
        /// The vocabulary that was expected.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A required value was empty.
    #[error("empty value not allowed for '{field}'")]
    EmptyValue { field: &'static str },

    #[error("{field} '{value}' contains characters that are not printable US-ASCII characters")]
    NotPrintableAscii {
        /// The field being validated.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// One half of a mutually dependent pair was given without the other.
    #[error("'{given}' is given but '{missing}' is not")]
    MissingPair {
        /// The field that was set.
        given: &'static str,
        /// Its counterpart, which was not.
        missing: &'static str,
    },

    #[error("'{field}' is 'OTHER' but 'other_{field}' is not given")]
    OtherWithoutValue { field: &'static str },

    #[error("either '{field}' or 'other_{field}' has to be set")]
    Unresolved { field: &'static str },
}

/// Result alias for type validation.
pub type TypeResult<T> = Result<T, TypeError>;
