//! Foundation types for building METS packages.
//!
//! This crate provides the controlled vocabularies, timestamp and identifier
//! primitives shared by every other `mets-*` crate.
//!
//! # Key Types
//!
//! - [`MetadataType`] / [`MetadataFormat`]: classification of metadata
//! - [`OtherOr`]: a vocabulary value or a free-text `OTHER` replacement
//! - [`Created`]: precise or approximate creation time
//! - [`TypeError`]: validation failures naming the offending value

pub mod created;
pub mod error;
pub mod identifier;
pub mod vocabulary;

pub use created::{format_timestamp, Created};
pub use error::{TypeError, TypeResult};
pub use identifier::{
    is_printable_us_ascii, require_non_empty, require_pair, underscore_uuid, uuid,
    validate_printable_ascii,
};
pub use vocabulary::{
    AgentRole, AgentType, Charset, ChecksumAlgorithm, DigitalProvenanceAgentType, EventOutcome,
    MetadataFormat, MetadataType, MetsProfile, OtherOr, PremisObjectType, RecordStatus,
    Vocabulary,
};

/// Not applicable, makes no sense.
pub const UNAP: &str = "(:unap)";

/// Value unavailable, possibly unknown.
pub const UNAV: &str = "(:unav)";
