//! Metadata records for METS packages.
//!
//! A [`Metadata`] is an immutable record compared by value. Each kind is
//! described by a plain struct (for example [`TechnicalObjectMetadata`] or
//! [`DigitalProvenanceEvent`]) that is validated and frozen through
//! [`IntoMetadata`]. Records render their format-specific payload against a
//! [`SerializerState`], which hands out generated identifiers so that equal
//! records always share one.

pub mod agent;
pub mod audio;
pub mod csv;
pub mod error;
pub mod event;
pub mod image;
pub mod imported;
pub mod metadata;
pub mod object;
mod premis;
pub mod state;
pub mod video;

pub use agent::{mets_builder_agent, DigitalProvenanceAgent, METS_BUILDER_AGENT_NAME};
pub use audio::{CodecQuality, DataRateMode, TechnicalAudioMetadata};
pub use csv::TechnicalCsvMetadata;
pub use error::{MetadataError, MetadataResult};
pub use event::{DigitalProvenanceEvent, LinkedAgent, LinkedObject};
pub use image::TechnicalImageMetadata;
pub use imported::{ImportSource, ImportedMetadata, ImportedXml};
pub use metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};
pub use object::{ObjectKind, Relationship, TechnicalObjectMetadata};
pub use state::SerializerState;
pub use video::{Color, Sound, TechnicalVideoMetadata};
