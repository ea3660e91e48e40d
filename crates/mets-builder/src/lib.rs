//! METS document builder for digital preservation packages.
//!
//! A [`Mets`] collects agents, structural maps and file references for one
//! package and serializes them as a single METS XML document following the
//! Finnish national METS profile.
//!
//! ```no_run
//! use mets_builder::{Mets, MetsOptions, MetsResult};
//! use mets_builder::mets_structure::{DigitalObject, StructuralMap};
//! use mets_builder::mets_types::MetsProfile;
//!
//! fn build() -> MetsResult<()> {
//!     let mut mets = Mets::new(
//!         MetsProfile::CulturalHeritage,
//!         "contract-1",
//!         "Example Organization",
//!         MetsOptions::default(),
//!     )?;
//!     let objects = [DigitalObject::new("data/a.txt")?];
//!     mets.add_structural_map(StructuralMap::from_directory_structure(objects, [])?);
//!     mets.generate_file_references()?;
//!     mets.write("mets.xml")
//! }
//! ```
//!
//! # Key Types
//!
//! - [`Mets`]: the package aggregate and its header attributes
//! - [`MetsAgent`]: a METS header agent
//! - [`SerializerConfig`]: output formatting, loadable from TOML
//! - [`MetsError`]: every failure of building or writing a document

pub mod agent;
pub mod config;
pub mod error;
pub mod mets;
pub mod serialize;

pub use agent::MetsAgent;
pub use config::{SerializerConfig, METS_FI_SCHEMA_LOCATION};
pub use error::{MetsError, MetsResult};
pub use mets::{Mets, MetsOptions, METS_CATALOG, METS_SPECIFICATION};
pub use serialize::{to_xml_bytes, write_document, write_to_path};

pub use mets_metadata;
pub use mets_structure;
pub use mets_types;
pub use mets_xml;
