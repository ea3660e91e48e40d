//! Package structure for METS documents.
//!
//! Files are represented by [`DigitalObject`]s, arranged into one or more
//! [`StructuralMap`]s and listed in [`FileReferences`]. Divisions of a map
//! live in a [`DivisionTree`] arena and are addressed by [`DivId`].
//!
//! # Key Types
//!
//! - [`DigitalObject`]: a file of the package with its administrative metadata
//! - [`DivisionTree`] / [`StructuralMapDiv`]: the division hierarchy
//! - [`StructuralMap`]: a division tree with map-level attributes
//! - [`FileReferences`] / [`FileGroup`]: files grouped by use

pub mod digital_object;
pub mod error;
pub mod file_references;
pub mod structural_map;
pub mod tree;

pub use digital_object::{
    normalize_package_path, DigitalObject, DigitalObjectOptions, DigitalObjectStream,
};
pub use error::{StructureError, StructureResult};
pub use file_references::{FileGroup, FileReferences};
pub use structural_map::{StructuralMap, StructuralMapOptions};
pub use tree::{DivId, DivNode, DivisionTree, StructuralMapDiv};
