//! METS `fileSec`: digital objects grouped by intended use.

use std::collections::BTreeSet;

use tracing::debug;

use crate::digital_object::DigitalObject;
use crate::error::{StructureError, StructureResult};

/// A METS `fileGrp`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileGroup {
    use_label: Option<String>,
    digital_objects: BTreeSet<DigitalObject>,
}

impl FileGroup {
    /// A group without a `USE` attribute.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_use(use_label: impl Into<String>) -> Self {
        Self {
            use_label: Some(use_label.into()),
            digital_objects: BTreeSet::new(),
        }
    }

    pub fn use_label(&self) -> Option<&str> {
        self.use_label.as_deref()
    }

    pub fn add_digital_objects(&mut self, objects: impl IntoIterator<Item = DigitalObject>) {
        self.digital_objects.extend(objects);
    }

    pub fn digital_objects(&self) -> &BTreeSet<DigitalObject> {
        &self.digital_objects
    }
}

/// The file groups of a package.
///
/// Nothing ties the groups to the structural maps of the same package;
/// keeping both on the same set of objects is up to the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileReferences {
    file_groups: Vec<FileGroup>,
}

impl FileReferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file_group(&mut self, group: FileGroup) {
        debug!(
            use_label = group.use_label().unwrap_or_default(),
            files = group.digital_objects.len(),
            "added file group"
        );
        self.file_groups.push(group);
    }

    pub fn file_groups(&self) -> &[FileGroup] {
        &self.file_groups
    }

    /// Every digital object in any group.
    pub fn digital_objects(&self) -> BTreeSet<DigitalObject> {
        self.file_groups
            .iter()
            .flat_map(|group| group.digital_objects.iter().cloned())
            .collect()
    }

    /// File references with all `objects` in a single unnamed group.
    pub fn generate_file_references(
        objects: impl IntoIterator<Item = DigitalObject>,
    ) -> StructureResult<Self> {
        let mut group = FileGroup::new();
        group.add_digital_objects(objects);
        if group.digital_objects.is_empty() {
            return Err(StructureError::NoDigitalObjects {
                action: "generate file references",
            });
        }

        let mut references = Self::new();
        references.add_file_group(group);
        Ok(references)
    }
}
