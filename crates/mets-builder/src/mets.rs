//! The METS document aggregate.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use mets_metadata::Metadata;
use mets_structure::{DigitalObject, FileReferences, StructuralMap};
use mets_types::{
    require_non_empty, uuid, validate_printable_ascii, AgentRole, AgentType, MetsProfile,
    OtherOr, RecordStatus,
};
use tracing::debug;

use crate::agent::MetsAgent;
use crate::config::SerializerConfig;
use crate::error::{MetsError, MetsResult};
use crate::serialize;

/// Schema catalog version written to `fi:CATALOG` by default.
pub const METS_CATALOG: &str = "1.7.4";

/// Packaging specification version written to `fi:SPECIFICATION` by default.
pub const METS_SPECIFICATION: &str = "1.7.4";

/// Optional attributes of a [`Mets`] document.
#[derive(Clone, Debug)]
pub struct MetsOptions {
    /// `OBJID`. A random UUID is used when unset.
    pub package_id: Option<String>,
    pub creator_type: Option<AgentType>,
    /// Overrides `creator_type` with `OTHER`.
    pub creator_other_type: Option<String>,
    pub content_id: Option<String>,
    pub label: Option<String>,
    /// Defaults to the moment the document is created.
    pub create_date: Option<DateTime<Utc>>,
    pub last_mod_date: Option<DateTime<Utc>>,
    pub record_status: Option<RecordStatus>,
    pub catalog_version: Option<String>,
    pub specification: Option<String>,
}

impl Default for MetsOptions {
    fn default() -> Self {
        Self {
            package_id: None,
            creator_type: Some(AgentType::Organization),
            creator_other_type: None,
            content_id: None,
            label: None,
            create_date: None,
            last_mod_date: None,
            record_status: None,
            catalog_version: Some(METS_CATALOG.to_string()),
            specification: Some(METS_SPECIFICATION.to_string()),
        }
    }
}

impl MetsOptions {
    pub fn with_package_id(mut self, package_id: impl Into<String>) -> Self {
        self.package_id = Some(package_id.into());
        self
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_record_status(mut self, record_status: RecordStatus) -> Self {
        self.record_status = Some(record_status);
        self
    }

    pub fn with_create_date(mut self, create_date: DateTime<Utc>) -> Self {
        self.create_date = Some(create_date);
        self
    }

    pub fn with_last_mod_date(mut self, last_mod_date: DateTime<Utc>) -> Self {
        self.last_mod_date = Some(last_mod_date);
        self
    }
}

/// A METS document under construction.
///
/// Holds the header attributes, the agents of the header, any number of
/// structural maps and at most one set of file references. Metadata and
/// digital objects are reached through the structural maps and file
/// references; nothing is stored twice.
#[derive(Clone, Debug)]
pub struct Mets {
    profile: MetsProfile,
    package_id: String,
    contract_id: String,
    content_id: Option<String>,
    label: Option<String>,
    create_date: DateTime<Utc>,
    last_mod_date: Option<DateTime<Utc>>,
    record_status: Option<RecordStatus>,
    catalog_version: Option<String>,
    specification: Option<String>,
    agents: Vec<MetsAgent>,
    structural_maps: Vec<StructuralMap>,
    file_references: Option<FileReferences>,
}

impl Mets {
    /// Start a document for `contract_id`, created by `creator_name`.
    ///
    /// The creator becomes the first agent of the header with role
    /// `CREATOR`.
    pub fn new(
        profile: MetsProfile,
        contract_id: impl Into<String>,
        creator_name: impl Into<String>,
        options: MetsOptions,
    ) -> MetsResult<Self> {
        if options.catalog_version.is_none() && options.specification.is_none() {
            return Err(MetsError::MissingVersion);
        }

        let contract_id = contract_id.into();
        require_non_empty("contract_id", &contract_id)?;
        validate_printable_ascii("contract_id", &contract_id)?;

        let package_id = options.package_id.unwrap_or_else(uuid);
        require_non_empty("package_id", &package_id)?;
        validate_printable_ascii("package_id", &package_id)?;

        if let Some(content_id) = &options.content_id {
            validate_printable_ascii("content_id", content_id)?;
        }

        let creator = MetsAgent::new(
            creator_name,
            OtherOr::Known(AgentRole::Creator),
            OtherOr::resolve(options.creator_type, options.creator_other_type.as_deref())?,
        )?;

        debug!(package_id = %package_id, contract_id = %contract_id, "created METS document");
        Ok(Self {
            profile,
            package_id,
            contract_id,
            content_id: options.content_id,
            label: options.label,
            create_date: options.create_date.unwrap_or_else(Utc::now),
            last_mod_date: options.last_mod_date,
            record_status: options.record_status,
            catalog_version: options.catalog_version,
            specification: options.specification,
            agents: vec![creator],
            structural_maps: Vec::new(),
            file_references: None,
        })
    }

    // -----------------------------------------------------------------------
    // Header
    // -----------------------------------------------------------------------

    pub fn profile(&self) -> MetsProfile {
        self.profile
    }

    pub fn package_id(&self) -> &str {
        &self.package_id
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn create_date(&self) -> DateTime<Utc> {
        self.create_date
    }

    pub fn last_mod_date(&self) -> Option<DateTime<Utc>> {
        self.last_mod_date
    }

    pub fn record_status(&self) -> Option<RecordStatus> {
        self.record_status
    }

    pub fn catalog_version(&self) -> Option<&str> {
        self.catalog_version.as_deref()
    }

    pub fn specification(&self) -> Option<&str> {
        self.specification.as_deref()
    }

    /// Header agents in insertion order, the creator first.
    pub fn agents(&self) -> &[MetsAgent] {
        &self.agents
    }

    pub fn add_agent(&mut self, agent: MetsAgent) {
        debug!(name = %agent.name, role = agent.role.as_str(), "added METS agent");
        self.agents.push(agent);
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    pub fn structural_maps(&self) -> &[StructuralMap] {
        &self.structural_maps
    }

    /// Mutable access, for example to bundle metadata before writing.
    pub fn structural_maps_mut(&mut self) -> &mut [StructuralMap] {
        &mut self.structural_maps
    }

    pub fn add_structural_map(&mut self, map: StructuralMap) {
        debug!(divs = map.tree().len(), "added structural map");
        self.structural_maps.push(map);
    }

    pub fn file_references(&self) -> Option<&FileReferences> {
        self.file_references.as_ref()
    }

    /// Set the file references, replacing any earlier ones.
    pub fn add_file_references(&mut self, file_references: FileReferences) {
        self.file_references = Some(file_references);
    }

    /// Reference every digital object of the structural maps in a single
    /// file group.
    pub fn generate_file_references(&mut self) -> MetsResult<()> {
        let objects = self.digital_objects()?;
        let references = FileReferences::generate_file_references(objects)?;
        self.add_file_references(references);
        Ok(())
    }

    /// Every digital object placed in any structural map.
    pub fn digital_objects(&self) -> MetsResult<BTreeSet<DigitalObject>> {
        let mut objects = BTreeSet::new();
        for map in &self.structural_maps {
            objects.extend(map.digital_objects()?);
        }
        Ok(objects)
    }

    /// Every metadata record reachable from the document, each once.
    ///
    /// Covers division metadata and the metadata of digital objects (and
    /// their streams) in the structural maps and the file references.
    pub fn metadata(&self) -> MetsResult<BTreeSet<Metadata>> {
        let mut metadata = BTreeSet::new();
        for map in &self.structural_maps {
            metadata.extend(map.metadata()?);
        }
        if let Some(references) = &self.file_references {
            for object in references.digital_objects() {
                metadata.extend(object.all_metadata());
            }
        }
        Ok(metadata)
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Serialize with the default configuration.
    pub fn serialize(&self) -> MetsResult<Vec<u8>> {
        serialize::to_xml_bytes(self, &SerializerConfig::default())
    }

    pub fn serialize_with(&self, config: &SerializerConfig) -> MetsResult<Vec<u8>> {
        serialize::to_xml_bytes(self, config)
    }

    /// Write the document to `path`.
    ///
    /// A failed write leaves a truncated file behind; do not use it.
    pub fn write(&self, path: impl AsRef<Path>) -> MetsResult<()> {
        serialize::write_to_path(self, path.as_ref(), &SerializerConfig::default())
    }

    pub fn write_with(&self, path: impl AsRef<Path>, config: &SerializerConfig) -> MetsResult<()> {
        serialize::write_to_path(self, path.as_ref(), config)
    }
}
