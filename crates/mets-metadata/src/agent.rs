//! PREMIS agents for digital provenance.

use mets_types::{
    DigitalProvenanceAgentType, MetadataFormat, MetadataType, OtherOr, TypeError, Vocabulary,
};
use mets_xml::XmlElement;

use crate::error::MetadataResult;
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};
use crate::premis;
use crate::state::SerializerState;

/// A PREMIS agent: a person, organization, or piece of software or hardware
/// involved in a digital provenance event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DigitalProvenanceAgent {
    pub agent_name: String,
    pub agent_type: DigitalProvenanceAgentType,
    /// Kept only for software and hardware agents.
    pub agent_version: Option<String>,
    pub agent_note: Option<String>,
    /// Defaults to `UUID` when no identifier is given.
    pub agent_identifier_type: Option<String>,
    /// Generated during serialization when unset.
    pub agent_identifier: Option<String>,
}

impl DigitalProvenanceAgent {
    pub fn new(agent_name: impl Into<String>, agent_type: DigitalProvenanceAgentType) -> Self {
        Self {
            agent_name: agent_name.into(),
            agent_type,
            agent_version: None,
            agent_note: None,
            agent_identifier_type: None,
            agent_identifier: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.agent_version = Some(version.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.agent_note = Some(note.into());
        self
    }

    pub fn with_identifier(
        mut self,
        identifier_type: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        self.agent_identifier_type = Some(identifier_type.into());
        self.agent_identifier = Some(identifier.into());
        self
    }

    /// Name as serialized: `name-vX` when a version is present.
    pub fn serialized_name(&self) -> String {
        match &self.agent_version {
            Some(version) => format!("{}-v{}", self.agent_name, version),
            None => self.agent_name.clone(),
        }
    }

    pub(crate) fn identifier_type(&self) -> &str {
        self.agent_identifier_type.as_deref().unwrap_or("UUID")
    }

    pub(crate) fn render(&self, metadata: &Metadata, state: &mut SerializerState) -> XmlElement {
        let identifier = state.agent_identifier(metadata);
        let mut agent = premis::element("agent")
            .with_child(premis::identifier(
                "agent",
                self.identifier_type(),
                &identifier,
                None,
            ))
            .with_child(premis::text("agentName", self.serialized_name()))
            .with_child(premis::text("agentType", self.agent_type.as_str()));
        if let Some(note) = &self.agent_note {
            agent.push_child(premis::text("agentNote", note.as_str()));
        }
        agent
    }
}

impl IntoMetadata for DigitalProvenanceAgent {
    fn into_metadata_with(mut self, options: MetadataOptions) -> MetadataResult<Metadata> {
        if self.agent_identifier.is_some() && self.agent_identifier_type.is_none() {
            return Err(TypeError::MissingPair {
                given: "agent_identifier",
                missing: "agent_identifier_type",
            }
            .into());
        }
        if self.agent_identifier.is_none() {
            self.agent_identifier_type = None;
        }
        if !self.agent_type.is_versioned() {
            self.agent_version = None;
        }

        let header = MetadataHeader::new(
            MetadataType::DigitalProvenance,
            OtherOr::Known(MetadataFormat::PremisAgent),
            "2.3",
            options,
        );
        Ok(Metadata::from_parts(header, Payload::Agent(self)))
    }
}

/// Name of the software agent representing this library.
pub const METS_BUILDER_AGENT_NAME: &str = "mets-builder";

/// The agent describing this library, for events it performs itself.
pub fn mets_builder_agent() -> MetadataResult<Metadata> {
    DigitalProvenanceAgent::new(METS_BUILDER_AGENT_NAME, DigitalProvenanceAgentType::Software)
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_note("Software that builds METS packages")
        .into_metadata()
}
