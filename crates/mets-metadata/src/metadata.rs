//! The metadata record handle.
//!
//! Every record, whatever its payload, is a [`Metadata`]: a shared,
//! immutable value compared by content. Two records built from equal
//! fields are the same record in every set and map.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use mets_types::{Created, MetadataFormat, MetadataType, OtherOr};
use mets_xml::XmlElement;

use crate::agent::DigitalProvenanceAgent;
use crate::audio::TechnicalAudioMetadata;
use crate::csv::TechnicalCsvMetadata;
use crate::error::MetadataResult;
use crate::event::DigitalProvenanceEvent;
use crate::image::TechnicalImageMetadata;
use crate::imported::ImportedXml;
use crate::object::TechnicalObjectMetadata;
use crate::state::SerializerState;
use crate::video::TechnicalVideoMetadata;

/// Caller-controlled settings shared by every metadata kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataOptions {
    /// METS `ID` of the record. Generated during serialization when unset.
    pub identifier: Option<String>,
    /// Creation time of the record. The serialization time is used when unset.
    pub created: Option<Created>,
}

impl MetadataOptions {
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_created(mut self, created: impl Into<Created>) -> Self {
        self.created = Some(created.into());
        self
    }
}

/// Attributes every metadata record carries in its METS wrapper.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetadataHeader {
    pub metadata_type: MetadataType,
    pub format: OtherOr<MetadataFormat>,
    pub format_version: String,
    pub identifier: Option<String>,
    pub created: Option<Created>,
}

impl MetadataHeader {
    pub(crate) fn new(
        metadata_type: MetadataType,
        format: OtherOr<MetadataFormat>,
        format_version: impl Into<String>,
        options: MetadataOptions,
    ) -> Self {
        Self {
            metadata_type,
            format,
            format_version: format_version.into(),
            identifier: options.identifier,
            created: options.created,
        }
    }
}

/// The kind-specific content of a metadata record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Payload {
    Object(TechnicalObjectMetadata),
    Image(TechnicalImageMetadata),
    Audio(TechnicalAudioMetadata),
    Video(TechnicalVideoMetadata),
    Csv(TechnicalCsvMetadata),
    Event(DigitalProvenanceEvent),
    Agent(DigitalProvenanceAgent),
    Imported(ImportedXml),
}

impl Payload {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Object(_) => "technical object",
            Payload::Image(_) => "technical image",
            Payload::Audio(_) => "technical audio",
            Payload::Video(_) => "technical video",
            Payload::Csv(_) => "technical CSV",
            Payload::Event(_) => "digital provenance event",
            Payload::Agent(_) => "digital provenance agent",
            Payload::Imported(_) => "imported",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct MetadataRecord {
    header: MetadataHeader,
    payload: Payload,
}

/// An immutable, cheaply clonable metadata record.
///
/// Equality, ordering and hashing are by full value: two records built from
/// identical fields are the same record, whichever handle they came from.
/// Records cannot be mutated once built, so a record placed in a set keeps
/// its position there.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Metadata(Rc<MetadataRecord>);

impl Metadata {
    pub(crate) fn from_parts(header: MetadataHeader, payload: Payload) -> Self {
        Self(Rc::new(MetadataRecord { header, payload }))
    }

    pub fn header(&self) -> &MetadataHeader {
        &self.0.header
    }

    pub fn payload(&self) -> &Payload {
        &self.0.payload
    }

    pub fn metadata_type(&self) -> MetadataType {
        self.0.header.metadata_type
    }

    pub fn format(&self) -> &OtherOr<MetadataFormat> {
        &self.0.header.format
    }

    pub fn format_version(&self) -> &str {
        &self.0.header.format_version
    }

    /// The caller-assigned identifier, if any.
    pub fn identifier(&self) -> Option<&str> {
        self.0.header.identifier.as_deref()
    }

    pub fn created(&self) -> Option<&Created> {
        self.0.header.created.as_ref()
    }

    pub fn is_descriptive(&self) -> bool {
        self.metadata_type().is_descriptive()
    }

    pub fn is_administrative(&self) -> bool {
        self.metadata_type().is_administrative()
    }

    /// Metadata this record refers to: linked agents and objects of an
    /// event. Empty for every other kind.
    pub fn linked_metadata(&self) -> BTreeSet<Metadata> {
        match self.payload() {
            Payload::Event(event) => event.linked_metadata(),
            _ => BTreeSet::new(),
        }
    }

    pub fn as_event(&self) -> Option<&DigitalProvenanceEvent> {
        match self.payload() {
            Payload::Event(event) => Some(event),
            _ => None,
        }
    }

    pub fn as_agent(&self) -> Option<&DigitalProvenanceAgent> {
        match self.payload() {
            Payload::Agent(agent) => Some(agent),
            _ => None,
        }
    }

    pub fn as_technical_object(&self) -> Option<&TechnicalObjectMetadata> {
        match self.payload() {
            Payload::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Render the format-specific payload.
    ///
    /// Generated identifiers and timestamps are drawn from `state`, so equal
    /// records rendered against the same state produce identical output.
    pub fn render(&self, state: &mut SerializerState) -> XmlElement {
        match self.payload() {
            Payload::Object(object) => object.render(self, state),
            Payload::Image(image) => image.render(),
            Payload::Audio(audio) => audio.render(),
            Payload::Video(video) => video.render(),
            Payload::Csv(csv) => csv.render(),
            Payload::Event(event) => event.render(self, state),
            Payload::Agent(agent) => agent.render(self, state),
            Payload::Imported(imported) => imported.render(),
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("kind", &self.payload().kind_name())
            .field("type", &self.metadata_type())
            .field("identifier", &self.identifier())
            .finish_non_exhaustive()
    }
}

/// Validate a metadata description and freeze it into a [`Metadata`].
pub trait IntoMetadata: Sized {
    fn into_metadata_with(self, options: MetadataOptions) -> MetadataResult<Metadata>;

    fn into_metadata(self) -> MetadataResult<Metadata> {
        self.into_metadata_with(MetadataOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::DigitalProvenanceAgent;
    use mets_types::{DigitalProvenanceAgentType, EventOutcome};
    use proptest::prelude::*;

    fn agent(name: &str) -> Metadata {
        DigitalProvenanceAgent::new(name, DigitalProvenanceAgentType::Software)
            .into_metadata()
            .unwrap()
    }

    #[test]
    fn equal_fields_give_equal_metadata() {
        let a = agent("tool");
        let b = agent("tool");
        assert_eq!(a, b);

        let set: BTreeSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn differing_field_gives_distinct_metadata() {
        assert_ne!(agent("tool"), agent("other tool"));
    }

    #[test]
    fn identifier_is_part_of_the_value() {
        let plain = agent("tool");
        let named = DigitalProvenanceAgent::new("tool", DigitalProvenanceAgentType::Software)
            .into_metadata_with(MetadataOptions::default().with_identifier("agent-1"))
            .unwrap();
        assert_ne!(plain, named);
        assert_eq!(named.identifier(), Some("agent-1"));
    }

    #[test]
    fn classification() {
        let md = agent("tool");
        assert_eq!(md.metadata_type(), MetadataType::DigitalProvenance);
        assert!(md.is_administrative());
        assert!(!md.is_descriptive());
        assert_eq!(md.format().as_str(), "PREMIS:AGENT");
        assert_eq!(md.format_version(), "2.3");
    }

    #[test]
    fn only_events_have_linked_metadata() {
        let tool = agent("tool");
        assert!(tool.linked_metadata().is_empty());

        let mut event =
            DigitalProvenanceEvent::new("creation", "detail", EventOutcome::Success, "ok");
        event.link_agent_metadata(&tool, "executing program").unwrap();
        let event = event.into_metadata().unwrap();

        assert_eq!(event.linked_metadata(), BTreeSet::from([tool]));
    }

    #[test]
    fn debug_output_names_kind() {
        let debug = format!("{:?}", agent("tool"));
        assert!(debug.contains("digital provenance agent"));
    }

    proptest! {
        #[test]
        fn hashing_follows_value(
            name in "[a-z]{1,12}",
            note in proptest::option::of("[a-z ]{0,20}"),
        ) {
            use std::collections::HashSet;

            let build = || {
                let mut agent =
                    DigitalProvenanceAgent::new(name.clone(), DigitalProvenanceAgentType::Person);
                agent.agent_note = note.clone();
                agent.into_metadata().unwrap()
            };
            let set: HashSet<Metadata> = [build(), build()].into_iter().collect();
            prop_assert_eq!(set.len(), 1);
        }
    }
}
