//! PREMIS events and their links to agents and objects.
//!
//! An event is composed mutably, then frozen into a [`Metadata`] handle.
//! Linked agents travel with the event wherever it is added.

use std::collections::BTreeSet;

use mets_types::{EventOutcome, MetadataFormat, MetadataType, OtherOr, TypeError, Vocabulary};
use mets_xml::XmlElement;
use tracing::debug;

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};
use crate::premis;
use crate::state::SerializerState;

/// An agent taking part in an event, with its role.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkedAgent {
    pub agent: Metadata,
    pub role: String,
}

/// A technical object affected by an event, with its role.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkedObject {
    pub object: Metadata,
    pub role: String,
}

/// A PREMIS event: an action involving one or more digital objects.
///
/// Links are added while the event is being composed. Once frozen with
/// [`IntoMetadata`], the event and its links are immutable. Links keep their
/// order and may repeat (the same agent in two roles).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DigitalProvenanceEvent {
    pub event_type: String,
    pub detail: String,
    pub outcome: EventOutcome,
    pub outcome_detail: String,
    /// Date, time or range of the event. The serialization time is used
    /// when unset.
    pub datetime: Option<String>,
    /// Defaults to `UUID` when no identifier is given.
    pub event_identifier_type: Option<String>,
    /// Generated during serialization when unset.
    pub event_identifier: Option<String>,
    linked_agents: Vec<LinkedAgent>,
    linked_objects: Vec<LinkedObject>,
}

impl DigitalProvenanceEvent {
    pub fn new(
        event_type: impl Into<String>,
        detail: impl Into<String>,
        outcome: EventOutcome,
        outcome_detail: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            detail: detail.into(),
            outcome,
            outcome_detail: outcome_detail.into(),
            datetime: None,
            event_identifier_type: None,
            event_identifier: None,
            linked_agents: Vec::new(),
            linked_objects: Vec::new(),
        }
    }

    pub fn with_datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }

    pub fn with_identifier(
        mut self,
        identifier_type: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        self.event_identifier_type = Some(identifier_type.into());
        self.event_identifier = Some(identifier.into());
        self
    }

    /// Link an agent that took part in this event.
    pub fn link_agent_metadata(
        &mut self,
        agent: &Metadata,
        role: impl Into<String>,
    ) -> MetadataResult<()> {
        if agent.as_agent().is_none() {
            return Err(MetadataError::WrongKind {
                expected: "digital provenance agent",
                found: agent.payload().kind_name(),
            });
        }
        let role = role.into();
        debug!(event_type = %self.event_type, role = %role, "linked agent to event");
        self.linked_agents.push(LinkedAgent {
            agent: agent.clone(),
            role,
        });
        Ok(())
    }

    /// Link a technical object affected by this event.
    pub fn link_object_metadata(
        &mut self,
        object: &Metadata,
        role: impl Into<String>,
    ) -> MetadataResult<()> {
        if object.as_technical_object().is_none() {
            return Err(MetadataError::WrongKind {
                expected: "technical object",
                found: object.payload().kind_name(),
            });
        }
        self.linked_objects.push(LinkedObject {
            object: object.clone(),
            role: role.into(),
        });
        Ok(())
    }

    pub fn linked_agents(&self) -> &[LinkedAgent] {
        &self.linked_agents
    }

    pub fn linked_objects(&self) -> &[LinkedObject] {
        &self.linked_objects
    }

    /// Linked agents and objects as a set.
    pub fn linked_metadata(&self) -> BTreeSet<Metadata> {
        self.linked_agents
            .iter()
            .map(|link| link.agent.clone())
            .chain(self.linked_objects.iter().map(|link| link.object.clone()))
            .collect()
    }

    pub(crate) fn render(&self, metadata: &Metadata, state: &mut SerializerState) -> XmlElement {
        let identifier = state.event_identifier(metadata);
        let datetime = self
            .datetime
            .clone()
            .unwrap_or_else(|| state.now_timestamp());

        let mut event = premis::element("event")
            .with_child(premis::identifier(
                "event",
                self.event_identifier_type.as_deref().unwrap_or("UUID"),
                &identifier,
                None,
            ))
            .with_child(premis::text("eventType", self.event_type.as_str()))
            .with_child(premis::text("eventDateTime", datetime))
            .with_child(premis::text("eventDetail", self.detail.as_str()))
            .with_child(
                premis::element("eventOutcomeInformation")
                    .with_child(premis::text("eventOutcome", self.outcome.as_str()))
                    .with_child(premis::element("eventOutcomeDetail").with_child(premis::text(
                        "eventOutcomeDetailNote",
                        self.outcome_detail.as_str(),
                    ))),
            );

        for link in &self.linked_agents {
            let identifier_type = link
                .agent
                .as_agent()
                .map_or("UUID", |agent| agent.identifier_type())
                .to_string();
            let value = state.agent_identifier(&link.agent);
            event.push_child(premis::identifier(
                "linkingAgent",
                &identifier_type,
                &value,
                Some(link.role.as_str()),
            ));
        }

        for link in &self.linked_objects {
            let identifier_type = link
                .object
                .as_technical_object()
                .map_or("UUID", |object| object.object_identifier_type())
                .to_string();
            let value = state.object_identifier(&link.object);
            event.push_child(premis::identifier(
                "linkingObject",
                &identifier_type,
                &value,
                Some(link.role.as_str()),
            ));
        }
        event
    }
}

impl IntoMetadata for DigitalProvenanceEvent {
    fn into_metadata_with(mut self, options: MetadataOptions) -> MetadataResult<Metadata> {
        if self.event_identifier.is_some() && self.event_identifier_type.is_none() {
            return Err(TypeError::MissingPair {
                given: "event_identifier",
                missing: "event_identifier_type",
            }
            .into());
        }
        if self.event_identifier.is_none() {
            self.event_identifier_type = None;
        }

        let header = MetadataHeader::new(
            MetadataType::DigitalProvenance,
            OtherOr::Known(MetadataFormat::PremisEvent),
            "2.3",
            options,
        );
        Ok(Metadata::from_parts(header, Payload::Event(self)))
    }
}
