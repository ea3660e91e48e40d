//! Per-run serialization state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mets_types::{format_timestamp, underscore_uuid, uuid, Created};
use tracing::trace;

use crate::metadata::Metadata;

/// Identifier and timestamp bookkeeping for one serialization run.
///
/// Records without a caller-assigned identifier get one generated on first
/// request; later requests for an equal record return the same value. METS
/// IDs, PREMIS object, event and agent identifiers are separate spaces and
/// are tracked in separate tables.
///
/// A state must not be shared between runs.
#[derive(Debug)]
pub struct SerializerState {
    now: DateTime<Utc>,
    metadata_ids: HashMap<Metadata, String>,
    object_ids: HashMap<Metadata, String>,
    event_ids: HashMap<Metadata, String>,
    agent_ids: HashMap<Metadata, String>,
}

impl SerializerState {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// A state whose "now" is fixed to `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            metadata_ids: HashMap::new(),
            object_ids: HashMap::new(),
            event_ids: HashMap::new(),
            agent_ids: HashMap::new(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The METS `ID` of a record.
    pub fn metadata_identifier(&mut self, metadata: &Metadata) -> String {
        if let Some(identifier) = metadata.identifier() {
            return identifier.to_string();
        }
        lookup(&mut self.metadata_ids, metadata, underscore_uuid)
    }

    /// The PREMIS object identifier value of a technical object record.
    pub fn object_identifier(&mut self, metadata: &Metadata) -> String {
        if let Some(value) = metadata
            .as_technical_object()
            .and_then(|object| object.object_identifier.as_ref())
        {
            return value.clone();
        }
        lookup(&mut self.object_ids, metadata, uuid)
    }

    /// The PREMIS event identifier value of an event record.
    pub fn event_identifier(&mut self, metadata: &Metadata) -> String {
        if let Some(value) = metadata
            .as_event()
            .and_then(|event| event.event_identifier.as_ref())
        {
            return value.clone();
        }
        lookup(&mut self.event_ids, metadata, uuid)
    }

    /// The PREMIS agent identifier value of an agent record.
    pub fn agent_identifier(&mut self, metadata: &Metadata) -> String {
        if let Some(value) = metadata
            .as_agent()
            .and_then(|agent| agent.agent_identifier.as_ref())
        {
            return value.clone();
        }
        lookup(&mut self.agent_ids, metadata, uuid)
    }

    /// The creation time of a record, falling back to the run's "now".
    pub fn created(&self, metadata: &Metadata) -> Created {
        metadata
            .created()
            .cloned()
            .unwrap_or(Created::Precise(self.now))
    }

    /// The run's "now" as written in PREMIS date fields.
    pub fn now_timestamp(&self) -> String {
        format_timestamp(&self.now)
    }
}

impl Default for SerializerState {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup(
    table: &mut HashMap<Metadata, String>,
    metadata: &Metadata,
    generate: fn() -> String,
) -> String {
    table
        .entry(metadata.clone())
        .or_insert_with(|| {
            let id = generate();
            trace!(id = %id, kind = metadata.payload().kind_name(), "generated identifier");
            id
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::DigitalProvenanceAgent;
    use crate::metadata::{IntoMetadata, MetadataOptions};
    use crate::object::TechnicalObjectMetadata;
    use chrono::TimeZone;
    use mets_types::{ChecksumAlgorithm, DigitalProvenanceAgentType};

    fn agent(name: &str, options: MetadataOptions) -> Metadata {
        DigitalProvenanceAgent::new(name, DigitalProvenanceAgentType::Software)
            .into_metadata_with(options)
            .unwrap()
    }

    #[test]
    fn equal_records_share_generated_id() {
        let mut state = SerializerState::new();
        let a = agent("tool", MetadataOptions::default());
        let b = agent("tool", MetadataOptions::default());

        let id_a = state.metadata_identifier(&a);
        let id_b = state.metadata_identifier(&b);
        assert_eq!(id_a, id_b);
        assert!(id_a.starts_with('_'));
    }

    #[test]
    fn different_records_get_different_ids() {
        let mut state = SerializerState::new();
        let a = agent("tool", MetadataOptions::default());
        let c = agent("other", MetadataOptions::default());
        assert_ne!(state.metadata_identifier(&a), state.metadata_identifier(&c));
    }

    #[test]
    fn assigned_identifier_is_used_verbatim() {
        let mut state = SerializerState::new();
        let named = agent("tool", MetadataOptions::default().with_identifier("my-id"));
        assert_eq!(state.metadata_identifier(&named), "my-id");
    }

    #[test]
    fn assigned_object_identifier_is_used_verbatim() {
        let mut state = SerializerState::new();
        let mut object =
            TechnicalObjectMetadata::file("text/plain", "(:unap)", ChecksumAlgorithm::Md5, "abc");
        object.object_identifier_type = Some("local".to_string());
        object.object_identifier = Some("object-7".to_string());
        let named = object.into_metadata().unwrap();
        assert_eq!(state.object_identifier(&named), "object-7");

        let generated =
            TechnicalObjectMetadata::file("text/plain", "(:unap)", ChecksumAlgorithm::Md5, "abc")
                .into_metadata()
                .unwrap();
        let id = state.object_identifier(&generated);
        assert_ne!(id, "object-7");
        assert_eq!(state.object_identifier(&generated), id);
    }

    #[test]
    fn id_spaces_are_independent() {
        let mut state = SerializerState::new();
        let a = agent("tool", MetadataOptions::default());
        let mets_id = state.metadata_identifier(&a);
        let agent_id = state.agent_identifier(&a);
        assert_ne!(mets_id, agent_id);
        assert!(!agent_id.starts_with('_'));
        assert_eq!(state.agent_identifier(&a), agent_id);
    }

    #[test]
    fn separate_states_do_not_share_ids() {
        let a = agent("tool", MetadataOptions::default());
        let first = SerializerState::new().metadata_identifier(&a);
        let second = SerializerState::new().metadata_identifier(&a);
        assert_ne!(first, second);
    }

    #[test]
    fn missing_created_falls_back_to_now() {
        let now = Utc.with_ymd_and_hms(2023, 5, 6, 7, 8, 9).unwrap();
        let state = SerializerState::at(now);
        let a = agent("tool", MetadataOptions::default());
        assert_eq!(state.created(&a), Created::Precise(now));
        assert_eq!(state.now_timestamp(), "2023-05-06T07:08:09+00:00");

        let approx = agent(
            "tool",
            MetadataOptions::default().with_created(Created::approximate("2000~").unwrap()),
        );
        assert!(state.created(&approx).is_approximate());
    }
}
