//! PREMIS object metadata for files and bitstreams.

use mets_types::{
    require_non_empty, require_pair, Charset, ChecksumAlgorithm, MetadataFormat, MetadataType,
    OtherOr, PremisObjectType, TypeError, Vocabulary, UNAP,
};
use mets_xml::{Namespace, XmlElement};

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};
use crate::premis;
use crate::state::SerializerState;

/// Whether the object is a stand-alone file or a bitstream inside one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    #[default]
    File,
    Bitstream,
}

impl ObjectKind {
    pub fn premis_type(&self) -> PremisObjectType {
        match self {
            ObjectKind::File => PremisObjectType::File,
            ObjectKind::Bitstream => PremisObjectType::Bitstream,
        }
    }
}

/// A relationship from one technical object to another.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Relationship {
    pub target: Metadata,
    pub relationship_type: String,
    pub relationship_subtype: String,
}

/// PREMIS object metadata for a file or a bitstream.
///
/// `file_format` and `file_format_version` are always required. A file also
/// requires a checksum and its algorithm. A `file_format_version` of
/// `(:unap)` is left out of the payload. When no object identifier is given,
/// a `UUID` identifier is generated during serialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechnicalObjectMetadata {
    pub kind: ObjectKind,
    /// Mimetype, e.g. `image/tiff`.
    pub file_format: String,
    pub file_format_version: String,
    pub checksum_algorithm: Option<ChecksumAlgorithm>,
    pub checksum: Option<String>,
    /// Actual or approximate creation time, ISO 8601.
    pub file_created_date: Option<String>,
    pub object_identifier_type: Option<String>,
    pub object_identifier: Option<String>,
    pub charset: Option<Charset>,
    pub original_name: Option<String>,
    pub format_registry_name: Option<String>,
    pub format_registry_key: Option<String>,
    pub creating_application: Option<String>,
    pub creating_application_version: Option<String>,
    pub relationships: Vec<Relationship>,
}

impl TechnicalObjectMetadata {
    pub fn file(
        file_format: impl Into<String>,
        file_format_version: impl Into<String>,
        checksum_algorithm: ChecksumAlgorithm,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            kind: ObjectKind::File,
            file_format: file_format.into(),
            file_format_version: file_format_version.into(),
            checksum_algorithm: Some(checksum_algorithm),
            checksum: Some(checksum.into()),
            ..Self::default()
        }
    }

    pub fn bitstream(
        file_format: impl Into<String>,
        file_format_version: impl Into<String>,
    ) -> Self {
        Self {
            kind: ObjectKind::Bitstream,
            file_format: file_format.into(),
            file_format_version: file_format_version.into(),
            ..Self::default()
        }
    }

    /// Relate this object to another technical object.
    pub fn add_relationship(
        &mut self,
        target: &Metadata,
        relationship_type: impl Into<String>,
        relationship_subtype: impl Into<String>,
    ) -> MetadataResult<()> {
        if target.as_technical_object().is_none() {
            return Err(MetadataError::WrongKind {
                expected: "technical object",
                found: target.payload().kind_name(),
            });
        }
        self.relationships.push(Relationship {
            target: target.clone(),
            relationship_type: relationship_type.into(),
            relationship_subtype: relationship_subtype.into(),
        });
        Ok(())
    }

    fn validate(&self) -> MetadataResult<()> {
        require_non_empty("file_format", &self.file_format)?;
        require_non_empty("file_format_version", &self.file_format_version)?;

        if self.kind == ObjectKind::File {
            if self.checksum_algorithm.is_none() {
                return Err(TypeError::EmptyValue {
                    field: "checksum_algorithm",
                }
                .into());
            }
            require_non_empty("checksum", self.checksum.as_deref().unwrap_or_default())?;
        }

        require_pair(
            ("checksum_algorithm", self.checksum_algorithm.map(|a| a.as_str())),
            ("checksum", self.checksum.as_deref()),
        )?;
        require_pair(
            ("object_identifier_type", self.object_identifier_type.as_deref()),
            ("object_identifier", self.object_identifier.as_deref()),
        )?;
        require_pair(
            ("format_registry_name", self.format_registry_name.as_deref()),
            ("format_registry_key", self.format_registry_key.as_deref()),
        )?;
        require_pair(
            ("creating_application", self.creating_application.as_deref()),
            (
                "creating_application_version",
                self.creating_application_version.as_deref(),
            ),
        )?;
        Ok(())
    }

    /// The format name as serialized; a charset is appended as
    /// `; encoding=X`.
    pub fn serialized_format_name(&self) -> String {
        match self.charset {
            Some(charset) => format!("{}; encoding={}", self.file_format, charset),
            None => self.file_format.clone(),
        }
    }

    pub(crate) fn object_identifier_type(&self) -> &str {
        self.object_identifier_type.as_deref().unwrap_or("UUID")
    }

    pub(crate) fn render(&self, metadata: &Metadata, state: &mut SerializerState) -> XmlElement {
        let object_id = premis::identifier(
            "object",
            self.object_identifier_type(),
            &state.object_identifier(metadata),
            None,
        );

        let mut characteristics = premis::element("objectCharacteristics")
            .with_child(premis::text("compositionLevel", "0"));

        if let (Some(algorithm), Some(checksum)) = (self.checksum_algorithm, &self.checksum) {
            characteristics.push_child(
                premis::element("fixity")
                    .with_child(premis::text("messageDigestAlgorithm", algorithm.as_str()))
                    .with_child(premis::text("messageDigest", checksum.as_str())),
            );
        }

        let mut designation = premis::element("formatDesignation")
            .with_child(premis::text("formatName", self.serialized_format_name()));
        if self.file_format_version != UNAP {
            designation
                .push_child(premis::text("formatVersion", self.file_format_version.as_str()));
        }
        let mut format = premis::element("format").with_child(designation);
        if let (Some(name), Some(key)) = (&self.format_registry_name, &self.format_registry_key) {
            format.push_child(
                premis::element("formatRegistry")
                    .with_child(premis::text("formatRegistryName", name.as_str()))
                    .with_child(premis::text("formatRegistryKey", key.as_str())),
            );
        }
        characteristics.push_child(format);

        let application: Vec<XmlElement> = [
            ("creatingApplicationName", &self.creating_application),
            ("creatingApplicationVersion", &self.creating_application_version),
            ("dateCreatedByApplication", &self.file_created_date),
        ]
        .into_iter()
        .filter_map(|(local, value)| value.as_ref().map(|v| premis::text(local, v.as_str())))
        .collect();
        if !application.is_empty() {
            characteristics
                .push_child(premis::element("creatingApplication").with_children(application));
        }

        let mut object = premis::element("object")
            .with_attr(
                Namespace::XSI.qualify("type"),
                Namespace::PREMIS.qualify(self.kind.premis_type().as_str()),
            )
            .with_child(object_id)
            .with_child(characteristics);

        if self.kind == ObjectKind::File {
            if let Some(name) = &self.original_name {
                object.push_child(premis::text("originalName", name.as_str()));
            }
        }

        for relationship in self.render_relationships(state) {
            object.push_child(relationship);
        }
        object
    }

    /// One `premis:relationship` per (type, subtype), in first-seen order.
    fn render_relationships(&self, state: &mut SerializerState) -> Vec<XmlElement> {
        let mut groups: Vec<(&str, &str, Vec<&Relationship>)> = Vec::new();
        for relationship in &self.relationships {
            let key = (
                relationship.relationship_type.as_str(),
                relationship.relationship_subtype.as_str(),
            );
            match groups.iter_mut().find(|(t, s, _)| (*t, *s) == key) {
                Some((_, _, members)) => members.push(relationship),
                None => groups.push((key.0, key.1, vec![relationship])),
            }
        }

        groups
            .into_iter()
            .map(|(relationship_type, subtype, members)| {
                let mut el = premis::element("relationship")
                    .with_child(premis::text("relationshipType", relationship_type))
                    .with_child(premis::text("relationshipSubType", subtype));
                for member in members {
                    let identifier_type = member
                        .target
                        .as_technical_object()
                        .map_or("UUID", |object| object.object_identifier_type())
                        .to_string();
                    let value = state.object_identifier(&member.target);
                    let identification = premis::element("relatedObjectIdentification")
                        .with_child(premis::text("relatedObjectIdentifierType", identifier_type))
                        .with_child(premis::text("relatedObjectIdentifierValue", value));
                    el.push_child(identification);
                }
                el
            })
            .collect()
    }
}

impl IntoMetadata for TechnicalObjectMetadata {
    fn into_metadata_with(self, options: MetadataOptions) -> MetadataResult<Metadata> {
        self.validate()?;
        let header = MetadataHeader::new(
            MetadataType::Technical,
            OtherOr::Known(MetadataFormat::PremisObject),
            "2.3",
            options,
        );
        Ok(Metadata::from_parts(header, Payload::Object(self)))
    }
}
