//! Incremental METS document writer.
//!
//! The document is written top to bottom in the order the METS schema
//! requires: root, `metsHdr`, `dmdSec`s, `amdSec`, `fileSec` and the
//! `structMap`s. Container elements are streamed through an [`XmlSink`];
//! only single metadata sections, files and file pointers are built as
//! element trees before writing.
//!
//! Generated identifiers and the fallback creation time come from one
//! [`SerializerState`] per run, so equal metadata records share one `ID`
//! wherever they are referenced.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mets_metadata::{Metadata, SerializerState};
use mets_structure::{
    DigitalObject, DivId, DivisionTree, FileReferences, StructuralMap, StructureError,
};
use mets_types::{format_timestamp, MetadataType, Vocabulary};
use mets_xml::{Namespace, XmlElement, XmlSink};
use tracing::{debug, info};

use crate::config::SerializerConfig;
use crate::error::{MetsError, MetsResult};
use crate::mets::Mets;

/// Order of the administrative sections inside `amdSec`.
const ADMINISTRATIVE_ORDER: [MetadataType; 4] = [
    MetadataType::Technical,
    MetadataType::Rights,
    MetadataType::Source,
    MetadataType::DigitalProvenance,
];

const NO_ATTRIBUTES: [(&str, &str); 0] = [];

type Attributes = Vec<(String, String)>;

fn mets(local: &str) -> String {
    Namespace::METS.qualify(local)
}

fn fi(local: &str) -> String {
    Namespace::FI.qualify(local)
}

fn push_opt(attributes: &mut Attributes, key: impl Into<String>, value: Option<impl Into<String>>) {
    if let Some(value) = value {
        attributes.push((key.into(), value.into()));
    }
}

/// The METS element wrapping metadata of the given type.
fn section_tag(metadata_type: MetadataType) -> MetsResult<&'static str> {
    match metadata_type {
        MetadataType::Descriptive => Ok("dmdSec"),
        MetadataType::Technical => Ok("techMD"),
        MetadataType::DigitalProvenance => Ok("digiprovMD"),
        MetadataType::Rights | MetadataType::Source => Err(MetsError::Unsupported {
            kind: metadata_type.as_str(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Serialize `mets` into memory.
pub fn to_xml_bytes(mets: &Mets, config: &SerializerConfig) -> MetsResult<Vec<u8>> {
    write_document(mets, Vec::new(), config, SerializerState::new())
}

/// Serialize `mets` into a file at `path`, replacing it.
pub fn write_to_path(mets: &Mets, path: &Path, config: &SerializerConfig) -> MetsResult<()> {
    let file = File::create(path)?;
    let mut writer = write_document(mets, BufWriter::new(file), config, SerializerState::new())?;
    writer.flush()?;
    info!(path = %path.display(), "wrote METS document");
    Ok(())
}

/// Serialize `mets` into `inner` using `state` for generated values.
///
/// Every metadata record is checked for a section placement before the
/// first byte is written. Returns the writer once the root is closed.
pub fn write_document<W: Write>(
    mets: &Mets,
    inner: W,
    config: &SerializerConfig,
    state: SerializerState,
) -> MetsResult<W> {
    let metadata = mets.metadata()?;
    for record in &metadata {
        section_tag(record.metadata_type())?;
    }

    info!(
        package_id = %mets.package_id(),
        metadata = metadata.len(),
        structural_maps = mets.structural_maps().len(),
        "serializing METS document"
    );

    let mut writer = DocumentWriter {
        sink: XmlSink::new(inner, config.indent),
        state,
    };
    if config.xml_declaration {
        writer.sink.declaration()?;
    }

    writer.open_root(mets, config)?;
    writer.header(mets)?;
    writer.descriptive_sections(&metadata)?;
    writer.administrative_sections(&metadata)?;
    if let Some(references) = mets.file_references() {
        writer.file_references(references)?;
    }
    for map in mets.structural_maps() {
        writer.structural_map(map)?;
    }
    writer.sink.close()?;

    Ok(writer.sink.finish()?)
}

// ---------------------------------------------------------------------------
// DocumentWriter
// ---------------------------------------------------------------------------

struct DocumentWriter<W: Write> {
    sink: XmlSink<W>,
    state: SerializerState,
}

impl<W: Write> DocumentWriter<W> {
    /// Space-separated METS ids of `records`, or `None` when there are none.
    fn identifiers<'a>(&mut self, records: impl Iterator<Item = &'a Metadata>) -> Option<String> {
        let ids: Vec<String> = records
            .map(|record| self.state.metadata_identifier(record))
            .collect();
        (!ids.is_empty()).then(|| ids.join(" "))
    }

    fn administrative_ids(&mut self, metadata: &BTreeSet<Metadata>) -> Option<String> {
        self.identifiers(metadata.iter().filter(|md| md.is_administrative()))
    }

    fn open_root(&mut self, document: &Mets, config: &SerializerConfig) -> MetsResult<()> {
        let mut attributes: Attributes = Namespace::ALL
            .iter()
            .map(|ns| (ns.declaration(), ns.uri.to_string()))
            .collect();
        attributes.push(("PROFILE".to_string(), document.profile().as_str().to_string()));
        attributes.push(("OBJID".to_string(), document.package_id().to_string()));
        push_opt(&mut attributes, "LABEL", document.label());
        attributes.push((fi("CONTRACTID"), document.contract_id().to_string()));
        push_opt(&mut attributes, fi("CONTENTID"), document.content_id());
        push_opt(&mut attributes, fi("CATALOG"), document.catalog_version());
        push_opt(&mut attributes, fi("SPECIFICATION"), document.specification());
        attributes.push((
            Namespace::XSI.qualify("schemaLocation"),
            config.schema_location.clone(),
        ));

        self.sink.open(&mets("mets"), attributes)?;
        Ok(())
    }

    fn header(&mut self, document: &Mets) -> MetsResult<()> {
        let agents = document.agents().iter().map(|agent| {
            XmlElement::new(mets("agent"))
                .with_attr("ROLE", agent.role.as_str())
                .with_opt_attr("OTHERROLE", agent.role.other_value())
                .with_attr("TYPE", agent.agent_type.as_str())
                .with_opt_attr("OTHERTYPE", agent.agent_type.other_value())
                .with_child(XmlElement::text_element(mets("name"), agent.name.as_str()))
        });

        let header = XmlElement::new(mets("metsHdr"))
            .with_attr("CREATEDATE", format_timestamp(&document.create_date()))
            .with_opt_attr(
                "LASTMODDATE",
                document.last_mod_date().map(|date| format_timestamp(&date)),
            )
            .with_opt_attr("RECORDSTATUS", document.record_status().map(|s| s.as_str()))
            .with_children(agents);

        self.sink.element(&header)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Metadata sections
    // -----------------------------------------------------------------------

    fn metadata_section(&mut self, record: &Metadata) -> MetsResult<XmlElement> {
        let tag = section_tag(record.metadata_type())?;
        let id = self.state.metadata_identifier(record);
        let created = self.state.created(record);
        let created_key = if created.is_approximate() {
            fi("CREATED")
        } else {
            "CREATED".to_string()
        };

        let wrap = XmlElement::new(mets("mdWrap"))
            .with_attr("MDTYPE", record.format().as_str())
            .with_attr("MDTYPEVERSION", record.format_version())
            .with_opt_attr("OTHERMDTYPE", record.format().other_value())
            .with_child(
                XmlElement::new(mets("xmlData")).with_child(record.render(&mut self.state)),
            );

        Ok(XmlElement::new(mets(tag))
            .with_attr("ID", id)
            .with_attr(created_key, created.value())
            .with_child(wrap))
    }

    fn descriptive_sections(&mut self, metadata: &BTreeSet<Metadata>) -> MetsResult<()> {
        let mut count = 0;
        for record in metadata.iter().filter(|record| record.is_descriptive()) {
            let section = self.metadata_section(record)?;
            self.sink.element(&section)?;
            count += 1;
        }
        debug!(count, "wrote descriptive metadata");
        Ok(())
    }

    fn administrative_sections(&mut self, metadata: &BTreeSet<Metadata>) -> MetsResult<()> {
        self.sink.open(&mets("amdSec"), NO_ATTRIBUTES)?;
        for metadata_type in ADMINISTRATIVE_ORDER {
            let mut count = 0;
            for record in metadata
                .iter()
                .filter(|record| record.metadata_type() == metadata_type)
            {
                let section = self.metadata_section(record)?;
                self.sink.element(&section)?;
                count += 1;
            }
            if count > 0 {
                debug!(
                    count,
                    metadata_type = metadata_type.as_str(),
                    "wrote administrative metadata"
                );
            }
        }
        self.sink.close()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // File references
    // -----------------------------------------------------------------------

    fn file(&mut self, object: &DigitalObject) -> XmlElement {
        let admid = self.administrative_ids(&object.metadata());

        let location = XmlElement::new(mets("FLocat"))
            .with_attr("LOCTYPE", "URL")
            .with_attr(
                Namespace::XLINK.qualify("href"),
                format!("file://{}", object.path()),
            )
            .with_attr(Namespace::XLINK.qualify("type"), "simple");

        let mut file = XmlElement::new(mets("file"))
            .with_attr("ID", object.identifier())
            .with_opt_attr("ADMID", admid)
            .with_child(location);

        for stream in object.streams() {
            let admid = self.administrative_ids(stream.metadata());
            file.push_child(XmlElement::new(mets("stream")).with_opt_attr("ADMID", admid));
        }
        file
    }

    fn file_references(&mut self, references: &FileReferences) -> MetsResult<()> {
        self.sink.open(&mets("fileSec"), NO_ATTRIBUTES)?;
        for group in references.file_groups() {
            let mut attributes = Attributes::new();
            push_opt(&mut attributes, "USE", group.use_label());
            self.sink.open(&mets("fileGrp"), attributes)?;
            for object in group.digital_objects() {
                let file = self.file(object);
                self.sink.element(&file)?;
            }
            self.sink.close()?;
        }
        self.sink.close()?;
        debug!(
            groups = references.file_groups().len(),
            files = references.digital_objects().len(),
            "wrote file references"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Structural maps
    // -----------------------------------------------------------------------

    fn structural_map(&mut self, map: &StructuralMap) -> MetsResult<()> {
        let mut attributes = Attributes::new();
        push_opt(&mut attributes, "TYPE", map.structural_map_type());
        push_opt(&mut attributes, "LABEL", map.label());
        push_opt(&mut attributes, fi("PID"), map.pid());
        push_opt(&mut attributes, fi("PIDTYPE"), map.pid_type());

        self.sink.open(&mets("structMap"), attributes)?;
        self.div(map.tree(), map.root())?;
        self.sink.close()?;
        debug!(divs = map.tree().len(), "wrote structural map");
        Ok(())
    }

    fn div(&mut self, tree: &DivisionTree, id: DivId) -> MetsResult<()> {
        let Some(node) = tree.get(id) else {
            return Err(StructureError::DivNotFound(id).into());
        };
        let div = node.div();

        let mut attributes = vec![("TYPE".to_string(), div.div_type.clone())];
        push_opt(&mut attributes, "ORDER", div.order.map(|order| order.to_string()));
        push_opt(&mut attributes, "LABEL", div.label.as_deref());
        push_opt(&mut attributes, "ORDERLABEL", div.orderlabel.as_deref());
        let dmdid = self.identifiers(node.metadata().iter().filter(|md| md.is_descriptive()));
        push_opt(&mut attributes, "DMDID", dmdid);
        let admid = self.administrative_ids(node.metadata());
        push_opt(&mut attributes, "ADMID", admid);

        self.sink.open(&mets("div"), attributes)?;
        for object in node.digital_objects() {
            let pointer = XmlElement::new(mets("fptr")).with_attr("FILEID", object.identifier());
            self.sink.element(&pointer)?;
        }
        for &child in node.children() {
            self.div(tree, child)?;
        }
        self.sink.close()?;
        Ok(())
    }
}
