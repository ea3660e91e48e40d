//! ADDML technical metadata describing CSV files.

use mets_types::{MetadataType, OtherOr};
use mets_xml::{Namespace, XmlElement};

use crate::error::MetadataResult;
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};

const FLAT_FILE_DEFINITION_REFERENCE: &str = "ref001";
const FLAT_FILE_TYPE_REFERENCE: &str = "rec001";

/// ADDML 8.3 technical metadata describing delimited text files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TechnicalCsvMetadata {
    /// Names of the files this description applies to.
    pub filenames: Vec<String>,
    /// Column names.
    pub header: Vec<String>,
    pub charset: String,
    pub delimiter: String,
    pub record_separator: String,
    pub quoting_character: Option<String>,
}

fn addml(local: &str) -> XmlElement {
    XmlElement::new(Namespace::ADDML.qualify(local))
}

fn named(local: &str, name: &str) -> XmlElement {
    addml(local).with_attr("name", name)
}

impl TechnicalCsvMetadata {
    pub(crate) fn render(&self) -> XmlElement {
        let field_definitions =
            addml("fieldDefinitions").with_children(self.header.iter().map(|column| {
                named("fieldDefinition", column).with_attr("typeReference", "String")
            }));
        let record_definitions = addml("recordDefinitions")
            .with_child(named("recordDefinition", "record").with_child(field_definitions));
        let flat_file_definitions = addml("flatFileDefinitions").with_child(
            named("flatFileDefinition", FLAT_FILE_DEFINITION_REFERENCE)
                .with_attr("typeReference", FLAT_FILE_TYPE_REFERENCE)
                .with_child(record_definitions),
        );

        let mut delim_format = addml("delimFileFormat")
            .with_child(XmlElement::text_element(
                Namespace::ADDML.qualify("recordSeparator"),
                self.record_separator.as_str(),
            ))
            .with_child(XmlElement::text_element(
                Namespace::ADDML.qualify("fieldSeparatingChar"),
                self.delimiter.as_str(),
            ));
        if let Some(quoting) = &self.quoting_character {
            delim_format.push_child(XmlElement::text_element(
                Namespace::ADDML.qualify("quotingChar"),
                quoting.as_str(),
            ));
        }
        let flat_file_types = addml("flatFileTypes").with_child(
            named("flatFileType", FLAT_FILE_TYPE_REFERENCE)
                .with_child(XmlElement::text_element(
                    Namespace::ADDML.qualify("charset"),
                    self.charset.as_str(),
                ))
                .with_child(delim_format),
        );
        let field_types = addml("fieldTypes").with_child(
            named("fieldType", "String").with_child(XmlElement::text_element(
                Namespace::ADDML.qualify("dataType"),
                "string",
            )),
        );
        let structure_types = addml("structureTypes")
            .with_child(flat_file_types)
            .with_child(field_types);

        let flat_files = addml("flatFiles")
            .with_children(self.filenames.iter().map(|filename| {
                named("flatFile", filename)
                    .with_attr("definitionReference", FLAT_FILE_DEFINITION_REFERENCE)
            }))
            .with_child(flat_file_definitions)
            .with_child(structure_types);

        addml("addml").with_child(addml("dataset").with_child(flat_files))
    }
}

impl IntoMetadata for TechnicalCsvMetadata {
    fn into_metadata_with(self, options: MetadataOptions) -> MetadataResult<Metadata> {
        let header = MetadataHeader::new(
            MetadataType::Technical,
            OtherOr::other("ADDML")?,
            "8.3",
            options,
        );
        Ok(Metadata::from_parts(header, Payload::Csv(self)))
    }
}
