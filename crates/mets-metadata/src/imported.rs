//! Metadata imported from caller-supplied XML.

use std::path::{Path, PathBuf};

use mets_types::{MetadataFormat, MetadataType, OtherOr};
use mets_xml::XmlElement;
use tracing::debug;

use crate::error::{MetadataError, MetadataResult};
use crate::metadata::{IntoMetadata, Metadata, MetadataHeader, MetadataOptions, Payload};

/// Where imported XML comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportSource {
    Path(PathBuf),
    Inline(String),
}

impl ImportSource {
    /// Pick the source from a path and a string, exactly one of which must
    /// be given.
    pub fn from_options(
        data_path: Option<&Path>,
        data_string: Option<&str>,
    ) -> MetadataResult<Self> {
        match (data_path, data_string) {
            (Some(path), None) => Ok(Self::Path(path.to_path_buf())),
            (None, Some(data)) => Ok(Self::Inline(data.to_string())),
            (None, None) => Err(MetadataError::MissingImportSource),
            (Some(_), Some(_)) => Err(MetadataError::AmbiguousImportSource),
        }
    }
}

/// Caller-supplied metadata, embedded verbatim.
///
/// Type and format are free; this is the usual carrier for descriptive
/// metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportedMetadata {
    pub metadata_type: MetadataType,
    pub metadata_format: Option<MetadataFormat>,
    /// Overrides `metadata_format` with `OTHER`.
    pub other_format: Option<String>,
    pub format_version: String,
    pub source: ImportSource,
}

impl ImportedMetadata {
    pub fn new(
        metadata_type: MetadataType,
        metadata_format: MetadataFormat,
        format_version: impl Into<String>,
        source: ImportSource,
    ) -> Self {
        Self {
            metadata_type,
            metadata_format: Some(metadata_format),
            other_format: None,
            format_version: format_version.into(),
            source,
        }
    }
}

/// Parsed content of imported metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportedXml {
    /// Resolved path of the source file, if read from disk.
    pub data_path: Option<PathBuf>,
    pub root: XmlElement,
}

impl ImportedXml {
    pub(crate) fn render(&self) -> XmlElement {
        self.root.clone()
    }
}

impl IntoMetadata for ImportedMetadata {
    fn into_metadata_with(self, options: MetadataOptions) -> MetadataResult<Metadata> {
        let format = OtherOr::resolve(self.metadata_format, self.other_format.as_deref())?;

        let content = match self.source {
            ImportSource::Path(path) => {
                let resolved = path.canonicalize().unwrap_or_else(|_| path.clone());
                if !resolved.is_file() {
                    return Err(MetadataError::NotAFile { path: resolved });
                }
                let data = std::fs::read(&resolved)?;
                debug!(path = %resolved.display(), bytes = data.len(), "imported metadata file");
                ImportedXml {
                    root: XmlElement::parse(&data)?,
                    data_path: Some(resolved),
                }
            }
            ImportSource::Inline(data) => ImportedXml {
                data_path: None,
                root: XmlElement::parse(data.as_bytes())?,
            },
        };

        let header = MetadataHeader::new(self.metadata_type, format, self.format_version, options);
        Ok(Metadata::from_parts(header, Payload::Imported(content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SerializerState;
    use std::io::Write;

    const DC: &str = concat!(
        r#"<dc:dc xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
        "<dc:title>Example</dc:title></dc:dc>"
    );

    fn descriptive(source: ImportSource) -> MetadataResult<Metadata> {
        ImportedMetadata::new(MetadataType::Descriptive, MetadataFormat::Dc, "2008", source)
            .into_metadata()
    }

    #[test]
    fn source_requires_exactly_one_option() {
        assert!(matches!(
            ImportSource::from_options(None, None),
            Err(MetadataError::MissingImportSource)
        ));
        assert!(matches!(
            ImportSource::from_options(Some(Path::new("a.xml")), Some(DC)),
            Err(MetadataError::AmbiguousImportSource)
        ));
        assert_eq!(
            ImportSource::from_options(None, Some(DC)).unwrap(),
            ImportSource::Inline(DC.to_string())
        );
    }

    #[test]
    fn imports_inline_xml() {
        let md = descriptive(ImportSource::Inline(DC.into())).unwrap();
        assert!(md.is_descriptive());
        assert_eq!(md.format().as_str(), "DC");

        let el = md.render(&mut SerializerState::new());
        assert_eq!(el.name(), "dc:dc");
        assert_eq!(el.find("dc:title").unwrap().text(), "Example");
    }

    #[test]
    fn mixed_content_is_embedded_unchanged() {
        let xml = concat!(
            r#"<dc:dc xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
            "<dc:description> Hello <b>big</b> world </dc:description></dc:dc>"
        );
        let md = descriptive(ImportSource::Inline(xml.into())).unwrap();
        let rendered = md.render(&mut SerializerState::new()).to_xml_string().unwrap();
        assert_eq!(rendered, xml);
    }

    #[test]
    fn indented_file_keeps_text_but_not_indentation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "<dc:dc xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n  \
             <dc:title>  Spaced title </dc:title>\n</dc:dc>\n"
        )
        .unwrap();

        let md = descriptive(ImportSource::Path(file.path().to_path_buf())).unwrap();
        let el = md.render(&mut SerializerState::new());
        assert_eq!(el.children().len(), 1);
        assert_eq!(el.find("dc:title").unwrap().text(), "  Spaced title ");
    }

    #[test]
    fn imports_xml_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DC.as_bytes()).unwrap();

        let md = descriptive(ImportSource::Path(file.path().to_path_buf())).unwrap();
        match md.payload() {
            Payload::Imported(xml) => assert!(xml.data_path.is_some()),
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(
            md,
            descriptive(ImportSource::Path(file.path().to_path_buf())).unwrap()
        );
    }

    #[test]
    fn directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = descriptive(ImportSource::Path(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, MetadataError::NotAFile { .. }));
        assert!(err.to_string().contains("is not a file"));
    }

    #[test]
    fn missing_file_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.xml");
        assert!(matches!(
            descriptive(ImportSource::Path(missing)),
            Err(MetadataError::NotAFile { .. })
        ));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(matches!(
            descriptive(ImportSource::Inline("<open>".into())),
            Err(MetadataError::Xml(_))
        ));
    }

    #[test]
    fn other_format_overrides() {
        let mut imported = ImportedMetadata::new(
            MetadataType::Descriptive,
            MetadataFormat::Dc,
            "1.0",
            ImportSource::Inline(DC.into()),
        );
        imported.other_format = Some("LOCAL".into());
        let md = imported.into_metadata().unwrap();
        assert_eq!(md.format().as_str(), "OTHER");
        assert_eq!(md.format().other_value(), Some("LOCAL"));
    }

    #[test]
    fn other_format_placeholder_needs_text() {
        let imported = ImportedMetadata::new(
            MetadataType::Descriptive,
            MetadataFormat::Other,
            "1.0",
            ImportSource::Inline(DC.into()),
        );
        assert!(matches!(imported.into_metadata(), Err(MetadataError::Type(_))));
    }
}
