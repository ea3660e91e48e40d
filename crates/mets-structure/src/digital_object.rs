//! Files of a package and the streams embedded in them.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path};
use std::rc::Rc;

use mets_metadata::Metadata;
use mets_types::underscore_uuid;
use tracing::debug;

use crate::error::{StructureError, StructureResult};

/// Expand `items` with everything they link to, transitively.
///
/// Adding an event therefore also adds its agents and affected objects.
pub(crate) fn with_linked(items: impl IntoIterator<Item = Metadata>) -> BTreeSet<Metadata> {
    let mut expanded = BTreeSet::new();
    let mut pending: Vec<Metadata> = items.into_iter().collect();
    while let Some(item) = pending.pop() {
        if expanded.contains(&item) {
            continue;
        }
        pending.extend(item.linked_metadata());
        expanded.insert(item);
    }
    expanded
}

/// Validate administrative metadata for a file or stream and expand links.
fn administrative_closure(
    items: impl IntoIterator<Item = Metadata>,
) -> StructureResult<BTreeSet<Metadata>> {
    let expanded = with_linked(items);
    if expanded.iter().any(Metadata::is_descriptive) {
        return Err(StructureError::DescriptiveMetadata);
    }
    Ok(expanded)
}

/// Lexically normalise a package-relative path to `/`-separated form.
///
/// Rejects absolute paths and paths that leave the package root.
pub fn normalize_package_path(path: &Path) -> StructureResult<String> {
    let invalid = |reason| StructureError::InvalidPath {
        path: path.display().to_string(),
        reason,
    };

    let mut segments: Vec<&str> = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                return Err(invalid("is not a relative path"));
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if segments.pop().is_none() {
                    return Err(invalid("points outside the package root directory"));
                }
            }
            Component::Normal(segment) => {
                let Some(segment) = segment.to_str() else {
                    return Err(invalid("is not valid UTF-8"));
                };
                segments.push(segment);
            }
        }
    }

    if segments.is_empty() {
        return Err(invalid("does not name a file inside the package root directory"));
    }
    Ok(segments.join("/"))
}

// ---------------------------------------------------------------------------
// DigitalObjectStream
// ---------------------------------------------------------------------------

/// A stream embedded in a file, such as the audio track of a video
/// container. Streams only carry administrative metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DigitalObjectStream {
    metadata: BTreeSet<Metadata>,
}

impl DigitalObjectStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add administrative metadata to the stream.
    ///
    /// Nothing is added if any item is descriptive.
    pub fn add_metadata(
        &mut self,
        items: impl IntoIterator<Item = Metadata>,
    ) -> StructureResult<()> {
        let expanded = administrative_closure(items)?;
        self.metadata.extend(expanded);
        Ok(())
    }

    pub fn metadata(&self) -> &BTreeSet<Metadata> {
        &self.metadata
    }
}

// ---------------------------------------------------------------------------
// DigitalObject
// ---------------------------------------------------------------------------

/// Construction options for a [`DigitalObject`].
#[derive(Clone, Debug, Default)]
pub struct DigitalObjectOptions {
    /// METS `ID` of the file. A random XML-safe id is generated when unset.
    pub identifier: Option<String>,
    /// `USE` of the file, for example `fi-preservation-no-file-format-validation`.
    pub use_label: Option<String>,
    /// Initial administrative metadata, added as by [`DigitalObject::add_metadata`].
    pub metadata: Vec<Metadata>,
    /// Initial streams, in order.
    pub streams: Vec<DigitalObjectStream>,
}

impl DigitalObjectOptions {
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_use(mut self, use_label: impl Into<String>) -> Self {
        self.use_label = Some(use_label.into());
        self
    }

    pub fn with_metadata(mut self, items: impl IntoIterator<Item = Metadata>) -> Self {
        self.metadata.extend(items);
        self
    }

    pub fn with_streams(mut self, streams: impl IntoIterator<Item = DigitalObjectStream>) -> Self {
        self.streams.extend(streams);
        self
    }
}

struct DigitalObjectInner {
    path: String,
    identifier: String,
    use_label: Option<String>,
    metadata: RefCell<BTreeSet<Metadata>>,
    streams: RefCell<Vec<DigitalObjectStream>>,
}

/// A file in the package.
///
/// `DigitalObject` is a shared handle: clones refer to the same file, and
/// metadata added through one clone is visible through all of them. Two
/// handles are equal only when they refer to the same file. Ordering is by
/// path, which keeps serialized output stable.
#[derive(Clone)]
pub struct DigitalObject(Rc<DigitalObjectInner>);

impl DigitalObject {
    /// A file at `path`, relative to the package root.
    pub fn new(path: impl AsRef<Path>) -> StructureResult<Self> {
        Self::with_options(path, DigitalObjectOptions::default())
    }

    pub fn with_options(
        path: impl AsRef<Path>,
        options: DigitalObjectOptions,
    ) -> StructureResult<Self> {
        let path = normalize_package_path(path.as_ref())?;
        let metadata = administrative_closure(options.metadata)?;
        let identifier = options.identifier.unwrap_or_else(underscore_uuid);
        debug!(
            path = %path,
            identifier = %identifier,
            metadata = metadata.len(),
            streams = options.streams.len(),
            "created digital object"
        );
        Ok(Self(Rc::new(DigitalObjectInner {
            path,
            identifier,
            use_label: options.use_label,
            metadata: RefCell::new(metadata),
            streams: RefCell::new(options.streams),
        })))
    }

    /// Normalised `/`-separated path relative to the package root.
    pub fn path(&self) -> &str {
        &self.0.path
    }

    pub fn identifier(&self) -> &str {
        &self.0.identifier
    }

    pub fn use_label(&self) -> Option<&str> {
        self.0.use_label.as_deref()
    }

    /// Add administrative metadata to this file.
    ///
    /// Descriptive metadata is rejected; it belongs on a structural map
    /// division. Metadata linked from the added items (the agents of an
    /// event, for instance) is added as well. Nothing is added on error.
    pub fn add_metadata(&self, items: impl IntoIterator<Item = Metadata>) -> StructureResult<()> {
        let expanded = administrative_closure(items)?;
        debug!(path = %self.path(), count = expanded.len(), "added metadata to digital object");
        self.0.metadata.borrow_mut().extend(expanded);
        Ok(())
    }

    /// Attach an embedded stream.
    ///
    /// The stream is stored by value: give it its metadata before attaching
    /// it. Later changes to the caller's copy are not seen by this file.
    pub fn add_stream(&self, stream: DigitalObjectStream) {
        self.0.streams.borrow_mut().push(stream);
    }

    /// Snapshot of the metadata attached to the file itself.
    pub fn metadata(&self) -> BTreeSet<Metadata> {
        self.0.metadata.borrow().clone()
    }

    pub fn streams(&self) -> Vec<DigitalObjectStream> {
        self.0.streams.borrow().clone()
    }

    /// Metadata of the file and all of its streams.
    pub fn all_metadata(&self) -> BTreeSet<Metadata> {
        let mut all = self.metadata();
        for stream in self.0.streams.borrow().iter() {
            all.extend(stream.metadata.iter().cloned());
        }
        all
    }

    pub(crate) fn remove_metadata(&self, items: &BTreeSet<Metadata>) {
        self.0.metadata.borrow_mut().retain(|md| !items.contains(md));
    }
}

impl PartialEq for DigitalObject {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DigitalObject {}

impl Hash for DigitalObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl Ord for DigitalObject {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path()
            .cmp(other.path())
            .then_with(|| self.identifier().cmp(other.identifier()))
            .then_with(|| Rc::as_ptr(&self.0).cmp(&Rc::as_ptr(&other.0)))
    }
}

impl PartialOrd for DigitalObject {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for DigitalObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalObject")
            .field("path", &self.0.path)
            .field("identifier", &self.0.identifier)
            .field("use_label", &self.0.use_label)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mets_metadata::{
        DigitalProvenanceAgent, DigitalProvenanceEvent, ImportSource, ImportedMetadata,
        IntoMetadata, TechnicalObjectMetadata,
    };
    use mets_types::{
        ChecksumAlgorithm, DigitalProvenanceAgentType, EventOutcome, MetadataFormat, MetadataType,
    };
    use proptest::prelude::*;

    fn descriptive() -> Metadata {
        ImportedMetadata::new(
            MetadataType::Descriptive,
            MetadataFormat::Dc,
            "2008",
            ImportSource::Inline("<dc><title>Cat</title></dc>".to_string()),
        )
        .into_metadata()
        .unwrap()
    }

    fn technical(checksum: &str) -> Metadata {
        TechnicalObjectMetadata::file("text/plain", "(:unap)", ChecksumAlgorithm::Md5, checksum)
            .into_metadata()
            .unwrap()
    }

    #[test]
    fn valid_paths_are_normalised() {
        let obj = DigitalObject::new("data/./pictures/../pictures/cat.jpg").unwrap();
        assert_eq!(obj.path(), "data/pictures/cat.jpg");
        assert!(obj.identifier().starts_with('_'));
        assert!(obj.use_label().is_none());
    }

    #[test]
    fn invalid_paths_are_rejected() {
        for path in ["/abs/path", "../../etc/passwd", "a/b/../../../c", "", "."] {
            let err = DigitalObject::new(path).unwrap_err();
            assert!(
                matches!(err, StructureError::InvalidPath { .. }),
                "{path} gave {err}"
            );
        }
        let err = DigitalObject::new("../x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "given package file path '../x' points outside the package root directory"
        );
    }

    #[test]
    fn options_are_kept() {
        let obj = DigitalObject::with_options(
            "data/a.txt",
            DigitalObjectOptions::default()
                .with_identifier("file-1")
                .with_use("original"),
        )
        .unwrap();
        assert_eq!(obj.identifier(), "file-1");
        assert_eq!(obj.use_label(), Some("original"));
    }

    #[test]
    fn metadata_and_streams_can_be_given_up_front() {
        let mut stream = DigitalObjectStream::new();
        stream.add_metadata([technical("def")]).unwrap();
        let obj = DigitalObject::with_options(
            "data/video.mkv",
            DigitalObjectOptions::default()
                .with_metadata([technical("abc")])
                .with_streams([stream.clone(), DigitalObjectStream::new()]),
        )
        .unwrap();

        assert_eq!(obj.metadata().len(), 1);
        assert_eq!(obj.streams().len(), 2);
        assert_eq!(obj.streams()[0], stream);
        assert_eq!(obj.all_metadata().len(), 2);
    }

    #[test]
    fn descriptive_metadata_is_rejected_at_construction() {
        let result = DigitalObject::with_options(
            "data/a.txt",
            DigitalObjectOptions::default().with_metadata([descriptive()]),
        );
        assert!(matches!(result, Err(StructureError::DescriptiveMetadata)));
    }

    #[test]
    fn descriptive_metadata_is_rejected() {
        let obj = DigitalObject::new("data/a.txt").unwrap();
        let err = obj
            .add_metadata([technical("abc"), descriptive()])
            .unwrap_err();
        assert!(matches!(err, StructureError::DescriptiveMetadata));
        // Nothing from the failed batch was added.
        assert!(obj.metadata().is_empty());

        let mut stream = DigitalObjectStream::new();
        assert!(stream.add_metadata([descriptive()]).is_err());
        assert!(stream.metadata().is_empty());
    }

    #[test]
    fn event_brings_its_agents_along() {
        let first = DigitalProvenanceAgent::new("tool-a", DigitalProvenanceAgentType::Software)
            .into_metadata()
            .unwrap();
        let second = DigitalProvenanceAgent::new("Jane", DigitalProvenanceAgentType::Person)
            .into_metadata()
            .unwrap();
        let mut event = DigitalProvenanceEvent::new(
            "validation",
            "File format validation",
            EventOutcome::Success,
            "File is valid",
        );
        event.link_agent_metadata(&first, "executing program").unwrap();
        event.link_agent_metadata(&second, "implementer").unwrap();
        let event = event.into_metadata().unwrap();

        let obj = DigitalObject::new("data/a.txt").unwrap();
        obj.add_metadata([event.clone()]).unwrap();

        let metadata = obj.metadata();
        assert_eq!(metadata.len(), 3);
        assert!(metadata.contains(&event));
        assert!(metadata.contains(&first));
        assert!(metadata.contains(&second));
    }

    #[test]
    fn clones_share_state_and_equality_is_identity() {
        let obj = DigitalObject::new("data/a.txt").unwrap();
        let alias = obj.clone();
        alias.add_metadata([technical("abc")]).unwrap();
        assert_eq!(obj.metadata().len(), 1);
        assert_eq!(obj, alias);

        let twin = DigitalObject::with_options(
            "data/a.txt",
            DigitalObjectOptions::default().with_identifier(obj.identifier()),
        )
        .unwrap();
        assert_ne!(obj, twin);
        let set: BTreeSet<_> = [obj.clone(), alias, twin].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn all_metadata_includes_streams() {
        let obj = DigitalObject::new("data/video.mkv").unwrap();
        obj.add_metadata([technical("abc")]).unwrap();
        let mut stream = DigitalObjectStream::new();
        stream.add_metadata([technical("def")]).unwrap();
        obj.add_stream(stream);

        assert_eq!(obj.metadata().len(), 1);
        assert_eq!(obj.streams().len(), 1);
        assert_eq!(obj.all_metadata().len(), 2);
    }

    proptest! {
        #[test]
        fn relative_paths_without_parent_steps_are_accepted(
            segments in prop::collection::vec("[a-z0-9_]{1,8}", 1..6)
        ) {
            let path = segments.join("/");
            let obj = DigitalObject::new(&path).unwrap();
            prop_assert_eq!(obj.path(), path.as_str());
        }

        #[test]
        fn climbing_above_the_root_is_rejected(
            depth in 0usize..5,
            extra in 1usize..4,
        ) {
            let mut parts: Vec<String> = (0..depth).map(|i| format!("d{i}")).collect();
            parts.extend(std::iter::repeat("..".to_string()).take(depth + extra));
            parts.push("file.txt".to_string());
            let result = DigitalObject::new(parts.join("/"));
            prop_assert!(
                matches!(result, Err(StructureError::InvalidPath { .. })),
                "path should have been rejected"
            );
        }
    }
}
