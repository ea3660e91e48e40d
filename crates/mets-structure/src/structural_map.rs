//! METS `structMap`: a division tree with map-level attributes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use mets_metadata::{mets_builder_agent, DigitalProvenanceEvent, IntoMetadata, Metadata};
use mets_types::{format_timestamp, require_pair, validate_printable_ascii, EventOutcome};
use tracing::{debug, info};

use crate::digital_object::DigitalObject;
use crate::error::{StructureError, StructureResult};
use crate::tree::{DivId, DivisionTree, StructuralMapDiv};

/// Map-level attributes of a [`StructuralMap`].
#[derive(Clone, Debug, Default)]
pub struct StructuralMapOptions {
    /// `TYPE` of the map, for example `logical` or `physical`.
    pub structural_map_type: Option<String>,
    pub label: Option<String>,
    /// Persistent identifier of the map. Requires `pid_type`.
    pub pid: Option<String>,
    pub pid_type: Option<String>,
}

impl StructuralMapOptions {
    pub fn with_type(mut self, structural_map_type: impl Into<String>) -> Self {
        self.structural_map_type = Some(structural_map_type.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_pid(mut self, pid: impl Into<String>, pid_type: impl Into<String>) -> Self {
        self.pid = Some(pid.into());
        self.pid_type = Some(pid_type.into());
        self
    }
}

/// A structural map organising the package's files into a hierarchy.
#[derive(Clone, Debug)]
pub struct StructuralMap {
    tree: DivisionTree,
    root: DivId,
    options: StructuralMapOptions,
}

impl StructuralMap {
    /// A map whose top division is `root`, which must not have a parent.
    pub fn new(tree: DivisionTree, root: DivId) -> StructureResult<Self> {
        Self::with_options(tree, root, StructuralMapOptions::default())
    }

    pub fn with_options(
        tree: DivisionTree,
        root: DivId,
        options: StructuralMapOptions,
    ) -> StructureResult<Self> {
        let Some(node) = tree.get(root) else {
            return Err(StructureError::DivNotFound(root));
        };
        if node.parent().is_some() {
            return Err(StructureError::NotARoot(root));
        }

        require_pair(
            ("pid", options.pid.as_deref()),
            ("pid_type", options.pid_type.as_deref()),
        )?;
        if let Some(pid) = &options.pid {
            validate_printable_ascii("pid", pid)?;
        }
        if let Some(pid_type) = &options.pid_type {
            validate_printable_ascii("pid_type", pid_type)?;
        }

        Ok(Self {
            tree,
            root,
            options,
        })
    }

    pub fn root(&self) -> DivId {
        self.root
    }

    pub fn tree(&self) -> &DivisionTree {
        &self.tree
    }

    /// Mutable access to the divisions. Divisions left detached from the
    /// root are not part of the map.
    pub fn tree_mut(&mut self) -> &mut DivisionTree {
        &mut self.tree
    }

    pub fn structural_map_type(&self) -> Option<&str> {
        self.options.structural_map_type.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.options.label.as_deref()
    }

    pub fn pid(&self) -> Option<&str> {
        self.options.pid.as_deref()
    }

    pub fn pid_type(&self) -> Option<&str> {
        self.options.pid_type.as_deref()
    }

    /// The root division followed by every division below it.
    pub fn divs(&self) -> StructureResult<Vec<DivId>> {
        let mut divs = vec![self.root];
        divs.extend(self.tree.descendants(self.root)?);
        Ok(divs)
    }

    /// Every digital object placed somewhere in the map.
    pub fn digital_objects(&self) -> StructureResult<BTreeSet<DigitalObject>> {
        self.tree.nested_digital_objects(self.root)
    }

    /// Metadata attached to the map's divisions, its digital objects and
    /// their streams.
    pub fn metadata(&self) -> StructureResult<BTreeSet<Metadata>> {
        let mut metadata = BTreeSet::new();
        for div in self.divs()? {
            if let Some(node) = self.tree.get(div) {
                metadata.extend(node.metadata().iter().cloned());
            }
        }
        for object in self.digital_objects()? {
            metadata.extend(object.all_metadata());
        }
        Ok(metadata)
    }

    /// Hoist shared metadata as high in the map as it goes.
    pub fn bundle_metadata(&mut self) -> StructureResult<()> {
        self.tree.bundle_metadata(self.root)
    }

    // -----------------------------------------------------------------------
    // Directory layout
    // -----------------------------------------------------------------------

    /// Build a map mirroring the directory layout of the objects' paths.
    ///
    /// Every directory becomes a division typed after the directory name, all
    /// wrapped in a root division of type `directory`. Files land in the
    /// division of their parent directory. The generation is documented on
    /// the root division as a `creation` event executed by this library and
    /// by `additional_agents`.
    pub fn from_directory_structure(
        digital_objects: impl IntoIterator<Item = DigitalObject>,
        additional_agents: impl IntoIterator<Item = Metadata>,
    ) -> StructureResult<Self> {
        let objects: BTreeSet<DigitalObject> = digital_objects.into_iter().collect();
        if objects.is_empty() {
            return Err(StructureError::NoDigitalObjects {
                action: "generate a structural map",
            });
        }

        let mut tree = DivisionTree::new();
        let root = tree.add_div(StructuralMapDiv::new("directory"));

        // The empty path is the package root.
        let mut dir_divs: BTreeMap<String, DivId> = BTreeMap::from([(String::new(), root)]);
        let mut subdirs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut files: BTreeMap<String, Vec<DigitalObject>> = BTreeMap::new();

        for object in objects {
            let segments: Vec<&str> = object.path().split('/').collect();
            let dir_count = segments.len() - 1;
            for depth in 1..=dir_count {
                let dir = segments[..depth].join("/");
                let parent = segments[..depth - 1].join("/");
                dir_divs
                    .entry(dir.clone())
                    .or_insert_with(|| tree.add_div(StructuralMapDiv::new(segments[depth - 1])));
                subdirs.entry(parent).or_default().insert(dir);
            }
            files
                .entry(segments[..dir_count].join("/"))
                .or_default()
                .push(object);
        }

        for (dir, objects) in files {
            let div = dir_divs[&dir];
            tree.add_digital_objects(div, objects)?;
        }
        for (parent, children) in subdirs {
            let parent = dir_divs[&parent];
            tree.add_divs(parent, children.iter().map(|dir| dir_divs[dir]))?;
        }

        let creation = structural_map_creation(additional_agents)?;
        tree.add_metadata(root, creation)?;

        info!(divs = tree.len(), "generated structural map from directory structure");
        Self::with_options(tree, root, StructuralMapOptions::default())
    }
}

/// The `creation` event documenting directory-based map generation, with
/// its executing agents.
fn structural_map_creation(
    additional_agents: impl IntoIterator<Item = Metadata>,
) -> StructureResult<Vec<Metadata>> {
    let mut agents = vec![mets_builder_agent()?];
    agents.extend(additional_agents);

    let mut event = DigitalProvenanceEvent::new(
        "creation",
        "Creation of structural metadata with the StructuralMap::from_directory_structure method",
        EventOutcome::Success,
        "Created METS structural map with type 'directory'",
    )
    .with_datetime(format_timestamp(&Utc::now()));
    for agent in &agents {
        event.link_agent_metadata(agent, "executing program")?;
    }
    debug!(agents = agents.len(), "documented structural map creation");

    let mut metadata = vec![event.into_metadata()?];
    metadata.extend(agents);
    Ok(metadata)
}
