//! Structural map divisions and the arena tree that holds them.
//!
//! [`DivisionTree`] owns every [`StructuralMapDiv`] it was given and hands
//! out [`DivId`] handles. Divisions start out detached; [`add_divs`] links
//! them under a parent. One arena may hold several disjoint trees.
//!
//! # Invariants
//!
//! - A division has at most one parent.
//! - No division is reachable from two places in the same tree.
//! - No digital object is held by two divisions of the same tree.
//!
//! All three are checked when a mutation is requested. A rejected mutation
//! leaves the tree unchanged.
//!
//! [`add_divs`]: DivisionTree::add_divs

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use mets_metadata::Metadata;
use mets_types::MetadataType;
use tracing::debug;

use crate::digital_object::{with_linked, DigitalObject};
use crate::error::{StructureError, StructureResult};

/// Handle to a division inside a [`DivisionTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DivId(usize);

impl DivId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for DivId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Attributes of a METS `div` element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuralMapDiv {
    /// Kind of division: `chapter`, `page`, `directory` and so on.
    pub div_type: String,
    /// Numeric position among siblings.
    pub order: Option<u32>,
    /// Human readable label, specific to this level of the tree.
    pub label: Option<String>,
    /// Position among siblings in a native numbering, such as `xii`.
    pub orderlabel: Option<String>,
}

impl StructuralMapDiv {
    pub fn new(div_type: impl Into<String>) -> Self {
        Self {
            div_type: div_type.into(),
            order: None,
            label: None,
            orderlabel: None,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_orderlabel(mut self, orderlabel: impl Into<String>) -> Self {
        self.orderlabel = Some(orderlabel.into());
        self
    }
}

/// A division together with its place in the tree and its contents.
#[derive(Clone, Debug)]
pub struct DivNode {
    div: StructuralMapDiv,
    parent: Option<DivId>,
    children: Vec<DivId>,
    metadata: BTreeSet<Metadata>,
    digital_objects: BTreeSet<DigitalObject>,
}

impl DivNode {
    pub fn div(&self) -> &StructuralMapDiv {
        &self.div
    }

    pub fn parent(&self) -> Option<DivId> {
        self.parent
    }

    /// Direct child divisions, in insertion order.
    pub fn children(&self) -> &[DivId] {
        &self.children
    }

    /// Metadata applying to everything under this division.
    pub fn metadata(&self) -> &BTreeSet<Metadata> {
        &self.metadata
    }

    /// Digital objects held directly by this division.
    pub fn digital_objects(&self) -> &BTreeSet<DigitalObject> {
        &self.digital_objects
    }
}

/// Arena of structural map divisions.
#[derive(Clone, Debug, Default)]
pub struct DivisionTree {
    nodes: Vec<DivNode>,
}

impl DivisionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of divisions in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: DivId) -> Option<&DivNode> {
        self.nodes.get(id.0)
    }

    /// Mutable access to the attributes of a division.
    pub fn div_mut(&mut self, id: DivId) -> Option<&mut StructuralMapDiv> {
        self.nodes.get_mut(id.0).map(|node| &mut node.div)
    }

    fn node(&self, id: DivId) -> StructureResult<&DivNode> {
        self.nodes.get(id.0).ok_or(StructureError::DivNotFound(id))
    }

    fn node_mut(&mut self, id: DivId) -> StructureResult<&mut DivNode> {
        self.nodes.get_mut(id.0).ok_or(StructureError::DivNotFound(id))
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Add a detached division to the arena.
    pub fn add_div(&mut self, div: StructuralMapDiv) -> DivId {
        let id = DivId(self.nodes.len());
        debug!(div = %id, div_type = %div.div_type, "added div");
        self.nodes.push(DivNode {
            div,
            parent: None,
            children: Vec::new(),
            metadata: BTreeSet::new(),
            digital_objects: BTreeSet::new(),
        });
        id
    }

    /// Nest `children` under `parent`.
    ///
    /// Every child must be detached, must not already be part of the tree
    /// `parent` belongs to, and must not bring along digital objects that the
    /// tree already holds. The check walks the whole tree, so add siblings in
    /// one call rather than one at a time.
    pub fn add_divs(
        &mut self,
        parent: DivId,
        children: impl IntoIterator<Item = DivId>,
    ) -> StructureResult<()> {
        let children: Vec<DivId> = children.into_iter().collect();
        self.node(parent)?;

        let root = self.root_div(parent)?;
        let mut existing_divs: HashSet<DivId> = self.descendants(root)?.into_iter().collect();
        existing_divs.insert(root);
        let mut existing_objects = self.nested_digital_objects(root)?;

        // Each child's subtree is claimed in turn, so overlap inside the
        // batch is caught the same way as overlap with the tree.
        for &child in &children {
            if self.node(child)?.parent.is_some() {
                return Err(StructureError::AlreadyParented(child));
            }
            let mut subtree = self.descendants(child)?;
            subtree.push(child);
            for div in subtree {
                if !existing_divs.insert(div) {
                    return Err(StructureError::DivConflict(child));
                }
            }
            for object in self.nested_digital_objects(child)? {
                if existing_objects.contains(&object) {
                    return Err(StructureError::DigitalObjectConflict {
                        path: object.path().to_string(),
                    });
                }
                existing_objects.insert(object);
            }
        }

        for &child in &children {
            self.node_mut(child)?.parent = Some(parent);
        }
        debug!(parent = %parent, count = children.len(), "nested divs");
        self.node_mut(parent)?.children.extend(children);
        Ok(())
    }

    /// Place digital objects directly under `div`.
    ///
    /// Fails without changes if any object is already held anywhere in the
    /// tree `div` belongs to.
    pub fn add_digital_objects(
        &mut self,
        div: DivId,
        objects: impl IntoIterator<Item = DigitalObject>,
    ) -> StructureResult<()> {
        let added: BTreeSet<DigitalObject> = objects.into_iter().collect();
        let existing = self.nested_digital_objects(self.root_div(div)?)?;
        if let Some(conflict) = added.intersection(&existing).next() {
            return Err(StructureError::DigitalObjectConflict {
                path: conflict.path().to_string(),
            });
        }

        debug!(div = %div, count = added.len(), "added digital objects to div");
        self.node_mut(div)?.digital_objects.extend(added);
        Ok(())
    }

    /// Attach metadata to `div`, together with anything it links to.
    pub fn add_metadata(
        &mut self,
        div: DivId,
        items: impl IntoIterator<Item = Metadata>,
    ) -> StructureResult<()> {
        let expanded = with_linked(items);
        let node = self.node_mut(div)?;
        debug!(div = %div, count = expanded.len(), "added metadata to div");
        node.metadata.extend(expanded);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Follow parent links up to the top of the tree holding `id`.
    pub fn root_div(&self, id: DivId) -> StructureResult<DivId> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            current = parent;
        }
        Ok(current)
    }

    /// Every division below `id` (BFS order). `id` itself is not included.
    pub fn descendants(&self, id: DivId) -> StructureResult<Vec<DivId>> {
        let mut result = Vec::new();
        let mut queue: VecDeque<DivId> = self.node(id)?.children.iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            result.push(current);
            queue.extend(self.node(current)?.children.iter().copied());
        }
        Ok(result)
    }

    /// Digital objects held by `id` or any division below it.
    pub fn nested_digital_objects(&self, id: DivId) -> StructureResult<BTreeSet<DigitalObject>> {
        let mut objects = self.node(id)?.digital_objects.clone();
        for div in self.descendants(id)? {
            objects.extend(self.node(div)?.digital_objects.iter().cloned());
        }
        Ok(objects)
    }

    // -----------------------------------------------------------------------
    // Bundling
    // -----------------------------------------------------------------------

    /// Hoist metadata shared by all direct children up to their parent.
    ///
    /// Divisions are visited children first, so metadata common to a whole
    /// subtree moves as high as it can. Technical metadata describes a single
    /// file and is never hoisted.
    pub fn bundle_metadata(&mut self, id: DivId) -> StructureResult<()> {
        let mut order = self.descendants(id)?;
        order.insert(0, id);
        // BFS order reversed visits every child before its parent.
        for div in order.into_iter().rev() {
            self.bundle_children(div)?;
        }
        Ok(())
    }

    fn bundle_children(&mut self, id: DivId) -> StructureResult<()> {
        let common = {
            let node = self.node(id)?;
            let mut child_sets = node
                .digital_objects
                .iter()
                .map(DigitalObject::metadata)
                .chain(
                    node.children
                        .iter()
                        .map(|child| self.nodes[child.0].metadata.clone()),
                );

            let Some(first) = child_sets.next() else {
                return Ok(());
            };
            let mut common: BTreeSet<Metadata> = first
                .into_iter()
                .filter(|md| md.metadata_type() != MetadataType::Technical)
                .collect();
            for set in child_sets {
                if common.is_empty() {
                    break;
                }
                common.retain(|md| set.contains(md));
            }
            common
        };
        if common.is_empty() {
            return Ok(());
        }

        let node = self.node(id)?;
        for object in &node.digital_objects {
            object.remove_metadata(&common);
        }
        for child in node.children.clone() {
            self.node_mut(child)?
                .metadata
                .retain(|md| !common.contains(md));
        }
        debug!(div = %id, count = common.len(), "bundled metadata into div");
        self.node_mut(id)?.metadata.extend(common);
        Ok(())
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
        ChecksumAlgorithm, DigitalProvenanceAgentType, EventOutcome, MetadataFormat,
    };
    use proptest::prelude::*;

    fn object(path: &str) -> DigitalObject {
        DigitalObject::new(path).unwrap()
    }

    fn agent(name: &str) -> Metadata {
        DigitalProvenanceAgent::new(name, DigitalProvenanceAgentType::Software)
            .into_metadata()
            .unwrap()
    }

    fn event(detail: &str) -> Metadata {
        DigitalProvenanceEvent::new("message digest calculation", detail, EventOutcome::Success, "")
            .into_metadata()
            .unwrap()
    }

    fn technical(checksum: &str) -> Metadata {
        TechnicalObjectMetadata::file("text/plain", "(:unap)", ChecksumAlgorithm::Md5, checksum)
            .into_metadata()
            .unwrap()
    }

    fn descriptive() -> Metadata {
        ImportedMetadata::new(
            MetadataType::Descriptive,
            MetadataFormat::Dc,
            "2008",
            ImportSource::Inline("<dc><title>Book</title></dc>".to_string()),
        )
        .into_metadata()
        .unwrap()
    }

    fn tree_with_root() -> (DivisionTree, DivId) {
        let mut tree = DivisionTree::new();
        let root = tree.add_div(StructuralMapDiv::new("directory"));
        (tree, root)
    }

    #[test]
    fn add_divs_links_parent_and_children() {
        let (mut tree, root) = tree_with_root();
        let a = tree.add_div(StructuralMapDiv::new("a").with_order(1));
        let b = tree.add_div(StructuralMapDiv::new("b").with_label("Second"));
        let c = tree.add_div(StructuralMapDiv::new("c"));
        tree.add_divs(a, [c]).unwrap();
        tree.add_divs(root, [a, b]).unwrap();

        assert_eq!(tree.get(root).unwrap().children(), &[a, b]);
        assert_eq!(tree.get(c).unwrap().parent(), Some(a));
        assert_eq!(tree.root_div(c).unwrap(), root);
        assert_eq!(tree.descendants(root).unwrap(), vec![a, b, c]);
        assert_eq!(tree.get(a).unwrap().div().order, Some(1));
        assert_eq!(tree.get(b).unwrap().div().label.as_deref(), Some("Second"));
    }

    #[test]
    fn parented_div_cannot_be_added_again() {
        let (mut tree, root) = tree_with_root();
        let other = tree.add_div(StructuralMapDiv::new("other"));
        let child = tree.add_div(StructuralMapDiv::new("child"));
        tree.add_divs(root, [child]).unwrap();

        let err = tree.add_divs(other, [child]).unwrap_err();
        assert!(matches!(err, StructureError::AlreadyParented(id) if id == child));
        assert!(tree.get(other).unwrap().children().is_empty());
    }

    #[test]
    fn cycles_and_duplicates_are_rejected() {
        let (mut tree, root) = tree_with_root();
        let child = tree.add_div(StructuralMapDiv::new("child"));
        tree.add_divs(root, [child]).unwrap();

        // The root is detached but already part of the child's tree.
        let err = tree.add_divs(child, [root]).unwrap_err();
        assert!(matches!(err, StructureError::DivConflict(id) if id == root));

        let loose = tree.add_div(StructuralMapDiv::new("loose"));
        let err = tree.add_divs(child, [loose, loose]).unwrap_err();
        assert!(matches!(err, StructureError::DivConflict(_)));
        assert_eq!(tree.get(loose).unwrap().parent(), None);
        assert!(tree.get(child).unwrap().children().is_empty());
    }

    #[test]
    fn digital_objects_are_unique_per_tree() {
        let (mut tree, root) = tree_with_root();
        let shared = object("data/a.txt");
        tree.add_digital_objects(root, [shared.clone()]).unwrap();

        let sub = tree.add_div(StructuralMapDiv::new("sub"));
        tree.add_digital_objects(sub, [shared.clone()]).unwrap();
        let err = tree.add_divs(root, [sub]).unwrap_err();
        assert!(matches!(err, StructureError::DigitalObjectConflict { .. }));
        assert_eq!(tree.get(sub).unwrap().parent(), None);

        let err = tree.add_digital_objects(root, [shared]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "digital object 'data/a.txt' already exists in the div tree"
        );
        assert_eq!(tree.nested_digital_objects(root).unwrap().len(), 1);
    }

    #[test]
    fn sibling_batches_may_not_share_objects() {
        let (mut tree, root) = tree_with_root();
        let shared = object("data/a.txt");
        let x = tree.add_div(StructuralMapDiv::new("x"));
        let y = tree.add_div(StructuralMapDiv::new("y"));
        tree.add_digital_objects(x, [shared.clone()]).unwrap();
        tree.add_digital_objects(y, [shared]).unwrap();

        assert!(tree.add_divs(root, [x, y]).is_err());
        assert!(tree.get(root).unwrap().children().is_empty());
    }

    #[test]
    fn nested_digital_objects_cover_the_subtree() {
        let (mut tree, root) = tree_with_root();
        let sub = tree.add_div(StructuralMapDiv::new("sub"));
        tree.add_digital_objects(root, [object("a.txt")]).unwrap();
        tree.add_digital_objects(sub, [object("sub/b.txt"), object("sub/c.txt")])
            .unwrap();
        tree.add_divs(root, [sub]).unwrap();

        assert_eq!(tree.nested_digital_objects(root).unwrap().len(), 3);
        assert_eq!(tree.nested_digital_objects(sub).unwrap().len(), 2);
    }

    #[test]
    fn unknown_div_is_reported() {
        let (mut tree, _) = tree_with_root();
        let mut other = DivisionTree::new();
        other.add_div(StructuralMapDiv::new("a"));
        let foreign = other.add_div(StructuralMapDiv::new("b"));
        let err = tree.add_metadata(foreign, [agent("x")]).unwrap_err();
        assert!(matches!(err, StructureError::DivNotFound(id) if id == foreign));
    }

    #[test]
    fn div_metadata_accepts_descriptive_and_expands_links() {
        let (mut tree, root) = tree_with_root();
        let tool = agent("tool");
        let mut creation = DigitalProvenanceEvent::new("creation", "", EventOutcome::Success, "");
        creation.link_agent_metadata(&tool, "executing program").unwrap();
        let creation = creation.into_metadata().unwrap();

        tree.add_metadata(root, [descriptive(), creation]).unwrap();
        let metadata = tree.get(root).unwrap().metadata();
        assert_eq!(metadata.len(), 3);
        assert!(metadata.contains(&tool));
    }

    #[test]
    fn bundling_hoists_common_metadata() {
        let (mut tree, root) = tree_with_root();
        let shared = event("shared");
        let a = object("a.txt");
        let b = object("b.txt");
        a.add_metadata([shared.clone(), event("only a"), technical("1")]).unwrap();
        b.add_metadata([shared.clone(), technical("2")]).unwrap();
        tree.add_digital_objects(root, [a.clone(), b.clone()]).unwrap();

        tree.bundle_metadata(root).unwrap();

        assert!(tree.get(root).unwrap().metadata().contains(&shared));
        assert!(!a.metadata().contains(&shared));
        assert!(!b.metadata().contains(&shared));
        assert_eq!(a.metadata().len(), 2);
        assert_eq!(b.metadata().len(), 1);
    }

    #[test]
    fn technical_metadata_is_never_hoisted() {
        let (mut tree, root) = tree_with_root();
        let same = technical("same");
        let a = object("a.txt");
        let b = object("b.txt");
        a.add_metadata([same.clone()]).unwrap();
        b.add_metadata([same.clone()]).unwrap();
        tree.add_digital_objects(root, [a.clone(), b]).unwrap();

        tree.bundle_metadata(root).unwrap();
        assert!(tree.get(root).unwrap().metadata().is_empty());
        assert!(a.metadata().contains(&same));
    }

    #[test]
    fn bundling_climbs_through_nested_divs() {
        let (mut tree, root) = tree_with_root();
        let shared = event("shared");
        let left = tree.add_div(StructuralMapDiv::new("left"));
        let right = tree.add_div(StructuralMapDiv::new("right"));
        for (div, path) in [(left, "l/1.txt"), (left, "l/2.txt"), (right, "r/1.txt")] {
            let obj = object(path);
            obj.add_metadata([shared.clone()]).unwrap();
            tree.add_digital_objects(div, [obj]).unwrap();
        }
        tree.add_divs(root, [left, right]).unwrap();

        tree.bundle_metadata(root).unwrap();

        assert!(tree.get(root).unwrap().metadata().contains(&shared));
        assert!(tree.get(left).unwrap().metadata().is_empty());
        assert!(tree.get(right).unwrap().metadata().is_empty());
        for obj in tree.nested_digital_objects(root).unwrap() {
            assert!(obj.metadata().is_empty());
        }
    }

    #[test]
    fn mixed_children_without_common_metadata_are_left_alone() {
        let (mut tree, root) = tree_with_root();
        let sub = tree.add_div(StructuralMapDiv::new("sub"));
        tree.add_metadata(sub, [event("sub")]).unwrap();
        let obj = object("a.txt");
        obj.add_metadata([event("object")]).unwrap();
        tree.add_digital_objects(root, [obj.clone()]).unwrap();
        tree.add_divs(root, [sub]).unwrap();

        tree.bundle_metadata(root).unwrap();
        assert!(tree.get(root).unwrap().metadata().is_empty());
        assert_eq!(obj.metadata().len(), 1);
        assert_eq!(tree.get(sub).unwrap().metadata().len(), 1);
    }

    proptest! {
        #[test]
        fn bundling_moves_exactly_the_common_part(
            common in 1usize..4,
            unique in prop::collection::vec(0usize..3, 1..5),
        ) {
            let (mut tree, root) = tree_with_root();
            let shared: BTreeSet<Metadata> =
                (0..common).map(|i| event(&format!("common {i}"))).collect();

            let mut expected_unique = Vec::new();
            for (child, count) in unique.iter().enumerate() {
                let own: BTreeSet<Metadata> = (0..*count)
                    .map(|i| event(&format!("child {child} item {i}")))
                    .collect();
                let obj = object(&format!("file{child}.txt"));
                obj.add_metadata(shared.iter().cloned().chain(own.iter().cloned())).unwrap();
                tree.add_digital_objects(root, [obj.clone()]).unwrap();
                expected_unique.push((obj, own));
            }

            tree.bundle_metadata(root).unwrap();

            if unique.len() == 1 {
                // A single child shares everything with itself.
                let (obj, own) = &expected_unique[0];
                let all: BTreeSet<Metadata> = shared.union(own).cloned().collect();
                prop_assert_eq!(tree.get(root).unwrap().metadata(), &all);
                prop_assert!(obj.metadata().is_empty());
            } else {
                prop_assert_eq!(tree.get(root).unwrap().metadata(), &shared);
                for (obj, own) in &expected_unique {
                    prop_assert_eq!(&obj.metadata(), own);
                }
            }
        }
    }
}
