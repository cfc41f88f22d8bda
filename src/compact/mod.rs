//! Compaction of the raw schema tree.
//!
//! The raw tree mirrors the constraint tree one-to-one and is far too deep
//! for form building. The compactor runs once, post-order, and
//!
//! - merges sibling alternatives of the same value (coded + free text),
//! - collapses single-child wrappers into their child,
//! - removes structural containers left without children.
//!
//! Under [`CompactionPolicy::Medium`] item structures, histories and
//! single-occurrence events are additionally spliced into their parent
//! before anything else happens at that level.
//!
//! ```text
//! OBSERVATION                       OBSERVATION
//! └── data: HISTORY                 └── quantity: DV_QUANTITY  (was ELEMENT)
//!     └── events: EVENT (0..1)
//!         └── data: ITEM_TREE   =>
//!             └── ELEMENT
//!                 └── DV_QUANTITY
//! ```

mod merge;

use crate::base::RmType;
use crate::model::{NodeArena, NodeKey};

/// How aggressively wrappers are removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompactionPolicy {
    /// Collapse data value wrappers only.
    Minimal,
    /// Also flatten structures and events, and collapse elements.
    #[default]
    Medium,
}

impl CompactionPolicy {
    /// Can a node of this type be replaced by its only child?
    pub fn is_skippable(&self, rm_type: &RmType) -> bool {
        rm_type.is_data_value()
            || (*self == CompactionPolicy::Medium && *rm_type == RmType::Element)
    }
}

/// Post-order compactor over a [`NodeArena`].
pub struct Compactor<'a> {
    nodes: &'a mut NodeArena,
    policy: CompactionPolicy,
}

impl<'a> Compactor<'a> {
    pub fn new(nodes: &'a mut NodeArena, policy: CompactionPolicy) -> Self {
        Self { nodes, policy }
    }

    /// Compact the tree under `root`. `None` means nothing survived.
    pub fn compact_root(&mut self, root: NodeKey) -> Option<NodeKey> {
        self.compact(root, &[])
    }

    fn compact(&mut self, key: NodeKey, ancestors: &[NodeKey]) -> Option<NodeKey> {
        if self.policy == CompactionPolicy::Medium {
            let children = self.nodes.get(key).children.clone();
            let flattened = self.flatten(key, &children);
            self.nodes.get_mut(key).children = flattened;
        }

        let mut path = Vec::with_capacity(ancestors.len() + 1);
        path.extend_from_slice(ancestors);
        path.push(key);
        let children = std::mem::take(&mut self.nodes.get_mut(key).children);
        let compacted: Vec<NodeKey> = children
            .into_iter()
            .filter_map(|child| self.compact(child, &path))
            .collect();
        self.nodes.get_mut(key).children = compacted;

        merge::merge_alternative_siblings(self.nodes, key);
        self.collapse(key, ancestors)
    }

    // ========================================================================
    // FLATTENING
    // ========================================================================

    /// Splice flattenable children (recursively) into `top`'s child list.
    fn flatten(&mut self, top: NodeKey, children: &[NodeKey]) -> Vec<NodeKey> {
        let mut result = Vec::with_capacity(children.len());
        for &child in children {
            if !self.is_flattenable(child, children) {
                result.push(child);
                continue;
            }
            tracing::trace!("flattening {}", self.nodes.get(child).path);

            let grandchildren = self.nodes.get(child).children.clone();
            if let Some(depends_on) = self.nodes.get(child).depends_on.clone() {
                for grandchild in &grandchildren {
                    self.nodes.get_mut(*grandchild).add_depends_on(&depends_on);
                }
            }
            let cardinalities = std::mem::take(&mut self.nodes.get_mut(child).cardinalities);
            self.nodes.get_mut(top).cardinalities.extend(cardinalities);

            result.extend(self.flatten(top, &grandchildren));
        }
        result
    }

    fn is_flattenable(&self, child: NodeKey, siblings: &[NodeKey]) -> bool {
        let node = self.nodes.get(child);
        if node.rm_type.is_always_flattened() {
            return true;
        }
        node.rm_type.is_event()
            && node.occurrences.max == Some(1)
            && !siblings.iter().any(|&sibling| {
                let other = &self.nodes.get(sibling).rm_type;
                sibling != child
                    && (*other == node.rm_type || (other.is_event() && node.rm_type.is_event()))
            })
    }

    // ========================================================================
    // COLLAPSE
    // ========================================================================

    fn collapse(&mut self, key: NodeKey, ancestors: &[NodeKey]) -> Option<NodeKey> {
        let node = self.nodes.get(key);
        let collapsible = node.children.len() == 1
            && !node.has_input()
            && !ancestors.is_empty()
            && self.policy.is_skippable(&node.rm_type);

        if collapsible {
            let child = node.children[0];
            tracing::trace!("collapsing {} into its only child", node.path);
            let cardinalities = std::mem::take(&mut self.nodes.get_mut(key).cardinalities);
            if !cardinalities.is_empty() {
                // the grandparent, or the parent when there is none
                let target = ancestors[ancestors.len().saturating_sub(2)];
                self.nodes.get_mut(target).cardinalities.extend(cardinalities);
            }
            self.copy_values(key, child);
            return Some(child);
        }

        if node.children.is_empty() && node.rm_type.is_removable_when_empty() {
            tracing::trace!("removing empty {}", node.path);
            return None;
        }
        Some(key)
    }

    /// Move the state of a collapsing node onto its surviving child.
    fn copy_values(&mut self, from: NodeKey, to: NodeKey) {
        let (from, to) = self.nodes.pair_mut(from, to);

        if from.rm_type == RmType::Element && to.occurrences.min.unwrap_or(0) == 0 {
            to.occurrences.min = Some(1);
        }

        to.name = from.name.clone();
        to.localized_name = from.localized_name.clone();
        to.localized_names = from.localized_names.clone();
        to.localized_descriptions
            .extend(from.localized_descriptions.iter().map(|(k, v)| (k.clone(), v.clone())));
        to.node_id = from.node_id.clone();
        if !to.rm_type.is_data_value() {
            to.rm_type = from.rm_type.clone();
        }
        to.occurrences.tighten_with(&from.occurrences);
        if let Some(depends_on) = &from.depends_on {
            to.add_depends_on(depends_on);
        }
        if !to.has_input() {
            to.inputs = from.inputs.clone();
        }
        for (key, value) in &from.annotations {
            to.annotations.entry(key.clone()).or_insert_with(|| value.clone());
        }
        for (key, value) in &from.term_bindings {
            to.term_bindings.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }
}
