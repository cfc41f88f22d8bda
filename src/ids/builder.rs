//! Hierarchical id assignment and cross-reference resolution.
//!
//! Runs once, top-down, over the compacted tree. For every node it
//!
//! 1. records the constraint-node chain spanned since the retained parent,
//! 2. derives a base id and makes it unique among its siblings,
//! 3. fixes the order and ids of polymorphic `value` alternatives,
//! 4. resolves cardinalities and dependencies into sibling local ids.

use indexmap::IndexSet;

use super::dedup::IdDeduplicator;
use super::slug::base_id_for;
use crate::am::{AmNodeId, AmTree};
use crate::base::{RmType, constants};
use crate::error::{BuilderError, Result};
use crate::model::{NodeArena, NodeKey};

/// Assigns ids to a compacted schema tree.
pub struct IdBuilder<'a> {
    am: &'a AmTree,
    nodes: &'a mut NodeArena,
    dedup: &'a mut dyn IdDeduplicator,
}

impl<'a> IdBuilder<'a> {
    pub fn new(am: &'a AmTree, nodes: &'a mut NodeArena, dedup: &'a mut dyn IdDeduplicator) -> Self {
        Self { am, nodes, dedup }
    }

    /// Assign ids to `root` and everything below it.
    pub fn build_ids(&mut self, root: NodeKey) -> Result<()> {
        self.build(root, &[])
    }

    fn build(&mut self, key: NodeKey, ancestors: &[NodeKey]) -> Result<()> {
        let parent = ancestors.last().copied();
        self.build_chain(key, parent);
        self.build_id(key, parent)?;

        if !self.nodes.get(key).children.is_empty() {
            let mut path = Vec::with_capacity(ancestors.len() + 1);
            path.extend_from_slice(ancestors);
            path.push(key);
            self.handle_children(key, &path)?;
            self.update_depends_on(key);
        }
        self.update_cardinalities(key);
        Ok(())
    }

    // ========================================================================
    // CHAIN
    // ========================================================================

    /// Constraint nodes from just below the parent's constraint node down to
    /// this node's own, in root-to-node order.
    fn build_chain(&mut self, key: NodeKey, parent: Option<NodeKey>) {
        let own = self.nodes.get(key).am_node;
        let Some(parent) = parent else {
            self.nodes.get_mut(key).chain = vec![own];
            return;
        };
        let stop = Some(self.nodes.get(parent).am_node);
        let mut chain: Vec<AmNodeId> = Vec::new();
        let mut current = Some(own);
        while let Some(am_node) = current {
            if Some(am_node) == stop {
                break;
            }
            chain.push(am_node);
            current = self.am.parent(am_node);
        }
        chain.reverse();
        self.nodes.get_mut(key).chain = chain;
    }

    // ========================================================================
    // IDS
    // ========================================================================

    fn build_id(&mut self, key: NodeKey, parent: Option<NodeKey>) -> Result<()> {
        let base = base_id_for(&self.base_name(key, parent));
        let scope = match parent {
            Some(parent) => format!("{}/", self.nodes.get(parent).id),
            None => String::new(),
        };
        let local_id = self.dedup.unique_id(&scope, &base)?;

        let node = self.nodes.get_mut(key);
        node.id = format!("{scope}{local_id}");
        node.local_id = Some(local_id);
        Ok(())
    }

    fn base_name(&self, key: NodeKey, parent: Option<NodeKey>) -> String {
        let node = self.nodes.get(key);
        if let Some(local_id) = &node.local_id {
            return local_id.clone();
        }
        match node.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let under_element = parent
                    .is_some_and(|p| self.nodes.get(p).rm_type == RmType::Element);
                if under_element && !node.rm_type.is_interval() {
                    constants::VALUE.to_string()
                } else {
                    node.last_path_segment().to_string()
                }
            }
        }
    }

    // ========================================================================
    // CHILDREN
    // ========================================================================

    fn handle_children(&mut self, key: NodeKey, path: &[NodeKey]) -> Result<()> {
        let is_choice = {
            let node = self.nodes.get(key);
            node.rm_type == RmType::Element && node.children.len() > 1
        };
        if is_choice {
            self.fix_polymorphic_order(key);
        }

        let children = self.nodes.get(key).children.clone();
        for (index, child) in children.iter().copied().enumerate() {
            if is_choice {
                self.assign_choice_id(key, child, index)?;
            }
            self.build(child, path)?;
        }
        Ok(())
    }

    /// Coded text goes before plain text; nothing else moves.
    fn fix_polymorphic_order(&mut self, key: NodeKey) {
        let position = |nodes: &NodeArena, rm_type: RmType| {
            nodes
                .children(key)
                .iter()
                .position(|child| nodes.get(*child).rm_type == rm_type)
        };
        let coded = position(&*self.nodes, RmType::DvCodedText);
        let text = position(&*self.nodes, RmType::DvText);
        if let (Some(coded), Some(text)) = (coded, text) {
            if coded > text {
                self.nodes.get_mut(key).children.swap(coded, text);
            }
        }
    }

    fn assign_choice_id(&mut self, parent: NodeKey, child: NodeKey, index: usize) -> Result<()> {
        let parent_node = self.nodes.get(parent);
        let child_node = self.nodes.get(child);
        let attribute = self
            .am
            .attribute_name_of(parent_node.am_node, child_node.am_node)
            .ok_or_else(|| BuilderError::unknown_attribute(child_node.path.clone()))?
            .to_string();

        if child_node.rm_type.is_data_value() && attribute == constants::VALUE {
            let typed_id = child_node.rm_type.typed_value_id();
            let suffix = if index > 0 {
                (index + 1).to_string()
            } else {
                String::new()
            };
            let alternative_id = format!("{}/value{suffix}", parent_node.id);

            let child_node = self.nodes.get_mut(child);
            child_node.local_id = Some(typed_id);
            child_node.alternative_id = Some(alternative_id);
            child_node.alternative_local_id = Some(format!("value{suffix}"));
        } else {
            self.nodes.get_mut(child).local_id = Some(attribute);
        }
        Ok(())
    }

    // ========================================================================
    // CROSS REFERENCES
    // ========================================================================

    /// Replace each child's dependency path prefixes with the local ids of
    /// the matching, not in-context siblings.
    fn update_depends_on(&mut self, key: NodeKey) {
        let children = self.nodes.get(key).children.clone();
        for child in &children {
            let Some(prefixes) = self.nodes.get(*child).depends_on.clone() else {
                continue;
            };
            let mut resolved: IndexSet<String> = IndexSet::new();
            for prefix in &prefixes {
                for sibling in &children {
                    let sibling = self.nodes.get(*sibling);
                    if !sibling.is_in_context() && sibling.path.starts_with(prefix.as_str()) {
                        resolved.extend(sibling.local_id.clone());
                    }
                }
            }
            self.nodes.get_mut(*child).depends_on = if resolved.is_empty() {
                None
            } else {
                Some(resolved.into_iter().collect())
            };
        }
    }

    /// Fill in matching child ids; cardinalities without a match are dropped.
    fn update_cardinalities(&mut self, key: NodeKey) {
        if self.nodes.get(key).cardinalities.is_empty() {
            return;
        }
        let children = self.nodes.get(key).children.clone();
        let mut cardinalities = std::mem::take(&mut self.nodes.get_mut(key).cardinalities);
        cardinalities.retain_mut(|cardinality| {
            cardinality.ids = children
                .iter()
                .map(|child| self.nodes.get(*child))
                .filter(|child| child.path.starts_with(cardinality.path.as_str()))
                .filter_map(|child| child.local_id.clone())
                .collect();
            if cardinality.ids.is_empty() {
                tracing::trace!("dropping cardinality {} without matches", cardinality.path);
            }
            !cardinality.ids.is_empty()
        });
        self.nodes.get_mut(key).cardinalities = cardinalities;
    }
}
