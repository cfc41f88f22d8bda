//! The compiled artifact.
//!
//! A [`WebTemplate`] is frozen: it owns its node arena (renumbered in
//! pre-order, unreachable nodes dropped) together with the constraint tree
//! it was compiled from, and only hands out shared references.

use std::sync::Arc;

use crate::am::{AmNode, AmNodeId, AmTree};
use crate::base::{RmType, constants};
use crate::builder::archetype_predicate;
use crate::error::{BuilderError, Result};
use crate::model::{CodedValue, NodeArena, NodeKey, WebTemplateNode};

// ============================================================================
// PREDICATES
// ============================================================================

/// Formats the predicate appended to each attribute of a sub-path.
pub trait PredicateProvider {
    /// Predicate for `node`; `index` is set only for the last node of the
    /// chain, when the caller addresses a specific repetition.
    fn predicate(&self, node: &AmNode, index: Option<usize>) -> String;
}

/// `[at0001]` or `[at0001,'Name']` for name-constrained nodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArchetypePredicates;

impl PredicateProvider for ArchetypePredicates {
    fn predicate(&self, node: &AmNode, _index: Option<usize>) -> String {
        archetype_predicate(node)
    }
}

// ============================================================================
// WEB TEMPLATE
// ============================================================================

/// A compiled web template.
#[derive(Clone, Debug)]
pub struct WebTemplate {
    am: Arc<AmTree>,
    nodes: NodeArena,
    root: NodeKey,
    pub template_id: String,
    pub sem_ver: Option<String>,
    pub default_language: String,
    pub languages: Vec<String>,
    pub version: &'static str,
}

impl WebTemplate {
    pub(crate) fn new(
        am: Arc<AmTree>,
        nodes: NodeArena,
        root: NodeKey,
        template_id: String,
        default_language: String,
        languages: Vec<String>,
    ) -> Self {
        Self {
            am,
            nodes,
            root,
            template_id,
            sem_ver: None,
            default_language,
            languages,
            version: constants::WEB_TEMPLATE_VERSION,
        }
    }

    pub fn with_sem_ver(mut self, sem_ver: impl Into<String>) -> Self {
        self.sem_ver = Some(sem_ver.into());
        self
    }

    /// The constraint tree this template was compiled from.
    pub fn am(&self) -> &AmTree {
        &self.am
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn tree(&self) -> &WebTemplateNode {
        self.nodes.get(self.root)
    }

    pub fn node(&self, key: NodeKey) -> &WebTemplateNode {
        self.nodes.get(key)
    }

    pub fn children(&self, key: NodeKey) -> impl Iterator<Item = (NodeKey, &WebTemplateNode)> {
        self.nodes
            .children(key)
            .iter()
            .map(|child| (*child, self.nodes.get(*child)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first, pre-order traversal from the root.
    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &WebTemplateNode)> {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let key = stack.pop()?;
            stack.extend(self.nodes.children(key).iter().rev().copied());
            Some((key, self.nodes.get(key)))
        })
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// Node with the given fully qualified id (`vitals/blood_pressure/systolic`).
    pub fn find_by_id(&self, id: &str) -> Option<NodeKey> {
        self.iter().find(|(_, node)| node.id == id).map(|(key, _)| key)
    }

    /// First node (in pre-order) with the given AQL path.
    pub fn find_by_path(&self, path: &str) -> Option<NodeKey> {
        self.iter()
            .find(|(_, node)| node.path == path)
            .map(|(key, _)| key)
    }

    /// Every node built from `am_node`, directly or through a collapsed chain.
    pub fn nodes_for(&self, am_node: AmNodeId) -> Vec<NodeKey> {
        self.iter()
            .filter(|(_, node)| node.am_node == am_node || node.chain.contains(&am_node))
            .map(|(key, _)| key)
            .collect()
    }

    /// Coded values of the node's primary input, labelled in `language` when
    /// a localized label exists.
    pub fn codes(&self, id: &str, language: Option<&str>) -> Result<Vec<CodedValue>> {
        let key = self
            .find_by_id(id)
            .ok_or_else(|| BuilderError::unknown_path(id))?;
        let list = self
            .nodes
            .get(key)
            .input()
            .map(|input| input.list.clone())
            .unwrap_or_default();
        Ok(list
            .into_iter()
            .map(|mut value| {
                if let Some(label) = language.and_then(|l| value.localized_labels.get(l)) {
                    value.label = Some(label.clone());
                }
                value
            })
            .collect())
    }

    /// Name of the node in `language`, or its default localized name.
    pub fn label(&self, id: &str, language: Option<&str>) -> Option<&str> {
        let node = self.nodes.get(self.find_by_id(id)?);
        language
            .and_then(|language| node.localized_names.get(language))
            .or(node.localized_name.as_ref())
            .map(String::as_str)
    }

    // ========================================================================
    // PATHS
    // ========================================================================

    /// AQL sub-path from the parent node to `key`, rebuilt from the node's
    /// constraint chain. Stops after an ELEMENT, so value nodes resolve to
    /// their element.
    pub fn sub_path(
        &self,
        key: NodeKey,
        index: Option<usize>,
        provider: &dyn PredicateProvider,
    ) -> String {
        let chain = &self.nodes.get(key).chain;
        let Some(first) = chain.first() else {
            return String::new();
        };

        let mut path = String::new();
        let mut parent = self.am.parent(*first);
        for (i, &am_id) in chain.iter().enumerate() {
            let am_node = self.am.get(am_id);
            let attribute = parent.and_then(|parent| self.am.attribute_name_of(parent, am_id));
            if let Some(attribute) = attribute {
                let index = if i == chain.len() - 1 { index } else { None };
                path.push('/');
                path.push_str(attribute);
                path.push_str(&provider.predicate(am_node, index));
            }
            parent = Some(am_id);
            if am_node.rm_type == RmType::Element {
                break;
            }
        }
        path
    }

    /// AQL path of a web template path such as `vitals/blood_pressure:1/systolic`.
    ///
    /// The first segment names the root; `:n` selects a repetition and is
    /// handed to the predicate provider.
    pub fn link_path(&self, web_path: &str, provider: &dyn PredicateProvider) -> Result<String> {
        let mut segments = web_path.split('/').map(parse_web_segment);
        let root = self.tree();
        match segments.next() {
            Some(Ok((id, _))) if root.local_id_matches(id) => {}
            Some(Err(err)) => return Err(err),
            _ => return Err(BuilderError::unknown_path(web_path)),
        }

        let mut current = self.root;
        let mut link = String::new();
        for segment in segments {
            let (id, index) = segment?;
            current = self
                .nodes
                .children(current)
                .iter()
                .copied()
                .find(|child| self.nodes.get(*child).local_id_matches(id))
                .ok_or_else(|| BuilderError::unknown_path(web_path))?;
            link.push_str(&self.sub_path(current, index, provider));
        }
        Ok(link)
    }
}

fn parse_web_segment(segment: &str) -> Result<(&str, Option<usize>)> {
    match segment.split_once(':') {
        None => Ok((segment, None)),
        Some((id, index)) => index
            .parse()
            .map(|index| (id, Some(index)))
            .map_err(|_| BuilderError::malformed_path(segment, "index is not a number")),
    }
}
