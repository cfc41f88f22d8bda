//! Arena-backed constraint tree.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::constraint::AmConstraint;
use crate::base::{IntegerRange, RmType};
use crate::error::{BuilderError, Result};

// ============================================================================
// IDS
// ============================================================================

/// Stable handle of a constraint node inside its [`AmTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AmNodeId(u32);

impl AmNodeId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// NODES
// ============================================================================

/// Text and description of a node's term in one language.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TermText {
    pub text: String,
    pub description: Option<String>,
}

/// A binding of a node's term to an external terminology code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TermBinding {
    pub terminology_id: String,
    pub code: String,
}

/// An RM attribute of a constraint node with its allowed children.
#[derive(Clone, Debug, Default)]
pub struct AmAttribute {
    pub existence: Option<IntegerRange>,
    pub cardinality: Option<IntegerRange>,
    pub children: Vec<AmNodeId>,
    /// Attribute added from the RM rather than declared by the archetype.
    pub rm_only: bool,
}

/// A single constraint node.
#[derive(Clone, Debug)]
pub struct AmNode {
    pub parent: Option<AmNodeId>,
    pub rm_type: RmType,
    /// Local at-code of the node (`at0001`).
    pub node_id: Option<String>,
    /// Node id used in path predicates (archetype id for archetype roots).
    pub archetype_node_id: Option<String>,
    pub name: Option<String>,
    /// The node's name is fixed by the template and must appear in paths.
    pub name_constrained: bool,
    /// Declared occurrences; unset bounds carry no information.
    pub occurrences: IntegerRange,
    pub attributes: IndexMap<SmolStr, AmAttribute>,
    pub constraint: Option<AmConstraint>,
    /// Language -> term text of this node's at-code.
    pub terms: IndexMap<String, TermText>,
    pub term_bindings: IndexMap<String, TermBinding>,
    pub annotations: IndexMap<String, String>,
}

impl AmNode {
    pub fn new(rm_type: impl Into<RmType>) -> Self {
        Self {
            parent: None,
            rm_type: rm_type.into(),
            node_id: None,
            archetype_node_id: None,
            name: None,
            name_constrained: false,
            occurrences: IntegerRange::default(),
            attributes: IndexMap::new(),
            constraint: None,
            terms: IndexMap::new(),
            term_bindings: IndexMap::new(),
            annotations: IndexMap::new(),
        }
    }

    /// Set both the at-code and the path node id.
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        self.archetype_node_id = Some(node_id.clone());
        self.node_id = Some(node_id);
        self
    }

    /// Archetype root: the at-code stays `at0000`, paths use the archetype id.
    pub fn with_archetype_id(mut self, archetype_id: impl Into<String>) -> Self {
        self.node_id = Some("at0000".to_string());
        self.archetype_node_id = Some(archetype_id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_occurrences(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.occurrences = IntegerRange::new(min, max);
        self
    }

    pub fn with_constraint(mut self, constraint: AmConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_term(
        mut self,
        language: impl Into<String>,
        text: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        self.terms.insert(
            language.into(),
            TermText {
                text: text.into(),
                description: description.map(str::to_owned),
            },
        );
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_term_binding(
        mut self,
        terminology_id: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        let terminology_id = terminology_id.into();
        self.term_bindings.insert(
            terminology_id.clone(),
            TermBinding {
                terminology_id,
                code: code.into(),
            },
        );
        self
    }
}

// ============================================================================
// TREE
// ============================================================================

/// A constraint tree stored in an arena; the first node is the root.
#[derive(Clone, Debug)]
pub struct AmTree {
    nodes: Vec<AmNode>,
    /// Default language of the source template.
    pub language: String,
}

impl AmTree {
    /// Create a tree consisting of `root` only.
    pub fn new(root: AmNode, language: impl Into<String>) -> Self {
        let mut root = root;
        root.parent = None;
        Self {
            nodes: vec![root],
            language: language.into(),
        }
    }

    pub fn root(&self) -> AmNodeId {
        AmNodeId::new(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: AmNodeId) -> &AmNode {
        &self.nodes[id.index()]
    }

    /// Append `node` under `parent.attribute` and return its id.
    pub fn add_child(&mut self, parent: AmNodeId, attribute: &str, node: AmNode) -> AmNodeId {
        let id = AmNodeId::new(self.nodes.len());
        let mut node = node;
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.index()]
            .attributes
            .entry(SmolStr::new(attribute))
            .or_default()
            .children
            .push(id);
        id
    }

    /// Replace the children of `parent.attribute` with `nodes` and return
    /// their ids. The attribute becomes archetyped; previous children stay in
    /// the arena but are no longer reachable through it.
    pub fn replace_children(
        &mut self,
        parent: AmNodeId,
        attribute: &str,
        nodes: Vec<AmNode>,
    ) -> Vec<AmNodeId> {
        let mut ids = Vec::with_capacity(nodes.len());
        for mut node in nodes {
            node.parent = Some(parent);
            ids.push(AmNodeId::new(self.nodes.len()));
            self.nodes.push(node);
        }
        let attribute = self.attribute_mut(parent, attribute);
        attribute.children = ids.clone();
        attribute.rm_only = false;
        ids
    }

    /// Declare the cardinality of a (possibly not yet populated) attribute.
    pub fn set_cardinality(&mut self, node: AmNodeId, attribute: &str, cardinality: IntegerRange) {
        self.attribute_mut(node, attribute).cardinality = Some(cardinality);
    }

    /// Declare the existence of a (possibly not yet populated) attribute.
    pub fn set_existence(&mut self, node: AmNodeId, attribute: &str, existence: IntegerRange) {
        self.attribute_mut(node, attribute).existence = Some(existence);
    }

    /// Mark an attribute as RM-only (not declared by the archetype).
    pub fn set_rm_only(&mut self, node: AmNodeId, attribute: &str) {
        self.attribute_mut(node, attribute).rm_only = true;
    }

    fn attribute_mut(&mut self, node: AmNodeId, attribute: &str) -> &mut AmAttribute {
        self.nodes[node.index()]
            .attributes
            .entry(SmolStr::new(attribute))
            .or_default()
    }

    pub fn parent(&self, id: AmNodeId) -> Option<AmNodeId> {
        self.get(id).parent
    }

    /// Name of the attribute of `parent` that holds `child`.
    pub fn attribute_name_of(&self, parent: AmNodeId, child: AmNodeId) -> Option<&str> {
        self.get(parent)
            .attributes
            .iter()
            .find(|(_, attribute)| attribute.children.contains(&child))
            .map(|(name, _)| name.as_str())
    }

    /// Resolve an AQL path such as `/content[openEHR-EHR-OBSERVATION.bp.v1]/data`
    /// relative to `from`.
    pub fn resolve_path(&self, from: AmNodeId, path: &str) -> Result<AmNodeId> {
        let mut current = from;
        for segment in parse_path(path)? {
            let attribute = self
                .get(current)
                .attributes
                .get(segment.attribute.as_str())
                .ok_or_else(|| BuilderError::unknown_path(path))?;
            current = attribute
                .children
                .iter()
                .copied()
                .find(|child| segment.matches(self.get(*child)))
                .ok_or_else(|| BuilderError::unknown_path(path))?;
        }
        Ok(current)
    }
}

// ============================================================================
// PATHS
// ============================================================================

/// One `/attribute[node_id,'name']` step of an AQL path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSegment {
    pub attribute: String,
    pub node_id: Option<String>,
    pub name: Option<String>,
}

impl PathSegment {
    fn matches(&self, node: &AmNode) -> bool {
        let id_matches = self
            .node_id
            .as_ref()
            .is_none_or(|id| node.archetype_node_id.as_ref() == Some(id));
        let name_matches = self
            .name
            .as_ref()
            .is_none_or(|name| node.name.as_ref() == Some(name));
        id_matches && name_matches
    }
}

/// Split an AQL path into segments. Brackets may contain `/`.
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return Ok(Vec::new());
    }
    let body = trimmed
        .strip_prefix('/')
        .ok_or_else(|| BuilderError::malformed_path(path, "path must start with '/'"))?;

    let mut raw_segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, ch) in body.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| BuilderError::malformed_path(path, "unbalanced ']'"))?;
            }
            '/' if depth == 0 => {
                raw_segments.push(&body[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(BuilderError::malformed_path(path, "unclosed '['"));
    }
    raw_segments.push(&body[start..]);

    raw_segments
        .into_iter()
        .map(|raw| parse_segment(path, raw))
        .collect()
}

fn parse_segment(path: &str, raw: &str) -> Result<PathSegment> {
    let (attribute, predicate) = match raw.find('[') {
        Some(open) => {
            let predicate = raw[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| BuilderError::malformed_path(path, "trailing text after ']'"))?;
            (&raw[..open], Some(predicate))
        }
        None => (raw, None),
    };
    if attribute.is_empty() {
        return Err(BuilderError::malformed_path(path, "empty attribute name"));
    }

    let (node_id, name) = match predicate {
        None => (None, None),
        Some(predicate) => match predicate.split_once(',') {
            Some((id, name)) => {
                let name = name.trim().trim_matches('\'');
                (Some(id.trim().to_string()), Some(name.to_string()))
            }
            None => (Some(predicate.trim().to_string()), None),
        },
    };

    Ok(PathSegment {
        attribute: attribute.to_string(),
        node_id: node_id.filter(|id| !id.is_empty()),
        name,
    })
}
