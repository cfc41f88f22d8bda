//! Schema nodes and the arena that owns them.

use indexmap::{IndexMap, IndexSet};

use super::input::{BindingCodedValue, Input};
use crate::am::{AmNodeId, ProportionKind};
use crate::base::{IntegerRange, RmType};

// ============================================================================
// KEYS
// ============================================================================

/// Stable handle of a schema node inside a [`NodeArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(u32);

impl NodeKey {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

// ============================================================================
// CARDINALITY
// ============================================================================

/// A repeat-count constraint over the children whose path starts with `path`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cardinality {
    pub range: IntegerRange,
    /// Declaring attribute path, used as a child path prefix.
    pub path: String,
    /// Local ids of the matching children, filled in by the id builder.
    pub ids: Vec<String>,
}

impl Cardinality {
    pub fn new(range: IntegerRange, path: impl Into<String>) -> Self {
        Self {
            range,
            path: path.into(),
            ids: Vec::new(),
        }
    }
}

// ============================================================================
// NODE
// ============================================================================

/// A compiled schema node.
#[derive(Clone, Debug)]
pub struct WebTemplateNode {
    /// Constraint node this schema node was built from.
    pub am_node: AmNodeId,
    pub rm_type: RmType,
    /// AQL path.
    pub path: String,
    pub name: Option<String>,
    pub localized_name: Option<String>,
    pub localized_names: IndexMap<String, String>,
    pub localized_descriptions: IndexMap<String, String>,
    /// Fully qualified id (`root/child/leaf`); empty until ids are built.
    pub id: String,
    /// Id unique among siblings.
    pub local_id: Option<String>,
    /// `<parent id>/value` form of a polymorphic value alternative.
    pub alternative_id: Option<String>,
    pub alternative_local_id: Option<String>,
    pub node_id: Option<String>,
    /// Value is derived from the composition context.
    pub in_context: Option<bool>,
    pub occurrences: IntegerRange,
    pub cardinalities: Vec<Cardinality>,
    /// Path prefixes before id resolution, sibling local ids after it.
    pub depends_on: Option<Vec<String>>,
    pub children: Vec<NodeKey>,
    /// Constraint nodes spanned since the nearest retained ancestor.
    pub chain: Vec<AmNodeId>,
    pub annotations: IndexMap<String, String>,
    pub term_bindings: IndexMap<String, BindingCodedValue>,
    pub proportion_types: IndexSet<ProportionKind>,
    pub inputs: Vec<Input>,
}

impl WebTemplateNode {
    pub fn new(am_node: AmNodeId, rm_type: RmType, path: impl Into<String>) -> Self {
        Self {
            am_node,
            rm_type,
            path: path.into(),
            name: None,
            localized_name: None,
            localized_names: IndexMap::new(),
            localized_descriptions: IndexMap::new(),
            id: String::new(),
            local_id: None,
            alternative_id: None,
            alternative_local_id: None,
            node_id: None,
            in_context: None,
            occurrences: IntegerRange::default(),
            cardinalities: Vec::new(),
            depends_on: None,
            children: Vec::new(),
            chain: Vec::new(),
            annotations: IndexMap::new(),
            term_bindings: IndexMap::new(),
            proportion_types: IndexSet::new(),
            inputs: Vec::new(),
        }
    }

    /// The primary input.
    pub fn input(&self) -> Option<&Input> {
        self.inputs.first()
    }

    pub fn input_mut(&mut self) -> Option<&mut Input> {
        self.inputs.first_mut()
    }

    /// The input with the given suffix.
    pub fn input_with_suffix(&self, suffix: &str) -> Option<&Input> {
        self.inputs
            .iter()
            .find(|input| input.suffix.as_deref() == Some(suffix))
    }

    /// Replace the primary input (or add it when there is none).
    pub fn set_input(&mut self, input: Input) {
        match self.inputs.first_mut() {
            Some(first) => *first = input,
            None => self.inputs.push(input),
        }
    }

    pub fn has_input(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn is_repeating(&self) -> bool {
        self.occurrences.is_repeating()
    }

    pub fn is_in_context(&self) -> bool {
        self.in_context == Some(true)
    }

    /// True when `id` is this node's local id or its alternative local id.
    pub fn local_id_matches(&self, id: &str) -> bool {
        self.local_id.as_deref() == Some(id) || self.alternative_local_id.as_deref() == Some(id)
    }

    /// Append dependency prefixes, creating the list if needed.
    pub fn add_depends_on(&mut self, paths: &[String]) {
        self.depends_on
            .get_or_insert_with(Vec::new)
            .extend(paths.iter().cloned());
    }

    /// Last `/`-delimited segment of the path.
    pub fn last_path_segment(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map_or(self.path.as_str(), |(_, last)| last)
    }
}

impl std::fmt::Display for WebTemplateNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}:{}]",
            self.rm_type,
            self.local_id.as_deref().unwrap_or(""),
            self.name.as_deref().unwrap_or("")
        )
    }
}

// ============================================================================
// ARENA
// ============================================================================

/// Arena storage for schema nodes.
///
/// Nodes removed or replaced during compaction stay allocated but become
/// unreachable; [`NodeArena::retain_reachable`] drops them when the tree is
/// frozen.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<WebTemplateNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: WebTemplateNode) -> NodeKey {
        let key = NodeKey::new(self.nodes.len());
        self.nodes.push(node);
        key
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, key: NodeKey) -> &WebTemplateNode {
        &self.nodes[key.index()]
    }

    pub fn get_mut(&mut self, key: NodeKey) -> &mut WebTemplateNode {
        &mut self.nodes[key.index()]
    }

    /// Two distinct nodes borrowed mutably at once.
    pub fn pair_mut(
        &mut self,
        a: NodeKey,
        b: NodeKey,
    ) -> (&mut WebTemplateNode, &mut WebTemplateNode) {
        assert_ne!(a, b, "pair_mut requires two distinct nodes");
        if a.index() < b.index() {
            let (left, right) = self.nodes.split_at_mut(b.index());
            (&mut left[a.index()], &mut right[0])
        } else {
            let (left, right) = self.nodes.split_at_mut(a.index());
            (&mut right[0], &mut left[b.index()])
        }
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        &self.get(key).children
    }

    /// Rebuild the arena with only the nodes reachable from `root`, numbered
    /// in depth-first pre-order. Returns the new root key.
    pub fn retain_reachable(&mut self, root: NodeKey) -> NodeKey {
        let mut old = std::mem::take(&mut self.nodes);
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            order.push(key);
            stack.extend(old[key.index()].children.iter().rev().copied());
        }

        let mut remap = vec![None; old.len()];
        for (new_index, key) in order.iter().enumerate() {
            remap[key.index()] = Some(NodeKey::new(new_index));
        }

        self.nodes = order
            .iter()
            .map(|key| {
                let mut node = std::mem::replace(
                    &mut old[key.index()],
                    WebTemplateNode::new(AmNodeId::new(0), RmType::Element, ""),
                );
                node.children = node
                    .children
                    .iter()
                    .filter_map(|child| remap[child.index()])
                    .collect();
                node
            })
            .collect();
        NodeKey::new(0)
    }
}
