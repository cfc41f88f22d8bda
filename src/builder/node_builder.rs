//! Raw schema tree construction: one schema node per constraint node.

use super::context::BuilderContext;
use super::inputs::build_inputs;
use crate::am::{AmAttribute, AmNode, AmNodeId, AmTree};
use crate::base::{IntegerRange, RmType, constants};
use crate::model::{BindingCodedValue, Cardinality, NodeArena, NodeKey, WebTemplateNode};
use crate::postprocess::postprocess;

/// Builds the uncompacted schema tree for a constraint subtree.
pub(crate) struct NodeBuilder<'a> {
    am: &'a AmTree,
    context: &'a BuilderContext,
    language: String,
    languages: Vec<String>,
    nodes: NodeArena,
}

impl<'a> NodeBuilder<'a> {
    pub(crate) fn new(am: &'a AmTree, context: &'a BuilderContext) -> Self {
        Self {
            am,
            context,
            language: context.resolve_language(&am.language).to_string(),
            languages: context.all_languages(&am.language),
            nodes: NodeArena::new(),
        }
    }

    /// Build the tree rooted at `root`; the root's path is always empty.
    pub(crate) fn build(mut self, root: AmNodeId) -> (NodeArena, NodeKey) {
        let key = self.build_node(root, String::new());
        (self.nodes, key)
    }

    fn build_node(&mut self, am_id: AmNodeId, path: String) -> NodeKey {
        let key = self.create_node(am_id, path);
        self.build_children(am_id, key);
        key
    }

    // ========================================================================
    // NODE
    // ========================================================================

    fn create_node(&mut self, am_id: AmNodeId, path: String) -> NodeKey {
        let am = self.am;
        let am_node = am.get(am_id);
        let mut node = WebTemplateNode::new(am_id, am_node.rm_type.clone(), path);

        let has_own_terms = am_node
            .node_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        node.name = am_node.name.clone().or_else(|| {
            has_own_terms
                .then(|| am_node.terms.get(&am.language).map(|term| term.text.clone()))
                .flatten()
        });

        // values without their own at-code are labelled by their element
        let term_source = if has_own_terms {
            Some(am_node)
        } else {
            am.parent(am_id)
                .map(|parent| am.get(parent))
                .filter(|parent| parent.rm_type == RmType::Element)
        };
        if let Some(source) = term_source {
            self.set_localized_names(source, &mut node);
        }

        node.node_id = am_node.archetype_node_id.clone();
        node.occurrences = am_node.occurrences;
        node.annotations = am_node.annotations.clone();
        node.term_bindings = am_node
            .term_bindings
            .iter()
            .map(|(terminology, binding)| {
                (
                    terminology.clone(),
                    BindingCodedValue {
                        value: binding.code.clone(),
                        terminology_id: binding.terminology_id.clone(),
                    },
                )
            })
            .collect();

        self.nodes.alloc(node)
    }

    fn set_localized_names(&self, source: &AmNode, node: &mut WebTemplateNode) {
        let name = node.name.clone().or_else(|| source.name.clone());
        node.localized_name = if source.name_constrained {
            name.clone()
        } else {
            source
                .terms
                .get(&self.language)
                .map(|term| term.text.clone())
                .or_else(|| name.clone())
        };

        for language in &self.languages {
            let term = source.terms.get(language);
            let localized = match term {
                Some(term) if !source.name_constrained => Some(term.text.clone()),
                _ if *language == self.language => name.clone(),
                Some(term) => Some(term.text.clone()),
                None => None,
            };
            if let Some(localized) = localized {
                node.localized_names.insert(language.clone(), localized);
            }
            if self.context.add_descriptions {
                if let Some(description) = term.and_then(|term| term.description.clone()) {
                    node.localized_descriptions.insert(language.clone(), description);
                }
            }
        }
    }

    // ========================================================================
    // CHILDREN
    // ========================================================================

    fn build_children(&mut self, am_id: AmNodeId, key: NodeKey) {
        let am = self.am;
        let am_node = am.get(am_id);
        let path = self.nodes.get(key).path.clone();
        let mut children = Vec::new();

        if expands_attributes(&am_node.rm_type) {
            for (attribute, am_attribute) in &am_node.attributes {
                let skipped = am_attribute.rm_only && !is_special_attribute(&am_node.rm_type, attribute);
                if skipped || attribute == constants::NAME {
                    continue;
                }
                for &child in &am_attribute.children {
                    let child_path = format!("{path}/{attribute}{}", archetype_predicate(am.get(child)));
                    if !self.context.filter.accept(&child_path) {
                        tracing::trace!("filtered out {child_path}");
                        continue;
                    }
                    let child_key = self.build_node(child, child_path);
                    if is_context_property(&am_node.rm_type, attribute) {
                        self.nodes.get_mut(child_key).in_context = Some(true);
                    }
                    children.push(child_key);
                }
            }
        }

        if children.is_empty() {
            build_inputs(am_node, self.nodes.get_mut(key), &self.languages);
        }
        if !self.nodes.get(key).has_input() {
            self.add_required_rm_attributes(am_node, &path, &mut children);
        }

        if !children.is_empty() {
            self.nodes.get_mut(key).children = children;
            tracing::trace!("post-processing {} {}", am_node.rm_type, path);
            postprocess(&mut self.nodes, key);
        }

        let cardinalities: Vec<Cardinality> = am_node
            .attributes
            .iter()
            .filter_map(|(attribute, am_attribute)| {
                let range = am_attribute.cardinality?;
                requires_cardinality(range, am_attribute)
                    .then(|| Cardinality::new(range, format!("{path}/{attribute}")))
            })
            .collect();
        self.nodes.get_mut(key).cardinalities = cardinalities;
    }

    /// Mandatory RM attributes the archetype does not declare still need a
    /// node so that they can be populated.
    fn add_required_rm_attributes(
        &mut self,
        am_node: &AmNode,
        path: &str,
        children: &mut Vec<NodeKey>,
    ) {
        for (attribute, am_attribute) in &am_node.attributes {
            let required = am_attribute.rm_only
                && am_attribute.existence.and_then(|existence| existence.min) == Some(1);
            let Some(&child) = am_attribute.children.first() else {
                continue;
            };
            if !required || children.iter().any(|key| self.nodes.get(*key).am_node == child) {
                continue;
            }
            let child_path = format!("{path}/{attribute}{}", archetype_predicate(self.am.get(child)));
            if !self.context.filter.accept(&child_path) {
                continue;
            }

            let key = self.build_node(child, child_path);
            let node = self.nodes.get_mut(key);
            node.name = Some(capitalize(attribute));
            node.in_context = Some(true);
            node.occurrences = IntegerRange::bounded(1, 1);
            children.push(key);
        }
    }
}

/// Data values are leaves, except intervals whose bounds are values.
fn expands_attributes(rm_type: &RmType) -> bool {
    !rm_type.is_data_value() || rm_type.is_interval()
}

/// RM properties normally derived from the composition context.
fn is_context_property(rm_type: &RmType, attribute: &str) -> bool {
    matches!(
        (rm_type, attribute),
        (RmType::Composition, constants::CATEGORY)
            | (RmType::History, constants::ORIGIN)
            | (RmType::Action, constants::ISM_TRANSITION)
            | (
                RmType::IsmTransition,
                constants::CURRENT_STATE | constants::TRANSITION | constants::CAREFLOW_STEP
            )
    )
}

/// RM attributes built even when the archetype leaves them unconstrained.
fn is_special_attribute(rm_type: &RmType, attribute: &str) -> bool {
    matches!((rm_type, attribute), (RmType::Instruction, constants::EXPIRY_TIME))
}

/// `[node_id]`, or `[node_id,'name']` for name-constrained nodes.
pub(crate) fn archetype_predicate(node: &AmNode) -> String {
    match node.archetype_node_id.as_deref().map(str::trim) {
        None | Some("") => String::new(),
        Some(id) => match node.name.as_deref().filter(|_| node.name_constrained) {
            Some(name) => format!("[{id},'{name}']"),
            None => format!("[{id}]"),
        },
    }
}

/// Only attributes whose cardinality actually restricts the declared
/// children need a cardinality record.
fn requires_cardinality(range: IntegerRange, attribute: &AmAttribute) -> bool {
    let Some(min) = range.min.filter(|min| *min > 0) else {
        return false;
    };
    let count = attribute.children.len();
    if min == 1 && range.max == Some(1) && count == 1 {
        return false;
    }
    min > 1 || range.max.is_some_and(|max| usize::try_from(max).is_ok_and(|max| max < count))
}

pub(crate) fn capitalize(attribute: &str) -> String {
    let mut chars = attribute.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
