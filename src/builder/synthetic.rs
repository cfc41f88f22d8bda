//! Constraint nodes an archetype leaves implicit.
//!
//! Runs on the compile's own copy of the constraint tree, before any schema
//! node is built:
//!
//! - an ELEMENT without a declared value accepts any data value and gets one
//!   `value` alternative per concrete data value type;
//! - the archetyped careflow steps of an ACTION are replaced by a single
//!   ISM_TRANSITION holding `current_state`, `transition` and `careflow_step`.

use indexmap::IndexSet;

use super::node_builder::capitalize;
use crate::am::{AmConstraint, AmNode, AmNodeId, AmTree, CodedTerm};
use crate::base::RmType;
use crate::base::constants::{
    ANY_DATA_VALUE_TYPES, CAREFLOW_STEP, CURRENT_STATE, INSTRUCTION_STATES, ISM_TRANSITION,
    LOCAL_TERMINOLOGY, NAME, OPENEHR_TERMINOLOGY, TRANSITION, VALUE,
};

/// Add the implicit nodes of the subtree under `start`.
pub(crate) fn add_implicit_nodes(am: &mut AmTree, start: AmNodeId, language: &str) {
    for id in subtree(am, start) {
        let rm_type = am.get(id).rm_type.clone();
        match rm_type {
            RmType::Element if !has_declared_children(am.get(id)) => add_any_values(am, id),
            RmType::Action => {
                let archetyped = am
                    .get(id)
                    .attributes
                    .get(ISM_TRANSITION)
                    .is_some_and(|attribute| !attribute.rm_only);
                if archetyped {
                    add_ism_transition(am, id, language);
                }
            }
            _ => {}
        }
    }
}

/// Ids of `start` and everything below it, collected before the tree grows.
fn subtree(am: &AmTree, start: AmNodeId) -> Vec<AmNodeId> {
    let mut ids = Vec::new();
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        ids.push(id);
        for attribute in am.get(id).attributes.values() {
            stack.extend(attribute.children.iter().rev().copied());
        }
    }
    ids
}

fn has_declared_children(node: &AmNode) -> bool {
    node.attributes
        .iter()
        .any(|(name, attribute)| !attribute.rm_only && name != NAME && !attribute.children.is_empty())
}

fn add_any_values(am: &mut AmTree, element: AmNodeId) {
    let values = ANY_DATA_VALUE_TYPES
        .iter()
        .map(|rm_type| AmNode::new(*rm_type).with_occurrences(Some(1), Some(1)))
        .collect();
    am.replace_children(element, VALUE, values);
    tracing::trace!("element {element:?} accepts any data value");
}

// ============================================================================
// ISM TRANSITION
// ============================================================================

fn add_ism_transition(am: &mut AmTree, action: AmNodeId, language: &str) {
    let steps = am
        .get(action)
        .attributes
        .get(ISM_TRANSITION)
        .map(|attribute| attribute.children.clone())
        .unwrap_or_default();

    let mut allowed: IndexSet<String> = IndexSet::new();
    let careflow_steps: Vec<CodedTerm> = steps
        .iter()
        .filter_map(|step| careflow_step(am, *step, language))
        .inspect(|term| allowed.extend(term.current_states.iter().cloned()))
        .collect();

    let current_states = if allowed.is_empty() {
        INSTRUCTION_STATES
            .iter()
            .map(|(code, rubric)| CodedTerm::new(*code, *rubric))
            .collect()
    } else {
        allowed
            .into_iter()
            .map(|code| {
                let rubric = instruction_state_rubric(&code).unwrap_or(&code).to_string();
                CodedTerm::new(code, rubric)
            })
            .collect()
    };

    am.replace_children(action, ISM_TRANSITION, Vec::new());
    let ism = am.add_child(
        action,
        ISM_TRANSITION,
        implicit_node("ISM_TRANSITION", ISM_TRANSITION, Some(1)),
    );
    for (attribute, min, terminology, codes) in [
        (CURRENT_STATE, 1, OPENEHR_TERMINOLOGY, current_states),
        (TRANSITION, 0, OPENEHR_TERMINOLOGY, Vec::new()),
        (CAREFLOW_STEP, 0, LOCAL_TERMINOLOGY, careflow_steps),
    ] {
        let constraint = AmConstraint::CodePhrase {
            terminology: Some(terminology.to_string()),
            codes,
            default: None,
        };
        let node = implicit_node("DV_CODED_TEXT", attribute, Some(min)).with_constraint(constraint);
        am.add_child(ism, attribute, node);
    }
}

/// A careflow step coded by its at-code, with the states it may follow.
fn careflow_step(am: &AmTree, id: AmNodeId, language: &str) -> Option<CodedTerm> {
    let step = am.get(id);
    let code = step.node_id.as_deref().filter(|id| !id.trim().is_empty())?;
    let label = step
        .terms
        .get(language)
        .map(|term| term.text.clone())
        .or_else(|| step.name.clone())
        .unwrap_or_else(|| code.to_string());

    let mut term = CodedTerm::new(code, label);
    term.localized_labels = step
        .terms
        .iter()
        .map(|(language, term)| (language.clone(), term.text.clone()))
        .collect();
    term.current_states = declared_current_states(am, step);
    Some(term)
}

/// Codes of the step's `current_state` code list, if it declares one.
fn declared_current_states(am: &AmTree, step: &AmNode) -> Vec<String> {
    let Some(&state) = step
        .attributes
        .get(CURRENT_STATE)
        .and_then(|attribute| attribute.children.first())
    else {
        return Vec::new();
    };
    match &am.get(state).constraint {
        Some(AmConstraint::CodePhrase { codes, .. }) => {
            codes.iter().map(|term| term.code.clone()).collect()
        }
        _ => Vec::new(),
    }
}

fn instruction_state_rubric(code: &str) -> Option<&'static str> {
    INSTRUCTION_STATES
        .iter()
        .find(|(state, _)| *state == code)
        .map(|(_, rubric)| *rubric)
}

fn implicit_node(rm_type: &str, attribute: &str, min: Option<i32>) -> AmNode {
    AmNode::new(rm_type)
        .with_name(capitalize(attribute))
        .with_occurrences(min, Some(1))
}
