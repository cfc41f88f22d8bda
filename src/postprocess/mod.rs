//! Structural post-processors.
//!
//! Each handler normalizes the already-built children of one node: it may
//! reorder, merge or replace them. Handlers are selected by RM type; types
//! without a handler are left untouched.
//!
//! | RM type                                  | Handler                  |
//! |------------------------------------------|--------------------------|
//! | `ELEMENT`                                | coded/other text merge   |
//! | `ACTION`                                 | protocol dependencies    |
//! | `OBSERVATION`, `EVALUATION`              | context attributes last  |
//! | `INSTRUCTION`                            | same, narrative first    |
//! | `COMPOSITION`                            | category before language |
//! | `EVENT`, `POINT_EVENT`, `INTERVAL_EVENT` | RM attributes last       |
//!
//! Data values are leaves by construction; their inputs come from the input
//! builder and never reach a handler.

mod composition;
mod element;
mod entry;
mod event;

pub(crate) use element::fold_other_text;

use crate::base::RmType;
use crate::model::{NodeArena, NodeKey};

/// Run the handler registered for the node's RM type.
pub fn postprocess(nodes: &mut NodeArena, key: NodeKey) {
    let rm_type = nodes.get(key).rm_type.clone();
    match rm_type {
        RmType::Element => element::postprocess(nodes, key),
        RmType::Action => entry::postprocess_action(nodes, key),
        RmType::Observation | RmType::Evaluation => entry::postprocess_entry(nodes, key, &[]),
        RmType::Instruction => entry::postprocess_entry(
            nodes,
            key,
            crate::base::constants::INSTRUCTION_TRAILING_ATTRIBUTES,
        ),
        RmType::Composition => composition::postprocess(nodes, key),
        RmType::Event | RmType::PointEvent | RmType::IntervalEvent => {
            event::postprocess(nodes, key)
        }
        _ => {}
    }
}

/// Remove the direct RM-attribute children `<parent path>/<attribute>` of
/// `key`, returned in the order of `attributes`.
fn take_attribute_children(
    nodes: &mut NodeArena,
    key: NodeKey,
    attributes: &[&str],
) -> Vec<NodeKey> {
    let parent_path = nodes.get(key).path.clone();
    let mut children = std::mem::take(&mut nodes.get_mut(key).children);
    let mut taken = Vec::new();
    for attribute in attributes {
        let path = format!("{parent_path}/{attribute}");
        let (matching, rest): (Vec<_>, Vec<_>) = children
            .into_iter()
            .partition(|child| nodes.get(*child).path == path);
        taken.extend(matching);
        children = rest;
    }
    nodes.get_mut(key).children = children;
    taken
}
