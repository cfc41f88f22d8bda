//! Care entries: ACTION dependencies and the RM context block of
//! OBSERVATION, EVALUATION and INSTRUCTION.

use super::take_attribute_children;
use crate::base::constants::{ENTRY_CONTEXT_ATTRIBUTES, INSTRUCTION_DETAILS, PROTOCOL};
use crate::model::{NodeArena, NodeKey};

/// Protocol data depends on the instruction details being present.
pub(super) fn postprocess_action(nodes: &mut NodeArena, key: NodeKey) {
    let path = nodes.get(key).path.clone();
    let protocol = format!("{path}/{PROTOCOL}");
    let details = vec![format!("{path}/{INSTRUCTION_DETAILS}")];
    for child in nodes.get(key).children.clone() {
        let child = nodes.get_mut(child);
        if child.path.starts_with(&protocol) {
            child.depends_on = Some(details.clone());
        }
    }
}

/// Move `leading` and then the context attributes to the end, flagging the
/// context attributes as in-context.
pub(super) fn postprocess_entry(nodes: &mut NodeArena, key: NodeKey, leading: &[&str]) {
    let leading = take_attribute_children(nodes, key, leading);
    let context = take_attribute_children(nodes, key, ENTRY_CONTEXT_ATTRIBUTES);
    for child in &context {
        nodes.get_mut(*child).in_context = Some(true);
    }
    let children = &mut nodes.get_mut(key).children;
    children.extend(leading);
    children.extend(context);
}
