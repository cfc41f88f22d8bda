//! ELEMENT: fold a coded/free-text pair and relax polymorphic values.

use crate::base::constants::OTHER_SUFFIX;
use crate::model::{Input, InputType, NodeArena, NodeKey};

pub(super) fn postprocess(nodes: &mut NodeArena, key: NodeKey) {
    let children = nodes.get(key).children.clone();
    if let [first, second] = children[..] {
        let input_type = |child: NodeKey| nodes.get(child).input().map(|input| input.input_type);
        match (input_type(first), input_type(second)) {
            (Some(InputType::CodedText), Some(InputType::Text)) => {
                fold_other_text(nodes, key, first, second)
            }
            (Some(InputType::Text), Some(InputType::CodedText)) => {
                fold_other_text(nodes, key, second, first)
            }
            _ => {}
        }
    }

    // a choice: only one variant is ever present
    if nodes.get(key).children.len() > 1 {
        for child in nodes.get(key).children.clone() {
            nodes.get_mut(child).occurrences.min = Some(0);
        }
    }
}

/// Keep the coded child with an extra "other" text input; drop the text child.
pub(crate) fn fold_other_text(nodes: &mut NodeArena, parent: NodeKey, coded: NodeKey, text: NodeKey) {
    let coded_node = nodes.get_mut(coded);
    coded_node
        .inputs
        .push(Input::with_suffix(InputType::Text, OTHER_SUFFIX));
    if let Some(input) = coded_node.input_mut() {
        input.list_open = Some(true);
    }
    nodes.get_mut(parent).children.retain(|child| *child != text);
    tracing::trace!("folded text alternative into coded text at {}", nodes.get(coded).path);
}
