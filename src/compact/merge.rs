//! Sibling merges of alternative representations of the same value.

use indexmap::IndexMap;

use crate::base::RmType;
use crate::base::constants::DEFINING_CODE;
use crate::model::{Input, NodeArena, NodeKey};
use crate::postprocess::fold_other_text;

/// Run both sibling merges over the children of `key`.
pub(super) fn merge_alternative_siblings(nodes: &mut NodeArena, key: NodeKey) {
    merge_coded_text_with_other(nodes, key);
    merge_duplicate_coded_texts(nodes, key);
}

/// Remainder of `b` starting at the first character where it differs from
/// `a`; empty when `b` is equal to or a prefix of `a`.
pub(super) fn difference<'b>(a: &str, b: &'b str) -> &'b str {
    let index = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((index, _), _)| index);
    match index {
        Some(index) => &b[index..],
        None if b.len() > a.len() => &b[a.len()..],
        None => "",
    }
}

/// A DV_TEXT and a DV_CODED_TEXT for the same attribute become one coded
/// child with an "other" text input.
fn merge_coded_text_with_other(nodes: &mut NodeArena, key: NodeKey) {
    let &[first, second] = nodes.children(key) else {
        return;
    };
    let (coded, text) = match (&nodes.get(first).rm_type, &nodes.get(second).rm_type) {
        (RmType::DvCodedText, RmType::DvText) => (first, second),
        (RmType::DvText, RmType::DvCodedText) => (second, first),
        _ => return,
    };
    let diff = difference(&nodes.get(first).path, &nodes.get(second).path);
    if diff.is_empty() || diff == format!("/{DEFINING_CODE}") {
        fold_other_text(nodes, key, coded, text);
    }
}

/// Two coded children at the same `defining_code` path collapse into one
/// when it is unambiguous which one to keep or how to merge them.
fn merge_duplicate_coded_texts(nodes: &mut NodeArena, key: NodeKey) {
    let mut by_path: IndexMap<String, Vec<NodeKey>> = IndexMap::new();
    for child in nodes.children(key) {
        by_path
            .entry(nodes.get(*child).path.clone())
            .or_default()
            .push(*child);
    }

    for (path, group) in by_path {
        let &[first, second] = group.as_slice() else {
            continue;
        };
        if !path.ends_with(DEFINING_CODE) {
            continue;
        }

        let dropped = match (is_constrained(nodes, first), is_constrained(nodes, second)) {
            (true, false) => second,
            (false, true) => first,
            _ => {
                let (Some(a), Some(b)) = (nodes.get(first).input(), nodes.get(second).input())
                else {
                    continue;
                };
                let Some(merged) = Input::merge(a, b) else {
                    tracing::trace!("keeping both coded alternatives at {path}");
                    continue;
                };
                nodes.get_mut(first).set_input(merged);
                second
            }
        };
        tracing::trace!("merged duplicate coded alternatives at {path}");
        nodes.get_mut(key).children.retain(|child| *child != dropped);
    }
}

fn is_constrained(nodes: &NodeArena, key: NodeKey) -> bool {
    nodes
        .get(key)
        .input()
        .is_some_and(|input| input.validation.is_some())
}
