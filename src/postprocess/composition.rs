//! COMPOSITION: category goes right before language.

use crate::base::constants::{CATEGORY, LANGUAGE};
use crate::model::{NodeArena, NodeKey};

pub(super) fn postprocess(nodes: &mut NodeArena, key: NodeKey) {
    let parent_path = nodes.get(key).path.clone();
    let category_path = format!("{parent_path}/{CATEGORY}");
    let language_path = format!("{parent_path}/{LANGUAGE}");

    let position = |nodes: &NodeArena, path: &str| {
        nodes
            .children(key)
            .iter()
            .position(|child| nodes.get(*child).path == path)
    };
    let Some(category_index) = position(nodes, &category_path) else {
        return;
    };
    let category = nodes.get_mut(key).children.remove(category_index);
    let target = position(nodes, &language_path).unwrap_or(nodes.children(key).len());
    nodes.get_mut(key).children.insert(target, category);
}
