//! EVENT family: RM attributes follow the archetyped data.

use super::take_attribute_children;
use crate::base::constants::EVENT_RM_ATTRIBUTES;
use crate::model::{NodeArena, NodeKey};

pub(super) fn postprocess(nodes: &mut NodeArena, key: NodeKey) {
    let trailing = take_attribute_children(nodes, key, EVENT_RM_ATTRIBUTES);
    nodes.get_mut(key).children.extend(trailing);
}
