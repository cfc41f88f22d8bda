//! Assertion helpers over compiled templates.

use webtemplate::{InputType, NodeKey, WebTemplate, WebTemplateNode};

/// Look up a node by its full id, failing with the list of known ids.
pub fn node<'a>(template: &'a WebTemplate, id: &str) -> &'a WebTemplateNode {
    let key = template.find_by_id(id).unwrap_or_else(|| {
        let ids: Vec<_> = template.iter().map(|(_, node)| node.id.as_str()).collect();
        panic!("Expected node '{}' in {:?}", id, ids)
    });
    template.node(key)
}

/// Local ids of the children of `key`, in order.
pub fn child_ids(template: &WebTemplate, key: NodeKey) -> Vec<&str> {
    template
        .children(key)
        .map(|(_, node)| node.local_id.as_deref().unwrap_or(""))
        .collect()
}

/// Assert the input with `suffix` exists and has the expected type.
pub fn assert_input(node: &WebTemplateNode, suffix: Option<&str>, expected: InputType) {
    let input = node
        .inputs
        .iter()
        .find(|input| input.suffix.as_deref() == suffix)
        .unwrap_or_else(|| panic!("Expected input {:?} on '{}'", suffix, node.id));
    assert_eq!(
        input.input_type, expected,
        "Expected input {:?} on '{}' to be {:?}",
        suffix, node.id, expected
    );
}

/// Assert that local ids are unique among the children of every node.
pub fn assert_unique_sibling_ids(template: &WebTemplate) {
    for (key, node) in template.iter() {
        let mut ids = child_ids(template, key);
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count, "Duplicate child ids under '{}'", node.id);
    }
}
