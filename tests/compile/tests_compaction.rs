//! Compaction tests: collapse, sibling merges, flattening and cardinalities.

use webtemplate::am::{AmNode, AmTree};
use webtemplate::base::IntegerRange;
use webtemplate::model::RangeBound;
use webtemplate::{BuilderContext, BuilderError, CompactionPolicy, InputType, RmType, compile};

use crate::helpers::am_fixtures::{add_element, cluster_of, element, local_codes, vital_signs};
use crate::helpers::template_assertions::{assert_input, child_ids, node};

#[test]
fn test_quantity_element_becomes_leaf() {
    let template = compile(&vital_signs(), "vital_signs", &BuilderContext::default()).unwrap();
    let systolic = node(&template, "vital_signs/blood_pressure/any_event/systolic");

    assert_eq!(systolic.rm_type, RmType::DvQuantity);
    assert_eq!(systolic.name.as_deref(), Some("Systolic"));
    assert_eq!(systolic.localized_name.as_deref(), Some("Systolic"));
    assert_eq!(systolic.node_id.as_deref(), Some("at0004"));
    assert_eq!(
        systolic.path,
        "/content[openEHR-EHR-OBSERVATION.blood_pressure.v2]/data[at0001]/events[at0006]/data[at0003]/items[at0004]/value"
    );
    // the element was 0..1; its value is mandatory once the element exists
    assert_eq!(systolic.occurrences, IntegerRange::bounded(1, 1));

    assert_input(systolic, Some("magnitude"), InputType::Decimal);
    assert_input(systolic, Some("unit"), InputType::CodedText);
    let magnitude = systolic.input_with_suffix("magnitude").unwrap();
    let range = magnitude.validation.as_ref().unwrap().range.as_ref().unwrap();
    assert_eq!(range.min, Some(RangeBound::Decimal(0.0)));
    assert_eq!(range.max_op, Some("<="));
}

#[test]
fn test_element_collapses_into_data_value_without_variant() {
    let mut am = AmTree::new(
        AmNode::new("CLUSTER").with_archetype_id("openEHR-EHR-CLUSTER.device.v1").with_name("Device"),
        "en",
    );
    let root = am.root();
    add_element(&mut am, root, "at0001", "Schedule", "DV_GENERAL_TIME_SPECIFICATION", None);

    let template = compile(&am, "device", &BuilderContext::default()).unwrap();
    let schedule = node(&template, "device/schedule");
    assert_eq!(schedule.rm_type.name(), "DV_GENERAL_TIME_SPECIFICATION");
    assert_eq!(schedule.path, "/items[at0001]/value");
    assert!(template.children(template.find_by_id("device/schedule").unwrap()).next().is_none());
}

#[test]
fn test_structures_and_history_are_flattened() {
    let template = compile(&vital_signs(), "vital_signs", &BuilderContext::default()).unwrap();
    let observation = template.find_by_id("vital_signs/blood_pressure").unwrap();
    assert_eq!(
        child_ids(&template, observation),
        ["any_event", "cuff_size", "language"]
    );
    assert!(
        template
            .iter()
            .all(|(_, node)| !matches!(node.rm_type, RmType::History | RmType::ItemTree))
    );
}

#[test]
fn test_single_event_is_flattened() {
    let mut am = AmTree::new(
        AmNode::new("OBSERVATION")
            .with_archetype_id("openEHR-EHR-OBSERVATION.weight.v1")
            .with_name("Weight"),
        "en",
    );
    let root = am.root();
    let history = am.add_child(root, "data", AmNode::new("HISTORY").with_node_id("at0002"));
    let event = am.add_child(
        history,
        "events",
        AmNode::new("POINT_EVENT")
            .with_node_id("at0003")
            .with_name("Any event")
            .with_occurrences(Some(0), Some(1)),
    );
    let tree = am.add_child(event, "data", AmNode::new("ITEM_TREE").with_node_id("at0001"));
    add_element(&mut am, tree, "at0004", "Weight", "DV_QUANTITY", None);

    let template = compile(&am, "weight", &BuilderContext::default()).unwrap();
    assert_eq!(child_ids(&template, template.root()), ["weight"]);
    let weight = node(&template, "weight/weight");
    assert_eq!(weight.rm_type, RmType::DvQuantity);
    // chain spans everything spliced out since the root
    assert_eq!(weight.chain.len(), 5);
}

#[test]
fn test_coded_text_with_text_alternative_gets_other_input() {
    let mut am = AmTree::new(
        AmNode::new("CLUSTER").with_archetype_id("openEHR-EHR-CLUSTER.finding.v1").with_name("Finding"),
        "en",
    );
    let root = am.root();
    let status = am.add_child(root, "items", element("at0001", "Status"));
    am.add_child(
        status,
        "value",
        AmNode::new("DV_CODED_TEXT").with_constraint(local_codes(&[("at0002", "Present"), ("at0003", "Absent")])),
    );
    am.add_child(status, "value", AmNode::new("DV_TEXT"));

    let template = compile(&am, "finding", &BuilderContext::default()).unwrap();
    assert_eq!(child_ids(&template, template.root()), ["status"]);
    let status = node(&template, "finding/status");
    assert_eq!(status.rm_type, RmType::DvCodedText);
    assert_eq!(status.inputs.len(), 2);
    assert_input(status, Some("code"), InputType::CodedText);
    assert_input(status, Some("other"), InputType::Text);
    assert_eq!(status.input().unwrap().list_open, Some(true));
}

#[test]
fn test_cardinality_ids_are_resolved() {
    let mut am = cluster_of(&["A", "B", "C"]);
    let root = am.root();
    am.set_cardinality(root, "items", IntegerRange::bounded(1, 2));

    let template = compile(&am, "test", &BuilderContext::default()).unwrap();
    let cardinalities = &template.tree().cardinalities;
    assert_eq!(cardinalities.len(), 1);
    assert_eq!(cardinalities[0].range, IntegerRange::bounded(1, 2));
    assert_eq!(cardinalities[0].ids, ["a", "b", "c"]);
}

#[test]
fn test_cardinality_without_matches_is_dropped() {
    let mut am = cluster_of(&["Kept"]);
    let root = am.root();
    // a cluster without items is removed by compaction
    am.add_child(
        root,
        "parts",
        AmNode::new("CLUSTER").with_node_id("at0009").with_name("Empty"),
    );
    am.set_cardinality(root, "parts", IntegerRange::unbounded(2));

    let template = compile(&am, "test", &BuilderContext::default()).unwrap();
    assert_eq!(child_ids(&template, template.root()), ["kept"]);
    assert!(template.tree().cardinalities.is_empty());
}

#[test]
fn test_everything_removed_is_an_error() {
    let am = AmTree::new(AmNode::new("CLUSTER").with_archetype_id("openEHR-EHR-CLUSTER.x.v1"), "en");
    let err = compile(&am, "x", &BuilderContext::default()).unwrap_err();
    assert_eq!(err, BuilderError::EmptyTemplate);
}

#[test]
fn test_minimal_policy_keeps_elements_and_structures() {
    let context = BuilderContext::new().with_policy(CompactionPolicy::Minimal);
    let template = compile(&vital_signs(), "vital_signs", &context).unwrap();

    let element = template
        .find_by_path(
            "/content[openEHR-EHR-OBSERVATION.blood_pressure.v2]/data[at0001]/events[at0006]/data[at0003]/items[at0004]",
        )
        .unwrap();
    assert_eq!(template.node(element).rm_type, RmType::Element);
    assert_eq!(template.children(element).count(), 1);
    assert!(template.iter().any(|(_, node)| node.rm_type == RmType::History));
}
