//! Identifier assignment tests.

use rstest::rstest;
use webtemplate::am::{AmNode, AmTree};
use webtemplate::ids::{IdDeduplicator, NumericSuffix, SuffixIdDeduplicator, base_id_for};
use webtemplate::{BuilderContext, BuilderError, RmType, compile, compile_with};

use crate::helpers::am_fixtures::{add_element, cluster_of, vital_signs};
use crate::helpers::template_assertions::{assert_unique_sibling_ids, child_ids, node};

#[test]
fn test_same_names_are_suffixed_in_order() {
    let am = cluster_of(&["Foo", "Foo", "Foo"]);
    let template = compile(&am, "test", &BuilderContext::default()).unwrap();
    assert_eq!(child_ids(&template, template.root()), ["foo", "foo2", "foo3"]);
    assert_eq!(node(&template, "test/foo3").name.as_deref(), Some("Foo"));
}

#[rstest]
#[case("Blood Pressure", "blood_pressure")]
#[case("Any event", "any_event")]
#[case("24 hour average", "a24_hour_average")]
#[case("(empty)", "empty")]
#[case("", "id")]
fn test_base_ids(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(base_id_for(name), expected);
}

#[rstest]
#[case(RmType::DvQuantity, "quantity_value")]
#[case(RmType::DvCodedText, "coded_text_value")]
#[case(RmType::DvDateTime, "date_time_value")]
#[case(RmType::parse("DV_INTERVAL<DV_COUNT>"), "interval_of_count_value")]
fn test_typed_value_ids(#[case] rm_type: RmType, #[case] expected: &str) {
    assert_eq!(rm_type.typed_value_id(), expected);
}

#[test]
fn test_vital_signs_ids() {
    let template = compile(&vital_signs(), "vital_signs", &BuilderContext::default()).unwrap();
    assert_eq!(template.tree().id, "vital_signs");
    assert_eq!(
        child_ids(&template, template.root()),
        ["blood_pressure", "category", "language"]
    );
    for id in [
        "vital_signs/blood_pressure/any_event/systolic",
        "vital_signs/blood_pressure/any_event/diastolic",
        "vital_signs/blood_pressure/cuff_size",
        "vital_signs/blood_pressure/language",
    ] {
        node(&template, id);
    }
    assert_unique_sibling_ids(&template);
}

#[test]
fn test_compiles_are_deterministic() {
    let am = vital_signs();
    let first = compile(&am, "vital_signs", &BuilderContext::default()).unwrap();
    let second = compile(&am, "vital_signs", &BuilderContext::default()).unwrap();
    let ids = |template: &webtemplate::WebTemplate| -> Vec<String> {
        template.iter().map(|(_, node)| node.id.clone()).collect()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[test]
fn test_value_choice_gets_typed_and_alternative_ids() {
    let mut am = AmTree::new(
        AmNode::new("CLUSTER").with_archetype_id("openEHR-EHR-CLUSTER.device.v1").with_name("Device"),
        "en",
    );
    let root = am.root();
    let element = add_element(&mut am, root, "at0001", "Reading", "DV_QUANTITY", None);
    am.add_child(element, "value", AmNode::new("DV_COUNT"));

    let template = compile(&am, "device", &BuilderContext::default()).unwrap();
    let reading = template.find_by_id("device/reading").unwrap();
    assert_eq!(child_ids(&template, reading), ["quantity_value", "count_value"]);

    let count = node(&template, "device/reading/count_value");
    assert_eq!(count.alternative_id.as_deref(), Some("device/reading/value2"));
    assert_eq!(count.alternative_local_id.as_deref(), Some("value2"));
    // one variant per instance, so neither is mandatory
    assert_eq!(count.occurrences.min, Some(0));
    assert_eq!(node(&template, "device/reading/quantity_value").occurrences.min, Some(0));
}

#[test]
fn test_choice_of_data_value_without_variant() {
    let mut am = AmTree::new(
        AmNode::new("CLUSTER").with_archetype_id("openEHR-EHR-CLUSTER.device.v1").with_name("Device"),
        "en",
    );
    let root = am.root();
    let element = add_element(&mut am, root, "at0001", "Schedule", "DV_TEXT", None);
    am.add_child(element, "value", AmNode::new("DV_PERIODIC_TIME_SPECIFICATION"));

    let template = compile(&am, "device", &BuilderContext::default()).unwrap();
    let schedule = template.find_by_id("device/schedule").unwrap();
    assert_eq!(
        child_ids(&template, schedule),
        ["text_value", "periodic_time_specification_value"]
    );

    let periodic = node(&template, "device/schedule/periodic_time_specification_value");
    assert_eq!(periodic.rm_type.name(), "DV_PERIODIC_TIME_SPECIFICATION");
    assert_eq!(periodic.alternative_id.as_deref(), Some("device/schedule/value2"));
    assert_eq!(periodic.alternative_local_id.as_deref(), Some("value2"));
}

#[test]
fn test_custom_deduplicator_failure_aborts_compile() {
    let am = cluster_of(&["Foo", "Foo", "Foo"]);
    let mut dedup = SuffixIdDeduplicator::new(NumericSuffix { max: 2 });
    let err = compile_with(&am, "test", &BuilderContext::default(), &mut dedup).unwrap_err();
    assert_eq!(err, BuilderError::id_space_exhausted("test/foo"));
}

struct Uppercase;

impl IdDeduplicator for Uppercase {
    fn unique_id(&mut self, _scope: &str, base: &str) -> webtemplate::Result<String> {
        Ok(base.to_uppercase())
    }
}

#[test]
fn test_custom_deduplicator_is_used() {
    let am = cluster_of(&["Foo"]);
    let template = compile_with(&am, "test", &BuilderContext::default(), &mut Uppercase).unwrap();
    assert_eq!(template.tree().id, "TEST");
    node(&template, "TEST/FOO");
}
