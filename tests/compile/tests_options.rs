//! Compile options: languages, descriptions, filters and sub-tree compiles.

use webtemplate::am::{AmNode, AmTree};
use webtemplate::{BuilderContext, BuilderError, ExcludePathFilter, compile};

use crate::helpers::am_fixtures::{BLOOD_PRESSURE, BLOOD_PRESSURE_PATH, add_element, vital_signs};
use crate::helpers::template_assertions::{child_ids, node};

fn multilingual() -> AmTree {
    let mut am = AmTree::new(
        AmNode::new("CLUSTER")
            .with_archetype_id("openEHR-EHR-CLUSTER.symptom.v1")
            .with_name("Symptom")
            .with_term("en", "Symptom", Some("A reported symptom"))
            .with_term("de", "Symptom", Some("Ein berichtetes Symptom"))
            .with_term("sl", "Simptom", None),
        "en",
    );
    let root = am.root();
    let element = am.add_child(
        root,
        "items",
        AmNode::new("ELEMENT")
            .with_node_id("at0001")
            .with_name("Severity")
            .with_term("en", "Severity", Some("How bad it is"))
            .with_term("de", "Schweregrad", Some("Wie schlimm"))
            .with_term("sl", "Resnost", None),
    );
    am.add_child(element, "value", AmNode::new("DV_TEXT"));
    am
}

#[test]
fn test_additional_languages_are_collected() {
    let context = BuilderContext::new().with_languages(["de"]);
    let template = compile(&multilingual(), "symptom", &context).unwrap();
    assert_eq!(template.languages, ["en", "de"]);

    let severity = node(&template, "symptom/severity");
    assert_eq!(severity.localized_names.get("de").map(String::as_str), Some("Schweregrad"));
    assert!(!severity.localized_names.contains_key("sl"));
    assert_eq!(
        severity.localized_descriptions.get("de").map(String::as_str),
        Some("Wie schlimm")
    );
}

#[test]
fn test_default_language_selects_localized_name() {
    let context = BuilderContext::new().with_default_language("de");
    let template = compile(&multilingual(), "symptom", &context).unwrap();
    assert_eq!(template.default_language, "de");
    let severity = node(&template, "symptom/severity");
    assert_eq!(severity.localized_name.as_deref(), Some("Schweregrad"));
    // ids follow the constraint name, not the language
    assert_eq!(severity.local_id.as_deref(), Some("severity"));
}

#[test]
fn test_descriptions_can_be_skipped() {
    let context = BuilderContext::new().with_descriptions(false);
    let template = compile(&multilingual(), "symptom", &context).unwrap();
    assert!(template.iter().all(|(_, node)| node.localized_descriptions.is_empty()));
}

#[test]
fn test_excluded_paths_are_not_compiled() {
    let mut am = multilingual();
    let root = am.root();
    add_element(&mut am, root, "at0002", "Onset", "DV_DATE_TIME", None);

    let context = BuilderContext::new().with_filter(ExcludePathFilter::new(["/items[at0001]"]));
    let template = compile(&am, "symptom", &context).unwrap();
    assert_eq!(child_ids(&template, template.root()), ["onset"]);
}

#[test]
fn test_compile_from_sub_tree() {
    let context = BuilderContext::new().with_from(BLOOD_PRESSURE_PATH);
    let template = compile(&vital_signs(), "blood_pressure", &context).unwrap();

    let root = template.tree();
    assert_eq!(root.id, "blood_pressure");
    assert_eq!(root.path, "");
    assert_eq!(root.node_id.as_deref(), Some(BLOOD_PRESSURE));
    let systolic = node(&template, "blood_pressure/any_event/systolic");
    assert_eq!(
        systolic.path,
        "/data[at0001]/events[at0006]/data[at0003]/items[at0004]/value"
    );
}

#[test]
fn test_malformed_from_path() {
    let context = BuilderContext::new().with_from("/content[openEHR");
    let err = compile(&vital_signs(), "x", &context).unwrap_err();
    assert!(matches!(err, BuilderError::MalformedPath { .. }), "got {err:?}");
}
