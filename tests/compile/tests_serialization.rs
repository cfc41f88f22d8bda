//! JSON output of compiled templates.

#![cfg(feature = "interchange")]

use serde_json::Value;
use webtemplate::{BuilderContext, compile};

use crate::helpers::am_fixtures::vital_signs;

fn vital_signs_json() -> Value {
    let template = compile(&vital_signs(), "vital_signs", &BuilderContext::default())
        .unwrap()
        .with_sem_ver("1.0.0");
    serde_json::to_value(&template).unwrap()
}

fn find<'a>(node: &'a Value, id: &str) -> &'a Value {
    node["children"]
        .as_array()
        .and_then(|children| children.iter().find(|child| child["id"] == id))
        .unwrap_or_else(|| panic!("Expected child '{}'", id))
}

#[test]
fn test_header_fields() {
    let json = vital_signs_json();
    assert_eq!(json["templateId"], "vital_signs");
    assert_eq!(json["semVer"], "1.0.0");
    assert_eq!(json["version"], "2.3");
    assert_eq!(json["defaultLanguage"], "en");
    assert_eq!(json["tree"]["rmType"], "COMPOSITION");
    assert_eq!(json["tree"]["min"], 1);
    assert_eq!(json["tree"]["max"], 1);
}

#[test]
fn test_unbounded_max_is_minus_one() {
    let json = vital_signs_json();
    let event = find(find(&json["tree"], "blood_pressure"), "any_event");
    assert_eq!(event["min"], 0);
    assert_eq!(event["max"], -1);
}

#[test]
fn test_leaf_inputs() {
    let json = vital_signs_json();
    let observation = find(&json["tree"], "blood_pressure");
    let systolic = find(find(observation, "any_event"), "systolic");

    assert_eq!(systolic["rmType"], "DV_QUANTITY");
    assert!(systolic.get("children").is_none());
    let inputs = systolic["inputs"].as_array().unwrap();
    assert_eq!(inputs[0]["suffix"], "magnitude");
    assert_eq!(inputs[0]["type"], "DECIMAL");
    assert_eq!(inputs[0]["validation"]["range"]["minOp"], ">=");
    assert_eq!(inputs[0]["validation"]["range"]["min"], 0);
    assert_eq!(inputs[1]["suffix"], "unit");
    assert_eq!(inputs[1]["list"][0]["value"], "mm[Hg]");

    let cuff = find(observation, "cuff_size");
    assert_eq!(cuff["inputs"][0]["list"].as_array().unwrap().len(), 2);
}

#[test]
fn test_in_context_flag() {
    let json = vital_signs_json();
    assert_eq!(find(&json["tree"], "category")["inContext"], true);
    assert!(find(&json["tree"], "blood_pressure").get("inContext").is_none());
}

#[test]
fn test_output_is_stable() {
    assert_eq!(vital_signs_json(), vital_signs_json());
}
