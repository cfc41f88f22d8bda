//! Post-processing of compositions and care entries.

use webtemplate::am::{AmConstraint, AmNode, AmTree, CodedTerm};
use webtemplate::base::IntegerRange;
use webtemplate::{BuilderContext, InputType, compile};

use crate::helpers::am_fixtures::{add_element, element, vital_signs};
use crate::helpers::template_assertions::{assert_input, child_ids, node};

#[test]
fn test_category_moves_before_language() {
    let template = compile(&vital_signs(), "vital_signs", &BuilderContext::default()).unwrap();
    let paths: Vec<&str> = template
        .children(template.root())
        .map(|(_, node)| node.path.as_str())
        .collect();
    assert_eq!(paths[1], "/category");
    assert_eq!(paths[2], "/language");

    let category = node(&template, "vital_signs/category");
    assert!(category.is_in_context());
}

#[test]
fn test_entry_language_is_added_in_context() {
    let template = compile(&vital_signs(), "vital_signs", &BuilderContext::default()).unwrap();
    let observation = template.find_by_id("vital_signs/blood_pressure").unwrap();
    assert_eq!(child_ids(&template, observation).last(), Some(&"language"));

    let language = node(&template, "vital_signs/blood_pressure/language");
    assert_eq!(language.name.as_deref(), Some("Language"));
    assert!(language.is_in_context());
    assert_eq!(language.occurrences, IntegerRange::bounded(1, 1));
}

#[test]
fn test_instruction_narrative_and_expiry_before_context() {
    let mut am = AmTree::new(
        AmNode::new("INSTRUCTION")
            .with_archetype_id("openEHR-EHR-INSTRUCTION.medication_order.v2")
            .with_name("Medication order"),
        "en",
    );
    let root = am.root();
    am.add_child(root, "narrative", AmNode::new("DV_TEXT"));
    let activity = am.add_child(
        root,
        "activities",
        AmNode::new("ACTIVITY").with_node_id("at0001").with_name("Order"),
    );
    let description = am.add_child(activity, "description", AmNode::new("ITEM_TREE").with_node_id("at0002"));
    add_element(&mut am, description, "at0003", "Medication", "DV_TEXT", None);
    am.add_child(root, "expiry_time", AmNode::new("DV_DATE_TIME"));
    am.add_child(root, "language", AmNode::new("CODE_PHRASE"));
    am.set_rm_only(root, "language");
    am.set_existence(root, "language", IntegerRange::bounded(1, 1));

    let template = compile(&am, "medication_order", &BuilderContext::default()).unwrap();
    assert_eq!(
        child_ids(&template, template.root()),
        ["order", "narrative", "expiry_time", "language"]
    );
    node(&template, "medication_order/order/medication");
}

/// ACTION with description and protocol data; `instruction_details` is
/// either declared by the archetype or only required by the RM.
fn procedure(declared_details: bool) -> AmTree {
    let mut am = AmTree::new(
        AmNode::new("COMPOSITION")
            .with_archetype_id("openEHR-EHR-COMPOSITION.report.v1")
            .with_name("Report"),
        "en",
    );
    let root = am.root();
    let action = am.add_child(
        root,
        "content",
        AmNode::new("ACTION")
            .with_archetype_id("openEHR-EHR-ACTION.procedure.v1")
            .with_name("Procedure"),
    );
    let description = am.add_child(action, "description", AmNode::new("ITEM_TREE").with_node_id("at0001"));
    add_element(&mut am, description, "at0002", "Procedure name", "DV_TEXT", None);
    let protocol = am.add_child(action, "protocol", AmNode::new("ITEM_TREE").with_node_id("at0053"));
    add_element(&mut am, protocol, "at0054", "Requestor", "DV_TEXT", None);

    am.add_child(action, "instruction_details", AmNode::new("INSTRUCTION_DETAILS"));
    if !declared_details {
        am.set_rm_only(action, "instruction_details");
        am.set_existence(action, "instruction_details", IntegerRange::bounded(1, 1));
    }
    am
}

#[test]
fn test_protocol_depends_on_instruction_details() {
    let template = compile(&procedure(true), "report", &BuilderContext::default()).unwrap();
    let action = template.find_by_id("report/procedure").unwrap();
    assert_eq!(
        child_ids(&template, action),
        ["procedure_name", "requestor", "instruction_details"]
    );

    let requestor = node(&template, "report/procedure/requestor");
    assert_eq!(
        requestor.depends_on.as_deref(),
        Some(&["instruction_details".to_string()][..])
    );
    assert_eq!(node(&template, "report/procedure/procedure_name").depends_on, None);
}

#[test]
fn test_in_context_siblings_are_not_dependencies() {
    let template = compile(&procedure(false), "report", &BuilderContext::default()).unwrap();
    let details = node(&template, "report/procedure/instruction_details");
    assert!(details.is_in_context());

    let requestor = node(&template, "report/procedure/requestor");
    assert_eq!(requestor.depends_on, None);
}

#[test]
fn test_unconstrained_expiry_time_is_still_built() {
    let mut am = AmTree::new(
        AmNode::new("INSTRUCTION")
            .with_archetype_id("openEHR-EHR-INSTRUCTION.request.v0")
            .with_name("Service request"),
        "en",
    );
    let root = am.root();
    let activity = am.add_child(
        root,
        "activities",
        AmNode::new("ACTIVITY").with_node_id("at0001").with_name("Request"),
    );
    let description = am.add_child(activity, "description", AmNode::new("ITEM_TREE").with_node_id("at0009"));
    add_element(&mut am, description, "at0121", "Service name", "DV_TEXT", None);
    am.add_child(root, "expiry_time", AmNode::new("DV_DATE_TIME"));
    am.set_rm_only(root, "expiry_time");
    am.add_child(root, "guideline_id", AmNode::new("OBJECT_REF"));
    am.set_rm_only(root, "guideline_id");

    let template = compile(&am, "service_request", &BuilderContext::default()).unwrap();
    assert_eq!(child_ids(&template, template.root()), ["request", "expiry_time"]);
    let expiry = node(&template, "service_request/expiry_time");
    assert_input(expiry, None, InputType::DateTime);
    assert!(!expiry.is_in_context());
}

#[test]
fn test_element_without_value_accepts_any_data_value() {
    let mut am = AmTree::new(
        AmNode::new("CLUSTER")
            .with_archetype_id("openEHR-EHR-CLUSTER.annotation.v1")
            .with_name("Annotation"),
        "en",
    );
    let root = am.root();
    am.add_child(root, "items", element("at0001", "Comment"));

    let template = compile(&am, "annotation", &BuilderContext::default()).unwrap();
    let comment = template.find_by_id("annotation/comment").unwrap();
    let ids = child_ids(&template, comment);
    assert_eq!(ids.len(), 18);
    assert_eq!(
        ids[..4],
        ["coded_text_value", "text_value", "multimedia_value", "parsable_value"]
    );
    assert_eq!(ids[10], "quantity_value");
    assert_eq!(ids[17], "scale_value");

    let text = node(&template, "annotation/comment/text_value");
    assert_eq!(text.path, "/items[at0001]/value");
    assert_eq!(text.alternative_id.as_deref(), Some("annotation/comment/value2"));
    // only one alternative is ever present
    assert_eq!(text.occurrences, IntegerRange::new(Some(0), Some(1)));
    assert!(!text.is_in_context());
    assert_input(text, None, InputType::Text);

    let coded = node(&template, "annotation/comment/coded_text_value");
    assert_eq!(coded.alternative_local_id.as_deref(), Some("value"));
    assert_input(coded, Some("code"), InputType::Text);
}

/// ACTION with two archetyped careflow steps, each entered from one state.
fn medication_management(with_steps: bool) -> AmTree {
    let mut am = AmTree::new(
        AmNode::new("ACTION")
            .with_archetype_id("openEHR-EHR-ACTION.medication.v1")
            .with_name("Medication"),
        "en",
    );
    let root = am.root();
    let description = am.add_child(root, "description", AmNode::new("ITEM_TREE").with_node_id("at0017"));
    add_element(&mut am, description, "at0020", "Medication item", "DV_TEXT", None);

    if !with_steps {
        am.add_child(root, "ism_transition", AmNode::new("ISM_TRANSITION"));
        return am;
    }
    for (node_id, name, state) in [("at0005", "Course planned", "526"), ("at0006", "Course started", "245")] {
        let step = am.add_child(
            root,
            "ism_transition",
            AmNode::new("ISM_TRANSITION")
                .with_node_id(node_id)
                .with_term("en", name, None)
                .with_term("de", format!("{name} (de)"), None),
        );
        am.add_child(
            step,
            "current_state",
            AmNode::new("DV_CODED_TEXT").with_constraint(AmConstraint::CodePhrase {
                terminology: Some("openehr".to_string()),
                codes: vec![CodedTerm::new(state, state)],
                default: None,
            }),
        );
    }
    am
}

#[test]
fn test_careflow_steps_become_one_ism_transition() {
    let context = BuilderContext::new().with_languages(["de"]);
    let template = compile(&medication_management(true), "medication", &context).unwrap();
    assert_eq!(
        child_ids(&template, template.root()),
        ["medication_item", "ism_transition"]
    );

    let ism = template.find_by_id("medication/ism_transition").unwrap();
    let ism_node = template.node(ism);
    assert!(ism_node.is_in_context());
    assert_eq!(ism_node.path, "/ism_transition");
    assert_eq!(ism_node.occurrences, IntegerRange::bounded(1, 1));
    assert_eq!(
        child_ids(&template, ism),
        ["current_state", "transition", "careflow_step"]
    );

    let current_state = node(&template, "medication/ism_transition/current_state");
    assert!(current_state.is_in_context());
    assert_eq!(current_state.occurrences, IntegerRange::bounded(1, 1));
    let states = current_state.input_with_suffix("code").unwrap();
    let codes: Vec<(&str, Option<&str>)> = states
        .list
        .iter()
        .map(|value| (value.value.as_str(), value.label.as_deref()))
        .collect();
    assert_eq!(codes, [("526", Some("planned")), ("245", Some("active"))]);
    assert_eq!(states.terminology.as_deref(), Some("openehr"));

    let transition = node(&template, "medication/ism_transition/transition");
    assert_eq!(transition.occurrences, IntegerRange::new(Some(0), Some(1)));
    assert_input(transition, Some("code"), InputType::Text);

    let careflow_step = node(&template, "medication/ism_transition/careflow_step");
    assert_eq!(careflow_step.occurrences, IntegerRange::new(Some(0), Some(1)));
    let steps = careflow_step.input_with_suffix("code").unwrap();
    assert_eq!(steps.input_type, InputType::CodedText);
    assert_eq!(steps.terminology, None);
    assert_eq!(steps.list.len(), 2);
    assert_eq!(steps.list[0].value, "at0005");
    assert_eq!(steps.list[0].label.as_deref(), Some("Course planned"));
    assert_eq!(
        steps.list[0].localized_labels.get("de").map(String::as_str),
        Some("Course planned (de)")
    );
    assert_eq!(steps.list[0].current_states, ["526"]);
    assert_eq!(steps.list[1].current_states, ["245"]);
}

#[test]
fn test_ism_transition_without_steps_allows_every_state() {
    let template = compile(&medication_management(false), "medication", &BuilderContext::default()).unwrap();
    let current_state = node(&template, "medication/ism_transition/current_state");
    let states = current_state.input_with_suffix("code").unwrap();
    assert_eq!(states.list.len(), 10);
    assert_eq!(states.list[0].value, "524");
    assert_eq!(states.list[0].label.as_deref(), Some("initial"));
    assert_eq!(states.list[9].label.as_deref(), Some("expired"));
    assert!(!states.fixed);
}
