//! JSON writer for compiled web templates.

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::base::IntegerRange;
use crate::model::{
    BindingCodedValue, Cardinality, CodedValue, Input, NodeKey, RangeBound, Validation,
    ValidationRange,
};
use crate::template::WebTemplate;

/// The whole template document.
pub fn template_to_json(template: &WebTemplate) -> Value {
    let mut obj = Map::new();
    obj.insert("templateId".to_string(), json!(template.template_id));
    if let Some(sem_ver) = &template.sem_ver {
        obj.insert("semVer".to_string(), json!(sem_ver));
    }
    obj.insert("version".to_string(), json!(template.version));
    obj.insert("defaultLanguage".to_string(), json!(template.default_language));
    obj.insert("languages".to_string(), json!(template.languages));
    obj.insert("tree".to_string(), node_to_json(template, template.root()));
    Value::Object(obj)
}

/// One node and its subtree.
pub fn node_to_json(template: &WebTemplate, key: NodeKey) -> Value {
    let node = template.node(key);
    let mut obj = Map::new();

    insert_str(&mut obj, "id", node.local_id.as_deref());
    insert_str(&mut obj, "name", node.name.as_deref());
    insert_str(&mut obj, "localizedName", node.localized_name.as_deref());
    obj.insert("rmType".to_string(), json!(node.rm_type.name()));
    insert_str(&mut obj, "nodeId", node.node_id.as_deref());
    obj.insert("min".to_string(), json!(node.occurrences.min.unwrap_or(0)));
    obj.insert("max".to_string(), json!(node.occurrences.json_max()));

    if !node.cardinalities.is_empty() {
        let cardinalities: Vec<Value> = node.cardinalities.iter().map(cardinality_to_json).collect();
        obj.insert("cardinalities".to_string(), Value::Array(cardinalities));
    }
    if let Some(depends_on) = node.depends_on.as_ref().filter(|d| !d.is_empty()) {
        obj.insert("dependsOn".to_string(), json!(depends_on));
    }
    insert_map(&mut obj, "localizedNames", &node.localized_names);
    insert_map(&mut obj, "localizedDescriptions", &node.localized_descriptions);
    insert_map(&mut obj, "annotations", &node.annotations);
    obj.insert("aqlPath".to_string(), json!(node.path));

    if !node.proportion_types.is_empty() {
        let kinds: Vec<&str> = node.proportion_types.iter().map(|kind| kind.as_str()).collect();
        obj.insert("proportionTypes".to_string(), json!(kinds));
    }
    if !node.inputs.is_empty() {
        let inputs: Vec<Value> = node.inputs.iter().map(input_to_json).collect();
        obj.insert("inputs".to_string(), Value::Array(inputs));
    }

    let children: Vec<Value> = template
        .children(key)
        .map(|(child, _)| node_to_json(template, child))
        .collect();
    if !children.is_empty() {
        obj.insert("children".to_string(), Value::Array(children));
    }

    if node.is_in_context() {
        obj.insert("inContext".to_string(), json!(true));
    }
    insert_bindings(&mut obj, &node.term_bindings);
    Value::Object(obj)
}

fn cardinality_to_json(cardinality: &Cardinality) -> Value {
    let mut obj = Map::new();
    obj.insert("min".to_string(), json!(cardinality.range.min.unwrap_or(0)));
    obj.insert("max".to_string(), json!(cardinality.range.json_max()));
    obj.insert("ids".to_string(), json!(cardinality.ids));
    Value::Object(obj)
}

// ============================================================================
// INPUTS
// ============================================================================

fn input_to_json(input: &Input) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "suffix", input.suffix.as_deref());
    obj.insert("type".to_string(), json!(input.input_type.as_str()));
    if !input.list.is_empty() {
        let list: Vec<Value> = input.list.iter().map(coded_value_to_json).collect();
        obj.insert("list".to_string(), Value::Array(list));
    }
    if let Some(list_open) = input.list_open {
        obj.insert("listOpen".to_string(), json!(list_open));
    }
    if let Some(validation) = input.validation.as_ref().filter(|v| !v.is_empty()) {
        obj.insert("validation".to_string(), validation_to_json(validation));
    }
    if input.fixed {
        obj.insert("fixed".to_string(), json!(true));
    }
    insert_str(&mut obj, "defaultValue", input.default_value.as_deref());
    insert_str(&mut obj, "terminology", input.terminology.as_deref());
    if !input.other_terminologies.is_empty() {
        obj.insert("otherTerminologies".to_string(), json!(input.other_terminologies));
    }
    Value::Object(obj)
}

fn coded_value_to_json(value: &CodedValue) -> Value {
    let mut obj = Map::new();
    obj.insert("value".to_string(), json!(value.value));
    insert_str(&mut obj, "label", value.label.as_deref());
    insert_map(&mut obj, "localizedLabels", &value.localized_labels);
    insert_map(&mut obj, "localizedDescriptions", &value.localized_descriptions);
    if let Some(validation) = value.validation.as_ref().filter(|v| !v.is_empty()) {
        obj.insert("validation".to_string(), validation_to_json(validation));
    }
    if let Some(ordinal) = value.ordinal {
        obj.insert("ordinal".to_string(), number(ordinal));
    }
    if !value.current_states.is_empty() {
        obj.insert("currentStates".to_string(), json!(value.current_states));
    }
    insert_bindings(&mut obj, &value.term_bindings);
    Value::Object(obj)
}

fn validation_to_json(validation: &Validation) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "pattern", validation.pattern.as_deref());
    if let Some(range) = validation.range.as_ref().filter(|r| !r.is_empty()) {
        obj.insert("range".to_string(), range_to_json(range));
    }
    if let Some(precision) = validation.precision.as_ref().filter(|p| !p.is_empty()) {
        obj.insert("precision".to_string(), precision_to_json(precision));
    }
    Value::Object(obj)
}

fn range_to_json(range: &ValidationRange) -> Value {
    let mut obj = Map::new();
    insert_str(&mut obj, "minOp", range.min_op);
    if let Some(min) = &range.min {
        obj.insert("min".to_string(), bound_to_json(min));
    }
    insert_str(&mut obj, "maxOp", range.max_op);
    if let Some(max) = &range.max {
        obj.insert("max".to_string(), bound_to_json(max));
    }
    Value::Object(obj)
}

fn precision_to_json(precision: &IntegerRange) -> Value {
    range_to_json(&ValidationRange::from_integers(precision))
}

fn bound_to_json(bound: &RangeBound) -> Value {
    match bound {
        RangeBound::Integer(value) => json!(value),
        RangeBound::Decimal(value) => number(*value),
    }
}

/// Whole decimals are written without a fraction (`0` rather than `0.0`).
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn insert_str(obj: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        obj.insert(key.to_string(), json!(value));
    }
}

fn insert_map(obj: &mut Map<String, Value>, key: &str, map: &IndexMap<String, String>) {
    if !map.is_empty() {
        obj.insert(key.to_string(), json!(map));
    }
}

fn insert_bindings(obj: &mut Map<String, Value>, bindings: &IndexMap<String, BindingCodedValue>) {
    if bindings.is_empty() {
        return;
    }
    let bindings: Map<String, Value> = bindings
        .iter()
        .map(|(terminology, binding)| {
            (
                terminology.clone(),
                json!({ "value": binding.value, "terminologyId": binding.terminology_id }),
            )
        })
        .collect();
    obj.insert("termBindings".to_string(), Value::Object(bindings));
}
