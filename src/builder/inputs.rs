//! Input descriptors of leaf nodes.
//!
//! A leaf's inputs are derived from its RM type and the constraint declared
//! on its constraint node. Types without a mapping (and intervals, whose
//! bounds are compiled as children) get no inputs.

use crate::am::{AmConstraint, AmNode, CodedTerm, ProportionKind, QuantityUnit, RealInterval};
use crate::base::constants::LOCAL_TERMINOLOGY;
use crate::base::{IntegerRange, RmType};
use crate::model::{
    CodedValue, Input, InputType, RangeBound, Validation, ValidationRange, WebTemplateNode,
};

/// Duration fields in output order, with their pattern designator and
/// whether they belong to the time part (after `T`).
const DURATION_FIELDS: &[(&str, char, bool)] = &[
    ("year", 'Y', false),
    ("month", 'M', false),
    ("day", 'D', false),
    ("week", 'W', false),
    ("hour", 'H', true),
    ("minute", 'M', true),
    ("second", 'S', true),
];

const IDENTIFIER_FIELDS: &[&str] = &["id", "type", "issuer", "assigner"];
const PARTY_FIELDS: &[&str] = &["id", "id_scheme", "id_namespace", "name"];

/// Attach the inputs of a leaf node.
pub(crate) fn build_inputs(am_node: &AmNode, node: &mut WebTemplateNode, languages: &[String]) {
    let constraint = am_node.constraint.as_ref();
    let inputs = match &node.rm_type {
        RmType::DvText | RmType::DvUri | RmType::DvEhrUri | RmType::DvMultimedia => {
            vec![text_input(constraint, None)]
        }
        RmType::DvParsable => {
            let mut input = text_input(constraint, None);
            if let Some(AmConstraint::Parsable { default }) = constraint {
                input.default_value = default.clone();
            }
            vec![input]
        }
        RmType::DvCodedText | RmType::CodePhrase | RmType::DvState => {
            coded_inputs(constraint, languages)
        }
        RmType::DvOrdinal | RmType::DvScale => vec![ordinal_input(constraint, languages)],
        RmType::DvQuantity => quantity_inputs(constraint),
        RmType::DvCount => vec![integer_input(constraint, None)],
        RmType::DvBoolean => vec![boolean_input(constraint)],
        RmType::DvDateTime => vec![temporal_input(InputType::DateTime, constraint)],
        RmType::DvDate => vec![temporal_input(InputType::Date, constraint)],
        RmType::DvTime => vec![temporal_input(InputType::Time, constraint)],
        RmType::DvDuration => duration_inputs(constraint),
        RmType::DvProportion => {
            let kinds = proportion_kinds(constraint);
            let inputs = proportion_inputs(&kinds);
            node.proportion_types = kinds.into_iter().collect();
            inputs
        }
        RmType::DvIdentifier => IDENTIFIER_FIELDS
            .iter()
            .map(|suffix| Input::with_suffix(InputType::Text, *suffix))
            .collect(),
        RmType::PartyProxy | RmType::PartyIdentified => PARTY_FIELDS
            .iter()
            .map(|suffix| Input::with_suffix(InputType::Text, *suffix))
            .collect(),
        RmType::DvInterval(_) => Vec::new(),
        _ => primitive_input(constraint).into_iter().collect(),
    };
    node.inputs.extend(inputs);
}

// ============================================================================
// TEXT AND CODES
// ============================================================================

fn text_input(constraint: Option<&AmConstraint>, suffix: Option<&str>) -> Input {
    let mut input = Input::new(InputType::Text);
    input.suffix = suffix.map(str::to_owned);
    if let Some(AmConstraint::Text {
        list,
        pattern,
        default,
    }) = constraint
    {
        if let Some(pattern) = pattern {
            input.validation = Some(Validation {
                pattern: Some(pattern.clone()),
                ..Validation::default()
            });
        }
        input.list = list
            .iter()
            .map(|item| CodedValue::new(item.clone(), Some(item.clone())))
            .collect();
        input.fixed = list.len() == 1;
        input.default_value = default.clone();
    }
    input
}

fn coded_value(term: &CodedTerm, languages: &[String]) -> CodedValue {
    let mut value = CodedValue::new(term.code.clone(), Some(term.label.clone()));
    for (language, label) in &term.localized_labels {
        if languages.contains(language) {
            value.localized_labels.insert(language.clone(), label.clone());
        }
    }
    value.current_states = term.current_states.clone();
    value
}

/// `terminology:*` style wildcards never make a list fixed.
fn is_fixed_list(list: &[CodedValue]) -> bool {
    match list {
        [only] => !only.value.ends_with(":*"),
        _ => false,
    }
}

fn coded_inputs(constraint: Option<&AmConstraint>, languages: &[String]) -> Vec<Input> {
    let (terminology, codes, default) = match constraint {
        Some(AmConstraint::CodePhrase {
            terminology,
            codes,
            default,
        }) => (terminology.as_deref(), codes.as_slice(), default.as_deref()),
        _ => (None, &[][..], None),
    };

    if codes.is_empty() {
        // external terminology: code and value are entered as text
        return ["code", "value"]
            .iter()
            .map(|suffix| {
                let mut input = Input::with_suffix(InputType::Text, *suffix);
                input.terminology = terminology.map(str::to_owned);
                if *suffix == "code" {
                    input.default_value = default.map(str::to_owned);
                }
                input
            })
            .collect();
    }

    let mut input = Input::with_suffix(InputType::CodedText, "code");
    input.list = codes.iter().map(|term| coded_value(term, languages)).collect();
    input.fixed = is_fixed_list(&input.list);
    input.default_value = default.map(str::to_owned);
    input.terminology = terminology
        .filter(|terminology| !terminology.trim().is_empty() && *terminology != LOCAL_TERMINOLOGY)
        .map(str::to_owned);
    vec![input]
}

fn ordinal_input(constraint: Option<&AmConstraint>, languages: &[String]) -> Input {
    let mut input = Input::new(InputType::CodedText);
    if let Some(AmConstraint::Ordinal { values }) = constraint {
        input.list = values
            .iter()
            .map(|ordinal| {
                let mut value = coded_value(&ordinal.term, languages);
                value.ordinal = Some(ordinal.value);
                value
            })
            .collect();
        input.fixed = input.list.len() == 1;
    }
    input
}

// ============================================================================
// NUMBERS
// ============================================================================

fn decimal_range(interval: &RealInterval) -> ValidationRange {
    ValidationRange {
        min_op: interval
            .lower
            .map(|_| if interval.lower_included { ">=" } else { ">" }),
        min: interval.lower.map(RangeBound::Decimal),
        max_op: interval
            .upper
            .map(|_| if interval.upper_included { "<=" } else { "<" }),
        max: interval.upper.map(RangeBound::Decimal),
    }
}

fn unit_validation(unit: &QuantityUnit) -> Option<Validation> {
    let range = unit
        .magnitude
        .as_ref()
        .map(decimal_range)
        .filter(|range| !range.is_empty());
    let precision = unit.precision.filter(|precision| !precision.is_empty());
    if range.is_none() && precision.is_none() {
        return None;
    }
    Some(Validation {
        pattern: None,
        range,
        precision,
    })
}

fn quantity_inputs(constraint: Option<&AmConstraint>) -> Vec<Input> {
    let mut magnitude = Input::with_suffix(InputType::Decimal, "magnitude");
    let unit = match constraint {
        Some(AmConstraint::Quantity { units }) => {
            let mut unit = Input::with_suffix(InputType::CodedText, "unit");
            unit.list = units
                .iter()
                .map(|item| {
                    let mut value = CodedValue::new(item.units.clone(), Some(item.units.clone()));
                    value.validation = unit_validation(item);
                    value
                })
                .collect();
            if let [only] = unit.list.as_slice() {
                magnitude.validation = only.validation.clone();
            }
            unit
        }
        _ => Input::with_suffix(InputType::Text, "unit"),
    };
    vec![magnitude, unit]
}

fn integer_input(constraint: Option<&AmConstraint>, suffix: Option<&str>) -> Input {
    let mut input = Input::new(InputType::Integer);
    input.suffix = suffix.map(str::to_owned);
    if let Some(AmConstraint::Count { range: Some(range) }) = constraint {
        if !range.is_empty() {
            input.validation = Some(Validation {
                range: Some(ValidationRange::from_integers(range)),
                ..Validation::default()
            });
        }
        input.fixed = range.is_fixed();
    }
    input
}

fn proportion_kinds(constraint: Option<&AmConstraint>) -> Vec<ProportionKind> {
    match constraint {
        Some(AmConstraint::Proportion { kinds }) if !kinds.is_empty() => kinds.clone(),
        _ => ProportionKind::ALL.to_vec(),
    }
}

fn fixed_integer(value: i32) -> Validation {
    Validation {
        range: Some(ValidationRange::from_integers(&IntegerRange::bounded(value, value))),
        ..Validation::default()
    }
}

fn fixed_decimal(value: f64) -> Validation {
    Validation {
        range: Some(decimal_range(&RealInterval::closed(value, value))),
        ..Validation::default()
    }
}

/// Numerator and denominator; unitary and percent proportions get a fixed
/// denominator.
fn proportion_inputs(kinds: &[ProportionKind]) -> Vec<Input> {
    let integral = kinds.iter().all(|kind| *kind == ProportionKind::IntegerFraction);
    let input_type = if integral {
        InputType::Integer
    } else {
        InputType::Decimal
    };
    let fixed = |value: i32| {
        if integral {
            fixed_integer(value)
        } else {
            fixed_decimal(f64::from(value))
        }
    };

    let numerator = Input::with_suffix(input_type, "numerator");
    let mut denominator = Input::with_suffix(input_type, "denominator");
    let single = kinds
        .iter()
        .all(|kind| matches!(kind, ProportionKind::Unitary | ProportionKind::Percent));
    if single {
        if kinds.len() == 2 {
            for value in [1, 100] {
                let mut coded = CodedValue::new(value.to_string(), Some(value.to_string()));
                coded.validation = Some(fixed(value));
                denominator.list.push(coded);
            }
        } else if kinds.first() == Some(&ProportionKind::Unitary) {
            denominator.validation = Some(fixed(1));
        } else {
            denominator.validation = Some(fixed(100));
        }
    }
    vec![numerator, denominator]
}

// ============================================================================
// OTHER VALUES
// ============================================================================

fn boolean_input(constraint: Option<&AmConstraint>) -> Input {
    let mut input = Input::new(InputType::Boolean);
    if let Some(AmConstraint::Boolean {
        true_valid,
        false_valid,
    }) = constraint
    {
        let only = match (*true_valid, *false_valid) {
            (true, false) => Some("true"),
            (false, true) => Some("false"),
            _ => None,
        };
        if let Some(value) = only {
            input.list.push(CodedValue::new(value, Some(value.to_string())));
            input.fixed = true;
        }
    }
    input
}

fn temporal_input(input_type: InputType, constraint: Option<&AmConstraint>) -> Input {
    let mut input = Input::new(input_type);
    if let Some(AmConstraint::Temporal {
        pattern: Some(pattern),
    }) = constraint
    {
        input.validation = Some(Validation {
            pattern: Some(pattern.clone()),
            ..Validation::default()
        });
    }
    input
}

/// Fields allowed by an ISO 8601 duration pattern such as `PYMDTHM`.
fn duration_fields(pattern: Option<&str>) -> Vec<&'static str> {
    let Some(pattern) = pattern.and_then(|pattern| pattern.strip_prefix('P')) else {
        return DURATION_FIELDS.iter().map(|(name, _, _)| *name).collect();
    };
    let (date, time) = pattern.split_once('T').unwrap_or((pattern, ""));
    DURATION_FIELDS
        .iter()
        .filter(|(_, designator, in_time)| {
            let part = if *in_time { time } else { date };
            part.contains(*designator)
        })
        .map(|(name, _, _)| *name)
        .collect()
}

fn duration_inputs(constraint: Option<&AmConstraint>) -> Vec<Input> {
    let pattern = match constraint {
        Some(AmConstraint::Duration { pattern }) => pattern.as_deref(),
        _ => None,
    };
    duration_fields(pattern)
        .into_iter()
        .map(|field| {
            let mut input = Input::with_suffix(InputType::Integer, field);
            input.validation = Some(Validation {
                range: Some(ValidationRange::from_integers(&IntegerRange::new(Some(0), None))),
                ..Validation::default()
            });
            input
        })
        .collect()
}

/// Primitive constraints on nodes without a typed mapping.
fn primitive_input(constraint: Option<&AmConstraint>) -> Option<Input> {
    match constraint? {
        AmConstraint::Text { .. } => Some(text_input(constraint, None)),
        AmConstraint::Count { .. } => Some(integer_input(constraint, None)),
        AmConstraint::Real { range } => {
            let mut input = Input::new(InputType::Decimal);
            if let Some(range) = range.as_ref().map(decimal_range).filter(|r| !r.is_empty()) {
                input.validation = Some(Validation {
                    range: Some(range),
                    ..Validation::default()
                });
            }
            Some(input)
        }
        AmConstraint::Boolean { .. } => Some(boolean_input(constraint)),
        AmConstraint::Temporal { .. } => Some(temporal_input(InputType::DateTime, constraint)),
        _ => None,
    }
}
