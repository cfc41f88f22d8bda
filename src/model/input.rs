//! Input descriptors: UI and validation metadata attached to leaf nodes.

use indexmap::{IndexMap, IndexSet};

use crate::base::IntegerRange;

/// The kind of value an input accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputType {
    Text,
    CodedText,
    Integer,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "TEXT",
            InputType::CodedText => "CODED_TEXT",
            InputType::Integer => "INTEGER",
            InputType::Decimal => "DECIMAL",
            InputType::Boolean => "BOOLEAN",
            InputType::Date => "DATE",
            InputType::Time => "TIME",
            InputType::DateTime => "DATETIME",
        }
    }
}

/// A terminology binding of a node or coded value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingCodedValue {
    pub value: String,
    pub terminology_id: String,
}

/// One entry of an input's coded-value list.
#[derive(Clone, Debug, PartialEq)]
pub struct CodedValue {
    pub value: String,
    pub label: Option<String>,
    pub localized_labels: IndexMap<String, String>,
    pub localized_descriptions: IndexMap<String, String>,
    pub term_bindings: IndexMap<String, BindingCodedValue>,
    pub validation: Option<Validation>,
    /// Numeric value of ordinal / scale entries.
    pub ordinal: Option<f64>,
    /// Careflow steps: instruction states the step may follow.
    pub current_states: Vec<String>,
}

impl CodedValue {
    pub fn new(value: impl Into<String>, label: Option<String>) -> Self {
        Self {
            value: value.into(),
            label,
            localized_labels: IndexMap::new(),
            localized_descriptions: IndexMap::new(),
            term_bindings: IndexMap::new(),
            validation: None,
            ordinal: None,
            current_states: Vec::new(),
        }
    }
}

/// A bound of a validation range.
#[derive(Clone, Debug, PartialEq)]
pub enum RangeBound {
    Integer(i64),
    Decimal(f64),
}

/// A validation range with comparison operators (`>=`, `>`, `<=`, `<`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationRange {
    pub min_op: Option<&'static str>,
    pub min: Option<RangeBound>,
    pub max_op: Option<&'static str>,
    pub max: Option<RangeBound>,
}

impl ValidationRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Inclusive integer range; unset bounds stay open.
    pub fn from_integers(range: &IntegerRange) -> Self {
        Self {
            min_op: range.min.map(|_| ">="),
            min: range.min.map(|v| RangeBound::Integer(i64::from(v))),
            max_op: range.max.map(|_| "<="),
            max: range.max.map(|v| RangeBound::Integer(i64::from(v))),
        }
    }
}

/// Validation rules of an input or coded value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Validation {
    pub pattern: Option<String>,
    pub range: Option<ValidationRange>,
    pub precision: Option<IntegerRange>,
}

impl Validation {
    pub fn is_empty(&self) -> bool {
        self.pattern.is_none() && self.range.is_none() && self.precision.is_none()
    }
}

/// UI / validation metadata of a leaf.
#[derive(Clone, Debug, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub suffix: Option<String>,
    pub list: Vec<CodedValue>,
    /// The coded list also accepts free text.
    pub list_open: Option<bool>,
    pub validation: Option<Validation>,
    /// Only a single value is allowed.
    pub fixed: bool,
    pub default_value: Option<String>,
    /// External terminology the list is taken from.
    pub terminology: Option<String>,
    pub other_terminologies: IndexSet<String>,
}

impl Input {
    pub fn new(input_type: InputType) -> Self {
        Self {
            input_type,
            suffix: None,
            list: Vec::new(),
            list_open: None,
            validation: None,
            fixed: false,
            default_value: None,
            terminology: None,
            other_terminologies: IndexSet::new(),
        }
    }

    pub fn with_suffix(input_type: InputType, suffix: impl Into<String>) -> Self {
        let mut input = Self::new(input_type);
        input.suffix = Some(suffix.into());
        input
    }

    pub fn is_external_terminology(&self) -> bool {
        self.terminology.is_some()
    }

    /// Merge two descriptors of duplicate coded siblings.
    ///
    /// Returns `None` when the pair is ambiguous; callers then keep both
    /// siblings instead of dropping information.
    pub fn merge(first: &Input, second: &Input) -> Option<Input> {
        let mut input = Input::new(first.input_type);
        input.suffix = first.suffix.clone();
        input.terminology = first.terminology.clone().or_else(|| second.terminology.clone());

        input.list = match (first.list.is_empty(), second.list.is_empty()) {
            (true, _) => second.list.clone(),
            (_, true) => first.list.clone(),
            _ => first.list.iter().chain(&second.list).cloned().collect(),
        };

        input.validation = match (&first.validation, &second.validation) {
            (None, other) | (other, None) => other.clone(),
            (Some(_), Some(_)) => return None,
        };

        input.fixed = false;

        input.list_open = if !input.list.is_empty() && input.validation.is_some() {
            Some(true)
        } else if first.list_open != Some(true) && second.list_open.is_some() {
            second.list_open
        } else if second.list_open != Some(true) && first.list_open.is_some() {
            first.list_open
        } else {
            return None;
        };

        Some(input)
    }
}
