//! Declared constraints and default values carried by constraint nodes.

use crate::base::IntegerRange;

/// A coded term allowed by a code list constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct CodedTerm {
    pub code: String,
    pub label: String,
    /// Language -> label.
    pub localized_labels: Vec<(String, String)>,
    /// Instruction states a careflow step may be entered from.
    pub current_states: Vec<String>,
}

impl CodedTerm {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            localized_labels: Vec::new(),
            current_states: Vec::new(),
        }
    }

    pub fn with_label(mut self, language: impl Into<String>, label: impl Into<String>) -> Self {
        self.localized_labels.push((language.into(), label.into()));
        self
    }
}

/// An ordinal / scale value.
#[derive(Clone, Debug, PartialEq)]
pub struct OrdinalTerm {
    pub value: f64,
    pub term: CodedTerm,
}

/// A decimal interval with inclusive/exclusive bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RealInterval {
    pub lower: Option<f64>,
    pub lower_included: bool,
    pub upper: Option<f64>,
    pub upper_included: bool,
}

impl RealInterval {
    /// Inclusive `lower..=upper`.
    pub fn closed(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            lower_included: true,
            upper: Some(upper),
            upper_included: true,
        }
    }
}

/// One allowed unit of a quantity constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityUnit {
    pub units: String,
    pub magnitude: Option<RealInterval>,
    pub precision: Option<IntegerRange>,
}

/// Proportion kinds as defined by the RM (`PROPORTION_KIND`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProportionKind {
    Ratio,
    Unitary,
    Percent,
    Fraction,
    IntegerFraction,
}

impl ProportionKind {
    pub const ALL: [ProportionKind; 5] = [
        ProportionKind::Ratio,
        ProportionKind::Unitary,
        ProportionKind::Percent,
        ProportionKind::Fraction,
        ProportionKind::IntegerFraction,
    ];

    /// Kind for the RM integer code (`0` = ratio ... `4` = integer fraction).
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.get(usize::try_from(code).ok()?).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProportionKind::Ratio => "ratio",
            ProportionKind::Unitary => "unitary",
            ProportionKind::Percent => "percent",
            ProportionKind::Fraction => "fraction",
            ProportionKind::IntegerFraction => "integer_fraction",
        }
    }
}

/// Constraint declared on a constraint node.
#[derive(Clone, Debug, PartialEq)]
pub enum AmConstraint {
    /// Coded values from a terminology. An empty code list with a
    /// terminology id means an external terminology reference.
    CodePhrase {
        terminology: Option<String>,
        codes: Vec<CodedTerm>,
        default: Option<String>,
    },
    /// Free text, optionally restricted to a list or pattern.
    Text {
        list: Vec<String>,
        pattern: Option<String>,
        default: Option<String>,
    },
    Ordinal {
        values: Vec<OrdinalTerm>,
    },
    Quantity {
        units: Vec<QuantityUnit>,
    },
    Count {
        range: Option<IntegerRange>,
    },
    Real {
        range: Option<RealInterval>,
    },
    Boolean {
        true_valid: bool,
        false_valid: bool,
    },
    /// Date, time or date-time with an optional ISO pattern.
    Temporal {
        pattern: Option<String>,
    },
    Duration {
        pattern: Option<String>,
    },
    Proportion {
        kinds: Vec<ProportionKind>,
    },
    Parsable {
        default: Option<String>,
    },
}
