//! Domain constants: RM attribute names and input suffixes.

// ============================================================================
// ATTRIBUTE NAMES
// ============================================================================

pub const VALUE: &str = "value";
pub const NAME: &str = "name";
pub const DEFINING_CODE: &str = "defining_code";
pub const CATEGORY: &str = "category";
pub const LANGUAGE: &str = "language";
pub const PROTOCOL: &str = "protocol";
pub const INSTRUCTION_DETAILS: &str = "instruction_details";
pub const ORIGIN: &str = "origin";
pub const EXPIRY_TIME: &str = "expiry_time";
pub const ISM_TRANSITION: &str = "ism_transition";
pub const CURRENT_STATE: &str = "current_state";
pub const TRANSITION: &str = "transition";
pub const CAREFLOW_STEP: &str = "careflow_step";

/// Event attributes that are filled from the RM rather than the archetype.
pub const EVENT_RM_ATTRIBUTES: &[&str] = &["time", "width", "math_function"];

/// Entry attributes that are normally taken from the composition context.
pub const ENTRY_CONTEXT_ATTRIBUTES: &[&str] = &[
    "language",
    "encoding",
    "subject",
    "provider",
    "other_participations",
    "work_flow_id",
    "guideline_id",
];

/// Instruction attributes placed right before the context block.
pub const INSTRUCTION_TRAILING_ATTRIBUTES: &[&str] = &["narrative", "expiry_time"];

/// Value alternatives of an ELEMENT whose value is left unconstrained.
pub const ANY_DATA_VALUE_TYPES: &[&str] = &[
    "DV_CODED_TEXT",
    "DV_TEXT",
    "DV_MULTIMEDIA",
    "DV_PARSABLE",
    "DV_STATE",
    "DV_BOOLEAN",
    "DV_IDENTIFIER",
    "DV_URI",
    "DV_EHR_URI",
    "DV_DURATION",
    "DV_QUANTITY",
    "DV_COUNT",
    "DV_PROPORTION",
    "DV_DATE_TIME",
    "DV_DATE",
    "DV_TIME",
    "DV_ORDINAL",
    "DV_SCALE",
];

// ============================================================================
// TERMINOLOGY
// ============================================================================

pub const OPENEHR_TERMINOLOGY: &str = "openehr";
pub const LOCAL_TERMINOLOGY: &str = "local";

/// The openEHR "instruction states" group: code and English rubric.
pub const INSTRUCTION_STATES: &[(&str, &str)] = &[
    ("524", "initial"),
    ("526", "planned"),
    ("527", "postponed"),
    ("528", "cancelled"),
    ("529", "scheduled"),
    ("245", "active"),
    ("530", "suspended"),
    ("531", "aborted"),
    ("532", "completed"),
    ("533", "expired"),
];

// ============================================================================
// INPUTS
// ============================================================================

/// Suffix of the free-text input added next to an open coded list.
pub const OTHER_SUFFIX: &str = "other";

/// Version stamped on compiled web templates.
pub const WEB_TEMPLATE_VERSION: &str = "2.3";
