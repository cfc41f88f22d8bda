//! Reference model type names.
//!
//! The compiler only needs to distinguish a closed set of RM types; anything
//! else is carried through as [`RmType::Other`] so that the original name is
//! preserved in the compiled tree.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

/// Prefix shared by all concrete data value type names.
pub const DATA_VALUE_PREFIX: &str = "DV_";

/// A reference model type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RmType {
    // Compositions and entries
    Composition,
    EventContext,
    Section,
    Observation,
    Evaluation,
    Instruction,
    Action,
    AdminEntry,
    Activity,
    IsmTransition,
    InstructionDetails,

    // Data structures
    History,
    Event,
    PointEvent,
    IntervalEvent,
    ItemTree,
    ItemList,
    ItemSingle,
    ItemTable,
    ItemStructure,
    Item,
    Cluster,
    Element,
    List,

    // Data values
    DvText,
    DvCodedText,
    DvQuantity,
    DvCount,
    DvProportion,
    DvOrdinal,
    DvScale,
    DvBoolean,
    DvDateTime,
    DvDate,
    DvTime,
    DvDuration,
    DvIdentifier,
    DvMultimedia,
    DvUri,
    DvEhrUri,
    DvParsable,
    DvState,
    /// `DV_INTERVAL<DV_X>`; the inner type is the interval's bound type.
    DvInterval(Box<RmType>),

    // Support types
    CodePhrase,
    PartyProxy,
    PartyIdentified,
    PartySelf,
    Participation,

    /// Any type the compiler does not special-case.
    Other(SmolStr),
}

/// Name table for every unit variant.
const NAMES: &[(RmType, &str)] = &[
    (RmType::Composition, "COMPOSITION"),
    (RmType::EventContext, "EVENT_CONTEXT"),
    (RmType::Section, "SECTION"),
    (RmType::Observation, "OBSERVATION"),
    (RmType::Evaluation, "EVALUATION"),
    (RmType::Instruction, "INSTRUCTION"),
    (RmType::Action, "ACTION"),
    (RmType::AdminEntry, "ADMIN_ENTRY"),
    (RmType::Activity, "ACTIVITY"),
    (RmType::IsmTransition, "ISM_TRANSITION"),
    (RmType::InstructionDetails, "INSTRUCTION_DETAILS"),
    (RmType::History, "HISTORY"),
    (RmType::Event, "EVENT"),
    (RmType::PointEvent, "POINT_EVENT"),
    (RmType::IntervalEvent, "INTERVAL_EVENT"),
    (RmType::ItemTree, "ITEM_TREE"),
    (RmType::ItemList, "ITEM_LIST"),
    (RmType::ItemSingle, "ITEM_SINGLE"),
    (RmType::ItemTable, "ITEM_TABLE"),
    (RmType::ItemStructure, "ITEM_STRUCTURE"),
    (RmType::Item, "ITEM"),
    (RmType::Cluster, "CLUSTER"),
    (RmType::Element, "ELEMENT"),
    (RmType::List, "LIST"),
    (RmType::DvText, "DV_TEXT"),
    (RmType::DvCodedText, "DV_CODED_TEXT"),
    (RmType::DvQuantity, "DV_QUANTITY"),
    (RmType::DvCount, "DV_COUNT"),
    (RmType::DvProportion, "DV_PROPORTION"),
    (RmType::DvOrdinal, "DV_ORDINAL"),
    (RmType::DvScale, "DV_SCALE"),
    (RmType::DvBoolean, "DV_BOOLEAN"),
    (RmType::DvDateTime, "DV_DATE_TIME"),
    (RmType::DvDate, "DV_DATE"),
    (RmType::DvTime, "DV_TIME"),
    (RmType::DvDuration, "DV_DURATION"),
    (RmType::DvIdentifier, "DV_IDENTIFIER"),
    (RmType::DvMultimedia, "DV_MULTIMEDIA"),
    (RmType::DvUri, "DV_URI"),
    (RmType::DvEhrUri, "DV_EHR_URI"),
    (RmType::DvParsable, "DV_PARSABLE"),
    (RmType::DvState, "DV_STATE"),
    (RmType::CodePhrase, "CODE_PHRASE"),
    (RmType::PartyProxy, "PARTY_PROXY"),
    (RmType::PartyIdentified, "PARTY_IDENTIFIED"),
    (RmType::PartySelf, "PARTY_SELF"),
    (RmType::Participation, "PARTICIPATION"),
];

impl RmType {
    /// Parse an RM type name. Never fails; unknown names become [`RmType::Other`].
    pub fn parse(name: &str) -> Self {
        if let Some(inner) = name
            .strip_prefix("DV_INTERVAL<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return RmType::DvInterval(Box::new(RmType::parse(inner)));
        }
        NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(t, _)| t.clone())
            .unwrap_or_else(|| RmType::Other(SmolStr::new(name)))
    }

    /// The canonical RM type name.
    pub fn name(&self) -> std::borrow::Cow<'static, str> {
        match self {
            RmType::DvInterval(inner) => format!("DV_INTERVAL<{}>", inner.name()).into(),
            RmType::Other(name) => name.to_string().into(),
            unit => NAMES
                .iter()
                .find(|(t, _)| t == unit)
                .map(|(_, n)| std::borrow::Cow::Borrowed(*n))
                .unwrap_or_default(),
        }
    }

    /// Returns true for concrete data value types (everything named `DV_*`),
    /// including ones without a variant of their own.
    pub fn is_data_value(&self) -> bool {
        match self {
            RmType::DvText
            | RmType::DvCodedText
            | RmType::DvQuantity
            | RmType::DvCount
            | RmType::DvProportion
            | RmType::DvOrdinal
            | RmType::DvScale
            | RmType::DvBoolean
            | RmType::DvDateTime
            | RmType::DvDate
            | RmType::DvTime
            | RmType::DvDuration
            | RmType::DvIdentifier
            | RmType::DvMultimedia
            | RmType::DvUri
            | RmType::DvEhrUri
            | RmType::DvParsable
            | RmType::DvState
            | RmType::DvInterval(_) => true,
            RmType::Other(name) => name.starts_with(DATA_VALUE_PREFIX),
            _ => false,
        }
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, RmType::DvInterval(_))
    }

    /// EVENT, POINT_EVENT and INTERVAL_EVENT.
    pub fn is_event(&self) -> bool {
        matches!(
            self,
            RmType::Event | RmType::PointEvent | RmType::IntervalEvent
        )
    }

    /// Structural containers that are dropped when they end up without children.
    pub fn is_removable_when_empty(&self) -> bool {
        matches!(
            self,
            RmType::List
                | RmType::Cluster
                | RmType::Element
                | RmType::ItemTree
                | RmType::ItemList
                | RmType::ItemSingle
                | RmType::ItemTable
                | RmType::ItemStructure
                | RmType::History
                | RmType::PointEvent
                | RmType::IntervalEvent
                | RmType::Event
                | RmType::Item
        )
    }

    /// Containers whose children are always spliced into the parent under the
    /// medium compaction policy.
    pub fn is_always_flattened(&self) -> bool {
        matches!(
            self,
            RmType::ItemTree
                | RmType::ItemList
                | RmType::ItemSingle
                | RmType::ItemTable
                | RmType::ItemStructure
                | RmType::History
        )
    }

    /// Identifier stem used for a polymorphic `value` alternative.
    ///
    /// `DV_QUANTITY` becomes `quantity_value`, `DV_INTERVAL<DV_COUNT>`
    /// becomes `interval_of_count_value`.
    pub fn typed_value_id(&self) -> String {
        match self {
            RmType::DvInterval(inner) => {
                let inner = inner.name();
                let bound = inner.strip_prefix(DATA_VALUE_PREFIX).unwrap_or(&inner);
                format!("interval_of_{}_value", bound.to_lowercase())
            }
            other => {
                let name = other.name();
                let stem = name.strip_prefix(DATA_VALUE_PREFIX).unwrap_or(&name);
                format!("{}_value", stem.to_lowercase())
            }
        }
    }
}

impl fmt::Display for RmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for RmType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RmType::parse(s))
    }
}

impl From<&str> for RmType {
    fn from(s: &str) -> Self {
        RmType::parse(s)
    }
}
