//! Identifier assignment.
//!
//! Ids are derived from node names, made unique per parent scope, and then
//! used to resolve the path-based cross references (cardinalities and
//! dependencies) into sibling ids.
//!
//! ```text
//! name "Blood Pressure" ──slug──► "blood_pressure"
//!                        ──dedup─► "blood_pressure2"   (second sibling)
//!                        ──scope─► "vitals/blood_pressure2"
//! ```

mod builder;
mod dedup;
mod slug;

pub use builder::IdBuilder;
pub use dedup::{
    IdDeduplicator, NumericSuffix, NumericSuffixDeduplicator, SuffixIdDeduplicator,
    SuffixStrategy,
};
pub use slug::{base_id_for, path_segment_for_name};
