//! Schema model: the compiled, consumer-facing tree.
//!
//! ## Key Types
//!
//! - [`WebTemplateNode`] - one compiled node (ids, occurrences, inputs, children)
//! - [`NodeArena`] / [`NodeKey`] - arena storage; children refer to each other by key
//! - [`Cardinality`] - repeat-count constraint over a path-prefixed subset of children
//! - [`Input`] - UI / validation metadata of a leaf

mod input;
mod node;

pub use input::{
    BindingCodedValue, CodedValue, Input, InputType, RangeBound, Validation, ValidationRange,
};
pub use node::{Cardinality, NodeArena, NodeKey, WebTemplateNode};
