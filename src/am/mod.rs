//! Constraint tree: the read-only input of a compile.
//!
//! A constraint tree describes, for every path of a clinical template, which
//! RM type may appear there, how often, and with which constraints. Nodes
//! live in an arena and are addressed by [`AmNodeId`], so schema nodes can
//! refer back to them without holding references.
//!
//! ```text
//! AmTree
//! ├── nodes: Vec<AmNode>            (root first)
//! └── AmNode
//!     ├── attributes: IndexMap<name, AmAttribute { children: Vec<AmNodeId> }>
//!     ├── constraint: Option<AmConstraint>
//!     └── terms / term_bindings / annotations
//! ```

mod constraint;
mod tree;

pub use constraint::{
    AmConstraint, CodedTerm, OrdinalTerm, ProportionKind, QuantityUnit, RealInterval,
};
pub use tree::{
    AmAttribute, AmNode, AmNodeId, AmTree, PathSegment, TermBinding, TermText, parse_path,
};
