//! # webtemplate-base
//!
//! Compiler from archetype constraint trees to compact web template schema
//! trees.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! builder      → compile entry points, node builder, input builder
//!   ↓
//! ids          → id slugs, per-scope deduplication, reference resolution
//! compact      → flatten, filter, merge and collapse passes
//! postprocess  → per-RM-type structural fix-ups
//!   ↓
//! template     → frozen WebTemplate artifact, lookups, sub-paths
//! model        → schema nodes, inputs, node arena
//!   ↓
//! am           → read-only constraint tree
//!   ↓
//! base         → RmType, IntegerRange, domain constants
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use webtemplate::{AmTree, AmNode, BuilderContext, compile};
//!
//! let am: AmTree = load_constraint_tree();
//! let template = compile(&am, "vital_signs", &BuilderContext::default())?;
//! println!("{}", template.as_json(true)?);
//! ```

// ============================================================================
// MODULES (dependency order: base → am → model → postprocess/compact/ids → builder)
// ============================================================================

/// Foundation types: RmType, IntegerRange, constants
pub mod base;

/// Constraint tree input model
pub mod am;

/// Error types
pub mod error;

/// Schema nodes and inputs
pub mod model;

/// Structural post-processors
pub mod postprocess;

/// Tree compaction
pub mod compact;

/// Id assignment and cross reference resolution
pub mod ids;

/// Compile pipeline and options
pub mod builder;

/// The compiled artifact
pub mod template;

/// JSON interchange format
#[cfg(feature = "interchange")]
pub mod interchange;

// Re-export commonly needed items
pub use am::{AmConstraint, AmNode, AmNodeId, AmTree};
pub use base::{IntegerRange, RmType};
pub use builder::{BuilderContext, ExcludePathFilter, NoopPathFilter, PathFilter, compile, compile_with};
pub use compact::CompactionPolicy;
pub use error::{BuilderError, Result};
pub use ids::{IdDeduplicator, NumericSuffixDeduplicator};
pub use model::{Input, InputType, NodeKey, WebTemplateNode};
pub use template::{ArchetypePredicates, PredicateProvider, WebTemplate};
