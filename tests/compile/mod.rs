//! Compile pipeline tests
//!
//! End-to-end compiles of constraint tree fixtures:
//! - Identifier assignment and deduplication
//! - Compaction (collapse, merges, flattening)
//! - Entry and composition post-processing
//! - Compile options
//! - JSON output

pub mod tests_compaction;
pub mod tests_entries;
pub mod tests_ids;
pub mod tests_options;
pub mod tests_serialization;
