//! Foundation types for the web template compiler.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`RmType`] - Closed enumeration of reference model types
//! - [`IntegerRange`] - Occurrence / cardinality ranges
//! - Domain constants (attribute names, input suffixes)
//!
//! This module has NO dependencies on other crate modules.

pub mod constants;
mod range;
mod rm_type;

pub use range::IntegerRange;
pub use rm_type::{DATA_VALUE_PREFIX, RmType};
