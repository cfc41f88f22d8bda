//! Error types for web template compilation.

use thiserror::Error;

/// Errors that abort a compile. No partial tree is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    /// A choice child whose owning attribute is not among its parent's attributes.
    #[error("Constraint node for {path} not found among the parent's attributes")]
    UnknownAttribute { path: String },

    /// A path that cannot be parsed.
    #[error("Malformed path '{path}': {message}")]
    MalformedPath { path: String, message: String },

    /// A well-formed path that does not exist in the constraint tree.
    #[error("Unknown path: {path}")]
    UnknownPath { path: String },

    /// No unused suffix was left for an identifier.
    #[error("Unable to deduplicate id={id}")]
    IdSpaceExhausted { id: String },

    /// Compaction removed the whole tree.
    #[error("Web template is empty")]
    EmptyTemplate,
}

impl BuilderError {
    /// Create an unknown attribute error.
    pub fn unknown_attribute(path: impl Into<String>) -> Self {
        Self::UnknownAttribute { path: path.into() }
    }

    /// Create a malformed path error.
    pub fn malformed_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unknown path error.
    pub fn unknown_path(path: impl Into<String>) -> Self {
        Self::UnknownPath { path: path.into() }
    }

    /// Create an id space exhausted error.
    pub fn id_space_exhausted(id: impl Into<String>) -> Self {
        Self::IdSpaceExhausted { id: id.into() }
    }

    /// The path this error refers to, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnknownAttribute { path }
            | Self::MalformedPath { path, .. }
            | Self::UnknownPath { path } => Some(path),
            Self::IdSpaceExhausted { .. } | Self::EmptyTemplate => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BuilderError>;
