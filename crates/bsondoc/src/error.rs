//! Error types for document construction, validation and ObjectId parsing.

use thiserror::Error;

/// Error raised while validating or sizing a single element.
///
/// Nested documents and arrays report the failure of their first invalid
/// element unchanged, so the `key` is always the innermost offending key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    #[error("element key {key:?} contains a NUL byte")]
    KeyContainsNul { key: String },

    #[error("regex {field} of element {key:?} contains a NUL byte")]
    RegexContainsNul { key: String, field: &'static str },

    #[error("element {key:?} wire size {size} exceeds maximum {max}")]
    SizeOverflow { key: String, size: usize, max: usize },
}

impl ElementError {
    /// Returns the key of the element that failed validation.
    pub fn key(&self) -> &str {
        match self {
            ElementError::KeyContainsNul { key }
            | ElementError::RegexContainsNul { key, .. }
            | ElementError::SizeOverflow { key, .. } => key,
        }
    }
}

/// Error raised by document mutation and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// An absent element was passed where a concrete one was required.
    #[error("element at batch position {index} is absent")]
    InvalidElement { index: usize },

    #[error("cannot validate a nil document")]
    NilDocument,

    #[error("document wire size {size} exceeds limit {limit}")]
    DocumentTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Error raised when parsing an ObjectId from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectIdError {
    /// The input was not exactly 24 hexadecimal characters.
    #[error("invalid ObjectId hex string: {input:?}")]
    InvalidHex { input: String },
}
