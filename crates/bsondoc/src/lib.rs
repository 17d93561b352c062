//! bsondoc: ordered BSON documents and ObjectId generation.
//!
//! This crate provides the building blocks that sit underneath BSON commands
//! and replies: an ordered document container that can be mutated and sized
//! against the BSON wire format, and a generator for 12-byte ObjectIds.
//!
//! # Quick Start
//!
//! ```rust
//! use bsondoc::{Document, Element, ObjectId, Value};
//!
//! let mut doc = Document::new();
//! doc.append([Element::new("name", "Alice"), Element::new("age", 42i32)]).unwrap();
//! doc.prepend([Element::new("_id", ObjectId::new())]).unwrap();
//!
//! doc.set(Element::new("age", 43i32));
//! assert_eq!(doc.get("age"), Some(&Value::Int32(43)));
//!
//! let size = doc.validate().unwrap();
//! assert!(size > 5);
//!
//! let id = ObjectId::new();
//! assert_eq!(ObjectId::from_hex(&id.to_hex()).unwrap(), id);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Core data types (ObjectId, Value, Element, Document)
//! - [`validate`]: Size and structure validation entry points
//! - [`error`]: Error types
//! - [`limits`]: Wire-format size limits
//! - [`util`]: RFC 3339 timestamp helpers
//!
//! # Ownership
//!
//! Documents are single-writer: mutation takes `&mut self`. The ObjectId
//! counter is the only process-wide state and is updated atomically, so ids
//! may be generated from any number of threads.
//!
//! # Logging
//!
//! Diagnostic events are emitted through `tracing`; install a subscriber to
//! see them.

pub mod error;
pub mod limits;
pub mod model;
pub mod util;
pub mod validate;

// Re-export commonly used types at crate root
pub use error::{DocumentError, ElementError, ObjectIdError};
pub use model::{
    BinarySubtype, Document, DocumentBuilder, Element, ElementType, ObjectId, Value,
};
pub use validate::{
    validate_document, validate_document_for_server, validate_document_with_limit,
    validate_element,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
