//! Data model types for bsondoc.
//!
//! This module contains the core types:
//! - ObjectIds (12-byte unique identifiers)
//! - Values (typed BSON payloads)
//! - Elements (key/value fields)
//! - Documents (ordered element containers)
//! - Builders (ergonomic construction)

pub mod builder;
pub mod document;
pub mod element;
pub mod oid;
pub mod value;

pub use builder::DocumentBuilder;
pub use document::{Document, IntoIter, Iter};
pub use element::Element;
pub use oid::ObjectId;
pub use value::{BinarySubtype, ElementType, Value};
