//! Builder API for ergonomic Document construction.
//!
//! # Example
//!
//! ```rust
//! use bsondoc::{DocumentBuilder, ObjectId};
//!
//! let doc = DocumentBuilder::new()
//!     .object_id("_id", ObjectId::new())
//!     .string("name", "Alice")
//!     .int32("age", 42)
//!     .document("address", |a| a
//!         .string("city", "Lisbon")
//!         .string("country", "PT")
//!     )
//!     .array("tags", ["admin", "ops"])
//!     .build();
//!
//! assert_eq!(doc.len(), 5);
//! assert!(doc.validate().is_ok());
//! ```

use crate::model::{BinarySubtype, Document, Element, ObjectId, Value};

/// Fluent builder that appends elements in call order.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing document; new fields go after its elements.
    pub fn from_document(doc: Document) -> Self {
        Self { doc }
    }

    /// Appends a field with any value convertible into [`Value`].
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.doc.push_back(Element::new(key, value));
        self
    }

    /// Appends a field only when the value is non-empty.
    pub fn field_omit_empty(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.doc.append_omit_empty([Element::new(key, value)]);
        self
    }

    // =========================================================================
    // Scalars
    // =========================================================================

    pub fn double(self, key: impl Into<String>, value: f64) -> Self {
        self.field(key, Value::Double(value))
    }

    pub fn string(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.field(key, Value::String(value.into()))
    }

    pub fn boolean(self, key: impl Into<String>, value: bool) -> Self {
        self.field(key, Value::Boolean(value))
    }

    pub fn int32(self, key: impl Into<String>, value: i32) -> Self {
        self.field(key, Value::Int32(value))
    }

    pub fn int64(self, key: impl Into<String>, value: i64) -> Self {
        self.field(key, Value::Int64(value))
    }

    pub fn null(self, key: impl Into<String>) -> Self {
        self.field(key, Value::Null)
    }

    pub fn object_id(self, key: impl Into<String>, id: ObjectId) -> Self {
        self.field(key, Value::ObjectId(id))
    }

    /// Appends a DateTime field (milliseconds since the Unix epoch).
    pub fn datetime(self, key: impl Into<String>, epoch_ms: i64) -> Self {
        self.field(key, Value::DateTime(epoch_ms))
    }

    pub fn timestamp(self, key: impl Into<String>, time: u32, increment: u32) -> Self {
        self.field(key, Value::Timestamp { time, increment })
    }

    pub fn binary(self, key: impl Into<String>, subtype: BinarySubtype, bytes: impl Into<Vec<u8>>) -> Self {
        self.field(key, Value::Binary {
            subtype,
            bytes: bytes.into(),
        })
    }

    pub fn regex(self, key: impl Into<String>, pattern: impl Into<String>, options: impl Into<String>) -> Self {
        self.field(key, Value::Regex {
            pattern: pattern.into(),
            options: options.into(),
        })
    }

    // =========================================================================
    // Nested
    // =========================================================================

    /// Appends an embedded document built with a nested builder.
    pub fn document<F>(self, key: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(DocumentBuilder) -> DocumentBuilder,
    {
        let nested = f(DocumentBuilder::new()).build();
        self.field(key, Value::Document(nested))
    }

    /// Appends an array field.
    pub fn array<I, V>(self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect::<Vec<Value>>();
        self.field(key, Value::Array(values))
    }

    /// Builds the document.
    pub fn build(self) -> Document {
        self.doc
    }
}
