//! BSON value types and their wire sizes.

use std::fmt;

use crate::error::ElementError;
use crate::limits::MAX_WIRE_SIZE;
use crate::model::{Document, ObjectId};
use crate::util::format_epoch_millis_rfc3339;

/// BSON element type bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    Double = 0x01,
    String = 0x02,
    EmbeddedDocument = 0x03,
    Array = 0x04,
    Binary = 0x05,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0A,
    Regex = 0x0B,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
}

impl ElementType {
    /// Creates an ElementType from its wire representation.
    pub fn from_u8(v: u8) -> Option<ElementType> {
        match v {
            0x01 => Some(ElementType::Double),
            0x02 => Some(ElementType::String),
            0x03 => Some(ElementType::EmbeddedDocument),
            0x04 => Some(ElementType::Array),
            0x05 => Some(ElementType::Binary),
            0x07 => Some(ElementType::ObjectId),
            0x08 => Some(ElementType::Boolean),
            0x09 => Some(ElementType::DateTime),
            0x0A => Some(ElementType::Null),
            0x0B => Some(ElementType::Regex),
            0x10 => Some(ElementType::Int32),
            0x11 => Some(ElementType::Timestamp),
            0x12 => Some(ElementType::Int64),
            _ => None,
        }
    }
}

/// Binary subtypes as defined by the BSON format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySubtype {
    Generic,
    Function,
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    Encrypted,
    UserDefined(u8),
}

impl BinarySubtype {
    pub fn to_u8(self) -> u8 {
        match self {
            BinarySubtype::Generic => 0x00,
            BinarySubtype::Function => 0x01,
            BinarySubtype::BinaryOld => 0x02,
            BinarySubtype::UuidOld => 0x03,
            BinarySubtype::Uuid => 0x04,
            BinarySubtype::Md5 => 0x05,
            BinarySubtype::Encrypted => 0x06,
            BinarySubtype::UserDefined(v) => v,
        }
    }
}

/// A BSON value held by an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit IEEE 754 float.
    Double(f64),

    /// UTF-8 string (may contain NUL; it is length-prefixed on the wire).
    String(String),

    /// Embedded document.
    Document(Document),

    /// Array, encoded on the wire as a document keyed "0", "1", ...
    Array(Vec<Value>),

    /// Binary data with subtype.
    Binary { subtype: BinarySubtype, bytes: Vec<u8> },

    ObjectId(ObjectId),

    Boolean(bool),

    /// Milliseconds since the Unix epoch.
    DateTime(i64),

    Null,

    /// Regular expression; both parts are NUL-terminated C strings on the wire.
    Regex { pattern: String, options: String },

    Int32(i32),

    /// Internal replication timestamp.
    Timestamp { time: u32, increment: u32 },

    Int64(i64),
}

impl Value {
    /// Returns the BSON type byte for this value.
    pub fn element_type(&self) -> ElementType {
        match self {
            Value::Double(_) => ElementType::Double,
            Value::String(_) => ElementType::String,
            Value::Document(_) => ElementType::EmbeddedDocument,
            Value::Array(_) => ElementType::Array,
            Value::Binary { .. } => ElementType::Binary,
            Value::ObjectId(_) => ElementType::ObjectId,
            Value::Boolean(_) => ElementType::Boolean,
            Value::DateTime(_) => ElementType::DateTime,
            Value::Null => ElementType::Null,
            Value::Regex { .. } => ElementType::Regex,
            Value::Int32(_) => ElementType::Int32,
            Value::Timestamp { .. } => ElementType::Timestamp,
            Value::Int64(_) => ElementType::Int64,
        }
    }

    /// Returns true for zero-length strings, binaries, arrays and documents.
    ///
    /// Scalars (including `Null`) are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Binary { bytes, .. } => bytes.is_empty(),
            Value::Array(values) => values.is_empty(),
            Value::Document(doc) => doc.is_empty(),
            _ => false,
        }
    }

    /// Validates this value and returns the size of its payload on the wire
    /// (excluding the type byte and key).
    ///
    /// `key` names the owning element in any error raised at this level.
    pub fn validate(&self, key: &str) -> Result<usize, ElementError> {
        let size = match self {
            Value::Double(_) | Value::DateTime(_) | Value::Int64(_) => 8,
            Value::Timestamp { .. } => 8,
            Value::Int32(_) => 4,
            Value::Boolean(_) => 1,
            Value::Null => 0,
            Value::ObjectId(_) => 12,
            Value::String(s) => 4 + s.len() + 1,
            Value::Binary { bytes, .. } => 4 + 1 + bytes.len(),
            Value::Regex { pattern, options } => {
                if pattern.as_bytes().contains(&0) {
                    return Err(ElementError::RegexContainsNul {
                        key: key.to_string(),
                        field: "pattern",
                    });
                }
                if options.as_bytes().contains(&0) {
                    return Err(ElementError::RegexContainsNul {
                        key: key.to_string(),
                        field: "options",
                    });
                }
                pattern.len() + 1 + options.len() + 1
            }
            Value::Document(doc) => doc.wire_size()?,
            Value::Array(values) => array_wire_size(values)?,
        };

        if size > MAX_WIRE_SIZE {
            return Err(ElementError::SizeOverflow {
                key: key.to_string(),
                size,
                max: MAX_WIRE_SIZE,
            });
        }
        Ok(size)
    }
}

/// Sizes an array as the document it becomes on the wire.
fn array_wire_size(values: &[Value]) -> Result<usize, ElementError> {
    let mut total = crate::limits::DOCUMENT_OVERHEAD;
    for (index, value) in values.iter().enumerate() {
        let key = index.to_string();
        total += 1 + key.len() + 1 + value.validate(&key)?;
    }
    Ok(total)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Document(doc) => write!(f, "{}", doc),
            Value::Array(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            }
            Value::Binary { subtype, bytes } => {
                write!(f, "Binary({:#04x}, {} bytes)", subtype.to_u8(), bytes.len())
            }
            Value::ObjectId(id) => write!(f, "{}", id),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::DateTime(ms) => write!(f, "ISODate(\"{}\")", format_epoch_millis_rfc3339(*ms)),
            Value::Null => f.write_str("null"),
            Value::Regex { pattern, options } => write!(f, "/{}/{}", pattern, options),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Timestamp { time, increment } => write!(f, "Timestamp({}, {})", time, increment),
            Value::Int64(v) => write!(f, "NumberLong({})", v),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<ObjectId> for Value {
    fn from(v: ObjectId) -> Self {
        Value::ObjectId(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Document(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(Value::Double(1.5).validate("k"), Ok(8));
        assert_eq!(Value::Int32(7).validate("k"), Ok(4));
        assert_eq!(Value::Int64(7).validate("k"), Ok(8));
        assert_eq!(Value::Boolean(true).validate("k"), Ok(1));
        assert_eq!(Value::Null.validate("k"), Ok(0));
        assert_eq!(Value::DateTime(0).validate("k"), Ok(8));
        assert_eq!(Value::Timestamp { time: 1, increment: 2 }.validate("k"), Ok(8));
        assert_eq!(Value::ObjectId(ObjectId::NIL).validate("k"), Ok(12));
    }

    #[test]
    fn test_variable_sizes() {
        // int32 length + bytes + NUL
        assert_eq!(Value::from("hello").validate("k"), Ok(10));
        assert_eq!(Value::from("").validate("k"), Ok(5));
        // int32 length + subtype + bytes
        let bin = Value::Binary { subtype: BinarySubtype::Generic, bytes: vec![1, 2, 3] };
        assert_eq!(bin.validate("k"), Ok(8));
        let regex = Value::Regex { pattern: "^a".to_string(), options: "i".to_string() };
        assert_eq!(regex.validate("k"), Ok(5));
    }

    #[test]
    fn test_array_size_matches_document_encoding() {
        // {"0": int32, "1": int32}: 5 + (1 + 1 + 1 + 4) * 2
        let array = Value::Array(vec![Value::Int32(1), Value::Int32(2)]);
        assert_eq!(array.validate("k"), Ok(19));
        assert_eq!(Value::Array(vec![]).validate("k"), Ok(5));
    }

    #[test]
    fn test_regex_nul_rejected() {
        let regex = Value::Regex { pattern: "a\0b".to_string(), options: String::new() };
        assert_eq!(
            regex.validate("re"),
            Err(ElementError::RegexContainsNul { key: "re".to_string(), field: "pattern" })
        );

        let regex = Value::Regex { pattern: "a".to_string(), options: "\0".to_string() };
        assert!(matches!(
            regex.validate("re"),
            Err(ElementError::RegexContainsNul { field: "options", .. })
        ));
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::from("").is_empty());
        assert!(Value::Array(vec![]).is_empty());
        assert!(Value::Document(Document::new()).is_empty());
        assert!(Value::Binary { subtype: BinarySubtype::Generic, bytes: vec![] }.is_empty());
        assert!(!Value::from("x").is_empty());
        assert!(!Value::Null.is_empty());
        assert!(!Value::Int32(0).is_empty());
        assert!(!Value::Boolean(false).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::DateTime(0).to_string(), "ISODate(\"1970-01-01T00:00:00Z\")");
        assert_eq!(Value::Array(vec![Value::Int32(1), Value::from("a")]).to_string(), "[1, \"a\"]");
        assert_eq!(Value::Int64(5).to_string(), "NumberLong(5)");
    }

    #[test]
    fn test_element_type_roundtrip() {
        let value = Value::Regex { pattern: String::new(), options: String::new() };
        let ty = value.element_type();
        assert_eq!(ElementType::from_u8(ty as u8), Some(ty));
        assert_eq!(ElementType::from_u8(0x06), None);
    }
}
