//! Key/value fields of a document.

use std::fmt;

use crate::error::ElementError;
use crate::limits::MAX_WIRE_SIZE;
use crate::model::Value;

/// A single key/value field.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    key: String,
    value: Value,
}

impl Element {
    /// Creates an element from a key and anything convertible into a [`Value`].
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Replaces the value in place, returning the previous one.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Value {
        std::mem::replace(&mut self.value, value.into())
    }

    /// Splits the element into its key and value.
    pub fn into_parts(self) -> (String, Value) {
        (self.key, self.value)
    }

    /// Validates the element and returns its full wire size:
    /// type byte, NUL-terminated key, then the value payload.
    pub fn validate(&self) -> Result<usize, ElementError> {
        if self.key.as_bytes().contains(&0) {
            return Err(ElementError::KeyContainsNul {
                key: self.key.clone(),
            });
        }

        let size = 1 + self.key.len() + 1 + self.value.validate(&self.key)?;
        if size > MAX_WIRE_SIZE {
            return Err(ElementError::SizeOverflow {
                key: self.key.clone(),
                size,
                max: MAX_WIRE_SIZE,
            });
        }
        Ok(size)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_size() {
        // type + "a\0" + int32
        assert_eq!(Element::new("a", 1i32).validate(), Ok(7));
        // type + "name\0" + (4 + "bob" + NUL)
        assert_eq!(Element::new("name", "bob").validate(), Ok(14));
    }

    #[test]
    fn test_key_with_nul_rejected() {
        let err = Element::new("bad\0key", 1i32).validate().unwrap_err();
        assert_eq!(err, ElementError::KeyContainsNul { key: "bad\0key".to_string() });
        assert_eq!(err.key(), "bad\0key");
    }

    #[test]
    fn test_set_value_returns_previous() {
        let mut element = Element::new("x", 1i32);
        let old = element.set_value("two");
        assert_eq!(old, Value::Int32(1));
        assert_eq!(element.value(), &Value::from("two"));
        assert_eq!(element.key(), "x");
    }
}
