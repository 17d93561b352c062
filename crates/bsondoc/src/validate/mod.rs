//! Validation entry points for documents and elements.
//!
//! [`Document::validate`] covers the common case. The free functions here
//! accept an optional document (for callers holding one that may never have
//! been built) and apply caller-chosen size caps such as the server's 16 MiB
//! document limit.

use crate::error::{DocumentError, ElementError};
use crate::limits::MAX_DOCUMENT_SIZE;
use crate::model::{Document, Element};

/// Validates a document and returns its total wire size.
///
/// Fails with [`DocumentError::NilDocument`] when no document is given.
pub fn validate_document(doc: Option<&Document>) -> Result<usize, DocumentError> {
    doc.ok_or(DocumentError::NilDocument)?.validate()
}

/// Validates a document and additionally checks its size against `limit`.
pub fn validate_document_with_limit(doc: &Document, limit: usize) -> Result<usize, DocumentError> {
    let size = doc.validate()?;
    if size > limit {
        tracing::debug!(size, limit, "document exceeds size limit");
        return Err(DocumentError::DocumentTooLarge { size, limit });
    }
    Ok(size)
}

/// Validates a document against the server's maximum document size.
pub fn validate_document_for_server(doc: &Document) -> Result<usize, DocumentError> {
    validate_document_with_limit(doc, MAX_DOCUMENT_SIZE)
}

/// Validates a single element and returns its wire size.
pub fn validate_element(element: &Element) -> Result<usize, ElementError> {
    element.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BinarySubtype, DocumentBuilder};

    #[test]
    fn test_nil_document() {
        assert_eq!(validate_document(None), Err(DocumentError::NilDocument));
    }

    #[test]
    fn test_present_document() {
        let doc = Document::new();
        assert_eq!(validate_document(Some(&doc)), Ok(5));
    }

    #[test]
    fn test_limit_exceeded() {
        let doc = DocumentBuilder::new().string("s", "0123456789").build();
        let size = doc.validate().unwrap();
        assert_eq!(validate_document_with_limit(&doc, size), Ok(size));
        assert_eq!(
            validate_document_with_limit(&doc, size - 1),
            Err(DocumentError::DocumentTooLarge { size, limit: size - 1 })
        );
    }

    #[test]
    fn test_server_limit() {
        let big = DocumentBuilder::new()
            .binary("blob", BinarySubtype::Generic, vec![0u8; MAX_DOCUMENT_SIZE])
            .build();
        assert!(matches!(
            validate_document_for_server(&big),
            Err(DocumentError::DocumentTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_element() {
        assert_eq!(validate_element(&Element::new("k", true)), Ok(4));
        assert!(validate_element(&Element::new("k\0", true)).is_err());
    }
}
