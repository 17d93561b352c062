//! Size limits for BSON documents and identifier lengths.

/// Largest size representable by a BSON length prefix (signed 32-bit).
pub const MAX_WIRE_SIZE: usize = i32::MAX as usize;

/// Document size cap enforced by MongoDB servers (16 MiB).
pub const MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Length prefix plus trailing terminator of every document.
pub const DOCUMENT_OVERHEAD: usize = 4 + 1;

/// Raw length of an ObjectId in bytes.
pub const OBJECT_ID_LEN: usize = 12;

/// Length of an ObjectId rendered as hex.
pub const OBJECT_ID_HEX_LEN: usize = OBJECT_ID_LEN * 2;
