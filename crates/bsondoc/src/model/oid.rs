//! 12-byte ObjectId generation and hex codec.
//!
//! Layout of a generated id:
//! ```text
//! bytes 0..4   u32 big-endian Unix seconds
//! bytes 4..9   per-process identity (random, fixed for the process lifetime)
//! bytes 9..12  low 24 bits of the process-wide counter, big-endian
//! ```
//!
//! The counter is a full `u32` that wraps from `u32::MAX` to `0`; only its
//! low three bytes are embedded in the id.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;

use crate::error::ObjectIdError;
use crate::limits::{OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};
use crate::util::format_epoch_seconds_rfc3339;

lazy_static! {
    static ref PROCESS_UNIQUE: [u8; 5] = process_unique();
    static ref OBJECT_ID_COUNTER: AtomicU32 = AtomicU32::new(counter_seed());
}

/// Draws the 5-byte process identity from a v4 UUID.
fn process_unique() -> [u8; 5] {
    let random = uuid::Uuid::new_v4();
    let mut unique = [0u8; 5];
    unique.copy_from_slice(&random.as_bytes()[..5]);
    tracing::debug!(process_unique = %hex_string(&unique), "initialized ObjectId process identity");
    unique
}

fn counter_seed() -> u32 {
    let random = uuid::Uuid::new_v4();
    let b = random.as_bytes();
    u32::from_be_bytes([b[8], b[9], b[10], b[11]])
}

/// Increments the process-wide counter and returns the new value.
fn next_counter() -> u32 {
    let previous = OBJECT_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    let next = previous.wrapping_add(1);
    if next == 0 {
        tracing::debug!("ObjectId counter wrapped to zero");
    }
    next
}

#[cfg(test)]
pub(crate) fn set_counter(value: u32) {
    OBJECT_ID_COUNTER.store(value, Ordering::SeqCst);
}

#[cfg(test)]
pub(crate) fn counter() -> u32 {
    OBJECT_ID_COUNTER.load(Ordering::SeqCst)
}

fn unix_seconds_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

fn hex_string(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// A 12-byte BSON ObjectId.
///
/// Ordering compares raw bytes, so ids sort by their embedded timestamp first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId([u8; OBJECT_ID_LEN]);

impl ObjectId {
    /// The all-zero ObjectId.
    pub const NIL: ObjectId = ObjectId([0u8; OBJECT_ID_LEN]);

    /// Generates a fresh ObjectId from the current time, the process
    /// identity and the next counter value.
    pub fn new() -> Self {
        Self::with_timestamp_and_counter(unix_seconds_now(), next_counter())
    }

    fn with_timestamp_and_counter(timestamp: u32, counter: u32) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);
        ObjectId(bytes)
    }

    /// Creates an ObjectId whose timestamp is `secs` and whose remaining
    /// bytes are zero.
    ///
    /// Useful as a lower bound when selecting ids created after a point in time.
    pub fn from_timestamp(secs: u32) -> Self {
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[0..4].copy_from_slice(&secs.to_be_bytes());
        ObjectId(bytes)
    }

    /// Wraps raw bytes without validation.
    pub const fn from_bytes(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        ObjectId(bytes)
    }

    /// Returns the raw bytes.
    pub const fn bytes(&self) -> [u8; OBJECT_ID_LEN] {
        self.0
    }

    /// Returns true if every byte is zero.
    pub fn is_nil(&self) -> bool {
        *self == Self::NIL
    }

    /// Parses exactly 24 hexadecimal characters (either case).
    ///
    /// Wrong length and non-hex characters both yield
    /// [`ObjectIdError::InvalidHex`].
    pub fn from_hex(s: &str) -> Result<Self, ObjectIdError> {
        let invalid = || ObjectIdError::InvalidHex {
            input: s.to_string(),
        };

        let hex = s.as_bytes();
        if hex.len() != OBJECT_ID_HEX_LEN {
            return Err(invalid());
        }

        let mut bytes = [0u8; OBJECT_ID_LEN];
        for (i, pair) in hex.chunks_exact(2).enumerate() {
            let hi = hex_digit(pair[0]).ok_or_else(invalid)?;
            let lo = hex_digit(pair[1]).ok_or_else(invalid)?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(ObjectId(bytes))
    }

    /// Renders the id as 24 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex_string(&self.0)
    }

    /// Returns the embedded creation time in seconds since the Unix epoch.
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Returns the embedded creation time as an RFC 3339 UTC string.
    pub fn datetime_rfc3339(&self) -> String {
        format_epoch_seconds_rfc3339(self.timestamp())
    }

    /// Returns the 5-byte process identity component.
    pub fn process_unique(&self) -> [u8; 5] {
        let mut unique = [0u8; 5];
        unique.copy_from_slice(&self.0[4..9]);
        unique
    }

    /// Returns the embedded 24-bit counter value.
    pub fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.0[9], self.0[10], self.0[11]])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId(\"{}\")", self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for ObjectId {
    type Err = ObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::from_hex(s)
    }
}

impl From<[u8; OBJECT_ID_LEN]> for ObjectId {
    fn from(bytes: [u8; OBJECT_ID_LEN]) -> Self {
        ObjectId(bytes)
    }
}

impl From<ObjectId> for [u8; OBJECT_ID_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    // Serializes tests that read or overwrite the global counter.
    static COUNTER_LOCK: Mutex<()> = Mutex::new(());

    fn lock_counter() -> std::sync::MutexGuard<'static, ()> {
        COUNTER_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_hex_roundtrip() {
        let _guard = lock_counter();
        let id = ObjectId::new();
        let parsed = ObjectId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_hex_is_lowercase_24_chars() {
        let id = ObjectId::from_bytes([0xAB; 12]);
        assert_eq!(id.to_hex(), "abababababababababababab");
        assert_eq!(ObjectId::from_hex("ABABABABABABABABABABABAB").unwrap(), id);
    }

    #[test]
    fn test_from_hex_invalid() {
        let err = ObjectId::from_hex("this is not a valid hex string!").unwrap_err();
        assert!(matches!(err, ObjectIdError::InvalidHex { .. }));

        let err = ObjectId::from_hex("deadbeef").unwrap_err();
        assert!(matches!(err, ObjectIdError::InvalidHex { .. }));

        // Right length, bad character
        let err = ObjectId::from_hex("00000000000000000000000g").unwrap_err();
        assert!(matches!(err, ObjectIdError::InvalidHex { .. }));

        // Multi-byte characters must not panic on slicing
        assert!(ObjectId::from_hex("ééééééééééé").is_err());
    }

    #[test]
    fn test_display_contains_hex() {
        let _guard = lock_counter();
        let id = ObjectId::new();
        assert!(id.to_string().contains(&id.to_hex()));
        assert!(format!("{:?}", id).contains(&id.to_hex()));
    }

    #[test]
    fn test_timestamp_decoding() {
        let cases = [
            ("000000001111111111111111", "1970-01-01T00:00:00Z"),
            ("7FFFFFFF1111111111111111", "2038-01-19T03:14:07Z"),
            ("800000001111111111111111", "2038-01-19T03:14:08Z"),
            ("FFFFFFFF1111111111111111", "2106-02-07T06:28:15Z"),
        ];

        for (hex, expected) in cases {
            let id = ObjectId::from_hex(hex).unwrap();
            assert_eq!(id.datetime_rfc3339(), expected, "failed for {}", hex);
        }
    }

    #[test]
    fn test_timestamp_is_current() {
        let _guard = lock_counter();
        let before = unix_seconds_now();
        let id = ObjectId::new();
        let after = unix_seconds_now();
        assert!(id.timestamp() >= before && id.timestamp() <= after);
    }

    #[test]
    fn test_process_unique_is_stable() {
        let _guard = lock_counter();
        let a = ObjectId::new();
        let b = ObjectId::new();
        assert_eq!(a.process_unique(), b.process_unique());
    }

    #[test]
    fn test_from_timestamp() {
        let id = ObjectId::from_timestamp(0x7FFF_FFFF);
        assert_eq!(id.timestamp(), 0x7FFF_FFFF);
        assert_eq!(id.to_hex(), "7fffffff0000000000000000");
        assert!(id < ObjectId::from_timestamp(0x8000_0000));
    }

    #[test]
    fn test_nil() {
        let _guard = lock_counter();
        assert!(ObjectId::NIL.is_nil());
        assert!(ObjectId::default().is_nil());
        assert!(!ObjectId::new().is_nil());
    }

    #[test]
    fn test_uniqueness() {
        let _guard = lock_counter();
        set_counter(0);
        let ids: HashSet<ObjectId> = (0..10_000).map(|_| ObjectId::new()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_counter_increments_per_call() {
        let _guard = lock_counter();
        set_counter(41);
        let id = ObjectId::new();
        assert_eq!(id.counter(), 42);
        assert_eq!(counter(), 42);
    }

    #[test]
    fn test_counter_wraparound() {
        let _guard = lock_counter();
        set_counter(u32::MAX);
        let id = ObjectId::new();
        assert_eq!(counter(), 0);
        assert_eq!(id.counter(), 0);
    }

    #[test]
    fn test_counter_embeds_low_24_bits() {
        let _guard = lock_counter();
        set_counter(0x1234_5677);
        let id = ObjectId::new();
        assert_eq!(counter(), 0x1234_5678);
        assert_eq!(id.counter(), 0x0034_5678);
        assert_eq!(&id.bytes()[9..12], &[0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_concurrent_generation_is_unique() {
        let _guard = lock_counter();
        set_counter(0);
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..1_000).map(|_| ObjectId::new()).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 8_000);
    }
}
