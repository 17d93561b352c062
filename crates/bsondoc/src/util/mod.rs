//! Utility modules for bsondoc.

pub mod datetime;

pub use datetime::{
    format_epoch_millis_rfc3339, format_epoch_seconds_rfc3339, parse_datetime_rfc3339,
    DateTimeParseError,
};
