//! RFC 3339 parsing and formatting for BSON timestamps.
//!
//! Two representations are covered:
//! - ObjectId timestamps: unsigned seconds since the Unix epoch
//! - BSON DateTime values: signed milliseconds since the Unix epoch
//!
//! All output is rendered in UTC (`Z` suffix). Input may carry any valid
//! offset and is normalized to UTC.

const MILLISECONDS_PER_SECOND: i64 = 1_000;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;
const MILLISECONDS_PER_DAY: i64 = SECONDS_PER_DAY * MILLISECONDS_PER_SECOND;

/// Error type for RFC 3339 parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeParseError {
    pub message: String,
}

impl DateTimeParseError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for DateTimeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DateTimeParseError {}

/// Parses a timezone offset string (Z, +HH:MM, -HH:MM) and returns offset in minutes.
fn parse_timezone_offset(offset: &str) -> Result<i16, DateTimeParseError> {
    if offset == "Z" || offset == "z" {
        return Ok(0);
    }

    let invalid = || DateTimeParseError::new(format!("Invalid timezone offset: {}", offset));

    if offset.len() != 6 || offset.as_bytes()[3] != b':' {
        return Err(invalid());
    }

    let sign = match offset.as_bytes()[0] {
        b'+' => 1i16,
        b'-' => -1i16,
        _ => return Err(invalid()),
    };

    let hours: i16 = offset[1..3].parse().map_err(|_| invalid())?;
    let minutes: i16 = offset[4..6].parse().map_err(|_| invalid())?;

    if hours > 24 || (hours == 24 && minutes != 0) || minutes > 59 {
        return Err(invalid());
    }

    Ok(sign * (hours * 60 + minutes))
}

/// Returns true if the given year is a leap year.
fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Returns the number of days in a given month (1-indexed).
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Calculates days since Unix epoch for a given civil date (Howard Hinnant).
fn date_to_days(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year - 1 } else { year } as i64;
    let m = if month <= 2 {
        month as i64 + 9
    } else {
        month as i64 - 3
    };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = (y - era * 400) as u32; // year of era
    let doy = (153 * m as u32 + 2) / 5 + day - 1; // day of year
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // day of era

    era * 146097 + doe as i64 - 719468
}

/// Converts days since Unix epoch to (year, month, day).
fn days_to_date(days: i64) -> (i64, u32, u32) {
    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32; // day of era
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // year of era
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year
    let mp = (5 * doy + 2) / 153; // month index
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };

    let year = if m <= 2 { y + 1 } else { y };
    (year, m, d)
}

/// Formats milliseconds since the Unix epoch as an RFC 3339 UTC string.
///
/// Milliseconds are rendered only when non-zero, with trailing zeros trimmed.
pub fn format_epoch_millis_rfc3339(epoch_ms: i64) -> String {
    let days = epoch_ms.div_euclid(MILLISECONDS_PER_DAY);
    let ms_of_day = epoch_ms.rem_euclid(MILLISECONDS_PER_DAY);

    let (year, month, day) = days_to_date(days);
    let secs_of_day = ms_of_day / MILLISECONDS_PER_SECOND;
    let millis = ms_of_day % MILLISECONDS_PER_SECOND;

    let hours = secs_of_day / 3600;
    let minutes = (secs_of_day % 3600) / 60;
    let seconds = secs_of_day % 60;

    let fraction = if millis == 0 {
        String::new()
    } else {
        let digits = format!("{:03}", millis);
        format!(".{}", digits.trim_end_matches('0'))
    };

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}Z",
        year, month, day, hours, minutes, seconds, fraction
    )
}

/// Formats unsigned seconds since the Unix epoch as an RFC 3339 UTC string.
pub fn format_epoch_seconds_rfc3339(epoch_secs: u32) -> String {
    format_epoch_millis_rfc3339(epoch_secs as i64 * MILLISECONDS_PER_SECOND)
}

/// Parses an RFC 3339 datetime (`YYYY-MM-DDTHH:MM:SS[.fff][Z|+HH:MM]`) and
/// returns milliseconds since the Unix epoch in UTC.
///
/// Fractional digits beyond milliseconds are truncated.
pub fn parse_datetime_rfc3339(s: &str) -> Result<i64, DateTimeParseError> {
    let invalid = || DateTimeParseError::new(format!("Invalid RFC 3339 datetime: {}", s));

    if s.len() < 20 || !s.is_ascii() {
        return Err(invalid());
    }
    let b = s.as_bytes();
    if b[4] != b'-' || b[7] != b'-' || !(b[10] == b'T' || b[10] == b't') || b[13] != b':' || b[16] != b':' {
        return Err(invalid());
    }

    let year: i32 = s[..4].parse().map_err(|_| invalid())?;
    let month: u32 = s[5..7].parse().map_err(|_| invalid())?;
    let day: u32 = s[8..10].parse().map_err(|_| invalid())?;
    let hours: i64 = s[11..13].parse().map_err(|_| invalid())?;
    let minutes: i64 = s[14..16].parse().map_err(|_| invalid())?;
    let seconds: i64 = s[17..19].parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
        return Err(invalid());
    }
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    let rest = &s[19..];
    let (millis, offset_str) = match rest.strip_prefix('.') {
        Some(frac_and_tz) => {
            let frac_end = frac_and_tz
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(frac_and_tz.len());
            if frac_end == 0 {
                return Err(invalid());
            }
            let mut digits = frac_and_tz[..frac_end].to_string();
            while digits.len() < 3 {
                digits.push('0');
            }
            digits.truncate(3);
            let millis: i64 = digits.parse().map_err(|_| invalid())?;
            (millis, &frac_and_tz[frac_end..])
        }
        None => (0, rest),
    };

    let offset_min = parse_timezone_offset(offset_str)? as i64;

    let days = date_to_days(year, month, day);
    let local_secs = days * SECONDS_PER_DAY + hours * 3600 + minutes * 60 + seconds;
    let utc_secs = local_secs - offset_min * 60;

    Ok(utc_secs * MILLISECONDS_PER_SECOND + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_epoch_seconds_boundaries() {
        assert_eq!(format_epoch_seconds_rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(
            format_epoch_seconds_rfc3339(0x7FFF_FFFF),
            "2038-01-19T03:14:07Z"
        );
        assert_eq!(
            format_epoch_seconds_rfc3339(0x8000_0000),
            "2038-01-19T03:14:08Z"
        );
        assert_eq!(
            format_epoch_seconds_rfc3339(u32::MAX),
            "2106-02-07T06:28:15Z"
        );
    }

    #[test]
    fn test_format_epoch_millis() {
        assert_eq!(format_epoch_millis_rfc3339(0), "1970-01-01T00:00:00Z");
        assert_eq!(
            format_epoch_millis_rfc3339(1_710_513_000_123),
            "2024-03-15T14:30:00.123Z"
        );
        assert_eq!(
            format_epoch_millis_rfc3339(1_710_513_000_500),
            "2024-03-15T14:30:00.5Z"
        );
        // Before the epoch
        assert_eq!(format_epoch_millis_rfc3339(-1_000), "1969-12-31T23:59:59Z");
    }

    #[test]
    fn test_parse_datetime_basic() {
        assert_eq!(parse_datetime_rfc3339("1970-01-01T00:00:00Z").unwrap(), 0);
        assert_eq!(
            parse_datetime_rfc3339("2024-03-15T14:30:00Z").unwrap(),
            1_710_513_000_000
        );
        assert_eq!(
            parse_datetime_rfc3339("2024-03-15T14:30:00.123456Z").unwrap(),
            1_710_513_000_123
        );
    }

    #[test]
    fn test_parse_datetime_with_offset() {
        let local = parse_datetime_rfc3339("2024-03-15T14:30:00+05:30").unwrap();
        let utc = parse_datetime_rfc3339("2024-03-15T09:00:00Z").unwrap();
        assert_eq!(local, utc);
    }

    #[test]
    fn test_datetime_roundtrip() {
        let datetimes = [
            "1970-01-01T00:00:00Z",
            "2024-03-15T14:30:00Z",
            "2024-03-15T14:30:00.5Z",
            "2024-12-31T23:59:59.999Z",
            "2106-02-07T06:28:15Z",
        ];

        for datetime in datetimes {
            let ms = parse_datetime_rfc3339(datetime).unwrap();
            assert_eq!(format_epoch_millis_rfc3339(ms), datetime, "Roundtrip failed for {}", datetime);
        }
    }

    #[test]
    fn test_invalid_datetimes() {
        assert!(parse_datetime_rfc3339("2024-13-01T00:00:00Z").is_err()); // invalid month
        assert!(parse_datetime_rfc3339("2023-02-29T00:00:00Z").is_err()); // not a leap year
        assert!(parse_datetime_rfc3339("2024-03-15T24:00:00Z").is_err()); // invalid hour
        assert!(parse_datetime_rfc3339("2024-03-15T14:30:00").is_err()); // missing offset
        assert!(parse_datetime_rfc3339("2024-03-15T14:30:00+24:01").is_err());
        assert!(parse_datetime_rfc3339("not a datetime at all").is_err());
    }
}
