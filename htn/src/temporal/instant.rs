//! ISO-8601 / RFC-3339 instant parsing and arithmetic.

use crate::error::PlannerError;
use crate::temporal::duration::{duration_to_seconds, DurationInput};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Parses an RFC-3339/ISO-8601 instant. A naive suffix (no `Z`/offset) is
/// interpreted as UTC.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, PlannerError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }
    Err(PlannerError::InvalidInstant(s.to_string()))
}

/// Formats an instant as an RFC-3339 string with a `Z` suffix.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Adds a duration (seconds or ISO-8601 string) to an instant.
pub fn add_duration(
    instant: DateTime<Utc>,
    duration: impl Into<DurationInput>,
) -> Result<DateTime<Utc>, PlannerError> {
    let secs = duration_to_seconds(&duration.into())?;
    let millis = (secs * 1000.0).round() as i64;
    Ok(instant + chrono::Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zulu_and_offset() {
        let z = parse_instant("2025-01-01T10:00:00Z").unwrap();
        let offset = parse_instant("2025-01-01T12:00:00+02:00").unwrap();
        assert_eq!(z, offset);
    }

    #[test]
    fn parses_naive_as_utc() {
        let naive = parse_instant("2025-01-01T10:00:00").unwrap();
        let zulu = parse_instant("2025-01-01T10:00:00Z").unwrap();
        assert_eq!(naive, zulu);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_instant("not-a-time").is_err());
    }

    #[test]
    fn adds_iso_duration() {
        let t0 = parse_instant("2025-01-01T10:00:00Z").unwrap();
        let t1 = add_duration(t0, "PT1H30M").unwrap();
        assert_eq!(format_instant(&t1), "2025-01-01T11:30:00Z");
    }

    #[test]
    fn adds_seconds() {
        let t0 = parse_instant("2025-01-01T10:00:00Z").unwrap();
        let t1 = add_duration(t0, 300.0).unwrap();
        assert_eq!(format_instant(&t1), "2025-01-01T10:05:00Z");
    }
}
