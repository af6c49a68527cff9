//! ISO-8601 restricted duration parsing: `PT[nH][nM][n(.n)?S]`.

use crate::error::PlannerError;
use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^PT(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?$").unwrap()
});

/// Parses a restricted ISO-8601 duration string into seconds.
///
/// Rejects strings that don't start with `PT` or that contain no
/// recognised H/M/S component (`PT` alone is not a valid duration).
pub fn parse_duration(s: &str) -> Result<f64, PlannerError> {
    let caps = DURATION_RE
        .captures(s)
        .ok_or_else(|| PlannerError::InvalidDuration(s.to_string()))?;

    let h = caps.get(1);
    let m = caps.get(2);
    let sec = caps.get(3);
    if h.is_none() && m.is_none() && sec.is_none() {
        return Err(PlannerError::InvalidDuration(s.to_string()));
    }

    let hours: f64 = h.map(|m| m.as_str().parse().unwrap()).unwrap_or(0.0);
    let minutes: f64 = m.map(|m| m.as_str().parse().unwrap()).unwrap_or(0.0);
    let seconds: f64 = sec.map(|m| m.as_str().parse().unwrap()).unwrap_or(0.0);

    Ok(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Formats a non-negative second count as a restricted ISO-8601 duration.
///
/// Round-trips exactly for non-negative integer second counts; `0` formats
/// as `PT0S`.
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0).floor();
    let remaining = seconds - hours * 3600.0;
    let minutes = (remaining / 60.0).floor();
    let secs = remaining - minutes * 60.0;

    let mut out = String::from("PT");
    if hours > 0.0 {
        out.push_str(&format!("{}H", hours as i64));
    }
    if minutes > 0.0 {
        out.push_str(&format!("{}M", minutes as i64));
    }
    if secs > 0.0 || (hours == 0.0 && minutes == 0.0) {
        if (secs - secs.round()).abs() < 1e-9 {
            out.push_str(&format!("{}S", secs.round() as i64));
        } else {
            let mut s = format!("{:.6}", secs);
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
            out.push_str(&s);
            out.push('S');
        }
    }
    out
}

/// Converts a duration given either as seconds or an ISO-8601 string.
pub fn duration_to_seconds(input: &DurationInput) -> Result<f64, PlannerError> {
    match input {
        DurationInput::Seconds(s) => Ok(*s),
        DurationInput::Iso(s) => parse_duration(s),
    }
}

/// A duration as accepted by the public API: either raw seconds or an
/// ISO-8601 string.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationInput {
    Seconds(f64),
    Iso(String),
}

impl From<f64> for DurationInput {
    fn from(v: f64) -> Self {
        DurationInput::Seconds(v)
    }
}

impl From<&str> for DurationInput {
    fn from(v: &str) -> Self {
        DurationInput::Iso(v.to_string())
    }
}

impl From<String> for DurationInput {
    fn from(v: String) -> Self {
        DurationInput::Iso(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_components() {
        assert_eq!(parse_duration("PT1H30M").unwrap(), 5400.0);
        assert_eq!(parse_duration("PT5M").unwrap(), 300.0);
        assert_eq!(parse_duration("PT30S").unwrap(), 30.0);
        assert_eq!(parse_duration("PT1H30M45S").unwrap(), 5445.0);
        assert_eq!(parse_duration("PT0.5S").unwrap(), 0.5);
        assert_eq!(parse_duration("PT0S").unwrap(), 0.0);
    }

    #[test]
    fn rejects_malformed() {
        assert!(parse_duration("PT").is_err());
        assert!(parse_duration("P1D").is_err());
        assert!(parse_duration("1H30M").is_err());
        assert!(parse_duration("PT1X").is_err());
    }

    #[test]
    fn formats_zero_as_pt0s() {
        assert_eq!(format_duration(0.0), "PT0S");
    }

    #[test]
    fn round_trips_integer_seconds() {
        for n in [0u64, 1, 30, 59, 60, 300, 3599, 3600, 5445, 7200, 86399] {
            let formatted = format_duration(n as f64);
            let parsed = parse_duration(&formatted).unwrap();
            assert_eq!(parsed, n as f64, "round-trip failed for {n} -> {formatted}");
        }
    }

    #[test]
    fn format_then_parse_is_semantically_equal_for_any_accepted_string() {
        for d in ["PT1H30M", "PT5M", "PT30S", "PT1H30M45S", "PT2H"] {
            let secs = parse_duration(d).unwrap();
            let reformatted = format_duration(secs);
            assert_eq!(parse_duration(&reformatted).unwrap(), secs);
        }
    }
}
