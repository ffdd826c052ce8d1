//! Typed value coercion.
//!
//! | Type | Parse | Serialize |
//! |------|-------|-----------|
//! | `bool` | absent or empty ⇒ `true`; `true/yes/on/1`, `false/no/off/0` (any case) | `true` ⇒ shorthand, `false` ⇒ `false` |
//! | `i64` | digits with optional `k/m/g/t` unit (× 1024ⁿ), optionally followed by `b` | decimal |
//! | `DateTime<FixedOffset>` | ISO 8601 round-trip (`2024-05-01T10:00:00.0000000+02:00`) | same |
//! | `String` | decoded value; absent value is an error | as-is |
//!
//! The type is picked at compile time through [`ConfigValue`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};

use crate::error::ConfigError;
use crate::types::ConfigKey;

/// A type that can be read from and written to a variable's raw value.
pub trait ConfigValue: Sized {
    /// Convert a raw value (`None` = boolean shorthand) read for `key`.
    fn from_config(key: &ConfigKey, raw: Option<&str>) -> Result<Self, ConfigError>;

    /// The raw value to store; `None` writes the boolean shorthand.
    fn to_config(&self) -> Option<String>;
}

impl ConfigValue for bool {
    fn from_config(key: &ConfigKey, raw: Option<&str>) -> Result<Self, ConfigError> {
        parse_bool(raw).map_err(|reason| ConfigError::invalid_value(key, reason))
    }

    fn to_config(&self) -> Option<String> {
        (!*self).then(|| "false".to_string())
    }
}

impl ConfigValue for i64 {
    fn from_config(key: &ConfigKey, raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = raw.ok_or_else(|| ConfigError::invalid_value(key, "expected a number"))?;
        parse_number(raw).map_err(|reason| ConfigError::invalid_value(key, reason))
    }

    fn to_config(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl ConfigValue for String {
    fn from_config(key: &ConfigKey, raw: Option<&str>) -> Result<Self, ConfigError> {
        raw.map(str::to_string)
            .ok_or_else(|| ConfigError::invalid_value(key, "expected a value"))
    }

    fn to_config(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl ConfigValue for DateTime<FixedOffset> {
    fn from_config(key: &ConfigKey, raw: Option<&str>) -> Result<Self, ConfigError> {
        let raw = raw.ok_or_else(|| ConfigError::invalid_value(key, "expected a date-time"))?;
        parse_datetime(raw).map_err(|reason| ConfigError::invalid_value(key, reason))
    }

    fn to_config(&self) -> Option<String> {
        Some(format_datetime(self))
    }
}

pub fn parse_bool(raw: Option<&str>) -> Result<bool, String> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(true);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("'{raw}' is not a valid boolean")),
    }
}

/// Parse `2k`, `5mb`, `1GB`, `-3` and friends.
pub fn parse_number(raw: &str) -> Result<i64, String> {
    let invalid = || format!("'{raw}' is not a valid number");
    let lower = raw.trim().to_ascii_lowercase();

    let mut body = lower.as_str();
    let mut has_unit = false;
    if let Some(rest) = body.strip_suffix('b')
        && rest.ends_with(['k', 'm', 'g', 't'])
    {
        body = rest;
    }
    let multiplier: i64 = match body.chars().last() {
        Some('k') => 1 << 10,
        Some('m') => 1 << 20,
        Some('g') => 1 << 30,
        Some('t') => 1 << 40,
        _ => 1,
    };
    if multiplier > 1 {
        body = &body[..body.len() - 1];
        has_unit = true;
    }

    let digits = body.strip_prefix('-').unwrap_or(body);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let number: i64 = body.parse().map_err(|_| invalid())?;
    if has_unit {
        number
            .checked_mul(multiplier)
            .ok_or_else(|| format!("'{raw}' is out of range"))
    } else {
        Ok(number)
    }
}

/// Parse an ISO 8601 date-time. Values without an offset are taken as UTC.
pub fn parse_datetime(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|e| format!("'{raw}' is not a valid date-time: {e}"))
}

pub fn format_datetime(value: &DateTime<FixedOffset>) -> String {
    // chrono has no seven-digit fraction specifier; ticks are 100ns.
    format!(
        "{}.{:07}{}",
        value.format("%Y-%m-%dT%H:%M:%S"),
        value.nanosecond() % 1_000_000_000 / 100,
        value.format("%:z")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn key() -> ConfigKey {
        ConfigKey::new("core", None, "value")
    }

    #[test]
    fn bool_table() {
        assert_eq!(parse_bool(None), Ok(true));
        assert_eq!(parse_bool(Some("")), Ok(true));
        for raw in ["true", "YES", "On", "1"] {
            assert_eq!(parse_bool(Some(raw)), Ok(true), "{raw}");
        }
        for raw in ["false", "no", "OFF", "0"] {
            assert_eq!(parse_bool(Some(raw)), Ok(false), "{raw}");
        }
        assert!(parse_bool(Some("maybe")).is_err());
    }

    #[test]
    fn bool_serializes_true_as_shorthand() {
        assert_eq!(true.to_config(), None);
        assert_eq!(false.to_config().as_deref(), Some("false"));
    }

    #[test]
    fn bool_error_names_key() {
        let err = bool::from_config(&key(), Some("maybe")).unwrap_err();
        assert!(err.to_string().contains("core.value"));
    }

    #[test]
    fn number_table() {
        assert_eq!(parse_number("42"), Ok(42));
        assert_eq!(parse_number("-7"), Ok(-7));
        assert_eq!(parse_number("2k"), Ok(2048));
        assert_eq!(parse_number("5mb"), Ok(5_242_880));
        assert_eq!(parse_number("1gb"), Ok(1_073_741_824));
        assert_eq!(parse_number("1G"), Ok(1_073_741_824));
        assert_eq!(parse_number("2t"), Ok(2 * (1_i64 << 40)));
    }

    #[test]
    fn number_rejects_garbage() {
        for raw in ["", "k", "12x", "5b", "1.5", "--1", "99999999999999999999", "9000000000t"] {
            assert!(parse_number(raw).is_err(), "{raw}");
        }
        assert!(i64::from_config(&key(), None).is_err());
    }

    #[test]
    fn datetime_roundtrip() {
        let dt = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 10, 30, 0)
            .unwrap();
        let raw = format_datetime(&dt);
        assert_eq!(raw, "2024-05-01T10:30:00.0000000+02:00");
        assert_eq!(parse_datetime(&raw), Ok(dt));
    }

    #[test]
    fn datetime_keeps_seven_fraction_digits() {
        let dt = parse_datetime("2024-05-01T10:30:00.1234567-05:00").unwrap();
        let raw = format_datetime(&dt);
        assert_eq!(raw, "2024-05-01T10:30:00.1234567-05:00");
        assert_eq!(parse_datetime(&raw), Ok(dt));
    }

    #[test]
    fn datetime_without_offset_is_utc() {
        let dt = parse_datetime("2024-05-01T10:30:00.1234567").unwrap();
        assert_eq!(dt.offset().local_minus_utc(), 0);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn string_requires_a_value() {
        assert_eq!(
            String::from_config(&key(), Some("x")).unwrap(),
            "x".to_string()
        );
        assert!(matches!(
            String::from_config(&key(), None),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
