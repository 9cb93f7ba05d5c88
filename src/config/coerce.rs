//! Coercion of raw environment strings into typed values.
//!
//! Each function returns the value for one key or the violation that key
//! produced. Callers collect violations rather than stopping at the first.

use std::num::IntErrorKind;

use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;

type Coerced<T> = std::result::Result<T, ConfigError>;

/// Trimmed string with a default; present-but-empty is a violation, not a
/// default.
pub fn non_empty(key: &'static str, raw: Option<&str>, default: &str) -> Coerced<String> {
    match raw.map(str::trim) {
        None => Ok(default.to_string()),
        Some("") => Err(ConfigError::EmptyValue { key }),
        Some(value) => Ok(value.to_string()),
    }
}

/// `tracing` filter directive such as `info` or `seraface_rs=debug,warn`.
pub fn log_filter(key: &'static str, raw: Option<&str>, default: &str) -> Coerced<String> {
    let directive = non_empty(key, raw, default)?;
    match EnvFilter::try_new(&directive) {
        Ok(_) => Ok(directive),
        Err(_) => Err(ConfigError::TypeCoercion {
            key,
            value: directive,
            expected: "tracing filter directive",
        }),
    }
}

/// Free-text string with a default. Empty is allowed.
pub fn text(raw: Option<&str>, default: &str) -> String {
    raw.unwrap_or(default).to_string()
}

/// Optional value; empty counts as absent.
pub fn optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Case-insensitive `true`/`false`/`1`/`0`.
pub fn boolean(key: &'static str, raw: Option<&str>, default: bool) -> Coerced<bool> {
    let Some(value) = raw else {
        return Ok(default);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        Ok(false)
    } else {
        Err(ConfigError::TypeCoercion {
            key,
            value: value.to_string(),
            expected: "boolean (true/false/1/0)",
        })
    }
}

pub const PORT_MIN: i64 = 1;
pub const PORT_MAX: i64 = u16::MAX as i64;

/// TCP port in 1-65535.
pub fn port(key: &'static str, raw: Option<&str>, default: u16) -> Coerced<u16> {
    let Some(value) = raw else {
        return Ok(default);
    };
    let trimmed = value.trim();
    let out_of_range = || ConfigError::RangeViolation {
        key,
        value: trimmed.to_string(),
        min: PORT_MIN,
        max: PORT_MAX,
    };
    let parsed: i64 = trimmed.parse().map_err(|e: std::num::ParseIntError| {
        match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(),
            _ => ConfigError::TypeCoercion {
                key,
                value: value.to_string(),
                expected: "integer",
            },
        }
    })?;
    if !(PORT_MIN..=PORT_MAX).contains(&parsed) {
        return Err(out_of_range());
    }
    Ok(parsed as u16)
}
