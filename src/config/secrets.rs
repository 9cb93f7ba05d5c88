//! Secret handling utilities.
//!
//! Re-exports secrecy types and provides the first-use check for secrets
//! that may be absent at load time.

pub use secrecy::{ExposeSecret, SecretString};

use crate::error::ConfigError;

/// Borrow a secret that a feature needs, or report which key is missing.
pub fn require<'a>(
    key: &'static str,
    secret: Option<&'a SecretString>,
) -> Result<&'a SecretString, ConfigError> {
    secret.ok_or(ConfigError::MissingRequiredValue { key })
}

/// Whether a secret is present, for redacted display.
pub(crate) fn presence(secret: Option<&SecretString>) -> &'static str {
    if secret.is_some() { "set" } else { "unset" }
}
