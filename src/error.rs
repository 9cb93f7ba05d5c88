//! Error types for seraface-rs.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] ConfigErrors),

    #[error("failed to read env file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single misconfigured key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} is required but not set")]
    MissingRequiredValue { key: &'static str },

    #[error("{key}={value:?} is not a valid {expected}")]
    TypeCoercion {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("{key}={value} is out of range ({min}-{max})")]
    RangeViolation {
        key: &'static str,
        value: String,
        min: i64,
        max: i64,
    },

    #[error("{key} must not be empty")]
    EmptyValue { key: &'static str },
}

impl ConfigError {
    /// The environment key this violation is about.
    pub fn key(&self) -> &'static str {
        match self {
            Self::MissingRequiredValue { key }
            | Self::TypeCoercion { key, .. }
            | Self::RangeViolation { key, .. }
            | Self::EmptyValue { key } => *key,
        }
    }
}

/// Every violation found in one load pass, in key-declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigErrors(Vec<ConfigError>);

impl ConfigErrors {
    /// Returns `Err` if any violations were collected.
    pub(crate) fn check(violations: Vec<ConfigError>) -> std::result::Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self(violations))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<ConfigError> {
        self.0
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.0.len() == 1 { "problem" } else { "problems" };
        write!(f, "invalid configuration ({} {noun}):", self.0.len())?;
        for violation in &self.0 {
            write!(f, "\n  - {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}
