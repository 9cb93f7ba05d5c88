//! Layered key/value source for configuration.
//!
//! A dotenv file provides the base layer; the process environment is
//! layered on top so deployments can override file values.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;

use crate::error::{Error, Result};

/// Default env file looked up in the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Flat view of configuration keys after layering.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
    /// Keys whose process value is not valid UTF-8, with a lossy rendering.
    non_unicode: HashMap<String, String>,
}

impl EnvSource {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a source from explicit pairs. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            non_unicode: HashMap::new(),
        }
    }

    /// Parse a dotenv file. The file must exist.
    ///
    /// Unlike `dotenvy::from_path`, this never writes into the process
    /// environment. Unquoted and double-quoted values go through `$VAR`
    /// substitution, so a value containing a literal `$` (passwords in
    /// `MONGO_URI`, prices in free text) must be single-quoted:
    /// `MONGO_URI='mongodb://app:pa$word@db:27017'`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        warn_substituted_dollars(path);
        let env_file_error = |source| Error::EnvFile {
            path: path.to_path_buf(),
            source,
        };

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(env_file_error)? {
            let (key, value) = item.map_err(env_file_error)?;
            vars.insert(key, value);
        }
        Ok(Self {
            vars,
            non_unicode: HashMap::new(),
        })
    }

    /// Parse a dotenv file if it exists; an absent file yields an empty source.
    pub fn from_optional_file(path: impl AsRef<Path>) -> Result<Self> {
        match Self::from_file(path) {
            Err(Error::EnvFile { source, .. }) if source.not_found() => Ok(Self::empty()),
            other => other,
        }
    }

    /// Snapshot of the process environment.
    ///
    /// Values that are not valid UTF-8 are kept aside so the loader can
    /// report them; keys that are not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        Self::from_os_pairs(std::env::vars_os())
    }

    pub(crate) fn from_os_pairs(pairs: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        let mut source = Self::empty();
        for (key, value) in pairs {
            let Ok(key) = key.into_string() else {
                continue;
            };
            match value.into_string() {
                Ok(value) => {
                    source.vars.insert(key, value);
                }
                Err(value) => {
                    tracing::warn!(key = %key, "environment value is not valid UTF-8");
                    source
                        .non_unicode
                        .insert(key, value.to_string_lossy().into_owned());
                }
            }
        }
        source
    }

    /// Resolve the standard layering: env file, then process environment.
    ///
    /// With an explicit `env_file` the file must exist. Without one,
    /// [`DEFAULT_ENV_FILE`] is read when present.
    pub fn resolve(env_file: Option<&Path>) -> Result<Self> {
        let file = match env_file {
            Some(path) => Self::from_file(path)?,
            None => Self::from_optional_file(DEFAULT_ENV_FILE)?,
        };
        tracing::debug!(
            env_file = %env_file.unwrap_or(Path::new(DEFAULT_ENV_FILE)).display(),
            file_keys = file.len(),
            "resolving configuration source"
        );
        Ok(file.overlay(Self::from_process()))
    }

    /// Layer `upper` on top of `self`; keys in `upper` win.
    pub fn overlay(mut self, upper: EnvSource) -> Self {
        for key in upper.vars.keys() {
            self.non_unicode.remove(key);
        }
        for key in upper.non_unicode.keys() {
            self.vars.remove(key);
        }
        self.vars.extend(upper.vars);
        self.non_unicode.extend(upper.non_unicode);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Lossy rendering of `key` when its value was not valid UTF-8.
    pub fn non_unicode(&self, key: &str) -> Option<&str> {
        self.non_unicode.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Warn about values that dotenvy will run `$VAR` substitution on.
///
/// Only the key is logged; the value may be a secret.
fn warn_substituted_dollars(path: &Path) {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return;
    };
    for line in contents.lines() {
        let line = line.trim_start();
        if line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim_start();
        if !value.starts_with('\'') && value.contains('$') {
            tracing::warn!(
                key = key.trim(),
                "value contains `$` outside single quotes; it will be substituted"
            );
        }
    }
}
