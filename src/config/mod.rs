//! Typed configuration from a dotenv file and the process environment.
//!
//! Loads once at startup, collects every misconfiguration in one pass and
//! fails fast. Sensitive values are wrapped in secrecy::SecretString to
//! prevent log leaks. The resulting [`Settings`] is immutable; share it with
//! `Arc<Settings>`.

pub mod coerce;
pub mod secrets;
pub mod source;

use std::path::PathBuf;

use secrecy::SecretString;
use serde::Serialize;

use crate::error::{ConfigError, ConfigErrors, Result};
use secrets::presence;
pub use source::EnvSource;

pub mod keys {
    pub const MONGO_URI: &str = "MONGO_URI";
    pub const DATABASE_NAME: &str = "DATABASE_NAME";
    pub const PRODUCTS_COLLECTION: &str = "PRODUCTS_COLLECTION";
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const SERPAPI_KEY: &str = "SERPAPI_KEY";
    pub const HOST: &str = "HOST";
    pub const PORT: &str = "PORT";
    pub const DEBUG: &str = "DEBUG";
    pub const RELOAD: &str = "RELOAD";
    pub const API_VERSION: &str = "API_VERSION";
    pub const APP_TITLE: &str = "APP_TITLE";
    pub const APP_DESCRIPTION: &str = "APP_DESCRIPTION";
    pub const APP_VERSION: &str = "APP_VERSION";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const OTEL_ENDPOINT: &str = "OTEL_ENDPOINT";

    /// Every key, in declaration order.
    pub const ALL: [&str; 15] = [
        MONGO_URI,
        DATABASE_NAME,
        PRODUCTS_COLLECTION,
        GEMINI_API_KEY,
        SERPAPI_KEY,
        HOST,
        PORT,
        DEBUG,
        RELOAD,
        API_VERSION,
        APP_TITLE,
        APP_DESCRIPTION,
        APP_VERSION,
        LOG_LEVEL,
        OTEL_ENDPOINT,
    ];
}

pub mod defaults {
    pub const MONGO_URI: &str = "mongodb://localhost:27017";
    pub const DATABASE_NAME: &str = "seraface";
    pub const PRODUCTS_COLLECTION: &str = "products_cache";
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8000;
    pub const DEBUG: bool = false;
    pub const RELOAD: bool = true;
    pub const API_VERSION: &str = "v1";
    pub const APP_TITLE: &str = "Seraface AI Server";
    pub const APP_DESCRIPTION: &str = "API for skincare product management";
    pub const APP_VERSION: &str = "1.0.0";
    pub const LOG_LEVEL: &str = "info";
}

/// How [`Settings::load`] finds and judges its input.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit env file. When `None`, `.env` is read if present.
    pub env_file: Option<PathBuf>,
    /// Treat absent API keys as load-time errors.
    pub strict: bool,
}

/// Validated application settings.
#[derive(Debug)]
pub struct Settings {
    mongo_uri: SecretString,
    database_name: String,
    products_collection: String,
    gemini_api_key: Option<SecretString>,
    serp_api_key: Option<SecretString>,
    host: String,
    port: u16,
    debug: bool,
    reload: bool,
    api_version: String,
    app_title: String,
    app_description: String,
    app_version: String,
    log_level: String,
    otel_endpoint: Option<String>,
}

impl Settings {
    /// Load settings from the env file and process environment.
    ///
    /// Process environment values override file values.
    pub fn load(options: &LoadOptions) -> Result<Self> {
        let source = EnvSource::resolve(options.env_file.as_deref())?;
        let settings = Self::from_source(&source, options.strict)?;
        tracing::info!(
            app = %settings.app_title,
            version = %settings.app_version,
            bind = %settings.bind_addr(),
            debug = settings.debug,
            "configuration loaded"
        );
        Ok(settings)
    }

    /// Coerce, default and validate every known key from `source`.
    pub fn from_source(
        source: &EnvSource,
        strict: bool,
    ) -> std::result::Result<Self, ConfigErrors> {
        let mut violations: Vec<ConfigError> = keys::ALL
            .iter()
            .filter_map(|&key| {
                source.non_unicode(key).map(|value| ConfigError::TypeCoercion {
                    key,
                    value: value.to_string(),
                    expected: "UTF-8 string",
                })
            })
            .collect();
        let get = |key| source.get(key);

        let mongo_uri = collect(
            &mut violations,
            coerce::non_empty(keys::MONGO_URI, get(keys::MONGO_URI), defaults::MONGO_URI),
        );
        let database_name = collect(
            &mut violations,
            coerce::non_empty(
                keys::DATABASE_NAME,
                get(keys::DATABASE_NAME),
                defaults::DATABASE_NAME,
            ),
        );
        let products_collection = collect(
            &mut violations,
            coerce::non_empty(
                keys::PRODUCTS_COLLECTION,
                get(keys::PRODUCTS_COLLECTION),
                defaults::PRODUCTS_COLLECTION,
            ),
        );

        let gemini_api_key = coerce::optional(get(keys::GEMINI_API_KEY));
        let serp_api_key = coerce::optional(get(keys::SERPAPI_KEY));
        if strict {
            if gemini_api_key.is_none() && source.non_unicode(keys::GEMINI_API_KEY).is_none() {
                violations.push(ConfigError::MissingRequiredValue {
                    key: keys::GEMINI_API_KEY,
                });
            }
            if serp_api_key.is_none() && source.non_unicode(keys::SERPAPI_KEY).is_none() {
                violations.push(ConfigError::MissingRequiredValue {
                    key: keys::SERPAPI_KEY,
                });
            }
        }

        let host = collect(
            &mut violations,
            coerce::non_empty(keys::HOST, get(keys::HOST), defaults::HOST),
        );
        let port = collect(
            &mut violations,
            coerce::port(keys::PORT, get(keys::PORT), defaults::PORT),
        );
        let debug = collect(
            &mut violations,
            coerce::boolean(keys::DEBUG, get(keys::DEBUG), defaults::DEBUG),
        );
        let reload = collect(
            &mut violations,
            coerce::boolean(keys::RELOAD, get(keys::RELOAD), defaults::RELOAD),
        );
        let api_version = collect(
            &mut violations,
            coerce::non_empty(
                keys::API_VERSION,
                get(keys::API_VERSION),
                defaults::API_VERSION,
            ),
        );
        let app_title = collect(
            &mut violations,
            coerce::non_empty(keys::APP_TITLE, get(keys::APP_TITLE), defaults::APP_TITLE),
        );
        let log_level = collect(
            &mut violations,
            coerce::log_filter(keys::LOG_LEVEL, get(keys::LOG_LEVEL), defaults::LOG_LEVEL),
        );

        // A key yields at most one violation, so this restores declaration order.
        violations.sort_by_key(|violation| {
            keys::ALL
                .iter()
                .position(|&key| key == violation.key())
        });
        ConfigErrors::check(violations)?;

        Ok(Self {
            mongo_uri: SecretString::from(mongo_uri),
            database_name,
            products_collection,
            gemini_api_key: gemini_api_key.map(SecretString::from),
            serp_api_key: serp_api_key.map(SecretString::from),
            host,
            port,
            debug,
            reload,
            api_version,
            app_title,
            app_description: coerce::text(
                get(keys::APP_DESCRIPTION),
                defaults::APP_DESCRIPTION,
            ),
            app_version: coerce::text(get(keys::APP_VERSION), defaults::APP_VERSION),
            log_level,
            otel_endpoint: coerce::optional(get(keys::OTEL_ENDPOINT)),
        })
    }

    pub fn mongo_uri(&self) -> &SecretString {
        &self.mongo_uri
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn products_collection(&self) -> &str {
        &self.products_collection
    }

    /// Gemini key, or `MissingRequiredValue` if it was never configured.
    pub fn gemini_api_key(&self) -> std::result::Result<&SecretString, ConfigError> {
        secrets::require(keys::GEMINI_API_KEY, self.gemini_api_key.as_ref())
    }

    /// SerpAPI key, or `MissingRequiredValue` if it was never configured.
    pub fn serp_api_key(&self) -> std::result::Result<&SecretString, ConfigError> {
        secrets::require(keys::SERPAPI_KEY, self.serp_api_key.as_ref())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn reload(&self) -> bool {
        self.reload
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn app_title(&self) -> &str {
        &self.app_title
    }

    pub fn app_description(&self) -> &str {
        &self.app_description
    }

    pub fn app_version(&self) -> &str {
        &self.app_version
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn otel_endpoint(&self) -> Option<&str> {
        self.otel_endpoint.as_deref()
    }

    /// `host:port`, suitable for a listener bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route prefix for the versioned API, e.g. `/api/v1`.
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.api_version)
    }

    /// Redacted view safe to print or log.
    pub fn summary(&self) -> SettingsSummary<'_> {
        SettingsSummary {
            mongo_uri: "[redacted]",
            database_name: &self.database_name,
            products_collection: &self.products_collection,
            gemini_api_key: presence(self.gemini_api_key.as_ref()),
            serp_api_key: presence(self.serp_api_key.as_ref()),
            host: &self.host,
            port: self.port,
            debug: self.debug,
            reload: self.reload,
            api_version: &self.api_version,
            app_title: &self.app_title,
            app_description: &self.app_description,
            app_version: &self.app_version,
            log_level: &self.log_level,
            otel_endpoint: self.otel_endpoint.as_deref(),
        }
    }
}

/// Printable settings with secrets replaced by their presence.
#[derive(Debug, Serialize)]
pub struct SettingsSummary<'a> {
    pub mongo_uri: &'static str,
    pub database_name: &'a str,
    pub products_collection: &'a str,
    pub gemini_api_key: &'static str,
    pub serp_api_key: &'static str,
    pub host: &'a str,
    pub port: u16,
    pub debug: bool,
    pub reload: bool,
    pub api_version: &'a str,
    pub app_title: &'a str,
    pub app_description: &'a str,
    pub app_version: &'a str,
    pub log_level: &'a str,
    pub otel_endpoint: Option<&'a str>,
}

impl SettingsSummary<'_> {
    /// `(KEY, value)` rows in declaration order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            (keys::MONGO_URI, self.mongo_uri.to_string()),
            (keys::DATABASE_NAME, self.database_name.to_string()),
            (keys::PRODUCTS_COLLECTION, self.products_collection.to_string()),
            (keys::GEMINI_API_KEY, self.gemini_api_key.to_string()),
            (keys::SERPAPI_KEY, self.serp_api_key.to_string()),
            (keys::HOST, self.host.to_string()),
            (keys::PORT, self.port.to_string()),
            (keys::DEBUG, self.debug.to_string()),
            (keys::RELOAD, self.reload.to_string()),
            (keys::API_VERSION, self.api_version.to_string()),
            (keys::APP_TITLE, self.app_title.to_string()),
            (keys::APP_DESCRIPTION, self.app_description.to_string()),
            (keys::APP_VERSION, self.app_version.to_string()),
            (keys::LOG_LEVEL, self.log_level.to_string()),
            (
                keys::OTEL_ENDPOINT,
                self.otel_endpoint.unwrap_or("-").to_string(),
            ),
        ]
    }
}

/// Record a violation and hand back a placeholder; the placeholder is never
/// observed because any violation aborts construction.
fn collect<T: Default>(
    violations: &mut Vec<ConfigError>,
    coerced: std::result::Result<T, ConfigError>,
) -> T {
    coerced.unwrap_or_else(|violation| {
        violations.push(violation);
        T::default()
    })
}
