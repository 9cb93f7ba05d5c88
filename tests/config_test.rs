use std::io::Write;

use secrecy::ExposeSecret;
use seraface_rs::config::{EnvSource, LoadOptions, Settings};
use seraface_rs::error::{ConfigError, Error};

fn env_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn load_pairs(pairs: &[(&str, &str)]) -> Result<Settings, Vec<ConfigError>> {
    let source = EnvSource::from_pairs(pairs.iter().copied());
    Settings::from_source(&source, false).map_err(|e| e.into_inner())
}

#[test]
fn file_values_round_trip() {
    let file = env_file(
        "\
# Seraface
MONGO_URI=mongodb://db.internal:27017
DATABASE_NAME=seraface_prod
PRODUCTS_COLLECTION=products_v2
GEMINI_API_KEY=gem-123
SERPAPI_KEY=serp-456

HOST=127.0.0.1
PORT=8443
DEBUG=True
RELOAD=False
API_VERSION=v2
APP_TITLE=Seraface Staging
APP_DESCRIPTION=API for skincare product management
APP_VERSION=2.1.0
",
    );

    let source = EnvSource::from_file(file.path()).unwrap();
    let settings = Settings::from_source(&source, true).unwrap();

    assert_eq!(
        settings.mongo_uri().expose_secret(),
        "mongodb://db.internal:27017"
    );
    assert_eq!(settings.database_name(), "seraface_prod");
    assert_eq!(settings.products_collection(), "products_v2");
    assert_eq!(settings.gemini_api_key().unwrap().expose_secret(), "gem-123");
    assert_eq!(settings.serp_api_key().unwrap().expose_secret(), "serp-456");
    assert_eq!(settings.host(), "127.0.0.1");
    assert_eq!(settings.port(), 8443);
    assert!(settings.debug());
    assert!(!settings.reload());
    assert_eq!(settings.api_version(), "v2");
    assert_eq!(settings.app_title(), "Seraface Staging");
    assert_eq!(
        settings.app_description(),
        "API for skincare product management"
    );
    assert_eq!(settings.app_version(), "2.1.0");
}

#[test]
fn dollar_signs_survive_in_single_quotes() {
    let file = env_file(
        "\
MONGO_URI='mongodb://app:pa$word@db:27017'
APP_DESCRIPTION='costs $5'
",
    );

    let source = EnvSource::from_file(file.path()).unwrap();
    let settings = Settings::from_source(&source, false).unwrap();

    assert_eq!(
        settings.mongo_uri().expose_secret(),
        "mongodb://app:pa$word@db:27017"
    );
    assert_eq!(settings.app_description(), "costs $5");
}

#[test]
fn absent_keys_use_defaults() {
    let settings = load_pairs(&[]).unwrap();

    assert_eq!(
        settings.mongo_uri().expose_secret(),
        "mongodb://localhost:27017"
    );
    assert_eq!(settings.database_name(), "seraface");
    assert_eq!(settings.products_collection(), "products_cache");
    assert_eq!(settings.host(), "0.0.0.0");
    assert_eq!(settings.port(), 8000);
    assert!(!settings.debug());
    assert!(settings.reload());
    assert_eq!(settings.api_version(), "v1");
    assert_eq!(settings.app_title(), "Seraface AI Server");
    assert_eq!(
        settings.app_description(),
        "API for skincare product management"
    );
    assert_eq!(settings.app_version(), "1.0.0");
    assert_eq!(settings.log_level(), "info");
    assert_eq!(settings.otel_endpoint(), None);
}

#[test]
fn port_range_edges() {
    assert_eq!(load_pairs(&[("PORT", "1")]).unwrap().port(), 1);
    assert_eq!(load_pairs(&[("PORT", "65535")]).unwrap().port(), 65535);

    for raw in ["0", "65536", "99999999999999999999"] {
        let errors = load_pairs(&[("PORT", raw)]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(
            matches!(errors[0], ConfigError::RangeViolation { key: "PORT", .. }),
            "PORT={raw}: {errors:?}"
        );
    }
}

#[test]
fn debug_spellings() {
    for raw in ["TRUE", "true", "1"] {
        assert!(load_pairs(&[("DEBUG", raw)]).unwrap().debug(), "{raw}");
    }
    for raw in ["false", "False"] {
        assert!(!load_pairs(&[("DEBUG", raw)]).unwrap().debug(), "{raw}");
    }
}

#[test]
fn non_numeric_port_names_the_key() {
    let errors = load_pairs(&[("PORT", "not-a-number")]).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0], ConfigError::TypeCoercion { key: "PORT", .. }));
    assert!(errors[0].to_string().contains("PORT"));
}

#[test]
fn all_violations_reported_together() {
    let errors = load_pairs(&[
        ("PORT", "70000"),
        ("DEBUG", "maybe"),
        ("HOST", ""),
        ("DATABASE_NAME", ""),
    ])
    .unwrap_err();

    let keys: Vec<_> = errors.iter().map(ConfigError::key).collect();
    assert_eq!(keys, ["DATABASE_NAME", "HOST", "PORT", "DEBUG"]);
}

#[test]
fn missing_api_keys_fail_at_use_not_at_load() {
    let settings = load_pairs(&[("GEMINI_API_KEY", "")]).unwrap();
    assert_eq!(
        settings.gemini_api_key().unwrap_err(),
        ConfigError::MissingRequiredValue {
            key: "GEMINI_API_KEY"
        }
    );
    assert!(settings.serp_api_key().is_err());
}

#[test]
fn strict_mode_requires_api_keys() {
    let source = EnvSource::from_pairs([("SERPAPI_KEY", "serp")]);
    let errors = Settings::from_source(&source, true).unwrap_err();
    assert_eq!(
        errors.into_inner(),
        vec![ConfigError::MissingRequiredValue {
            key: "GEMINI_API_KEY"
        }]
    );
}

#[test]
fn secrets_are_redacted() {
    let settings = load_pairs(&[
        ("MONGO_URI", "mongodb://admin:hunter2@db:27017"),
        ("GEMINI_API_KEY", "gem-secret"),
    ])
    .unwrap();

    let debug = format!("{settings:?}");
    assert!(!debug.contains("hunter2"));
    assert!(!debug.contains("gem-secret"));

    let json = serde_json::to_value(settings.summary()).unwrap();
    assert_eq!(json["gemini_api_key"], "set");
    assert_eq!(json["serp_api_key"], "unset");
    assert_eq!(json["mongo_uri"], "[redacted]");
}

#[test]
fn aggregated_error_lists_every_problem() {
    let file = env_file("RELOAD=sometimes\nAPP_TITLE=\n");
    let options = LoadOptions {
        env_file: Some(file.path().to_path_buf()),
        strict: false,
    };

    let Err(Error::Config(errors)) = Settings::load(&options) else {
        panic!("expected a configuration error");
    };
    let message = errors.to_string();
    assert!(message.contains("RELOAD"), "{message}");
    assert!(message.contains("APP_TITLE"), "{message}");
}

#[test]
fn explicit_missing_env_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let options = LoadOptions {
        env_file: Some(dir.path().join("missing.env")),
        strict: false,
    };
    assert!(matches!(
        Settings::load(&options),
        Err(Error::EnvFile { .. })
    ));
}

#[test]
fn process_environment_overrides_file() {
    let file = env_file("HOST=10.1.1.1\n");
    unsafe {
        std::env::set_var("HOST", "192.168.0.9");
    }

    let source = EnvSource::resolve(Some(file.path())).unwrap();
    let settings = Settings::from_source(&source, false);

    unsafe {
        std::env::remove_var("HOST");
    }
    assert_eq!(settings.unwrap().host(), "192.168.0.9");
}
