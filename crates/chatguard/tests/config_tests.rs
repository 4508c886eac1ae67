//! Integration tests for configuration loading.

use std::time::Duration;

use chatguard::config::{ConfigLoader, EnvConfig, GuardConfig, vars};
use chatguard::error::GuardError;

#[test]
fn toml_file_is_found_and_loaded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("chatguard.toml"),
        r#"
settings_path = "/var/lib/chatguard/settings.json"

[classifier]
endpoint = "http://classifier.internal:8080"
analyze_timeout_ms = 1500

[logging]
filter = "chatguard=debug"
json = true
"#,
    )
    .unwrap();

    let config = ConfigLoader::new().add_path(dir.path()).load_or_default().unwrap();
    assert_eq!(config.classifier.endpoint, "http://classifier.internal:8080");
    assert_eq!(config.classifier.timeouts().analyze, Duration::from_millis(1500));
    // Unset fields keep their defaults.
    assert_eq!(config.classifier.probe_timeout_ms, 2000);
    assert!(config.classifier.enabled);
    assert_eq!(config.logging.filter, "chatguard=debug");
    assert!(config.logging.json);
    assert!(config.settings_path.is_some());
}

#[test]
fn toml_is_preferred_over_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chatguard.json"), r#"{"classifier": {"enabled": false}}"#).unwrap();
    std::fs::write(dir.path().join("chatguard.toml"), "[classifier]\nenabled = true\n").unwrap();

    let loader = ConfigLoader::new().add_path(dir.path());
    let found = loader.find("chatguard").unwrap();
    assert_eq!(found.extension().unwrap(), "toml");
}

#[test]
fn json_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatguard.json");
    std::fs::write(&path, r#"{"classifier": {"enabled": false, "endpoint": ""}}"#).unwrap();

    let config = ConfigLoader::new().load(&path).unwrap();
    assert!(!config.classifier.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn first_search_path_wins() {
    let near = tempfile::tempdir().unwrap();
    let far = tempfile::tempdir().unwrap();
    std::fs::write(near.path().join("chatguard.toml"), "[logging]\nfilter = \"warn\"\n").unwrap();
    std::fs::write(far.path().join("chatguard.toml"), "[logging]\nfilter = \"trace\"\n").unwrap();

    let config = ConfigLoader::new()
        .add_path(near.path())
        .add_path(far.path())
        .load_or_default()
        .unwrap();
    assert_eq!(config.logging.filter, "warn");
}

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConfigLoader::new().add_path(dir.path()).load_or_default().unwrap();
    assert_eq!(config, GuardConfig::default());
}

#[test]
fn malformed_toml_is_typed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chatguard.toml");
    std::fs::write(&path, "[classifier\nendpoint = ").unwrap();

    let err = ConfigLoader::new().load(&path).unwrap_err();
    assert!(matches!(err, GuardError::Toml(_)));
}

#[test]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("chatguard.toml"), "[classifier]\nanalyze_timeout_ms = 1500\n").unwrap();

    let env = EnvConfig::from_pairs([
        ("CHATGUARD_ANALYZE_TIMEOUT_MS", "250"),
        ("CHATGUARD_CLASSIFIER_URL", "http://10.0.0.5:5000"),
    ]);
    let config = ConfigLoader::new()
        .add_path(dir.path())
        .load_or_default()
        .unwrap()
        .with_env(&env)
        .unwrap();

    assert_eq!(config.classifier.analyze_timeout_ms, 250);
    assert_eq!(config.classifier.endpoint, "http://10.0.0.5:5000");
    assert!(EnvConfig::from_pairs([("CHATGUARD_ANALYZE_TIMEOUT_MS", "1")]).is_set(vars::ANALYZE_TIMEOUT_MS));
}

#[test]
fn zero_timeout_is_rejected() {
    let env = EnvConfig::from_pairs([("CHATGUARD_PROBE_TIMEOUT_MS", "0")]);
    let err = GuardConfig::default().with_env(&env).unwrap_err();
    assert!(matches!(err, GuardError::Config { .. }));
}
