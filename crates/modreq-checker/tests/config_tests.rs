use super::*;

#[test]
fn test_empty_object_uses_defaults() {
    let config = PlatformConfig::from_json("{}").expect("valid config");
    assert_eq!(config, PlatformConfig::default());
    assert!(config.string_require.enabled);
    assert_eq!(config.string_require.global_name, "shared");
    assert_eq!(config.string_require.publishing, PublishingStrategy::Eager);
    assert_eq!(config.solver, SolverKind::Eager);
}

#[test]
fn test_camel_case_fields() {
    let config = PlatformConfig::from_json(
        r#"{
            "stringRequire": { "globalName": "import", "publishing": "lazy" },
            "solver": "incremental"
        }"#,
    )
    .expect("valid config");
    assert!(config.string_require.enabled);
    assert_eq!(config.string_require.global_name, "import");
    assert_eq!(config.string_require.publishing, PublishingStrategy::Lazy);
    assert_eq!(config.solver, SolverKind::Incremental);
}

#[test]
fn test_disable_string_require() {
    let config = PlatformConfig::from_json(r#"{ "stringRequire": { "enabled": false } }"#)
        .expect("valid config");
    assert!(!config.string_require.enabled);
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let err = PlatformConfig::from_json(r#"{ "solver": "fast" }"#).expect_err("bad solver");
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_reserved_or_invalid_global_names() {
    for name in ["require", "game", "script", "", "1abc", "a-b"] {
        let json = format!(r#"{{ "stringRequire": {{ "globalName": "{name}" }} }}"#);
        let err = PlatformConfig::from_json(&json).expect_err(name);
        assert!(matches!(err, ConfigError::InvalidGlobalName(_)), "{name}");
    }
}

#[test]
fn test_missing_config_file() {
    let err = PlatformConfig::from_file(Path::new("/no/such/modreq.json")).expect_err("missing");
    assert!(matches!(err, ConfigError::Io { .. }));
}
