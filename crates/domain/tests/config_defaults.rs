use ssa_domain::config::{Config, ConfigSeverity, StoreBackendKind};

#[test]
fn default_enforces_single_session() {
    let config = Config::default();
    assert!(config.authority.enforce_single_session);
    assert_eq!(config.authority.token_bytes, 32);
}

#[test]
fn default_backend_is_memory() {
    let config = Config::default();
    assert_eq!(config.store.backend, StoreBackendKind::Memory);
}

#[test]
fn default_config_is_clean() {
    assert!(Config::default().validate().is_empty());
}

#[test]
fn file_backend_parses() {
    let toml_str = r#"
[store]
backend = "file"
state_path = "/var/lib/ssa"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.store.backend, StoreBackendKind::File);
    assert_eq!(config.store.state_path.to_str(), Some("/var/lib/ssa"));
}

#[test]
fn short_tokens_are_an_error() {
    let toml_str = r#"
[authority]
token_bytes = 8
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|e| e.severity == ConfigSeverity::Error && e.field == "authority.token_bytes"));
    assert!(!config.is_valid());
}

#[test]
fn huge_tokens_only_warn() {
    let toml_str = r#"
[authority]
token_bytes = 512
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    assert!(config.is_valid());
}

#[test]
fn disabling_enforcement_warns() {
    let toml_str = r#"
[authority]
enforce_single_session = false
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    let issues = config.validate();
    assert!(issues.iter().any(|e| e.field == "authority.enforce_single_session"
        && e.severity == ConfigSeverity::Warning));
}

#[test]
fn file_backend_without_path_is_an_error() {
    let toml_str = r#"
[store]
backend = "file"
state_path = ""
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(!config.is_valid());
}

#[test]
fn issue_display_carries_severity_tag() {
    let mut config = Config::default();
    config.authority.token_bytes = 4;
    let rendered = config.validate()[0].to_string();
    assert!(rendered.starts_with("[ERROR] authority.token_bytes"));
}
