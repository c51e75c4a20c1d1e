mod common;

use reactive_coordinator::config::{Config, ConfigError, DemoConfig, LoggingConfig};
use reactive_coordinator::demo::DemoAction;
use std::fs;
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config");
    (temp_dir, path)
}

/// Test that Config::default() produces the expected values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.logging.filter, "info");
    assert_eq!(config.demo.app_version, "1.0.0");
    assert_eq!(config.demo.step_delay_ms, 200);
    assert_eq!(config.demo.script.last().map(String::as_str), Some("close"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("reactive-coordinator/config.toml"));
}

#[test]
fn test_load_from_partial_file_fills_defaults() {
    let (_dir, path) = write_config(
        r#"[demo]
app_version = "3.0.0"
script = ["greet", "back"]
"#,
    );

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.demo.app_version, "3.0.0");
    assert_eq!(config.demo.step_delay_ms, 200);
    assert_eq!(config.logging.filter, "info");
    assert_eq!(
        config.demo.actions().unwrap(),
        vec![DemoAction::Greet, DemoAction::Back]
    );
}

#[test]
fn test_load_from_empty_file_is_default() {
    let (_dir, path) = write_config("");
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.demo.script, DemoConfig::default().script);
}

#[test]
fn test_load_from_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load_from(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError { .. })));
}

#[test]
fn test_load_from_invalid_toml_is_parse_error() {
    let (_dir, path) = write_config("[demo\nscript = ");
    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_validation_rejects_unknown_action() {
    let config = Config {
        logging: LoggingConfig::default(),
        demo: DemoConfig {
            script: vec!["greet".into(), "teleport".into()],
            ..DemoConfig::default()
        },
    };

    match config.validate() {
        Err(ConfigError::ValidationError { message }) => assert!(message.contains("teleport")),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_validation_rejects_empty_version() {
    let (_dir, path) = write_config("[demo]\napp_version = \"  \"\n");
    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}
