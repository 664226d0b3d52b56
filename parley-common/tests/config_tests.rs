//! Config resolution tests
//!
//! Tests touching process environment variables run serially.

use parley_common::config::{resolve_config_path, ProtocolConfig, CONFIG_ENV_VAR};
use parley_common::{Error, Locale, Query};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const TEST_ENV_VAR: &str = "PARLEY_TEST_CONFIG";

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "config.toml",
        r#"
participants = ["engine", "cli", "kiosk"]
locale = "fr"
log_level = "DEBUG"
directories = ["scores", "/tmp"]
"#,
    );

    let config = ProtocolConfig::load(&path).unwrap();
    assert!(config.participants.contains("kiosk"));
    assert!(!config.participants.contains("bot"));
    assert_eq!(config.locale, Locale::Fr);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.directories, vec![PathBuf::from("scores"), PathBuf::from("/tmp")]);
}

#[test]
fn test_load_rejects_malformed_toml() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "broken.toml", "participants = [\"engine\"");
    assert!(matches!(ProtocolConfig::load(&path), Err(Error::Toml(_))));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = ProtocolConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
#[serial]
fn test_cli_argument_beats_environment() {
    let dir = TempDir::new().unwrap();
    let from_cli = write_config(&dir, "cli.toml", "locale = \"de\"");
    let from_env = write_config(&dir, "env.toml", "locale = \"es\"");
    std::env::set_var(TEST_ENV_VAR, &from_env);

    let path = resolve_config_path(from_cli.to_str(), TEST_ENV_VAR);
    assert_eq!(path, Some(from_cli.clone()));
    let config = ProtocolConfig::resolve(from_cli.to_str(), TEST_ENV_VAR).unwrap();
    assert_eq!(config.locale, Locale::De);

    let config = ProtocolConfig::resolve(None, TEST_ENV_VAR).unwrap();
    assert_eq!(config.locale, Locale::Es);

    std::env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_blank_environment_variable_ignored() {
    std::env::set_var(TEST_ENV_VAR, "   ");
    let path = resolve_config_path(None, TEST_ENV_VAR);
    assert!(path.map_or(true, |p| p.ends_with("parley/config.toml")));
    std::env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_unreadable_file_degrades_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nowhere.toml");
    std::env::set_var(TEST_ENV_VAR, &missing);

    let config = ProtocolConfig::resolve(None, TEST_ENV_VAR).unwrap();
    assert_eq!(config, ProtocolConfig::default());

    std::env::remove_var(TEST_ENV_VAR);
}

#[test]
#[serial]
fn test_invalid_values_are_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "bad.toml", "participants = [\"engine\", \"  \"]");
    let result = ProtocolConfig::resolve(path.to_str(), CONFIG_ENV_VAR);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_configured_participants_gate_queries() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "config.toml", "participants = [\"engine\", \"kiosk\"]\nlocale = \"de\"");
    let config = ProtocolConfig::load(&path).unwrap();

    let query = Query::boolean("engine", "kiosk")
        .question("Wiederholen?")
        .participants(&config.participants)
        .locale(config.locale)
        .build()
        .unwrap();
    assert_eq!(query.display_text(), "Wiederholen? (j/n)");

    let refused = Query::boolean("engine", "cli")
        .question("Repeat?")
        .participants(&config.participants)
        .build();
    assert!(matches!(refused, Err(Error::UnknownParticipant(name)) if name == "cli"));
}
