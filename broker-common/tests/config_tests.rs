//! Unit tests for configuration resolution and graceful degradation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate BROKER_* variables are marked with #[serial]
//! to ensure they run sequentially, not in parallel.

use broker_common::config::{
    load_toml_config, CliOverrides, CompiledDefaults, ConfigResolver, LoggingConfig, TomlConfig,
    ENV_DATABASE_PATH, ENV_LOG_LEVEL, ENV_WORKERS,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    env::remove_var(ENV_DATABASE_PATH);
    env::remove_var(ENV_LOG_LEVEL);
    env::remove_var(ENV_WORKERS);
}

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.database_path.as_os_str().is_empty());
    assert!(defaults.database_path.ends_with("broker.db"));
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.workers, 4);
    assert_eq!(defaults.batch_size, 500);
}

#[test]
#[serial]
fn test_cli_overrides_env_and_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(
        &dir,
        r#"
database_path = "/srv/toml.db"
workers = 2

[logging]
level = "debug"
"#,
    );
    env::set_var(ENV_DATABASE_PATH, "/srv/env.db");

    let config = ConfigResolver::new(CliOverrides {
        config_file: Some(config_file),
        database_path: Some(PathBuf::from("/srv/cli.db")),
        log_level: Some("trace".to_string()),
        workers: Some(16),
    })
    .resolve()
    .unwrap();

    assert_eq!(config.database_path, PathBuf::from("/srv/cli.db"));
    assert_eq!(config.log_level, "trace");
    assert_eq!(config.workers, 16);

    clear_env();
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, "database_path = \"/srv/toml.db\"\nworkers = 2\n");
    env::set_var(ENV_DATABASE_PATH, "/srv/env.db");
    env::set_var(ENV_WORKERS, "6");

    let config = ConfigResolver::new(CliOverrides {
        config_file: Some(config_file),
        ..Default::default()
    })
    .resolve()
    .unwrap();

    assert_eq!(config.database_path, PathBuf::from("/srv/env.db"));
    assert_eq!(config.workers, 6);

    clear_env();
}

#[test]
#[serial]
fn test_toml_used_when_cli_and_env_absent() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(
        &dir,
        r#"
database_path = "/srv/toml.db"
workers = 3
batch_size = 50

[logging]
level = "warn"
"#,
    );

    let config = ConfigResolver::new(CliOverrides {
        config_file: Some(config_file),
        ..Default::default()
    })
    .resolve()
    .unwrap();

    assert_eq!(config.database_path, PathBuf::from("/srv/toml.db"));
    assert_eq!(config.log_level, "warn");
    assert_eq!(config.workers, 3);
    assert_eq!(config.batch_size, 50);
}

#[test]
#[serial]
fn test_missing_config_file_falls_back_to_defaults() {
    clear_env();
    let dir = TempDir::new().unwrap();

    let config = ConfigResolver::new(CliOverrides {
        config_file: Some(dir.path().join("does-not-exist.toml")),
        ..Default::default()
    })
    .resolve()
    .unwrap();

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(config.database_path, defaults.database_path);
    assert_eq!(config.workers, defaults.workers);
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_malformed_config_file_is_ignored() {
    clear_env();
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, "workers = [this is not toml");

    let config = ConfigResolver::new(CliOverrides {
        config_file: Some(config_file),
        ..Default::default()
    })
    .resolve()
    .unwrap();

    assert_eq!(config.workers, CompiledDefaults::for_current_platform().workers);
}

#[test]
#[serial]
fn test_invalid_worker_env_is_config_error() {
    clear_env();
    env::set_var(ENV_WORKERS, "many");

    let result = ConfigResolver::new(CliOverrides::default()).resolve();
    assert!(result.is_err());

    clear_env();
}

#[test]
#[serial]
fn test_zero_workers_rejected() {
    clear_env();

    let result = ConfigResolver::new(CliOverrides {
        workers: Some(0),
        ..Default::default()
    })
    .resolve();
    assert!(result.is_err());
}

#[test]
fn test_load_toml_config_defaults_logging_section() {
    let dir = TempDir::new().unwrap();
    let config_file = write_config(&dir, "database_path = \"/srv/a.db\"\n");

    let config = load_toml_config(&config_file).unwrap();
    assert_eq!(
        config,
        TomlConfig {
            database_path: Some(PathBuf::from("/srv/a.db")),
            logging: LoggingConfig::default(),
            workers: None,
            batch_size: None,
        }
    );
}
