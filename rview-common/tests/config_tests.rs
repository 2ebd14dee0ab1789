//! Integration tests for config file resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate RVIEW_CONFIG are marked with #[serial].

use rview_common::config::{locate_config_file, ViewerConfig, CONFIG_ENV_VAR};
use rview_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn test_explicit_path_wins_over_env() {
    let dir = TempDir::new().unwrap();
    let explicit = dir.path().join("explicit.toml");
    let from_env = dir.path().join("env.toml");
    fs::write(&explicit, "port = 9001").unwrap();
    fs::write(&from_env, "port = 9002").unwrap();

    env::set_var(CONFIG_ENV_VAR, &from_env);
    let config = ViewerConfig::load(Some(&explicit)).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.port, 9001);
}

#[test]
#[serial]
fn test_env_var_used_without_explicit_path() {
    let dir = TempDir::new().unwrap();
    let from_env = dir.path().join("env.toml");
    fs::write(&from_env, "port = 9002\nsearch_dirs = [\"/mnt/media\"]").unwrap();

    env::set_var(CONFIG_ENV_VAR, &from_env);
    let config = ViewerConfig::load(None).unwrap();
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(config.port, 9002);
    assert_eq!(config.search_dirs.len(), 1);
}

#[test]
#[serial]
fn test_named_but_missing_file_is_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let result = locate_config_file(Some(std::path::Path::new("/nonexistent/rview.toml")));
    assert!(matches!(result, Err(Error::Config(_))));

    env::set_var(CONFIG_ENV_VAR, "/nonexistent/env-rview.toml");
    let result = ViewerConfig::load(None);
    env::remove_var(CONFIG_ENV_VAR);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_unparseable_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "port = [").unwrap();

    env::remove_var(CONFIG_ENV_VAR);
    let result = ViewerConfig::load(Some(&path));
    assert!(matches!(result, Err(Error::Config(_))));
}
