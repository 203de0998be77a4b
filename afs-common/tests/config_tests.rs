//! Configuration resolution tests
//!
//! Uses serial_test: these tests set and clear process environment variables.

use afs_common::config::{
    default_root_folder, ensure_directory_exists, locate_config_file, resolve_root_folder,
    ConfigSource, SentimentBackend, TomlConfig, CONFIG_FILE_ENV, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn test_root_folder_default_when_nothing_set() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolved = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(resolved, default_root_folder());
}

#[test]
#[serial]
fn test_root_folder_priority_order() {
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    env::remove_var(ROOT_FOLDER_ENV);
    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/from/toml"));

    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/from/env"));

    let cli = Path::new("/from/cli");
    assert_eq!(resolve_root_folder(Some(cli), &toml), PathBuf::from("/from/cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_config_file_from_env_var() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("afs.toml");
    std::fs::write(&path, "[analysis]\nsentiment = \"keyword\"\n").unwrap();

    env::set_var(CONFIG_FILE_ENV, &path);
    assert_eq!(locate_config_file(None), Some(path.clone()));

    let (config, source) = TomlConfig::load_or_default(None).unwrap();
    assert_eq!(config.analysis.sentiment, SentimentBackend::Keyword);
    assert_eq!(source, ConfigSource::File(path.clone()));

    env::remove_var(CONFIG_FILE_ENV);
}

#[test]
#[serial]
fn test_missing_config_file_falls_back_to_defaults() {
    env::remove_var(CONFIG_FILE_ENV);
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let (config, source) = TomlConfig::load_or_default(Some(&missing)).unwrap();
    assert_eq!(config.analysis.sentiment, SentimentBackend::Model);
    assert_eq!(source, ConfigSource::Missing(missing));
}

#[test]
#[serial]
fn test_malformed_config_file_is_an_error() {
    env::remove_var(CONFIG_FILE_ENV);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[server\nport = ").unwrap();

    let result = TomlConfig::load_or_default(Some(&path));
    assert!(matches!(result, Err(afs_common::Error::Config(_))));
}

#[test]
fn test_ensure_directory_exists_creates_nested_folders() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("a").join("b");

    ensure_directory_exists(&root).unwrap();
    assert!(root.is_dir());

    // Second call is a no-op
    ensure_directory_exists(&root).unwrap();
}
