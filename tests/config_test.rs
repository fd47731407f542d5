//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run without a global config (temp directories only), so the
//! local `.bomtree.toml` overlays the compiled defaults directly.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use bomtree::config::{local_config_path, Settings, DEFAULT_SEPARATOR};
use bomtree::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

#[test]
fn given_no_local_config_when_load_then_defaults_anchored_to_project() {
    let project = TempDir::new().unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.definitions_file, project.path().join("definitions.txt"));
    assert_eq!(settings.separator, DEFAULT_SEPARATOR);
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let project = TempDir::new().unwrap();
    let local = r#"
definitions_file = "bom/parts.txt"
separator = "==="
"#;
    fs::write(local_config_path(project.path()), local).unwrap();

    // Act
    let settings = Settings::load(Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings.definitions_file, project.path().join("bom/parts.txt"));
    assert_eq!(settings.separator, "===");
}

#[test]
fn given_absolute_path_in_local_config_when_load_then_kept_as_is() {
    let project = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let defs = elsewhere.path().join("defs.txt");
    fs::write(
        local_config_path(project.path()),
        format!("definitions_file = {:?}\n", defs.display().to_string()),
    )
    .unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.definitions_file, defs);
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let project = TempDir::new().unwrap();
    fs::write(local_config_path(project.path()), "definitions_file = [").unwrap();

    let err = Settings::load(Some(project.path())).unwrap_err();

    assert!(err.to_string().starts_with("config error"), "{err}");
}

/// Only test in this binary that touches the environment; the other tests
/// never assert on `queries_file`.
#[test]
fn given_env_override_when_load_then_env_wins_over_local_config() {
    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "queries_file = \"local.txt\"\n",
    )
    .unwrap();

    std::env::set_var("BOMTREE_QUERIES_FILE", "/from/env.txt");
    let settings = Settings::load(Some(project.path()));
    std::env::remove_var("BOMTREE_QUERIES_FILE");

    assert_eq!(settings.unwrap().queries_file, PathBuf::from("/from/env.txt"));
}

#[test]
fn given_settings_when_rendered_then_toml_round_trips() {
    let project = TempDir::new().unwrap();
    let settings = Settings::load(Some(project.path())).unwrap();

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed.definitions_file, settings.definitions_file);
    assert_eq!(parsed.separator, settings.separator);
}
