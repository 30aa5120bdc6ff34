//! Loading configuration files and applying them to views.

mod common;

use common::{find_by_attr, make_view_with_config, temp_config};
use lightview::config::ConfigError;
use lightview::ViewConfig;
use serde_json::json;

#[test]
fn test_load_from_file() {
    let (_dir, path) = temp_config(
        r#"
[binding]
attribute = "data-field"

[render]
max_depth = 8

[fetch]
timeout_seconds = 10

[navigation]
active_field = "selected"
active_value = "yes"
"#,
    );

    let config = ViewConfig::load_from(&path).unwrap();
    assert_eq!(config.binding.attribute, "data-field");
    assert_eq!(config.render.max_depth, 8);
    assert!(config.render.prune_stale_nodes);
    assert_eq!(config.fetch.timeout_seconds, 10);
    assert_eq!(config.fetch.connect_timeout_seconds, 5);
    assert_eq!(config.navigation.active_field, "selected");
    assert_eq!(config.navigation.active_value, "yes");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = ViewConfig::load_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, ViewConfig::default());
}

#[test]
fn test_malformed_file_reports_its_path() {
    let (_dir, path) = temp_config("[render]\nmax_depth = \"deep\"\n");
    let err = ViewConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("lightview.toml"));
}

#[test]
fn test_invalid_values_fail_validation() {
    let (_dir, path) = temp_config("[fetch]\nconnect_timeout_seconds = 0\n");
    let err = ViewConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
fn test_unreadable_path_is_a_read_error() {
    let dir = tempfile::TempDir::new().unwrap();
    // A directory exists but cannot be read as a file.
    let err = ViewConfig::load_from(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

#[test]
fn test_loaded_config_drives_a_view() {
    let (_dir, path) = temp_config("[binding]\nattribute = \"data-field\"\n");
    let config = ViewConfig::load_from(&path).unwrap();

    let view = make_view_with_config(
        r#"<input data-field="name"><p>{{name}}</p>"#,
        json!({"name": "ann"}),
        config,
    );
    let input = find_by_attr(view.mount(), "data-field", "name");
    assert_eq!(input.value(), "ann");

    input.input_text("bea");
    assert_eq!(view.mount().inner_html(), r#"<input data-field="name"><p>bea</p>"#);
}
