//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;

use lightview::dom::parse_fragment;
use lightview::template::TemplateError;
use lightview::{Node, Store, TemplateSource, ViewConfig, ViewController, ViewOptions};
use serde_json::Value;
use tempfile::TempDir;

/// Builds a controller over a fresh `<div>` with an inline template.
pub fn make_view(template: &str, data: Value) -> ViewController {
    make_view_with_config(template, data, ViewConfig::default())
}

pub fn make_view_with_config(template: &str, data: Value, config: ViewConfig) -> ViewController {
    ViewController::new(
        Node::element("div"),
        ViewOptions::new(TemplateSource::Inline(template.to_string()), data).with_config(config),
    )
    .expect("Failed to build view")
}

/// A mount element whose children are parsed from `markup`.
pub fn mount_with(markup: &str) -> Node {
    let mount = Node::element("div");
    mount.replace_children(parse_fragment(markup));
    mount
}

/// Counts store notifications for as long as the returned guard lives.
pub fn count_changes(store: &Store) -> (Rc<Cell<u32>>, lightview::store::Subscription) {
    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);
    let sub = store.subscribe(move || seen.set(seen.get() + 1));
    (count, sub)
}

/// First descendant element of `root` carrying `attr="value"`.
pub fn find_by_attr(root: &Node, attr: &str, value: &str) -> Node {
    root.find(|node| node.attribute(attr).as_deref() == Some(value))
        .unwrap_or_else(|| panic!("No element with {attr}=\"{value}\""))
}

/// Create a temporary config file with the given TOML content.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("lightview.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}

/// A template closure that fails whenever `flag` is set in the context.
pub fn failing_when(flag: &'static str) -> Rc<dyn lightview::template::Template> {
    Rc::new(move |ctx: &Value| -> Result<String, TemplateError> {
        if ctx[flag] == Value::Bool(true) {
            Err(TemplateError::Custom(format!("{flag} is set")))
        } else {
            Ok(format!("<p>{}</p>", ctx["text"].as_str().unwrap_or_default()))
        }
    })
}
