//! Controller construction, data replacement and navigation.

mod common;

use common::{make_view, mount_with};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use lightview::template::HandlebarsEngine;
use lightview::{TemplateSource, ViewConfig, ViewController, ViewError, ViewOptions};
use serde_json::json;

fn from_mount(markup: &str, data: serde_json::Value) -> Result<ViewController, ViewError> {
    ViewController::new(
        mount_with(markup),
        ViewOptions::new(TemplateSource::FromMount, data),
    )
}

#[test]
fn test_template_from_tpl_element() {
    let view = from_mount(
        r#"<div class="tpl hidden"><ul>{{#each items}}<li>{{this}}</li>{{/each}}</ul></div>"#,
        json!({"items": ["a", "b"]}),
    )
    .unwrap();
    assert_eq!(view.mount().inner_html(), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn test_template_from_mount_markup() {
    let view = from_mount("\n  <p>{{msg}}</p>\n", json!({"msg": "hello"})).unwrap();
    assert_eq!(view.mount().inner_html(), "\n  <p>hello</p>\n");
}

#[test]
fn test_empty_mount_has_no_template() {
    assert!(matches!(
        from_mount("", json!({})),
        Err(ViewError::MissingTemplate)
    ));
    assert!(matches!(
        from_mount("  \n ", json!({})),
        Err(ViewError::MissingTemplate)
    ));
    assert!(matches!(
        from_mount(r#"<div class="tpl"> </div>"#, json!({})),
        Err(ViewError::MissingTemplate)
    ));
}

#[test]
fn test_invalid_config_fails_construction() {
    let mut config = ViewConfig::default();
    config.render.max_depth = 0;
    let err = ViewController::new(
        lightview::Node::element("div"),
        ViewOptions::new(TemplateSource::Inline("x".to_string()), json!({})).with_config(config),
    )
    .unwrap_err();
    assert_eq!(err.error_type(), "config_error");
}

fn shout(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let text = h.param(0).and_then(|p| p.value().as_str()).unwrap_or_default();
    out.write(&text.to_uppercase())?;
    Ok(())
}

#[test]
fn test_custom_engine_helpers() {
    let mut engine = HandlebarsEngine::new();
    engine.register_helper("shout", Box::new(shout));

    let view = ViewController::new(
        lightview::Node::element("div"),
        ViewOptions::new(
            TemplateSource::Inline("<b>{{shout word}}</b>".to_string()),
            json!({"word": "hey"}),
        )
        .with_engine(engine),
    )
    .unwrap();
    assert_eq!(view.mount().inner_html(), "<b>HEY</b>");
}

#[test]
fn test_builtin_helpers_in_a_view() {
    let view = make_view(
        "{{#each posts}}<article><h2>{{plus @index}}. {{title}}</h2><time>{{formatDate at}}</time>{{nl2p body}}</article>{{/each}}",
        json!({"posts": [{"title": "Hi", "at": "2024-09-14T10:00:00Z", "body": "a\nb"}]}),
    );
    assert_eq!(
        view.mount().inner_html(),
        "<article><h2>1. Hi</h2><time>2024-09-14</time><p>a</p><p>b</p></article>"
    );
}

#[test]
fn test_replace_data_keeps_handles_valid() {
    let view = make_view("{{#each this}}<p>{{this}}</p>{{/each}}", json!(["a", "b"]));
    let handle = view.root();

    view.replace_data(json!(["c"])).unwrap();
    assert_eq!(handle.len(), 1);
    handle.push("d");
    assert_eq!(view.mount().inner_html(), "<p>c</p><p>d</p>");
}

#[test]
fn test_active_index_is_tracked_per_path() {
    let view = make_view(
        r#"{{#each top}}<a class="{{isActive}}">t{{@index}}</a>{{/each}}{{#each side}}<a class="{{isActive}}">s{{@index}}</a>{{/each}}"#,
        json!({"top": [{}, {}, {}], "side": [{}, {}]}),
    );

    view.set_active_index("top", 2).unwrap();
    view.set_active_index("side", 1).unwrap();
    view.set_active_index("top", 0).unwrap();

    let data = view.store().snapshot();
    assert_eq!(data["top"][0]["isActive"], json!("active"));
    assert_eq!(data["top"][2]["isActive"], json!(""));
    assert_eq!(data["side"][1]["isActive"], json!("active"));
    assert_eq!(view.active_index("top"), Some(0));
    assert_eq!(view.active_index("side"), Some(1));
    assert!(view
        .mount()
        .inner_html()
        .contains(r#"<a class="active">s1</a>"#));
}

#[test]
fn test_active_index_uses_configured_marker() {
    let mut config = ViewConfig::default();
    config.navigation.active_field = "state".to_string();
    config.navigation.active_value = "current".to_string();
    let view = common::make_view_with_config(
        "{{#each nav.items}}<li class=\"{{state}}\"></li>{{/each}}",
        json!({"nav": {"items": [{"state": "current"}, {}]}}),
        config,
    );

    view.set_active_index("nav.items", 1).unwrap();
    assert_eq!(
        view.mount().inner_html(),
        r#"<li class=""></li><li class="current"></li>"#
    );
}

#[test]
fn test_setting_same_index_twice_is_quiet() {
    let view = make_view(
        "{{#each menu}}<li>{{isActive}}</li>{{/each}}",
        json!({"menu": [{}, {}]}),
    );
    view.set_active_index("menu", 1).unwrap();
    let renders = view.render_stats().renders;

    view.set_active_index("menu", 1).unwrap();
    assert_eq!(view.render_stats().renders, renders);
}
