//! Built-in template helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use serde_json::Value;

pub(super) fn register_builtin(registry: &mut Handlebars<'static>) {
    registry.register_helper("nl2p", Box::new(nl2p));
    registry.register_helper("plus", Box::new(plus));
    registry.register_helper("FatherIndex", Box::new(father_index));
    registry.register_helper("formatDate", Box::new(format_date));
}

fn param(h: &Helper, index: usize) -> Value {
    h.param(index)
        .map(|p| p.value().clone())
        .unwrap_or(Value::Null)
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `{{nl2p text}}`: escaped text with each non-blank line wrapped in `<p>`.
///
/// Writes straight to the output, so the paragraph tags are not escaped.
fn nl2p(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let escaped = handlebars::html_escape(&display(&param(h, 0)));
    let wrapped: String = escaped
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{line}</p>"))
        .collect();
    out.write(&wrapped)?;
    Ok(())
}

/// `{{plus n}}`: `n + 1`, mostly for one-based row numbers from `@index`.
fn plus(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let rendered = match param(h, 0) {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.checked_add(1).map(|v| v.to_string()).unwrap_or_default(),
            None => n.as_f64().map(|f| (f + 1.0).to_string()).unwrap_or_default(),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|i| i.checked_add(1))
            .map(|v| v.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    out.write(&rendered)?;
    Ok(())
}

/// `{{FatherIndex @index}}`: emits the outer loop index so nested blocks can
/// print it.
fn father_index(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    out.write(&display(&param(h, 0)))?;
    Ok(())
}

/// `{{formatDate iso}}`: `YYYY-MM-DD`, or nothing when the input is not a date.
fn format_date(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let formatted = parse_date(&display(&param(h, 0)))
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    out.write(&formatted)?;
    Ok(())
}

/// Calendar date of an ISO-8601 string, taken in the string's own offset.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(moment) = DateTime::parse_from_rfc3339(raw) {
        return Some(moment.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(moment) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(moment.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
