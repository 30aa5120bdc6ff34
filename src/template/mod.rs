//! Template capability: compile a source string into a render function.
//!
//! The renderer only needs [`Template::render`]. [`HandlebarsEngine`] is the
//! stock implementation; any closure `Fn(&Value) -> Result<String, TemplateError>`
//! works as a precompiled template too.

mod engine;
mod helpers;

use serde_json::Value;
use thiserror::Error;

pub use engine::{CompiledTemplate, HandlebarsEngine};

/// Errors from compiling or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to compile template: {0}")]
    Compile(#[from] handlebars::TemplateError),

    #[error("Failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Template failed: {0}")]
    Custom(String),
}

/// A compiled render function: context in, markup out.
pub trait Template {
    fn render(&self, context: &Value) -> Result<String, TemplateError>;
}

impl<F> Template for F
where
    F: Fn(&Value) -> Result<String, TemplateError>,
{
    fn render(&self, context: &Value) -> Result<String, TemplateError> {
        self(context)
    }
}
