use handlebars::{Handlebars, HelperDef};
use serde_json::Value;

use super::{helpers, Template, TemplateError};

const VIEW_TEMPLATE: &str = "view";

/// Handlebars registry preloaded with the built-in helpers.
///
/// Compiling clones the registry, so helpers registered afterwards do not
/// affect templates that were already compiled.
#[derive(Clone)]
pub struct HandlebarsEngine {
    registry: Handlebars<'static>,
}

impl HandlebarsEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        helpers::register_builtin(&mut registry);
        Self { registry }
    }

    /// Adds or replaces a helper.
    pub fn register_helper(&mut self, name: &str, helper: Box<dyn HelperDef + Send + Sync>) {
        self.registry.register_helper(name, helper);
    }

    pub fn compile(&self, source: &str) -> Result<CompiledTemplate, TemplateError> {
        let mut registry = self.registry.clone();
        registry.register_template_string(VIEW_TEMPLATE, source)?;
        Ok(CompiledTemplate { registry })
    }
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// A template compiled by [`HandlebarsEngine::compile`].
pub struct CompiledTemplate {
    registry: Handlebars<'static>,
}

impl Template for CompiledTemplate {
    fn render(&self, context: &Value) -> Result<String, TemplateError> {
        Ok(self.registry.render(VIEW_TEMPLATE, context)?)
    }
}
