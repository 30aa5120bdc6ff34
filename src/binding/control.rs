//! Control classification and value conversion.

use serde_json::Value;

use crate::dom::{EventKind, Node};
use crate::store::{Field, Shape};

/// `type` values of `<input>` that bind like free text.
const TEXT_INPUT_TYPES: &[&str] = &[
    "text",
    "email",
    "password",
    "search",
    "number",
    "date",
    "datetime-local",
    "month",
    "week",
    "time",
    "tel",
    "url",
];

/// Bindable control categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Free-text-like inputs and textareas, bound to a scalar.
    Text,
    /// Single-select dropdown, bound to a scalar.
    Select,
    /// Radio button; checked when its value equals the bound scalar.
    Radio,
    /// Checkbox; checked when its value is a member of the bound list.
    Checkbox,
}

impl ControlKind {
    /// Classifies an element, or `None` if it is not a supported control.
    pub fn classify(node: &Node) -> Option<Self> {
        match node.tag_name()?.as_str() {
            "textarea" => Some(ControlKind::Text),
            "select" => Some(ControlKind::Select),
            "input" => {
                // A missing type attribute means a text input.
                let kind = node
                    .attribute("type")
                    .map(|t| t.trim().to_ascii_lowercase())
                    .unwrap_or_else(|| "text".to_string());
                match kind.as_str() {
                    "radio" => Some(ControlKind::Radio),
                    "checkbox" => Some(ControlKind::Checkbox),
                    other if TEXT_INPUT_TYPES.contains(&other) => Some(ControlKind::Text),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Event the control's binding listens to.
    pub fn event(self) -> EventKind {
        match self {
            ControlKind::Text => EventKind::Input,
            ControlKind::Select | ControlKind::Radio | ControlKind::Checkbox => EventKind::Change,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlKind::Text => "text",
            ControlKind::Select => "select",
            ControlKind::Radio => "radio",
            ControlKind::Checkbox => "checkbox",
        }
    }
}

/// Text a control shows for a stored scalar. Missing values and `null` are blank.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Display text of a field read from the store.
pub(crate) fn field_text(field: Option<&Field>) -> String {
    match field {
        Some(Field::Value(value)) => display_value(Some(value)),
        Some(Field::Observable(handle)) => display_value(handle.snapshot().as_ref()),
        None => String::new(),
    }
}

/// Whether `candidate` is a member of the list held by `field`, comparing
/// display text.
pub(crate) fn list_contains(field: Option<&Field>, candidate: &str) -> bool {
    let Some(Field::Observable(list)) = field else {
        return false;
    };
    if list.shape() != Some(Shape::List) {
        return false;
    }
    list.items()
        .iter()
        .any(|item| field_text(Some(item)) == candidate)
}
