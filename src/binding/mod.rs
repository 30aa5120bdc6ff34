//! Two-way form binding.
//!
//! After every render the binder scans the managed region for controls that
//! carry the binding attribute, shows the stored value on each of them, and
//! installs a listener that writes edits back through the store. Writing back
//! notifies the store, which re-renders and binds again.
//!
//! Every control holds a single binding listener. Binding a node that
//! survived reconciliation replaces its listener instead of stacking another.

mod control;

use std::rc::Rc;

use serde_json::Value;
use tracing::{trace, warn};

use crate::dom::Node;
use crate::path::{self, Path};
use crate::store::{Field, Shape, Store, WriteOutcome};

pub use control::{display_value, ControlKind};

use control::{field_text, list_contains};

/// Counts from one [`FormBinder::bind`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BindReport {
    /// Controls that received a binding.
    pub bound: usize,
    /// Controls skipped because their binding path does not parse.
    pub invalid: usize,
}

/// Wires form controls in a region to paths in a store.
#[derive(Clone)]
pub struct FormBinder {
    store: Store,
    attribute: String,
}

impl FormBinder {
    pub fn new(store: Store, attribute: impl Into<String>) -> Self {
        Self {
            store,
            attribute: attribute.into(),
        }
    }

    /// Attribute that carries a control's path.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Binds every supported control under `region`.
    ///
    /// Elements without the binding attribute, and elements with it that are
    /// not a supported control, are left alone.
    pub fn bind(&self, region: &Node) -> BindReport {
        let mut report = BindReport::default();

        for node in region.descendant_elements() {
            let Some(raw) = node.attribute(&self.attribute) else {
                continue;
            };
            let Some(kind) = ControlKind::classify(&node) else {
                continue;
            };

            let path = match Path::parse(raw.trim()) {
                Ok(path) => path,
                Err(err) => {
                    warn!(path = %raw, error = %err, "Ignoring control with invalid binding path");
                    report.invalid += 1;
                    continue;
                }
            };

            let control = BoundControl {
                store: self.store.clone(),
                path,
                kind,
            };
            control.apply(&node);
            trace!(path = %control.path, control = kind.name(), "Bound control");

            node.set_binding_listener(
                kind.event(),
                Rc::new(move |target: &Node| control.commit(target)),
            );
            report.bound += 1;
        }

        report
    }
}

/// One control's binding: which path, and how the control shows it.
struct BoundControl {
    store: Store,
    path: Path,
    kind: ControlKind,
}

impl BoundControl {
    fn read(&self) -> Option<Field> {
        path::get(&self.store.root(), &self.path)
    }

    /// Shows the stored state on `node`.
    fn apply(&self, node: &Node) {
        let current = self.read();
        match self.kind {
            ControlKind::Text | ControlKind::Select => {
                node.set_value(&field_text(current.as_ref()));
            }
            ControlKind::Radio => {
                node.set_checked(field_text(current.as_ref()) == node.value());
            }
            ControlKind::Checkbox => {
                node.set_checked(list_contains(current.as_ref(), &node.value()));
            }
        }
    }

    /// Writes the control's state into the store, then shows the stored
    /// state again.
    fn commit(&self, node: &Node) {
        let value = node.value();
        let outcome = match self.kind {
            ControlKind::Text | ControlKind::Select => {
                path::set(&self.store.root(), &self.path, Value::String(value))
            }
            ControlKind::Radio if node.checked() => {
                path::set(&self.store.root(), &self.path, Value::String(value))
            }
            ControlKind::Radio => WriteOutcome::Unchanged,
            ControlKind::Checkbox => self.toggle_member(node.checked(), value),
        };

        if !outcome.is_resolved() {
            warn!(path = %self.path, "Dropped write to unresolved binding path");
        }
        self.apply(node);
    }

    /// Adds or removes `value` in the bound list.
    ///
    /// An existing list is changed in place. Anything else at the path is
    /// replaced by a new list.
    fn toggle_member(&self, checked: bool, value: String) -> WriteOutcome {
        match self.read() {
            Some(Field::Observable(list)) if list.shape() == Some(Shape::List) => {
                let position = list
                    .items()
                    .iter()
                    .position(|item| field_text(Some(item)) == value);
                match (checked, position) {
                    (true, None) => list.push(value),
                    (false, Some(index)) => match list.remove(index) {
                        Some(_) => WriteOutcome::Changed,
                        None => WriteOutcome::Unchanged,
                    },
                    _ => WriteOutcome::Unchanged,
                }
            }
            _ => {
                let items = if checked {
                    vec![Value::String(value)]
                } else {
                    Vec::new()
                };
                path::set(&self.store.root(), &self.path, Value::Array(items))
            }
        }
    }
}
