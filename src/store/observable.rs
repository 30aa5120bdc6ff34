//! Intercepting handles over store nodes.

use std::fmt;

use serde_json::Value;

use super::{Shape, Store, WriteOutcome};
use crate::path;

/// How far past the end of a list a write may land. Larger gaps are refused
/// instead of padding the list with `null`.
pub const MAX_INDEX_GAP: usize = 1024;

/// The result of reading a key through an [`Observable`].
#[derive(Debug, Clone)]
pub enum Field {
    /// The child is an object or list; reads and writes go through this handle.
    Observable(Observable),
    /// The child is a scalar (including `null`).
    Value(Value),
}

impl Field {
    pub fn as_observable(&self) -> Option<&Observable> {
        match self {
            Field::Observable(handle) => Some(handle),
            Field::Value(_) => None,
        }
    }

    pub fn into_observable(self) -> Option<Observable> {
        match self {
            Field::Observable(handle) => Some(handle),
            Field::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(value) => Some(value),
            Field::Observable(_) => None,
        }
    }

    /// Detached copy of the underlying value.
    pub fn to_value(&self) -> Value {
        match self {
            Field::Value(value) => value.clone(),
            Field::Observable(handle) => handle.snapshot().unwrap_or(Value::Null),
        }
    }
}

/// A view over one container inside a [`Store`].
///
/// Reads of container-valued children return new handles; reads of scalars
/// return plain values. Writes that change something notify the store's
/// subscribers immediately, which re-renders the view.
///
/// A handle is addressed by path. If the structure changes so that the path
/// no longer leads to a container, reads return `None` and writes are
/// [`WriteOutcome::Unresolved`].
#[derive(Clone)]
pub struct Observable {
    store: Store,
    path: Vec<String>,
}

impl Observable {
    pub(crate) fn new(store: Store, path: Vec<String>) -> Self {
        Self { store, path }
    }

    /// Segments from the store root to this node. Empty for the root.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Shape of the node, or `None` if the path no longer resolves to a container.
    pub fn shape(&self) -> Option<Shape> {
        self.store
            .with_root(|root| path::lookup(root, &self.path).and_then(Shape::of))
    }

    /// Number of entries (list items or object keys). Zero when unresolved.
    pub fn len(&self) -> usize {
        self.store.with_root(|root| match path::lookup(root, &self.path) {
            Some(Value::Array(items)) => items.len(),
            Some(Value::Object(map)) => map.len(),
            _ => 0,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Object keys in order, or list indices as strings.
    pub fn keys(&self) -> Vec<String> {
        self.store.with_root(|root| match path::lookup(root, &self.path) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => (0..items.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        })
    }

    /// Detached copy of this node's value.
    pub fn snapshot(&self) -> Option<Value> {
        self.store
            .with_root(|root| path::lookup(root, &self.path).cloned())
    }

    /// Reads `key`. Containers come back wrapped, scalars as values.
    pub fn get(&self, key: &str) -> Option<Field> {
        let child = self.store.with_root(|root| {
            let target = path::lookup(root, &self.path)?;
            match path::child(target, key)? {
                Value::Object(_) | Value::Array(_) => Some(None),
                scalar => Some(Some(scalar.clone())),
            }
        })?;

        Some(match child {
            Some(scalar) => Field::Value(scalar),
            None => Field::Observable(self.child(key)),
        })
    }

    /// Writes `value` at `key`.
    ///
    /// A scalar equal to the current one is suppressed. Objects and lists
    /// always count as a change. On a list, `key` must be an index; an index
    /// past the end extends the list, padding with `null`, up to
    /// [`MAX_INDEX_GAP`] slots beyond the current length.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> WriteOutcome {
        let value = value.into();
        self.modify(|target| match target {
            Value::Object(map) => {
                if same_scalar(map.get(key), &value) {
                    return WriteOutcome::Unchanged;
                }
                map.insert(key.to_string(), value);
                WriteOutcome::Changed
            }
            Value::Array(items) => match path::index_of(key) {
                Some(i) if i < items.len() => {
                    if same_scalar(items.get(i), &value) {
                        return WriteOutcome::Unchanged;
                    }
                    items[i] = value;
                    WriteOutcome::Changed
                }
                Some(i) if i - items.len() <= MAX_INDEX_GAP => {
                    items.resize(i, Value::Null);
                    items.push(value);
                    WriteOutcome::Changed
                }
                Some(_) | None => WriteOutcome::Unresolved,
            },
            _ => WriteOutcome::Unresolved,
        })
    }

    /// Removes `key` without notifying.
    ///
    /// On a list the slot is left in place as `null`, so later indices keep
    /// their positions.
    pub fn delete(&self, key: &str) -> Option<Value> {
        self.store.with_root_mut(|root| {
            match path::lookup_mut(root, &self.path)? {
                Value::Object(map) => map.remove(key),
                Value::Array(items) => {
                    let slot = items.get_mut(path::index_of(key)?)?;
                    Some(std::mem::replace(slot, Value::Null))
                }
                _ => None,
            }
        })
    }

    /// Appends one item to a list.
    pub fn push(&self, value: impl Into<Value>) -> WriteOutcome {
        self.extend(std::iter::once(value.into()))
    }

    /// Appends all `values` to a list as one change.
    pub fn extend(&self, values: impl IntoIterator<Item = Value>) -> WriteOutcome {
        self.modify(|target| match target {
            Value::Array(items) => {
                let before = items.len();
                items.extend(values);
                if items.len() == before {
                    WriteOutcome::Unchanged
                } else {
                    WriteOutcome::Changed
                }
            }
            _ => WriteOutcome::Unresolved,
        })
    }

    /// Shortens a list to `len` items. Longer lengths leave it alone.
    pub fn truncate(&self, len: usize) -> WriteOutcome {
        self.modify(|target| match target {
            Value::Array(items) if items.len() > len => {
                items.truncate(len);
                WriteOutcome::Changed
            }
            Value::Array(_) => WriteOutcome::Unchanged,
            _ => WriteOutcome::Unresolved,
        })
    }

    /// Removes the list item at `index`, shifting later items down.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let mut removed = None;
        self.modify(|target| match target {
            Value::Array(items) if index < items.len() => {
                removed = Some(items.remove(index));
                WriteOutcome::Changed
            }
            Value::Array(_) => WriteOutcome::Unchanged,
            _ => WriteOutcome::Unresolved,
        });
        removed
    }

    /// Handles for every item of a list, or every value of an object.
    pub fn items(&self) -> Vec<Field> {
        self.keys()
            .iter()
            .filter_map(|key| self.get(key))
            .collect()
    }

    fn child(&self, key: &str) -> Observable {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Observable::new(self.store.clone(), path)
    }

    /// Applies `f` to this node and notifies after the borrow is released.
    fn modify(&self, f: impl FnOnce(&mut Value) -> WriteOutcome) -> WriteOutcome {
        let outcome = self
            .store
            .with_root_mut(|root| path::lookup_mut(root, &self.path).map(f))
            .unwrap_or(WriteOutcome::Unresolved);

        if outcome.is_changed() {
            self.store.notify();
        }
        outcome
    }
}

/// Containers have no identity to compare, so only scalars can be "the same".
fn same_scalar(current: Option<&Value>, value: &Value) -> bool {
    match (current, value) {
        (_, Value::Object(_) | Value::Array(_)) => false,
        (Some(current), value) => current == value,
        (None, _) => false,
    }
}

impl fmt::Debug for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("path", &self.path.join("."))
            .finish()
    }
}
