//! Observable data store.
//!
//! The store owns the root value (an object or a list) and notifies its
//! subscribers synchronously after every effective change. All access goes
//! through [`Observable`] handles: a handle is a path into the root, never a
//! copy of the data, so mutating through it is always seen by the store.
//!
//! Holding a detached `serde_json::Value` and mutating it does not notify
//! anybody. Callers that want to batch many changes build the new value
//! detached and swap it in with a single bulk operation instead.
//!
//! # Invariants
//!
//! 1. Writing a value equal to the current one is a no-op and does not notify.
//! 2. Deleting a key never notifies.
//! 3. Subscribers run after the root borrow is released, so they may read or
//!    write the store again.

mod observable;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use crate::error::ViewError;

pub use observable::{Field, Observable, MAX_INDEX_GAP};

type Callback = Rc<dyn Fn()>;

/// Container shape of a store node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Object,
    List,
}

impl Shape {
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => Some(Shape::Object),
            Value::Array(_) => Some(Shape::List),
            _ => None,
        }
    }

    /// An empty container of this shape.
    pub fn empty(self) -> Value {
        match self {
            Shape::Object => Value::Object(Map::new()),
            Shape::List => Value::Array(Vec::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Shape::Object => "object",
            Shape::List => "list",
        }
    }
}

/// Result of a write through a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The value changed and subscribers were notified.
    Changed,
    /// The new value equals the current one; nothing happened.
    Unchanged,
    /// The target location does not exist; nothing happened.
    Unresolved,
}

impl WriteOutcome {
    pub fn is_changed(self) -> bool {
        self == WriteOutcome::Changed
    }

    pub fn is_resolved(self) -> bool {
        self != WriteOutcome::Unresolved
    }
}

/// Name of a JSON value's kind, for diagnostics.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

struct StoreInner {
    root: RefCell<Value>,
    subscribers: RefCell<Vec<(u64, Callback)>>,
    next_id: Cell<u64>,
    revision: Cell<u64>,
}

/// Shared owner of the observed root value.
///
/// Cloning a `Store` clones the handle, not the data.
#[derive(Clone)]
pub struct Store {
    inner: Rc<StoreInner>,
}

impl Store {
    /// Creates a store over `root`, which must be an object or a list.
    pub fn new(root: Value) -> Result<Self, ViewError> {
        if Shape::of(&root).is_none() {
            return Err(ViewError::InvalidRoot {
                found: kind_name(&root),
            });
        }

        Ok(Self {
            inner: Rc::new(StoreInner {
                root: RefCell::new(root),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                revision: Cell::new(0),
            }),
        })
    }

    /// Handle on the root value.
    pub fn root(&self) -> Observable {
        Observable::new(self.clone(), Vec::new())
    }

    /// Detached copy of the whole root value.
    pub fn snapshot(&self) -> Value {
        self.inner.root.borrow().clone()
    }

    /// Number of effective changes since creation.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Registers `callback` to run after every effective change.
    ///
    /// The callback stays registered until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .subscribers
            .borrow_mut()
            .push((id, Rc::new(callback)));

        Subscription {
            store: Rc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    pub(crate) fn with_root<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.root.borrow())
    }

    pub(crate) fn with_root_mut<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.inner.root.borrow_mut())
    }

    /// Bumps the revision and runs every subscriber.
    pub(crate) fn notify(&self) {
        self.inner.revision.set(self.inner.revision.get() + 1);

        // Snapshot the list so callbacks can subscribe or unsubscribe freely.
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();

        tracing::trace!(
            revision = self.inner.revision.get(),
            subscribers = callbacks.len(),
            "Store changed"
        );

        for callback in callbacks {
            callback();
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("revision", &self.revision())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Keeps a store callback registered. Dropping it unsubscribes.
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner
                .subscribers
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
