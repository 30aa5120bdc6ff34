//! Event kinds and listener storage.

use std::rc::Rc;

use super::Node;

/// Events a control can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Fired on every edit of a text-like control.
    Input,
    /// Fired when a select, radio or checkbox commits a new state.
    Change,
}

/// Callback invoked with the event's target node.
pub type Listener = Rc<dyn Fn(&Node)>;

pub(super) struct Handler {
    pub(super) kind: EventKind,
    pub(super) listener: Listener,
}
