//! In-memory DOM-equivalent used as the managed region.
//!
//! [`Node`] is a reference-counted handle, so two handles can be compared for
//! identity with [`Node::ptr_eq`] while [`Node::is_equal_node`] compares
//! structure. Elements carry live `value`/`checked` properties separate from
//! their attributes, the same split a browser makes, and both are left out of
//! structural equality.

mod event;
mod parser;
mod serialize;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub use event::{EventKind, Listener};
pub use parser::parse_fragment;

use event::Handler;

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

struct NodeData {
    kind: NodeKind,
    children: Vec<Node>,
    value: Option<String>,
    checked: Option<bool>,
    listeners: Vec<Handler>,
    binding: Option<Handler>,
}

/// Shared handle to a DOM node.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Node(Rc::new(RefCell::new(NodeData {
            kind,
            children: Vec::new(),
            value: None,
            checked: None,
            listeners: Vec::new(),
            binding: None,
        })))
    }

    /// Creates an element. Tag names are stored lowercase.
    pub fn element(tag: &str) -> Self {
        Self::from_kind(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn text(data: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Text(data.into()))
    }

    pub fn comment(data: impl Into<String>) -> Self {
        Self::from_kind(NodeKind::Comment(data.into()))
    }

    pub fn kind(&self) -> NodeKind {
        self.0.borrow().kind.clone()
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.borrow().kind, NodeKind::Element { .. })
    }

    pub fn tag_name(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    /// True when both handles point at the same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -- attributes ---------------------------------------------------------

    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
            match attributes.iter().position(|(n, _)| *n == name) {
                Some(i) => attributes[i].1 = value,
                None => attributes.push((name, value)),
            }
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.0.borrow_mut().kind {
            attributes.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        }
    }

    /// Builder form of [`Node::set_attribute`].
    pub fn with_attribute(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|c| c == class))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Comment(_) => String::new(),
            NodeKind::Element { .. } => data
                .children
                .iter()
                .filter(|child| !matches!(child.0.borrow().kind, NodeKind::Comment(_)))
                .map(Node::text_content)
                .collect(),
        }
    }

    // -- tree ---------------------------------------------------------------

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn child_at(&self, index: usize) -> Option<Node> {
        self.0.borrow().children.get(index).cloned()
    }

    pub fn append_child(&self, child: Node) {
        self.0.borrow_mut().children.push(child);
    }

    /// Builder form of [`Node::append_child`].
    pub fn with_child(self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    /// Replaces the whole child list.
    pub fn replace_children(&self, children: Vec<Node>) {
        self.0.borrow_mut().children = children;
    }

    /// Replaces the child at `index`, returning the old one. An index at or
    /// past the end appends instead.
    pub fn replace_child_at(&self, index: usize, child: Node) -> Option<Node> {
        let mut data = self.0.borrow_mut();
        if index < data.children.len() {
            Some(std::mem::replace(&mut data.children[index], child))
        } else {
            data.children.push(child);
            None
        }
    }

    /// Drops children past `len`, returning them.
    pub fn truncate_children(&self, len: usize) -> Vec<Node> {
        let mut data = self.0.borrow_mut();
        if data.children.len() <= len {
            return Vec::new();
        }
        data.children.split_off(len)
    }

    /// Every descendant element in document order.
    pub fn descendant_elements(&self) -> Vec<Node> {
        let mut found = Vec::new();
        self.collect_elements(&mut found);
        found
    }

    fn collect_elements(&self, found: &mut Vec<Node>) {
        for child in self.children() {
            if child.is_element() {
                found.push(child.clone());
            }
            child.collect_elements(found);
        }
    }

    /// First descendant element matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&Node) -> bool) -> Option<Node> {
        self.descendant_elements().into_iter().find(|node| predicate(node))
    }

    // -- equality and cloning -----------------------------------------------

    /// Structural equality: kind, tag, attribute set and children.
    ///
    /// Live properties and listeners are not compared.
    pub fn is_equal_node(&self, other: &Node) -> bool {
        if self.ptr_eq(other) {
            return true;
        }

        let (a, b) = (self.0.borrow(), other.0.borrow());
        let same_kind = match (&a.kind, &b.kind) {
            (
                NodeKind::Element {
                    tag: tag_a,
                    attributes: attrs_a,
                },
                NodeKind::Element {
                    tag: tag_b,
                    attributes: attrs_b,
                },
            ) => {
                tag_a == tag_b
                    && attrs_a.len() == attrs_b.len()
                    && attrs_a.iter().all(|attr| attrs_b.contains(attr))
            }
            (NodeKind::Text(x), NodeKind::Text(y)) => x == y,
            (NodeKind::Comment(x), NodeKind::Comment(y)) => x == y,
            _ => false,
        };

        same_kind
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(&b.children)
                .all(|(x, y)| x.is_equal_node(y))
    }

    /// Deep copy with fresh live state and no listeners.
    pub fn clone_node(&self) -> Node {
        let data = self.0.borrow();
        let copy = Node::from_kind(data.kind.clone());
        copy.replace_children(data.children.iter().map(Node::clone_node).collect());
        copy
    }

    // -- live control state -------------------------------------------------

    /// The control's current value.
    ///
    /// Falls back to the `value` attribute, the text of a `textarea`, or the
    /// selected (else first) option of a `select`.
    pub fn value(&self) -> String {
        if let Some(live) = self.0.borrow().value.clone() {
            return live;
        }

        match self.tag_name().as_deref() {
            Some("textarea") => self.text_content(),
            Some("select") => {
                let options = self.options();
                options
                    .iter()
                    .find(|option| option.has_attribute("selected"))
                    .or_else(|| options.first())
                    .map(Node::option_value)
                    .unwrap_or_default()
            }
            Some("option") => self.option_value(),
            Some("input") => self.attribute("value").unwrap_or_else(|| {
                let kind = self.attribute("type").unwrap_or_default();
                if kind.eq_ignore_ascii_case("checkbox") || kind.eq_ignore_ascii_case("radio") {
                    "on".to_string()
                } else {
                    String::new()
                }
            }),
            _ => self.attribute("value").unwrap_or_default(),
        }
    }

    /// Sets the live value. A `select` only accepts the value of one of its
    /// options and falls back to the empty string otherwise.
    pub fn set_value(&self, value: &str) {
        let accepted = if self.tag_name().as_deref() == Some("select") {
            let known = self
                .options()
                .iter()
                .any(|option| option.option_value() == value);
            if known {
                value.to_string()
            } else {
                String::new()
            }
        } else {
            value.to_string()
        };
        self.0.borrow_mut().value = Some(accepted);
    }

    pub fn checked(&self) -> bool {
        let live = self.0.borrow().checked;
        live.unwrap_or_else(|| self.has_attribute("checked"))
    }

    pub fn set_checked(&self, checked: bool) {
        self.0.borrow_mut().checked = Some(checked);
    }

    fn options(&self) -> Vec<Node> {
        self.descendant_elements()
            .into_iter()
            .filter(|node| node.tag_name().as_deref() == Some("option"))
            .collect()
    }

    fn option_value(&self) -> String {
        self.attribute("value")
            .unwrap_or_else(|| self.text_content().trim().to_string())
    }

    // -- events -------------------------------------------------------------

    /// Adds a listener. Listeners accumulate.
    pub fn add_event_listener(&self, kind: EventKind, listener: impl Fn(&Node) + 'static) {
        self.0.borrow_mut().listeners.push(Handler {
            kind,
            listener: Rc::new(listener),
        });
    }

    /// Installs the node's single binding listener, replacing any previous one.
    pub fn set_binding_listener(&self, kind: EventKind, listener: Listener) {
        self.0.borrow_mut().binding = Some(Handler { kind, listener });
    }

    /// Event the binding listener reacts to, if one is installed.
    pub fn binding_event(&self) -> Option<EventKind> {
        self.0.borrow().binding.as_ref().map(|handler| handler.kind)
    }

    /// Total listeners, binding listener included.
    pub fn listener_count(&self) -> usize {
        let data = self.0.borrow();
        data.listeners.len() + usize::from(data.binding.is_some())
    }

    /// Runs every listener registered for `kind` with this node as the target.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch(&self, kind: EventKind) -> usize {
        let matching: Vec<Listener> = {
            let data = self.0.borrow();
            data.binding
                .iter()
                .chain(data.listeners.iter())
                .filter(|handler| handler.kind == kind)
                .map(|handler| Rc::clone(&handler.listener))
                .collect()
        };

        for listener in &matching {
            listener(self);
        }
        matching.len()
    }

    /// Types `text` into a text-like control.
    pub fn input_text(&self, text: &str) {
        self.set_value(text);
        self.dispatch(EventKind::Input);
    }

    /// Picks an option of a `select`.
    pub fn select_option(&self, value: &str) {
        self.set_value(value);
        self.dispatch(EventKind::Change);
    }

    /// Flips a checkbox.
    pub fn toggle(&self) {
        self.set_checked(!self.checked());
        self.dispatch(EventKind::Change);
    }

    /// Selects a radio button.
    pub fn choose(&self) {
        self.set_checked(true);
        self.dispatch(EventKind::Change);
    }

    // -- markup -------------------------------------------------------------

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        serialize::write_node(self, &mut out);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in self.children() {
            serialize::write_node(&child, &mut out);
        }
        out
    }

    /// Replaces the children with the parsed `markup`.
    pub fn set_inner_html(&self, markup: &str) {
        self.replace_children(parse_fragment(markup));
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.outer_html())
    }
}
