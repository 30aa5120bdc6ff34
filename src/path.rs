//! Dotted/bracket path resolution against nested data.
//!
//! A path such as `a.b[2].c` addresses a location inside the store. Bracket
//! indices are normalized to plain segments, so `a.b[2].c` and `a.b.2.c` are
//! the same path. Whether a numeric segment acts as a list index or an object
//! key depends on the container it is applied to.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use crate::store::{Field, Observable, Shape, WriteOutcome};

/// Errors produced while parsing a path string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    #[error("Path '{path}' contains a malformed index")]
    MalformedIndex { path: String },
}

/// A parsed, non-empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parses `raw`, normalizing `[n]` into its own segment.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let malformed = || PathError::MalformedIndex {
            path: raw.to_string(),
        };

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, mut rest) = match part.find('[') {
                Some(open) => part.split_at(open),
                None => (part, ""),
            };

            if name.is_empty() && rest.is_empty() {
                return Err(PathError::EmptySegment {
                    path: raw.to_string(),
                });
            }
            if name.contains(']') {
                return Err(malformed());
            }
            if !name.is_empty() {
                segments.push(name.to_string());
            }

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(malformed)?;
                let index = &rest[1..close];
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                segments.push(index.to_string());
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(malformed());
                }
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when the path has more than one segment.
    pub fn is_nested(&self) -> bool {
        self.segments.len() > 1
    }

    /// The final segment.
    pub fn last(&self) -> &str {
        // Parsing never yields an empty segment list.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Interprets a segment as a list index. Only plain ASCII digits qualify.
pub fn index_of(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Returns the direct child of a container, or `None` for scalars and
/// missing keys.
pub fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => index_of(key).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(key),
        Value::Array(items) => index_of(key).and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Walks `segments` from `root` over plain data.
pub fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |current, segment| child(current, segment))
}

/// Mutable counterpart of [`lookup`].
pub fn lookup_mut<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = child_mut(current, segment)?;
    }
    Some(current)
}

/// Reads the value at `path`, short-circuiting to `None` at the first
/// missing segment.
///
/// Container values come back as observable handles, scalars as plain values.
pub fn get(root: &Observable, path: &Path) -> Option<Field> {
    let mut current = Field::Observable(root.clone());
    for segment in path.segments() {
        current = match current {
            Field::Observable(handle) => handle.get(segment)?,
            Field::Value(_) => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `path` through the observable handles.
///
/// The parent chain must already exist. When it does not, nothing is
/// written and [`WriteOutcome::Unresolved`] is returned.
pub fn set(root: &Observable, path: &Path, value: Value) -> WriteOutcome {
    let segments = path.segments();
    let mut parent = root.clone();
    for segment in &segments[..segments.len() - 1] {
        parent = match parent.get(segment) {
            Some(Field::Observable(handle)) => handle,
            _ => return WriteOutcome::Unresolved,
        };
    }
    parent.set(path.last(), value)
}

/// Writes `value` at `path`, creating missing intermediate containers.
///
/// A missing or scalar intermediate becomes a list when the segment after it
/// is numeric and an object otherwise. Existing containers are kept as they are.
pub fn set_or_create(root: &Observable, path: &Path, value: Value) -> WriteOutcome {
    match vivify_parent(root, path.segments()) {
        Some(parent) => parent.set(path.last(), value),
        None => WriteOutcome::Unresolved,
    }
}

/// Walks to the parent of the last segment, creating containers on the way.
pub(crate) fn vivify_parent(root: &Observable, segments: &[String]) -> Option<Observable> {
    let mut current = root.clone();
    for window in segments.windows(2) {
        let (segment, next) = (&window[0], &window[1]);
        current = match current.get(segment) {
            Some(Field::Observable(handle)) => handle,
            _ => {
                let fresh = match index_of(next) {
                    Some(_) => Shape::List.empty(),
                    None => Shape::Object.empty(),
                };
                if !current.set(segment, fresh).is_resolved() {
                    return None;
                }
                current.get(segment)?.into_observable()?
            }
        };
    }
    Some(current)
}
