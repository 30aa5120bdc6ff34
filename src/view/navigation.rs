use crate::error::ViewError;
use crate::path::{self, Path};
use crate::store::{Field, Observable, Shape};

use super::ViewController;

impl ViewController {
    /// Marks item `index` of the list at `path` as active.
    ///
    /// The item previously marked through the same path loses the marker
    /// (index `0` the first time a path is used). Each path is tracked
    /// separately, so one view can drive several lists. Nothing is written
    /// unless the path leads to a list whose item `index` is an object.
    pub fn set_active_index(&self, path: &str, index: usize) -> Result<(), ViewError> {
        let parsed = Path::parse(path)?;
        let key = parsed.to_string();

        let list = match path::get(&self.root(), &parsed) {
            Some(Field::Observable(list)) if list.shape() == Some(Shape::List) => list,
            _ => return Err(ViewError::NotAList { path: key }),
        };

        let len = list.len();
        if index >= len {
            return Err(ViewError::IndexOutOfRange {
                path: key,
                index,
                len,
            });
        }
        let Some(target) = object_item(&list, index) else {
            return Err(ViewError::NotAnObject { path: key, index });
        };

        let navigation = &self.inner.config.navigation;
        let previous = self.active_index(&key).unwrap_or(0);
        if previous != index {
            if let Some(item) = object_item(&list, previous) {
                item.set(&navigation.active_field, "");
            }
        }

        self.inner.active.borrow_mut().insert(key, index);
        target.set(&navigation.active_field, navigation.active_value.as_str());
        Ok(())
    }

    /// Index last activated through `path`, if any.
    pub fn active_index(&self, path: &str) -> Option<usize> {
        let key = Path::parse(path).ok()?.to_string();
        self.inner.active.borrow().get(&key).copied()
    }
}

fn object_item(list: &Observable, index: usize) -> Option<Observable> {
    list.get(&index.to_string())?
        .into_observable()
        .filter(|item| item.shape() == Some(Shape::Object))
}
