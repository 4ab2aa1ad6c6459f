//! Per-type private state records.
//!
//! A `StateStore` lazily attaches one record per `TypeKey`. The factory for a
//! missing record receives the nearest ancestor record, so a hierarchy can
//! derive its state top-down without the store knowing anything about the
//! data it holds.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::registry::{self, TypeKey};

type Factory<T> = Box<dyn Fn(TypeKey, Option<Rc<T>>) -> T>;

pub struct StateStore<T> {
    label: &'static str,
    entries: RefCell<HashMap<TypeKey, Rc<T>>>,
    init: Factory<T>,
}

impl<T> StateStore<T> {
    pub fn new(
        label: &'static str,
        init: impl Fn(TypeKey, Option<Rc<T>>) -> T + 'static,
    ) -> Self {
        Self {
            label,
            entries: RefCell::new(HashMap::new()),
            init: Box::new(init),
        }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The record already attached to exactly `key`, if any. Creates nothing.
    pub fn existing(&self, key: TypeKey) -> Option<Rc<T>> {
        self.entries.borrow().get(&key).cloned()
    }

    /// The nearest record walking from `key` itself up the parent chain.
    /// Creates nothing.
    pub fn inherited(&self, key: TypeKey) -> Option<Rc<T>> {
        let mut cursor = Some(key);
        while let Some(current) = cursor {
            if let Some(found) = self.existing(current) {
                return Some(found);
            }
            cursor = registry::parent_of(current);
        }
        None
    }

    /// The record for exactly `key`, created on first access. The factory
    /// observes the nearest strict-ancestor record and may touch this store;
    /// no borrow is held across the call.
    pub fn get(&self, key: TypeKey) -> Rc<T> {
        if let Some(found) = self.existing(key) {
            return found;
        }
        let above = registry::parent_of(key).and_then(|parent| self.inherited(parent));
        let created = Rc::new((self.init)(key, above));
        self.entries
            .borrow_mut()
            .entry(key)
            .or_insert(created)
            .clone()
    }
}

impl<T> fmt::Debug for StateStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("label", &self.label)
            .field("entries", &self.entries.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::register_type;

    fn store() -> StateStore<Vec<&'static str>> {
        StateStore::new("trail", |key, above: Option<Rc<Vec<&'static str>>>| {
            let mut trail = above.map(|above| (*above).clone()).unwrap_or_default();
            trail.push(registry::type_name(key).unwrap_or("?"));
            trail
        })
    }

    #[test]
    fn creates_records_lazily_and_caches_them() {
        let store = store();
        let key = register_type("Solo", None);

        assert!(store.existing(key).is_none());
        let first = store.get(key);
        let second = store.get(key);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn factory_sees_the_nearest_ancestor_record() {
        let store = store();
        let top = register_type("Top", None);
        let middle = register_type("Middle", Some(top));
        let bottom = register_type("Bottom", Some(middle));

        store.get(top);
        // No record for `middle`: the factory for `bottom` falls through to
        // the one attached to `top`.
        let record = store.get(bottom);
        assert_eq!(*record, vec!["Top", "Bottom"]);
    }

    #[test]
    fn inherited_prefers_the_own_record() {
        let store = store();
        let top = register_type("Top", None);
        let bottom = register_type("Bottom", Some(top));

        let top_record = store.get(top);
        assert!(store.existing(bottom).is_none());
        let found = store.inherited(bottom).unwrap();
        assert!(Rc::ptr_eq(&found, &top_record));

        let own = store.get(bottom);
        let found = store.inherited(bottom).unwrap();
        assert!(Rc::ptr_eq(&found, &own));
    }

    #[test]
    fn lookups_create_nothing() {
        let store = store();
        let top = register_type("Top", None);
        let bottom = register_type("Bottom", Some(top));

        assert!(store.inherited(bottom).is_none());
        assert!(store.existing(top).is_none());
    }
}
