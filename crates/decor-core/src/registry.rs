//! Type identities and the parent table.
//!
//! Every participating type registers once and receives a stable `TypeKey`.
//! Parent links form a forest; lookups walk a linear ancestor chain. Keys are
//! never retired.

use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use hashbrown::HashMap;

/// Stable identity of a registered type.
pub type TypeKey = usize;

static NEXT_TYPE_KEY: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static TYPE_NAMES: RefCell<HashMap<TypeKey, &'static str>> = RefCell::new(HashMap::new());
    static TYPE_PARENTS: RefCell<HashMap<TypeKey, TypeKey>> = RefCell::new(HashMap::new());
}

/// Registers a type under `name` and returns its key. `parent` links the new
/// type under an already registered one.
pub fn register_type(name: &'static str, parent: Option<TypeKey>) -> TypeKey {
    let key = NEXT_TYPE_KEY.fetch_add(1, Ordering::Relaxed);
    TYPE_NAMES.with(|names| names.borrow_mut().insert(key, name));
    if let Some(parent) = parent {
        TYPE_PARENTS.with(|parents| parents.borrow_mut().insert(key, parent));
    }
    key
}

/// The name `key` was registered under.
pub fn type_name(key: TypeKey) -> Option<&'static str> {
    TYPE_NAMES.with(|names| names.borrow().get(&key).copied())
}

#[inline]
pub fn parent_of(key: TypeKey) -> Option<TypeKey> {
    TYPE_PARENTS.with(|parents| parents.borrow().get(&key).copied())
}

/// The key itself followed by its ancestors, nearest first.
pub fn ancestry(key: TypeKey) -> Vec<TypeKey> {
    let mut chain = vec![key];
    let mut cursor = key;
    while let Some(parent) = parent_of(cursor) {
        chain.push(parent);
        cursor = parent;
    }
    chain
}
