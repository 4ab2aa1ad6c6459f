//! Mix records: per-type hook attachments for constructors and named methods.
//!
//! Mixing never alters the registered type. A `mix` attaches a side record to
//! the type's key; hooks live in that record and are gathered along the
//! parent chain when a call is intercepted. Per-method hook lists are created
//! lazily, transitively up the chain, so hooks an ancestor registers later
//! remain visible to an already linked descendant.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::hooks::HookList;
use crate::intercept::{AfterHook, BeforeHook, CallArgs};
use crate::registry::TypeKey;
use crate::state::StateStore;

/// Runs right after an instance of a mixed type is constructed. Receives the
/// finished subject and the original construction arguments.
pub type ConstructorHook<S> = dyn Fn(&S, &CallArgs);

pub struct MixerData<S: 'static> {
    parent: Option<Rc<MixerData<S>>>,
    constructor_hooks: Rc<HookList<ConstructorHook<S>>>,
    before: RefCell<HashMap<&'static str, Rc<HookList<BeforeHook<S>>>>>,
    after: RefCell<HashMap<&'static str, Rc<HookList<AfterHook<S>>>>>,
}

impl<S: 'static> MixerData<S> {
    fn new(parent: Option<Rc<MixerData<S>>>) -> Self {
        let chained = parent.as_ref().map(|parent| parent.constructor_hooks.clone());
        Self {
            parent,
            constructor_hooks: HookList::new(chained),
            before: RefCell::new(HashMap::new()),
            after: RefCell::new(HashMap::new()),
        }
    }

    pub fn add_constructor_hook(&self, hook: Rc<ConstructorHook<S>>) {
        self.constructor_hooks.add(hook);
    }

    pub fn constructor_chain(&self) -> Vec<Rc<ConstructorHook<S>>> {
        self.constructor_hooks.collect()
    }

    /// Runs the collected constructor chain over a finished instance.
    pub fn run_constructor_hooks(&self, subject: &S, args: &CallArgs) {
        for hook in self.constructor_chain() {
            hook(subject, args);
        }
    }

    pub fn add_before_hook(&self, method: &'static str, hook: Rc<BeforeHook<S>>) {
        self.before_list(method).add(hook);
    }

    pub fn add_after_hook(&self, method: &'static str, hook: Rc<AfterHook<S>>) {
        self.after_list(method).add(hook);
    }

    /// The full before chain for `method`, ancestors first. Empty when no
    /// list exists anywhere in the chain.
    pub fn before_chain(&self, method: &'static str) -> Vec<Rc<BeforeHook<S>>> {
        self.existing_before(method)
            .map(|list| list.collect())
            .unwrap_or_default()
    }

    /// The full after chain for `method`, ancestors first.
    pub fn after_chain(&self, method: &'static str) -> Vec<Rc<AfterHook<S>>> {
        self.existing_after(method)
            .map(|list| list.collect())
            .unwrap_or_default()
    }

    /// True when any hook is registered for `method` anywhere in the chain.
    /// Probing creates no lists.
    pub fn has_hooks(&self, method: &'static str) -> bool {
        self.existing_before(method)
            .is_some_and(|list| !list.is_empty())
            || self
                .existing_after(method)
                .is_some_and(|list| !list.is_empty())
    }

    fn before_list(&self, method: &'static str) -> Rc<HookList<BeforeHook<S>>> {
        if let Some(list) = self.before.borrow().get(method) {
            return list.clone();
        }
        let chained = self.parent.as_ref().map(|parent| parent.before_list(method));
        self.before
            .borrow_mut()
            .entry(method)
            .or_insert_with(|| HookList::new(chained))
            .clone()
    }

    fn after_list(&self, method: &'static str) -> Rc<HookList<AfterHook<S>>> {
        if let Some(list) = self.after.borrow().get(method) {
            return list.clone();
        }
        let chained = self.parent.as_ref().map(|parent| parent.after_list(method));
        self.after
            .borrow_mut()
            .entry(method)
            .or_insert_with(|| HookList::new(chained))
            .clone()
    }

    fn existing_before(&self, method: &'static str) -> Option<Rc<HookList<BeforeHook<S>>>> {
        if let Some(list) = self.before.borrow().get(method) {
            return Some(list.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.existing_before(method))
    }

    fn existing_after(&self, method: &'static str) -> Option<Rc<HookList<AfterHook<S>>>> {
        if let Some(list) = self.after.borrow().get(method) {
            return Some(list.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.existing_after(method))
    }
}

/// Attaches mix records to registered types and resolves them along the
/// parent chain.
pub struct Mixer<S: 'static> {
    store: StateStore<MixerData<S>>,
}

impl<S: 'static> Mixer<S> {
    pub fn new(label: &'static str) -> Self {
        Self {
            store: StateStore::new(label, |_, parent| MixerData::new(parent)),
        }
    }

    /// Ensures the mix record for `key` exists and returns the key unchanged.
    /// The record's parent is the nearest ancestor record existing right now.
    pub fn mix(&self, key: TypeKey) -> TypeKey {
        self.store.get(key);
        key
    }

    /// The mix record for exactly `key`, created on first access.
    pub fn data(&self, key: TypeKey) -> Rc<MixerData<S>> {
        self.store.get(key)
    }

    /// The nearest record for `key` or an ancestor. Creates nothing.
    pub fn resolved(&self, key: TypeKey) -> Option<Rc<MixerData<S>>> {
        self.store.inherited(key)
    }
}

#[cfg(test)]
#[path = "tests/mixer_tests.rs"]
mod tests;
