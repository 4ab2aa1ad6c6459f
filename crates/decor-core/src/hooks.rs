//! Ordered hook lists with ancestor chaining.

use std::cell::RefCell;
use std::rc::Rc;

/// An append-only list of hooks, optionally chained under a parent list.
///
/// Collection walks ancestors first, then own hooks, each in registration
/// order. The snapshot is computed fresh on every call, so hooks added
/// anywhere in the chain between calls are picked up.
pub struct HookList<F: ?Sized> {
    parent: Option<Rc<HookList<F>>>,
    own: RefCell<Vec<Rc<F>>>,
}

impl<F: ?Sized> HookList<F> {
    pub fn new(parent: Option<Rc<HookList<F>>>) -> Rc<Self> {
        Rc::new(Self {
            parent,
            own: RefCell::new(Vec::new()),
        })
    }

    pub fn add(&self, hook: Rc<F>) {
        self.own.borrow_mut().push(hook);
    }

    /// True when neither this list nor any ancestor holds a hook.
    pub fn is_empty(&self) -> bool {
        self.own.borrow().is_empty()
            && self.parent.as_ref().map_or(true, |parent| parent.is_empty())
    }

    /// Snapshot of the full chain. No borrow is live when this returns, so
    /// callers may run the hooks directly.
    pub fn collect(&self) -> Vec<Rc<F>> {
        let mut collected = match &self.parent {
            Some(parent) => parent.collect(),
            None => Vec::new(),
        };
        collected.extend(self.own.borrow().iter().cloned());
        collected
    }
}
