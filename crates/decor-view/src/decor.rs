//! Render interception: per-type decoration records and per-call frames.
//!
//! Decorating a view type creates a `ViewDecorData` record keyed by its type;
//! records chain along the parent table so subtype renders see ancestor hooks
//! first. The topmost record of a chain arms the hierarchy once, by attaching
//! before/after hooks to the `render` method slot.
//!
//! Arming works through a stack of `RenderFrame`s. The before-render hook
//! pushes a frame for the rendering instance; every element construction
//! consults the top frame; the after-render hook pops the frame and rewrites
//! the returned root through the `onRootElement` chain. A frame that sees a
//! construction for a foreign owner releases itself and stays released until
//! its render call ends, so nested undecorated renders fall through
//! untouched.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hashbrown::HashMap;

use decor_core::config::current_config;
use decor_core::hooks::HookList;
use decor_core::intercept::{CallArgs, CallValue};
use decor_core::state::StateStore;

use crate::element::{Element, ElementArgs, Props};
use crate::registry::{with_view_mixer, ViewHandle, ViewTypeId};
use crate::runtime::current_owner;
use crate::ViewError;

/// Rewrites the argument tuple of one element construction. Receives the
/// rendering instance, a snapshot of its props, and the tuple produced by the
/// previous hook. Returning `None` violates the hook contract and aborts the
/// render.
pub type ElementHook = dyn Fn(&ViewHandle, &Props, ElementArgs) -> Option<ElementArgs>;

pub(crate) struct ViewDecorData {
    on_each: Rc<HookList<ElementHook>>,
    on_root: Rc<HookList<ElementHook>>,
}

impl ViewDecorData {
    fn new(parent: Option<&ViewDecorData>) -> Self {
        Self {
            on_each: HookList::new(parent.map(|parent| parent.on_each.clone())),
            on_root: HookList::new(parent.map(|parent| parent.on_root.clone())),
        }
    }
}

thread_local! {
    static VIEW_DECOR: StateStore<ViewDecorData> = StateStore::new("render decor", |key, parent| {
        if parent.is_none() {
            arm_render_hooks(key);
        }
        ViewDecorData::new(parent.as_deref())
    });

    static ACTIVE_FRAMES: RefCell<Vec<Rc<RenderFrame>>> = RefCell::new(Vec::new());
}

pub(crate) fn add_each_hook(id: ViewTypeId, hook: Rc<ElementHook>) {
    VIEW_DECOR.with(|store| store.get(id).on_each.add(hook));
}

pub(crate) fn add_root_hook(id: ViewTypeId, hook: Rc<ElementHook>) {
    VIEW_DECOR.with(|store| store.get(id).on_root.add(hook));
}

fn arm_render_hooks(id: ViewTypeId) {
    with_view_mixer(|mixer| {
        let data = mixer.data(id);
        data.add_before_hook("render", Rc::new(pre_render));
        data.add_after_hook("render", Rc::new(post_render));
    });
}

fn pre_render(handle: &ViewHandle, args: CallArgs) -> Option<CallArgs> {
    if let Some(record) = VIEW_DECOR.with(|store| store.inherited(handle.type_id())) {
        ACTIVE_FRAMES.with(|frames| {
            frames
                .borrow_mut()
                .push(Rc::new(RenderFrame::new(record, handle.clone())));
        });
    }
    Some(args)
}

fn post_render(handle: &ViewHandle, value: CallValue) -> Option<CallValue> {
    let frame = ACTIVE_FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        let matches = frames
            .last()
            .is_some_and(|frame| frame.instance.id() == handle.id());
        if matches {
            frames.pop()
        } else {
            None
        }
    });
    match frame {
        Some(frame) => Some(frame.finish(value)),
        None => Some(value),
    }
}

/// Routes one element construction through the top frame, if any.
pub(crate) fn construct(args: ElementArgs) -> Result<Element, ViewError> {
    let frame = ACTIVE_FRAMES.with(|frames| frames.borrow().last().cloned());
    match frame {
        Some(frame) => frame.construct(args),
        None => Ok(args.build()),
    }
}

/// The argument tuple of the element currently being constructed under
/// interception, as transformed by the hooks that have run so far.
pub fn current_construction() -> Option<ElementArgs> {
    ACTIVE_FRAMES.with(|frames| {
        frames
            .borrow()
            .last()
            .and_then(|frame| frame.current.borrow().clone())
    })
}

/// Truncates the frame stack back to its depth at capture time. Keeps the
/// stack balanced when a render body fails or panics past its after hooks.
pub(crate) struct FrameScope {
    depth: usize,
}

impl FrameScope {
    pub(crate) fn capture() -> Self {
        Self {
            depth: ACTIVE_FRAMES.with(|frames| frames.borrow().len()),
        }
    }
}

impl Drop for FrameScope {
    fn drop(&mut self) {
        ACTIVE_FRAMES.with(|frames| {
            frames.borrow_mut().truncate(self.depth);
        });
    }
}

struct RenderFrame {
    record: Rc<ViewDecorData>,
    instance: ViewHandle,
    // Maps element identity to the element (kept alive so the address stays
    // unique for the whole render call) and the tuple it was built from.
    side: RefCell<HashMap<usize, (Element, ElementArgs)>>,
    // Running tuple of the construction in flight. Ends at the final
    // transformed args and clears once the element is recorded.
    current: RefCell<Option<ElementArgs>>,
    released: Cell<bool>,
}

impl RenderFrame {
    fn new(record: Rc<ViewDecorData>, instance: ViewHandle) -> Self {
        Self {
            record,
            instance,
            side: RefCell::new(HashMap::new()),
            current: RefCell::new(None),
            released: Cell::new(false),
        }
    }

    fn construct(&self, args: ElementArgs) -> Result<Element, ViewError> {
        if self.released.get() {
            return Ok(args.build());
        }
        let own = current_owner() == Some(self.instance.id());
        if !own && !current_config().force_intercept {
            // Some other instance is rendering inside this frame's render
            // call; stop intercepting for the rest of it.
            self.released.set(true);
            return Ok(args.build());
        }
        let props = self.instance.props();
        let prior = self.current.borrow_mut().replace(args.clone());
        let transformed = match self.run_each_hooks(&props, args) {
            Ok(transformed) => transformed,
            Err(failure) => {
                *self.current.borrow_mut() = prior;
                return Err(failure);
            }
        };
        let element = transformed.clone().build();
        self.side
            .borrow_mut()
            .insert(element.identity(), (element.clone(), transformed));
        *self.current.borrow_mut() = prior;
        Ok(element)
    }

    fn run_each_hooks(&self, props: &Props, args: ElementArgs) -> Result<ElementArgs, ViewError> {
        let mut args = args;
        for hook in self.record.on_each.collect() {
            args = hook(&self.instance, props, args).ok_or(ViewError::EachHookNoValue)?;
            *self.current.borrow_mut() = Some(args.clone());
        }
        Ok(args)
    }

    /// Rewrites the render result's root element through the root hook chain.
    /// Anything other than a successful root produced by this frame passes
    /// through untouched.
    fn finish(&self, value: CallValue) -> CallValue {
        let result = match value.downcast::<Result<Option<Element>, ViewError>>() {
            Ok(result) => result,
            Err(other) => return other,
        };
        let root = match &*result {
            Ok(Some(root)) => root.clone(),
            _ => return result,
        };
        let entry = self.side.borrow_mut().remove(&root.identity());
        let (_root, root_args) = match entry {
            Some(entry) => entry,
            None => {
                if current_config().dev_mode {
                    log::warn!("unexpected root element {:?} from {:?}", root, self.instance);
                }
                return result;
            }
        };
        let props = self.instance.props();
        let mut args = root_args;
        for hook in self.record.on_root.collect() {
            match hook(&self.instance, &props, args) {
                Some(next) => args = next,
                None => {
                    return Rc::new(Err::<Option<Element>, ViewError>(ViewError::RootHookNoValue))
                }
            }
        }
        Rc::new(Ok::<Option<Element>, ViewError>(Some(args.build())))
    }
}

#[cfg(test)]
#[path = "tests/decor_tests.rs"]
mod tests;
