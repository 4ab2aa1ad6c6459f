//! The public registration surface.
//!
//! Registration functions return the type id they were given, so calls can be
//! stacked decorator-style around `register_view`.

use std::rc::Rc;

use decor_core::config::{current_config, run_in_context, Config};
use decor_core::intercept::{CallArgs, CallValue};

use crate::decor::{self, ElementHook, FrameScope};
use crate::element::{Element, ElementArgs, Props};
use crate::registry::{instantiate, with_view_mixer, ViewHandle, ViewTypeId};
use crate::runtime::{call_method, decode_render_value};
use crate::ViewError;

/// Registers a hook over every element constructed by renders of `id` (and
/// of its subtypes).
pub fn on_child_element(
    id: ViewTypeId,
    hook: impl Fn(&ViewHandle, &Props, ElementArgs) -> Option<ElementArgs> + 'static,
) -> ViewTypeId {
    decor::add_each_hook(id, Rc::new(hook));
    id
}

/// Registers a hook over the root element returned by renders of `id` (and
/// of its subtypes).
pub fn on_root_element(
    id: ViewTypeId,
    hook: impl Fn(&ViewHandle, &Props, ElementArgs) -> Option<ElementArgs> + 'static,
) -> ViewTypeId {
    decor::add_root_hook(id, Rc::new(hook));
    id
}

/// A bundle of element hooks for `decorate`.
#[derive(Default)]
pub struct DecorHooks {
    each: Vec<Rc<ElementHook>>,
    root: Vec<Rc<ElementHook>>,
}

impl DecorHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn each(
        mut self,
        hook: impl Fn(&ViewHandle, &Props, ElementArgs) -> Option<ElementArgs> + 'static,
    ) -> Self {
        self.each.push(Rc::new(hook));
        self
    }

    pub fn root(
        mut self,
        hook: impl Fn(&ViewHandle, &Props, ElementArgs) -> Option<ElementArgs> + 'static,
    ) -> Self {
        self.root.push(Rc::new(hook));
        self
    }
}

/// Applies a bundle of element hooks to a view type in one step.
pub fn decorate(id: ViewTypeId, hooks: DecorHooks) -> ViewTypeId {
    for hook in hooks.each {
        decor::add_each_hook(id, hook);
    }
    for hook in hooks.root {
        decor::add_root_hook(id, hook);
    }
    id
}

/// Registers a hook to run right after instances of `id` are constructed.
/// The argument tuple holds the construction props.
pub fn on_instantiate(
    id: ViewTypeId,
    hook: impl Fn(&ViewHandle, &CallArgs) + 'static,
) -> ViewTypeId {
    with_view_mixer(|mixer| mixer.data(id).add_constructor_hook(Rc::new(hook)));
    id
}

/// Registers a before hook on a named method slot of `id`.
pub fn before_method(
    id: ViewTypeId,
    method: &'static str,
    hook: impl Fn(&ViewHandle, CallArgs) -> Option<CallArgs> + 'static,
) -> ViewTypeId {
    with_view_mixer(|mixer| mixer.data(id).add_before_hook(method, Rc::new(hook)));
    id
}

/// Registers an after hook on a named method slot of `id`.
pub fn after_method(
    id: ViewTypeId,
    method: &'static str,
    hook: impl Fn(&ViewHandle, CallValue) -> Option<CallValue> + 'static,
) -> ViewTypeId {
    with_view_mixer(|mixer| mixer.data(id).add_after_hook(method, Rc::new(hook)));
    id
}

/// Renders a throwaway instance of `id` outside the normal lifecycle, with
/// interception forced on. The element hooks observe exactly what a hosted
/// render would produce.
pub fn simulate_render(id: ViewTypeId, props: Props) -> Result<Option<Element>, ViewError> {
    run_in_context(
        Config {
            force_intercept: true,
            ..current_config()
        },
        || {
            let _frames = FrameScope::capture();
            let handle = instantiate(id, props, Vec::new())?;
            let value = call_method(&handle, "render", Vec::new())?;
            decode_render_value(value)
        },
    )
}

#[allow(non_snake_case)]
pub fn onChildElement(
    id: ViewTypeId,
    hook: impl Fn(&ViewHandle, &Props, ElementArgs) -> Option<ElementArgs> + 'static,
) -> ViewTypeId {
    on_child_element(id, hook)
}

#[allow(non_snake_case)]
pub fn onRootElement(
    id: ViewTypeId,
    hook: impl Fn(&ViewHandle, &Props, ElementArgs) -> Option<ElementArgs> + 'static,
) -> ViewTypeId {
    on_root_element(id, hook)
}

#[allow(non_snake_case)]
pub fn simulateRender(id: ViewTypeId, props: Props) -> Result<Option<Element>, ViewError> {
    simulate_render(id, props)
}
