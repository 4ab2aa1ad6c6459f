//! Render interception for registered view types.
//!
//! A view type can be decorated with element hooks after the fact. While one
//! of its instances renders, every element the render constructs is routed
//! through the `onChildElement` chain, and the returned root is rewritten
//! through the `onRootElement` chain. Interception is scoped to exactly the
//! render call it was armed for: a nested render of an undecorated instance
//! releases it, a nested decorated render gets its own scope.

use decor_core::intercept::InterceptError;

pub mod api;
pub mod decor;
pub mod element;
pub mod registry;
pub mod runtime;

/// Failures surfaced by the view layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("onChildElement hook returned no element arguments")]
    EachHookNoValue,
    #[error("onRootElement hook returned no element arguments")]
    RootHookNoValue,
    #[error("no view type registered for id {id}")]
    UnknownType { id: ViewTypeId },
    #[error("no method `{method}` on view type {id} or its ancestors")]
    UnknownMethod { id: ViewTypeId, method: &'static str },
    #[error("render produced a value of an unexpected type")]
    RenderResultType,
    #[error("view instance is not a `{expected}`")]
    ViewTypeMismatch { expected: &'static str },
    #[error(transparent)]
    Intercept(#[from] InterceptError),
}

pub use api::{
    after_method, before_method, decorate, on_child_element, on_instantiate, on_root_element,
    simulate_render, DecorHooks,
};
pub use decor::{current_construction, ElementHook};
pub use element::{
    create_element, Child, Element, ElementArgs, ElementKind, PropValue, Props,
};
pub use registry::{
    instantiate, register_method, register_view, InstanceId, View, ViewHandle, ViewTypeId,
};
pub use runtime::{call_method, current_owner, mount, render_view, HostChild, HostNode};

#[allow(non_snake_case)]
pub use api::{onChildElement, onRootElement, simulateRender};
