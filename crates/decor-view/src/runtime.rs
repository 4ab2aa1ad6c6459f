//! The render driver: owner tracking, method dispatch and mounting.

use std::cell::RefCell;

use decor_core::intercept::{intercept_call, CallArgs, CallValue};

use crate::decor::FrameScope;
use crate::element::{Child, Element, ElementKind, Props};
use crate::registry::{instantiate, method_body, with_view_mixer, InstanceId, ViewHandle};
use crate::ViewError;

thread_local! {
    static OWNER_STACK: RefCell<Vec<InstanceId>> = RefCell::new(Vec::new());
}

/// The instance whose render call is innermost right now.
pub fn current_owner() -> Option<InstanceId> {
    OWNER_STACK.with(|stack| stack.borrow().last().copied())
}

struct OwnerScope;

impl OwnerScope {
    fn enter(id: InstanceId) -> Self {
        OWNER_STACK.with(|stack| stack.borrow_mut().push(id));
        Self
    }
}

impl Drop for OwnerScope {
    fn drop(&mut self) {
        OWNER_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Renders one view instance under owner tracking.
pub fn render_view(handle: &ViewHandle) -> Result<Option<Element>, ViewError> {
    let _owner = OwnerScope::enter(handle.id());
    let _frames = FrameScope::capture();
    let value = call_method(handle, "render", Vec::new())?;
    decode_render_value(value)
}

/// Calls a named method slot, routing through interception when hooks are
/// attached anywhere in the instance's hierarchy.
pub fn call_method(
    handle: &ViewHandle,
    method: &'static str,
    args: CallArgs,
) -> Result<CallValue, ViewError> {
    let body = method_body(handle.type_id(), method).ok_or(ViewError::UnknownMethod {
        id: handle.type_id(),
        method,
    })?;
    let data = with_view_mixer(|mixer| mixer.resolved(handle.type_id()))
        .filter(|data| data.has_hooks(method));
    match data {
        Some(data) => intercept_call(
            handle,
            method,
            &data.before_chain(method),
            &data.after_chain(method),
            args,
            |handle, args| body(handle, args),
        ),
        None => body(handle, args),
    }
}

pub(crate) fn decode_render_value(value: CallValue) -> Result<Option<Element>, ViewError> {
    match value.downcast::<Result<Option<Element>, ViewError>>() {
        Ok(result) => (*result).clone(),
        Err(_) => Err(ViewError::RenderResultType),
    }
}

/// A fully resolved host tree: view elements rendered away, only intrinsic
/// tags left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostNode {
    pub tag: &'static str,
    pub props: Props,
    pub children: Vec<HostChild>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostChild {
    Node(HostNode),
    Text(String),
}

/// Renders `element` and every view beneath it into a host tree. Views that
/// render nothing contribute nothing.
pub fn mount(element: &Element) -> Result<Option<HostNode>, ViewError> {
    match element.kind() {
        ElementKind::Tag(tag) => {
            let mut children = Vec::new();
            for child in element.children() {
                match child {
                    Child::Text(text) => children.push(HostChild::Text(text.clone())),
                    Child::Element(child) => {
                        if let Some(node) = mount(child)? {
                            children.push(HostChild::Node(node));
                        }
                    }
                }
            }
            Ok(Some(HostNode {
                tag,
                props: element.props().clone(),
                children,
            }))
        }
        ElementKind::View(id) => {
            let handle = instantiate(id, element.props().clone(), element.children().to_vec())?;
            match render_view(&handle)? {
                Some(produced) => mount(&produced),
                None => Ok(None),
            }
        }
    }
}
