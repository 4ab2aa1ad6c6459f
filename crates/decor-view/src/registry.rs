//! View types, constructors and live instances.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hashbrown::HashMap;

use decor_core::intercept::{CallArgs, CallValue};
use decor_core::mixer::Mixer;
use decor_core::registry::{parent_of, register_type, type_name, TypeKey};

use crate::element::{Child, Element, Props};
use crate::ViewError;

/// Identity of a registered view type.
pub type ViewTypeId = TypeKey;

/// Identity of a live view instance.
pub type InstanceId = usize;

/// A component behind the registry. Rendering may produce an element tree or
/// nothing at all.
pub trait View: Any {
    fn render(&mut self, props: &Props, children: &[Child]) -> Result<Option<Element>, ViewError>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

type ViewCtor = Box<dyn Fn(&Props) -> Box<dyn View>>;
type MethodBody = Rc<dyn Fn(&ViewHandle, CallArgs) -> Result<CallValue, ViewError>>;

struct ViewType {
    ctor: ViewCtor,
    methods: RefCell<HashMap<&'static str, MethodBody>>,
}

thread_local! {
    static VIEW_TYPES: RefCell<HashMap<ViewTypeId, Rc<ViewType>>> = RefCell::new(HashMap::new());
    static VIEW_MIXER: Mixer<ViewHandle> = Mixer::new("views");
}

static NEXT_INSTANCE_ID: AtomicUsize = AtomicUsize::new(1);

/// Registers a view type under `name` and returns its id. `parent` links the
/// type into an existing hierarchy.
///
/// Every view type gets a `render` method slot, so render calls can be routed
/// through method interception like any other slot.
pub fn register_view<V, F>(name: &'static str, parent: Option<ViewTypeId>, ctor: F) -> ViewTypeId
where
    V: View,
    F: Fn(&Props) -> V + 'static,
{
    let id = register_type(name, parent);
    let ctor: ViewCtor = Box::new(move |props| Box::new(ctor(props)));
    let record = Rc::new(ViewType {
        ctor,
        methods: RefCell::new(HashMap::new()),
    });
    record.methods.borrow_mut().insert(
        "render",
        Rc::new(|handle: &ViewHandle, _args| {
            Ok(Rc::new(handle.raw_render()) as CallValue)
        }),
    );
    VIEW_TYPES.with(|types| types.borrow_mut().insert(id, record));
    id
}

/// Adds a named method slot to a registered view type. Slots are inherited
/// along the parent chain; the most derived one wins.
pub fn register_method<F>(id: ViewTypeId, method: &'static str, body: F) -> Result<(), ViewError>
where
    F: Fn(&ViewHandle, CallArgs) -> Result<CallValue, ViewError> + 'static,
{
    let record = view_type(id).ok_or(ViewError::UnknownType { id })?;
    record.methods.borrow_mut().insert(method, Rc::new(body));
    Ok(())
}

/// Builds an instance of `id`, runs the constructor hook chain over it, and
/// returns the handle.
pub fn instantiate(
    id: ViewTypeId,
    props: Props,
    children: Vec<Child>,
) -> Result<ViewHandle, ViewError> {
    let record = view_type(id).ok_or(ViewError::UnknownType { id })?;
    let view = (record.ctor)(&props);
    let handle = ViewHandle {
        inner: Rc::new(ViewInstance {
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            type_id: id,
            props: RefCell::new(props),
            children: RefCell::new(children),
            view: RefCell::new(view),
        }),
    };
    if let Some(data) = with_view_mixer(|mixer| mixer.resolved(id)) {
        let args: CallArgs = vec![Rc::new(handle.props()) as Rc<dyn Any>];
        data.run_constructor_hooks(&handle, &args);
    }
    Ok(handle)
}

/// Runs a closure against the process-wide view mixer.
pub fn with_view_mixer<R>(body: impl FnOnce(&Mixer<ViewHandle>) -> R) -> R {
    VIEW_MIXER.with(|mixer| body(mixer))
}

pub(crate) fn method_body(id: ViewTypeId, method: &'static str) -> Option<MethodBody> {
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        if let Some(record) = view_type(current) {
            if let Some(body) = record.methods.borrow().get(method) {
                return Some(body.clone());
            }
        }
        cursor = parent_of(current);
    }
    None
}

fn view_type(id: ViewTypeId) -> Option<Rc<ViewType>> {
    VIEW_TYPES.with(|types| types.borrow().get(&id).cloned())
}

struct ViewInstance {
    id: InstanceId,
    type_id: ViewTypeId,
    props: RefCell<Props>,
    children: RefCell<Vec<Child>>,
    view: RefCell<Box<dyn View>>,
}

/// Cheap cloneable handle to a live view instance.
#[derive(Clone)]
pub struct ViewHandle {
    inner: Rc<ViewInstance>,
}

impl ViewHandle {
    #[inline]
    pub fn id(&self) -> InstanceId {
        self.inner.id
    }

    #[inline]
    pub fn type_id(&self) -> ViewTypeId {
        self.inner.type_id
    }

    pub fn props(&self) -> Props {
        self.inner.props.borrow().clone()
    }

    pub fn set_props(&self, props: Props) {
        *self.inner.props.borrow_mut() = props;
    }

    pub fn children(&self) -> Vec<Child> {
        self.inner.children.borrow().clone()
    }

    /// Runs `body` against the concrete view behind the handle.
    pub fn with_view<V: View, R>(&self, body: impl FnOnce(&mut V) -> R) -> Result<R, ViewError> {
        let mut view = self.inner.view.borrow_mut();
        match view.as_any_mut().downcast_mut::<V>() {
            Some(view) => Ok(body(view)),
            None => Err(ViewError::ViewTypeMismatch {
                expected: std::any::type_name::<V>(),
            }),
        }
    }

    pub(crate) fn raw_render(&self) -> Result<Option<Element>, ViewError> {
        let props = self.inner.props.borrow().clone();
        let children = self.inner.children.borrow().clone();
        self.inner.view.borrow_mut().render(&props, &children)
    }
}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewHandle")
            .field("id", &self.inner.id)
            .field("type", &type_name(self.inner.type_id))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementArgs;

    struct Label {
        text: String,
        renders: usize,
    }

    impl View for Label {
        fn render(
            &mut self,
            _props: &Props,
            _children: &[Child],
        ) -> Result<Option<Element>, ViewError> {
            self.renders += 1;
            Ok(Some(ElementArgs::tag("span").child(self.text.clone()).create()?))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn label_type() -> ViewTypeId {
        register_view::<Label, _>("Label", None, |props| Label {
            text: props.string("text").unwrap_or_default().to_owned(),
            renders: 0,
        })
    }

    #[test]
    fn instantiates_registered_views() {
        let id = label_type();
        let handle = instantiate(id, Props::new().with("text", "hi"), Vec::new()).unwrap();

        assert_eq!(handle.type_id(), id);
        let text = handle.with_view::<Label, _>(|label| label.text.clone()).unwrap();
        assert_eq!(text, "hi");
    }

    #[test]
    fn downcasting_to_the_wrong_view_fails() {
        struct Other;
        impl View for Other {
            fn render(
                &mut self,
                _props: &Props,
                _children: &[Child],
            ) -> Result<Option<Element>, ViewError> {
                Ok(None)
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
            fn as_any_mut(&mut self) -> &mut dyn Any {
                self
            }
        }

        let id = label_type();
        let handle = instantiate(id, Props::new(), Vec::new()).unwrap();
        let failure = handle.with_view::<Other, _>(|_| ()).unwrap_err();
        assert!(matches!(failure, ViewError::ViewTypeMismatch { .. }));
    }

    #[test]
    fn unknown_types_cannot_be_instantiated() {
        let bogus = register_type("Ghost", None);
        assert_eq!(
            instantiate(bogus, Props::new(), Vec::new()).unwrap_err(),
            ViewError::UnknownType { id: bogus }
        );
    }

    #[test]
    fn method_slots_resolve_along_the_parent_chain() {
        let base = label_type();
        let derived = register_view::<Label, _>("SmallLabel", Some(base), |props| Label {
            text: props.string("text").unwrap_or_default().to_owned(),
            renders: 0,
        });

        register_method(base, "describe", |handle, _| {
            Ok(Rc::new(format!("view {}", handle.id())) as CallValue)
        })
        .unwrap();

        assert!(method_body(derived, "describe").is_some());
        assert!(method_body(derived, "missing").is_none());
    }
}
