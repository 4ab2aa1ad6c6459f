//! Element values and the shared construction primitive.
//!
//! Elements are shared and immutable once built; the mutable form is
//! `ElementArgs`, the tuple hooks receive and return. `ElementArgs::build`
//! constructs directly, `create_element` routes through the active render
//! interception.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::registry::ViewTypeId;
use crate::ViewError;

/// What an element instantiates: a host intrinsic tag or a registered view
/// type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Tag(&'static str),
    View(ViewTypeId),
}

/// A single property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

/// Insertion-ordered property bag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    /// The string value under `name`, if it is one.
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(PropValue::Str(value)) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Copies every entry of `other` over this bag. Names already present
    /// keep their original position.
    pub fn merge(&mut self, other: &Props) {
        for (name, value) in other.iter() {
            self.entries.insert(name.to_owned(), value.clone());
        }
    }
}

/// One child slot of an element.
#[derive(Debug, Clone)]
pub enum Child {
    Element(Element),
    Text(String),
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_owned())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

struct ElementInner {
    kind: ElementKind,
    props: Props,
    children: Vec<Child>,
}

/// A produced element: shared, immutable, compared by identity.
#[derive(Clone)]
pub struct Element {
    inner: Rc<ElementInner>,
}

impl Element {
    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.inner.kind
    }

    #[inline]
    pub fn props(&self) -> &Props {
        &self.inner.props
    }

    #[inline]
    pub fn children(&self) -> &[Child] {
        &self.inner.children
    }

    /// Address-based identity, stable for the element's lifetime.
    #[inline]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    #[inline]
    pub fn same(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("kind", &self.inner.kind)
            .field("props", &self.inner.props)
            .field("children", &self.inner.children.len())
            .finish()
    }
}

/// The argument tuple an element is built from. Hooks receive and return
/// values of this type.
#[derive(Debug, Clone)]
pub struct ElementArgs {
    pub kind: ElementKind,
    pub props: Props,
    pub children: Vec<Child>,
}

impl ElementArgs {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn tag(name: &'static str) -> Self {
        Self::new(ElementKind::Tag(name))
    }

    pub fn view(id: ViewTypeId) -> Self {
        Self::new(ElementKind::View(id))
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.set(name, value);
        self
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builds the element directly, bypassing any active interception.
    pub fn build(self) -> Element {
        Element {
            inner: Rc::new(ElementInner {
                kind: self.kind,
                props: self.props,
                children: self.children,
            }),
        }
    }

    /// Builds through the shared constructor, subject to interception.
    pub fn create(self) -> Result<Element, ViewError> {
        crate::decor::construct(self)
    }
}

/// The shared element constructor. While a decorated render is live, the
/// construction is routed through its element hooks; otherwise this is
/// `ElementArgs::build`.
pub fn create_element(
    kind: ElementKind,
    props: Props,
    children: Vec<Child>,
) -> Result<Element, ViewError> {
    ElementArgs {
        kind,
        props,
        children,
    }
    .create()
}
