//! The immutable element model: what callers describe, the work loop consumes.
//!
//! An [`Element`] is a plain description of a node to render: a type (host
//! tag or function component) plus a property bag. Elements are built fresh
//! on every render call and never mutated afterwards; cloning is cheap
//! because handlers and components are reference counted.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Callback bound to a host event.
pub type EventHandler = Rc<dyn Fn()>;

/// Function component: maps a property bag to rendered children.
///
/// Invoked synchronously during the begin phase; its return value is the
/// sole source of nested structure under a component unit.
pub type ComponentFn = Rc<dyn Fn(&Props) -> Children>;

/// The type of an element: a host tag known to the render target, or a
/// user-defined function component.
#[derive(Clone)]
pub enum ElementType {
    Host(String),
    Component(ComponentFn),
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Host(tag) => f.debug_tuple("Host").field(tag).finish(),
            ElementType::Component(_) => f.write_str("Component(..)"),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Host(tag.to_owned())
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Host(tag)
    }
}

/// Wraps a closure as a component element type.
pub fn component(body: impl Fn(&Props) -> Children + 'static) -> ElementType {
    ElementType::Component(Rc::new(body))
}

/// Scalar property value: plain text or a number.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            // whole numbers print without a trailing fraction
            Scalar::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                write!(f, "{}", *n as i64)
            }
            Scalar::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(text: &str) -> Self {
        Scalar::Text(text.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(text: String) -> Self {
        Scalar::Text(text)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Number(n.into())
    }
}

/// Ordered mapping of css-style property names to values.
pub type StyleMap = IndexMap<String, String>;

/// A single named property value.
#[derive(Clone)]
pub enum PropValue {
    Scalar(Scalar),
    Handler(EventHandler),
    Style(StyleMap),
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Scalar(scalar) => f.debug_tuple("Scalar").field(scalar).finish(),
            PropValue::Handler(_) => f.write_str("Handler(..)"),
            PropValue::Style(style) => f.debug_tuple("Style").field(style).finish(),
        }
    }
}

impl From<Scalar> for PropValue {
    fn from(value: Scalar) -> Self {
        PropValue::Scalar(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Scalar(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Scalar(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Scalar(value.into())
    }
}

/// Normalized children of an element, and the return type of function
/// components.
///
/// A bare scalar is legal here: it renders as the owning host node's text
/// content and is never reconciled into child units.
#[derive(Clone, Debug, Default)]
pub enum Children {
    #[default]
    None,
    Scalar(Scalar),
    One(Box<Element>),
    Many(Vec<Element>),
}

impl From<Element> for Children {
    fn from(element: Element) -> Self {
        Children::One(Box::new(element))
    }
}

impl From<Vec<Element>> for Children {
    fn from(elements: Vec<Element>) -> Self {
        Children::Many(elements)
    }
}

impl From<&str> for Children {
    fn from(text: &str) -> Self {
        Children::Scalar(text.into())
    }
}

impl From<String> for Children {
    fn from(text: String) -> Self {
        Children::Scalar(text.into())
    }
}

/// One child passed to [`create_element`], before normalization.
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Scalar(Scalar),
}

impl From<Element> for Child {
    fn from(element: Element) -> Self {
        Child::Element(element)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Child::Scalar(text.into())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Child::Scalar(text.into())
    }
}

impl From<f64> for Child {
    fn from(n: f64) -> Self {
        Child::Scalar(n.into())
    }
}

impl From<i64> for Child {
    fn from(n: i64) -> Self {
        Child::Scalar(n.into())
    }
}

impl From<i32> for Child {
    fn from(n: i32) -> Self {
        Child::Scalar(n.into())
    }
}

/// Property bag of an element.
///
/// Named properties keep their declared order. Children live in a dedicated
/// slot rather than under a magic key, so they can never leak into visual
/// property application.
#[derive(Clone, Debug, Default)]
pub struct Props {
    attrs: IndexMap<String, PropValue>,
    children: Children,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a scalar-valued property (rendered as a host attribute).
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.attrs
            .insert(name.into(), PropValue::Scalar(value.into()));
        self
    }

    /// Adds an event handler property. The name carries the `on` prefix
    /// convention, e.g. `onClick`.
    pub fn handler(mut self, name: impl Into<String>, callback: impl Fn() + 'static) -> Self {
        self.attrs
            .insert(name.into(), PropValue::Handler(Rc::new(callback)));
        self
    }

    /// Adds the style property: an ordered css property/value mapping.
    pub fn style<K, V>(mut self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let style: StyleMap = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.attrs.insert("style".to_owned(), PropValue::Style(style));
        self
    }

    /// Inserts a raw property value under `name`.
    pub fn insert(mut self, name: impl Into<String>, value: PropValue) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    /// Named properties in declared order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attrs.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub(crate) fn with_children(mut self, children: Children) -> Self {
        self.children = children;
        self
    }
}

/// Immutable description of one node to render.
#[derive(Clone, Debug)]
pub struct Element {
    ty: ElementType,
    props: Props,
}

impl Element {
    pub fn ty(&self) -> &ElementType {
        &self.ty
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn into_parts(self) -> (ElementType, Props) {
        (self.ty, self.props)
    }
}

/// Builds an element from a type, a property bag and a list of children.
///
/// Children are normalized: an empty list leaves the element childless, a
/// single child collapses to its own value (element or scalar), and a longer
/// list keeps its order as a sequence. Scalars inside a multi-child list
/// have no host representation and are dropped, the same way unsupported
/// property shapes are ignored at commit.
pub fn create_element(
    ty: impl Into<ElementType>,
    props: Props,
    children: Vec<Child>,
) -> Element {
    let mut children = children;
    let children = match children.len() {
        0 => Children::None,
        1 => match children.pop() {
            Some(Child::Element(element)) => Children::One(Box::new(element)),
            Some(Child::Scalar(scalar)) => Children::Scalar(scalar),
            None => Children::None,
        },
        _ => Children::Many(
            children
                .into_iter()
                .filter_map(|child| match child {
                    Child::Element(element) => Some(element),
                    Child::Scalar(_) => None,
                })
                .collect(),
        ),
    };
    Element {
        ty: ty.into(),
        props: props.with_children(children),
    }
}
