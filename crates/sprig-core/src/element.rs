//! Element descriptors
//!
//! Elements are immutable descriptions of a desired node: a type, an
//! attribute map and an ordered list of child elements. They are cheap to
//! clone; fibers copy the props of the element they mirror.

use std::fmt;
use std::sync::Arc;

use crate::{
    AttrValue, Attributes, Component, EventHandler, SprigError, SprigResult, CHILDREN, NODE_VALUE,
};

/// Element type - closed over the three kinds of node the engine knows
#[derive(Clone, Debug, PartialEq)]
pub enum ElementType {
    /// Host node tag, e.g. `div`
    Host(String),
    /// Text leaf; content lives in the `nodeValue` attribute
    Text,
    /// Function component
    Component(Component),
}

impl ElementType {
    pub fn host(tag: impl Into<String>) -> Self {
        ElementType::Host(tag.into())
    }

    #[inline]
    pub fn is_component(&self) -> bool {
        matches!(self, ElementType::Component(_))
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, ElementType::Text)
    }

    /// Short label for logs and reports
    pub fn label(&self) -> String {
        match self {
            ElementType::Host(tag) => tag.clone(),
            ElementType::Text => "#text".to_string(),
            ElementType::Component(c) => format!("<{}>", c.name()),
        }
    }

    /// Reject host tags the host could never create
    pub fn validate(&self) -> SprigResult<()> {
        match self {
            ElementType::Host(tag) => {
                let valid = tag
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic())
                    && tag
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':');
                if valid {
                    Ok(())
                } else {
                    Err(SprigError::InvalidElementType(tag.clone()))
                }
            }
            ElementType::Text | ElementType::Component(_) => Ok(()),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Host(tag.to_string())
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::Host(tag)
    }
}

impl From<Component> for ElementType {
    fn from(c: Component) -> Self {
        ElementType::Component(c)
    }
}

/// Attributes plus child descriptors
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    pub attrs: Attributes,
    pub children: Vec<Element>,
}

impl Props {
    pub fn new(attrs: Attributes, children: Vec<Element>) -> Self {
        Props { attrs, children }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }
}

#[derive(Debug, PartialEq)]
struct ElementNode {
    ty: ElementType,
    props: Props,
}

/// Immutable element descriptor
#[derive(Clone)]
pub struct Element(Arc<ElementNode>);

impl Element {
    pub fn new(ty: ElementType, props: Props) -> Self {
        Element(Arc::new(ElementNode { ty, props }))
    }

    /// Start a host element, e.g. `Element::host("div")`
    pub fn host(tag: impl Into<String>) -> ElementBuilder {
        ElementBuilder::new(ElementType::Host(tag.into()))
    }

    /// Start a function component element
    pub fn component(component: &Component) -> ElementBuilder {
        ElementBuilder::new(ElementType::Component(component.clone()))
    }

    pub fn ty(&self) -> &ElementType {
        &self.0.ty
    }

    pub fn props(&self) -> &Props {
        &self.0.props
    }

    pub fn attrs(&self) -> &Attributes {
        &self.0.props.attrs
    }

    pub fn children(&self) -> &[Element] {
        &self.0.props.children
    }

    /// Text content if this is a text element
    pub fn text_value(&self) -> Option<&str> {
        if self.0.ty.is_text() {
            self.attrs().get(NODE_VALUE).and_then(|v| v.as_text())
        } else {
            None
        }
    }

    /// Validate this element and every descendant
    pub fn validate_tree(&self) -> SprigResult<()> {
        self.ty().validate()?;
        self.children().iter().try_for_each(|c| c.validate_tree())
    }

    /// Number of elements in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children().iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.text_value() {
            return write!(f, "{text:?}");
        }
        let mut t = f.debug_tuple(&self.ty().label());
        if !self.attrs().is_empty() {
            t.field(self.attrs());
        }
        for child in self.children() {
            t.field(child);
        }
        t.finish()
    }
}

/// Child passed to the builder; scalars become text elements
#[derive(Clone, Debug)]
pub enum Child {
    Element(Element),
    Text(String),
}

impl Child {
    pub fn into_element(self) -> Element {
        match self {
            Child::Element(e) => e,
            Child::Text(s) => text(s),
        }
    }
}

impl From<Element> for Child {
    fn from(e: Element) -> Self {
        Child::Element(e)
    }
}

impl From<ElementBuilder> for Child {
    fn from(b: ElementBuilder) -> Self {
        Child::Element(b.build())
    }
}

impl From<&str> for Child {
    fn from(s: &str) -> Self {
        Child::Text(s.to_string())
    }
}

impl From<String> for Child {
    fn from(s: String) -> Self {
        Child::Text(s)
    }
}

impl From<i64> for Child {
    fn from(i: i64) -> Self {
        Child::Text(i.to_string())
    }
}

impl From<i32> for Child {
    fn from(i: i32) -> Self {
        Child::Text(i.to_string())
    }
}

impl From<f64> for Child {
    fn from(f: f64) -> Self {
        Child::Text(f.to_string())
    }
}

impl From<bool> for Child {
    fn from(b: bool) -> Self {
        Child::Text(b.to_string())
    }
}

/// Build a text element
pub fn text(value: impl Into<String>) -> Element {
    let mut attrs = Attributes::new();
    attrs.insert(NODE_VALUE.to_string(), AttrValue::Text(value.into()));
    Element::new(ElementType::Text, Props::new(attrs, Vec::new()))
}

/// Build an element from a type, attributes and children
///
/// A `children` entry in `attrs` is dropped; children only come from the
/// `children` argument.
pub fn create_element<K, I, C>(ty: impl Into<ElementType>, attrs: I, children: C) -> Element
where
    K: Into<String>,
    I: IntoIterator<Item = (K, AttrValue)>,
    C: IntoIterator<Item = Child>,
{
    let attrs: Attributes = attrs
        .into_iter()
        .map(|(k, v)| (k.into(), v))
        .filter(|(k, _)| k != CHILDREN)
        .collect();
    let children = children.into_iter().map(Child::into_element).collect();
    Element::new(ty.into(), Props::new(attrs, children))
}

/// Fluent element builder
#[derive(Clone, Debug)]
pub struct ElementBuilder {
    ty: ElementType,
    props: Props,
}

impl ElementBuilder {
    pub fn new(ty: ElementType) -> Self {
        ElementBuilder {
            ty,
            props: Props::default(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let name = name.into();
        if name != CHILDREN {
            self.props.attrs.insert(name, value.into());
        }
        self
    }

    /// Register an event handler, e.g. `.on("click", handler)` -> `onClick`
    pub fn on(self, event: &str, handler: EventHandler) -> Self {
        let mut name = String::from(crate::EVENT_PREFIX);
        let mut chars = event.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            name.extend(chars);
        }
        self.attr(name, AttrValue::Handler(handler))
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.props.children.push(child.into().into_element());
        self
    }

    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        self.props
            .children
            .extend(children.into_iter().map(|c| c.into().into_element()));
        self
    }

    pub fn build(self) -> Element {
        Element::new(self.ty, self.props)
    }
}

impl From<ElementBuilder> for Element {
    fn from(b: ElementBuilder) -> Self {
        b.build()
    }
}
