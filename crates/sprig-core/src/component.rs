//! Function components
//!
//! A component is a named, shared render function. Two component types
//! are the same type only if they share the same function value.

use std::fmt;
use std::sync::Arc;

use crate::{ComponentError, Element, Props};

type RenderFn = dyn Fn(&Props) -> Result<Vec<Element>, ComponentError> + Send + Sync;

/// Function component type
#[derive(Clone)]
pub struct Component {
    name: Arc<str>,
    render: Arc<RenderFn>,
}

impl Component {
    /// Component rendering exactly one element
    pub fn new(name: &str, f: impl Fn(&Props) -> Element + Send + Sync + 'static) -> Self {
        Self::fallible(name, move |props| Ok(vec![f(props)]))
    }

    /// Component rendering any number of sibling elements
    pub fn fragment(
        name: &str,
        f: impl Fn(&Props) -> Vec<Element> + Send + Sync + 'static,
    ) -> Self {
        Self::fallible(name, move |props| Ok(f(props)))
    }

    /// Component whose render may fail
    pub fn fallible(
        name: &str,
        f: impl Fn(&Props) -> Result<Vec<Element>, ComponentError> + Send + Sync + 'static,
    ) -> Self {
        Component {
            name: Arc::from(name),
            render: Arc::new(f),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the render function with the fiber's props
    pub fn render(&self, props: &Props) -> Result<Vec<Element>, ComponentError> {
        (self.render)(props)
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Arc::ptr_eq(&self.render, &other.render)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text;

    #[test]
    fn test_identity_is_the_function() {
        let a = Component::new("Label", |_| text("a"));
        let b = Component::new("Label", |_| text("a"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_render_receives_props() {
        let greet = Component::new("Greet", |props| {
            let name = props
                .attrs
                .get("name")
                .and_then(|v| v.as_text())
                .unwrap_or("nobody")
                .to_string();
            text(format!("hi {name}"))
        });

        let mut props = Props::default();
        props.attrs.insert("name".into(), "ada".into());
        let out = greet.render(&props).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text_value(), Some("hi ada"));
    }

    #[test]
    fn test_fragment_and_fallible() {
        let pair = Component::fragment("Pair", |_| vec![text("a"), text("b")]);
        assert_eq!(pair.render(&Props::default()).unwrap().len(), 2);

        let broken = Component::fallible("Broken", |_| Err(ComponentError::new("nope")));
        assert_eq!(
            broken.render(&Props::default()).unwrap_err(),
            ComponentError::new("nope")
        );
    }
}
