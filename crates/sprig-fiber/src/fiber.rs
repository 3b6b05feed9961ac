//! Fiber definitions
//!
//! A fiber mirrors one element for one render cycle. Structural links are
//! arena indices: `parent`, first `child`, next `sibling`. `alternate`
//! indexes into the previously committed tree.

use sprig_core::{Component, EffectTag, Element, ElementType, FiberId, Props};

/// Fiber type - the synthetic root or an element type
#[derive(Clone, Debug, PartialEq)]
pub enum FiberType {
    /// Wraps the external container; never created or removed
    Root,
    Element(ElementType),
}

impl FiberType {
    #[inline]
    pub fn is_root(&self) -> bool {
        matches!(self, FiberType::Root)
    }

    #[inline]
    pub fn is_component(&self) -> bool {
        matches!(self, FiberType::Element(ElementType::Component(_)))
    }

    pub fn component(&self) -> Option<&Component> {
        match self {
            FiberType::Element(ElementType::Component(c)) => Some(c),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&ElementType> {
        match self {
            FiberType::Element(ty) => Some(ty),
            FiberType::Root => None,
        }
    }

    /// Same type for diffing purposes
    pub fn matches(&self, ty: &ElementType) -> bool {
        match self {
            FiberType::Element(own) => own == ty,
            FiberType::Root => false,
        }
    }

    pub fn label(&self) -> String {
        match self {
            FiberType::Root => "#root".to_string(),
            FiberType::Element(ty) => ty.label(),
        }
    }
}

/// Progress of a fiber through one render cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FiberState {
    #[default]
    Unvisited,
    /// Component invoked or host node materialised
    Evaluated,
    /// Child chain built
    Reconciled,
    Committed,
}

/// Fiber - one node of the work-in-progress or current tree
#[derive(Clone, Debug)]
pub struct Fiber<N> {
    pub ty: FiberType,
    pub props: Props,
    /// Host node; `None` for components and not-yet-materialised fibers
    pub host: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    /// Counterpart in the previously committed tree
    pub alternate: Option<FiberId>,
    pub effect: EffectTag,
    pub state: FiberState,
}

impl<N> Fiber<N> {
    pub fn new(ty: FiberType, props: Props) -> Self {
        Fiber {
            ty,
            props,
            host: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: EffectTag::None,
            state: FiberState::Unvisited,
        }
    }

    /// Fresh fiber for an element that has no counterpart
    pub fn placement(element: &Element, parent: FiberId) -> Self {
        let mut fiber = Fiber::new(
            FiberType::Element(element.ty().clone()),
            element.props().clone(),
        );
        fiber.parent = Some(parent);
        fiber.effect = EffectTag::Placement;
        fiber
    }

    /// Fiber reusing `old`'s host node with the new element's props
    pub fn update(element: &Element, parent: FiberId, old_id: FiberId, old: &Fiber<N>) -> Self
    where
        N: Clone,
    {
        let mut fiber = Fiber::new(old.ty.clone(), element.props().clone());
        fiber.host = old.host.clone();
        fiber.parent = Some(parent);
        fiber.alternate = Some(old_id);
        fiber.effect = EffectTag::Update;
        fiber
    }

    pub fn label(&self) -> String {
        self.ty.label()
    }

    /// Children descriptors carried on the element itself
    pub fn element_children(&self) -> &[Element] {
        &self.props.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_core::{text, Component};

    #[test]
    fn test_type_matching() {
        let comp = Component::new("A", |_| text("a"));
        let other = Component::new("A", |_| text("a"));
        let ty = FiberType::Element(ElementType::Component(comp.clone()));

        assert!(ty.matches(&ElementType::Component(comp)));
        assert!(!ty.matches(&ElementType::Component(other)));
        assert!(!FiberType::Root.matches(&ElementType::host("div")));
        assert!(FiberType::Element(ElementType::host("div")).matches(&ElementType::host("div")));
        assert!(!FiberType::Element(ElementType::Text).matches(&ElementType::host("div")));
    }

    #[test]
    fn test_update_carries_host_and_alternate() {
        let old_el = sprig_core::Element::host("p").attr("id", "a").build();
        let new_el = sprig_core::Element::host("p").attr("id", "b").build();

        let mut old: Fiber<u32> = Fiber::placement(&old_el, FiberId::ROOT);
        old.host = Some(7);

        let updated = Fiber::update(&new_el, FiberId::new(1), FiberId::new(4), &old);
        assert_eq!(updated.host, Some(7));
        assert_eq!(updated.alternate, Some(FiberId::new(4)));
        assert_eq!(updated.effect, EffectTag::Update);
        assert_eq!(updated.props, *new_el.props());
        assert_eq!(updated.state, FiberState::Unvisited);
    }

    #[test]
    fn test_placement_has_no_host() {
        let el = sprig_core::Element::host("div").build();
        let fiber: Fiber<u32> = Fiber::placement(&el, FiberId::ROOT);
        assert!(fiber.host.is_none());
        assert!(fiber.alternate.is_none());
        assert_eq!(fiber.effect, EffectTag::Placement);
        assert_eq!(fiber.parent, Some(FiberId::ROOT));
    }
}
