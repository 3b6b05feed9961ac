//! Unit of work
//!
//! Processing one fiber means evaluating it, then reconciling its children:
//! - component fibers call their render function; the returned elements
//!   are the children
//! - host and text fibers materialise a host node if they have none; their
//!   own `props.children` are the children
//! - the root wraps the container and reconciles the rendered element

use sprig_core::{
    AttrValue, Attributes, Element, ElementType, FiberId, HostTree, NodeKind, SprigError,
    SprigResult, NODE_VALUE,
};
use tracing::trace;

use crate::{
    apply_attribute_diff, reconcile_children, FiberState, FiberTree, FiberType, ReconcileOutcome,
};

/// Create a detached host node for `ty` with `attrs` applied
///
/// Text nodes get their content through creation; every other attribute
/// goes through the same diff used at commit, against an empty map.
pub fn create_host_node<H: HostTree>(
    host: &mut H,
    ty: &ElementType,
    attrs: &Attributes,
) -> SprigResult<H::Node> {
    let node = match ty {
        ElementType::Host(tag) => {
            ty.validate()?;
            let node = host.create_node(NodeKind::Element(tag), None)?;
            apply_attribute_diff(host, &node, &Attributes::new(), attrs)?;
            node
        }
        ElementType::Text => {
            let value = attrs.get(NODE_VALUE).map(AttrValue::to_host_string);
            let node = host.create_node(NodeKind::Text, value.as_deref())?;
            let rest: Attributes = attrs
                .iter()
                .filter(|(name, _)| name.as_str() != NODE_VALUE)
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            apply_attribute_diff(host, &node, &Attributes::new(), &rest)?;
            node
        }
        // Components never own host nodes
        ElementType::Component(_) => return Err(SprigError::InvalidElementType(ty.label())),
    };
    Ok(node)
}

/// Child descriptors of a fiber, evaluating it if needed
fn evaluate<H: HostTree>(
    host: &mut H,
    wip: &mut FiberTree<H::Node>,
    id: FiberId,
) -> SprigResult<Vec<Element>> {
    let fiber = wip.get(id)?;
    let children = match &fiber.ty {
        FiberType::Root => fiber.element_children().to_vec(),
        FiberType::Element(ElementType::Component(component)) => component
            .render(&fiber.props)
            .map_err(|source| SprigError::Component {
                name: component.name().to_string(),
                source,
            })?,
        FiberType::Element(ty) => {
            let children = fiber.element_children().to_vec();
            if fiber.host.is_none() {
                let ty = ty.clone();
                let attrs = fiber.props.attrs.clone();
                let node = create_host_node(host, &ty, &attrs)?;
                wip.get_mut(id)?.host = Some(node);
            }
            children
        }
    };
    wip.get_mut(id)?.state = FiberState::Evaluated;
    Ok(children)
}

/// Process one fiber: evaluate it and reconcile its children
///
/// Deleted old fibers are tagged in `current` and pushed to `deletions`.
pub fn perform_unit<H: HostTree>(
    host: &mut H,
    wip: &mut FiberTree<H::Node>,
    current: Option<&mut FiberTree<H::Node>>,
    id: FiberId,
    deletions: &mut Vec<FiberId>,
) -> SprigResult<ReconcileOutcome> {
    let children = evaluate(host, wip, id)?;
    let outcome = reconcile_children(wip, current, id, &children, deletions)?;
    wip.get_mut(id)?.state = FiberState::Reconciled;

    trace!(
        fiber = ?id,
        children = children.len(),
        effects = outcome.total(),
        "unit of work done"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LogHost;
    use sprig_core::{text, Component, ComponentError, EffectTag, Generation};

    fn run_all(host: &mut LogHost, wip: &mut FiberTree<u32>) -> Vec<FiberId> {
        let mut visited = Vec::new();
        let mut deletions = Vec::new();
        let mut next = Some(FiberId::ROOT);
        while let Some(id) = next {
            perform_unit(host, wip, None, id, &mut deletions).unwrap();
            visited.push(id);
            next = wip.next_unit(id).unwrap();
        }
        visited
    }

    #[test]
    fn test_host_fiber_gets_node_with_attributes() {
        let el = Element::host("div").attr("id", "x").child("hi").build();
        let mut host = LogHost::new();
        let mut wip = FiberTree::with_root(Generation::new(1), 0, el, None);
        run_all(&mut host, &mut wip);

        assert_eq!(
            host.log,
            vec!["create 1 <div>", "set 1 id=x", "create 2 \"hi\""]
        );
        for (_, fiber) in wip.iter() {
            assert_eq!(fiber.state, FiberState::Reconciled);
            assert!(fiber.host.is_some());
        }
        // Nothing attached before commit
        assert!(host.children.is_empty());
    }

    #[test]
    fn test_component_gets_no_host_node() {
        let label = Component::new("Label", |props| {
            let v = props.get("v").map(|v| v.to_host_string()).unwrap_or_default();
            Element::host("span").child(v).build()
        });
        let el = Element::component(&label).attr("v", 3).build();

        let mut host = LogHost::new();
        let mut wip = FiberTree::with_root(Generation::new(1), 0, el, None);
        let visited = run_all(&mut host, &mut wip);

        assert_eq!(visited.len(), 4);
        let comp = wip.get(visited[1]).unwrap();
        assert!(comp.ty.is_component());
        assert!(comp.host.is_none());
        assert_eq!(wip.get(visited[2]).unwrap().label(), "span");
        assert_eq!(wip.get(visited[3]).unwrap().effect, EffectTag::Placement);
    }

    #[test]
    fn test_component_failure_is_reported() {
        let broken = Component::fallible("Broken", |_| Err(ComponentError::new("boom")));
        let mut host = LogHost::new();
        let mut wip = FiberTree::with_root(
            Generation::new(1),
            0,
            Element::component(&broken).build(),
            None,
        );
        let mut deletions = Vec::new();
        perform_unit(&mut host, &mut wip, None, FiberId::ROOT, &mut deletions).unwrap();
        let child = wip.get(FiberId::ROOT).unwrap().child.unwrap();

        let err = perform_unit(&mut host, &mut wip, None, child, &mut deletions).unwrap_err();
        assert!(matches!(err, SprigError::Component { ref name, .. } if name == "Broken"));
    }

    #[test]
    fn test_invalid_tag_rejected_before_host_call() {
        let mut host = LogHost::new();
        let el = Element::host("no tag").build();
        let mut wip = FiberTree::with_root(Generation::new(1), 0, el, None);
        let mut deletions = Vec::new();
        perform_unit(&mut host, &mut wip, None, FiberId::ROOT, &mut deletions).unwrap();
        let child = wip.get(FiberId::ROOT).unwrap().child.unwrap();

        let err = perform_unit(&mut host, &mut wip, None, child, &mut deletions).unwrap_err();
        assert!(matches!(err, SprigError::InvalidElementType(_)));
        assert!(host.log.is_empty());
    }

    #[test]
    fn test_host_failure_propagates() {
        let mut host = LogHost::new();
        host.fail_on = Some("create_node");
        let mut wip = FiberTree::with_root(Generation::new(1), 0, text("x"), None);
        let mut deletions = Vec::new();
        perform_unit(&mut host, &mut wip, None, FiberId::ROOT, &mut deletions).unwrap();
        let child = wip.get(FiberId::ROOT).unwrap().child.unwrap();

        let err = perform_unit(&mut host, &mut wip, None, child, &mut deletions).unwrap_err();
        assert!(matches!(err, SprigError::Host(_)));
    }
}
