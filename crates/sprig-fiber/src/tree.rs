//! Fiber tree - per-cycle arena of fibers

use sprig_core::{Element, FiberId, Generation, Props, SprigError, SprigResult};

use crate::{Fiber, FiberState, FiberType};

/// Fiber tree - one arena per render cycle
///
/// Slot zero is always the synthetic root wrapping the host container.
#[derive(Debug)]
pub struct FiberTree<N> {
    generation: Generation,
    /// Generation of the tree `alternate` links point into
    alternate_generation: Option<Generation>,
    fibers: Vec<Fiber<N>>,
}

impl<N> FiberTree<N> {
    /// Create a work-in-progress tree whose root wraps `container`
    ///
    /// The root's only child descriptor is `element`. If `previous` is the
    /// committed tree, the root's alternate is that tree's root.
    pub fn with_root(
        generation: Generation,
        container: N,
        element: Element,
        previous: Option<&FiberTree<N>>,
    ) -> Self {
        let mut root = Fiber::new(FiberType::Root, Props::new(Default::default(), vec![element]));
        root.host = Some(container);
        root.alternate = previous.map(|_| FiberId::ROOT);

        FiberTree {
            generation,
            alternate_generation: previous.map(|p| p.generation),
            fibers: vec![root],
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn alternate_generation(&self) -> Option<Generation> {
        self.alternate_generation
    }

    pub fn root(&self) -> FiberId {
        FiberId::ROOT
    }

    /// Get a fiber by ID
    pub fn get(&self, id: FiberId) -> SprigResult<&Fiber<N>> {
        self.fibers.get(id.index()).ok_or(SprigError::DanglingFiber(id))
    }

    /// Get a mutable fiber by ID
    pub fn get_mut(&mut self, id: FiberId) -> SprigResult<&mut Fiber<N>> {
        self.fibers
            .get_mut(id.index())
            .ok_or(SprigError::DanglingFiber(id))
    }

    /// Add a fiber to the arena
    pub fn alloc(&mut self, fiber: Fiber<N>) -> FiberId {
        let id = FiberId::new(self.fibers.len() as u32);
        self.fibers.push(fiber);
        id
    }

    /// Number of fibers, root included
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Iterate over fibers in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (FiberId, &Fiber<N>)> {
        self.fibers
            .iter()
            .enumerate()
            .map(|(i, f)| (FiberId::new(i as u32), f))
    }

    /// Iterate over a fiber's child chain
    pub fn children(&self, id: FiberId) -> Children<'_, N> {
        Children {
            tree: self,
            next: self.get(id).ok().and_then(|f| f.child),
        }
    }

    /// Next fiber in pre-order after `id`
    ///
    /// The child if present, else the nearest ancestor-or-self sibling.
    /// `None` once the walk climbs back to the root.
    pub fn next_unit(&self, id: FiberId) -> SprigResult<Option<FiberId>> {
        let fiber = self.get(id)?;
        if let Some(child) = fiber.child {
            return Ok(Some(child));
        }

        let mut cursor = id;
        loop {
            if cursor.is_root() {
                return Ok(None);
            }
            let fiber = self.get(cursor)?;
            if let Some(sibling) = fiber.sibling {
                return Ok(Some(sibling));
            }
            match fiber.parent {
                Some(parent) => cursor = parent,
                None => return Ok(None),
            }
        }
    }

    /// Pre-order walk of the linked fibers, root first
    pub fn preorder(&self) -> Preorder<'_, N> {
        Preorder {
            tree: self,
            next: Some(FiberId::ROOT),
        }
    }

    /// Nearest ancestor of `id` owning a host node
    pub fn host_parent(&self, id: FiberId) -> SprigResult<(FiberId, &N)> {
        let mut cursor = self.get(id)?.parent;
        while let Some(parent_id) = cursor {
            let parent = self.get(parent_id)?;
            if let Some(node) = parent.host.as_ref() {
                return Ok((parent_id, node));
            }
            cursor = parent.parent;
        }
        Err(SprigError::NoContainer(id))
    }

    /// Depth of a fiber; the root has depth zero
    pub fn depth(&self, id: FiberId) -> SprigResult<usize> {
        let mut depth = 0;
        let mut cursor = self.get(id)?.parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.get(parent)?.parent;
        }
        Ok(depth)
    }

    /// Mark the tree committed: clear effect tags and cross-tree links
    ///
    /// After this the tree no longer references its predecessor, so the
    /// predecessor can be dropped.
    pub fn seal(&mut self) {
        for fiber in &mut self.fibers {
            fiber.effect = sprig_core::EffectTag::None;
            fiber.alternate = None;
            fiber.state = FiberState::Committed;
        }
        self.alternate_generation = None;
    }
}

/// Iterator over a child chain
pub struct Children<'a, N> {
    tree: &'a FiberTree<N>,
    next: Option<FiberId>,
}

impl<N> Iterator for Children<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree.get(id).ok().and_then(|f| f.sibling);
        Some(id)
    }
}

/// Pre-order iterator
pub struct Preorder<'a, N> {
    tree: &'a FiberTree<N>,
    next: Option<FiberId>,
}

impl<N> Iterator for Preorder<'_, N> {
    type Item = FiberId;

    fn next(&mut self) -> Option<FiberId> {
        let id = self.next?;
        self.next = self.tree.next_unit(id).ok().flatten();
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_core::{text, Element};

    /// root -> a -> (b, c), a's sibling d
    fn sample_tree() -> (FiberTree<u32>, [FiberId; 4]) {
        let el = Element::host("div").build();
        let mut tree = FiberTree::with_root(Generation::new(1), 0, el.clone(), None);

        let a = tree.alloc(Fiber::placement(&el, FiberId::ROOT));
        let d = tree.alloc(Fiber::placement(&el, FiberId::ROOT));
        let b = tree.alloc(Fiber::placement(&text("b"), a));
        let c = tree.alloc(Fiber::placement(&text("c"), a));

        tree.get_mut(FiberId::ROOT).unwrap().child = Some(a);
        tree.get_mut(a).unwrap().sibling = Some(d);
        tree.get_mut(a).unwrap().child = Some(b);
        tree.get_mut(b).unwrap().sibling = Some(c);
        tree.get_mut(a).unwrap().host = Some(10);

        (tree, [a, b, c, d])
    }

    #[test]
    fn test_root_wraps_container() {
        let el = Element::host("div").build();
        let tree: FiberTree<u32> = FiberTree::with_root(Generation::new(3), 99, el.clone(), None);
        let root = tree.get(tree.root()).unwrap();

        assert!(root.ty.is_root());
        assert_eq!(root.host, Some(99));
        assert_eq!(root.props.children, vec![el]);
        assert!(root.alternate.is_none());
        assert_eq!(tree.alternate_generation(), None);
    }

    #[test]
    fn test_root_alternate_points_at_previous() {
        let el = Element::host("div").build();
        let prev: FiberTree<u32> = FiberTree::with_root(Generation::new(1), 1, el.clone(), None);
        let next = FiberTree::with_root(Generation::new(2), 1, el, Some(&prev));

        assert_eq!(next.get(FiberId::ROOT).unwrap().alternate, Some(FiberId::ROOT));
        assert_eq!(next.alternate_generation(), Some(Generation::new(1)));
    }

    #[test]
    fn test_preorder_walk() {
        let (tree, [a, b, c, d]) = sample_tree();
        let order: Vec<_> = tree.preorder().collect();
        assert_eq!(order, vec![FiberId::ROOT, a, b, c, d]);
    }

    #[test]
    fn test_next_unit_climbs_to_ancestor_sibling() {
        let (tree, [_, _, c, d]) = sample_tree();
        assert_eq!(tree.next_unit(c).unwrap(), Some(d));
        assert_eq!(tree.next_unit(d).unwrap(), None);
    }

    #[test]
    fn test_children_chain() {
        let (tree, [a, b, c, d]) = sample_tree();
        assert_eq!(tree.children(a).collect::<Vec<_>>(), vec![b, c]);
        assert_eq!(tree.children(FiberId::ROOT).collect::<Vec<_>>(), vec![a, d]);
        assert_eq!(tree.children(d).count(), 0);
    }

    #[test]
    fn test_host_parent_skips_hostless() {
        let (mut tree, [a, b, _, d]) = sample_tree();
        assert_eq!(tree.host_parent(b).unwrap(), (a, &10));
        assert_eq!(tree.host_parent(d).unwrap(), (FiberId::ROOT, &0));

        tree.get_mut(a).unwrap().host = None;
        assert_eq!(tree.host_parent(b).unwrap().0, FiberId::ROOT);
        assert_eq!(tree.depth(b).unwrap(), 2);
    }

    #[test]
    fn test_dangling_lookup_is_an_error() {
        let (tree, _) = sample_tree();
        assert!(matches!(
            tree.get(FiberId::new(500)),
            Err(SprigError::DanglingFiber(_))
        ));
        assert!(tree.next_unit(FiberId::new(500)).is_err());
    }

    #[test]
    fn test_seal_clears_cycle_state() {
        let (mut tree, [a, ..]) = sample_tree();
        tree.get_mut(a).unwrap().alternate = Some(FiberId::new(2));
        tree.seal();

        for (_, fiber) in tree.iter() {
            assert_eq!(fiber.effect, sprig_core::EffectTag::None);
            assert!(fiber.alternate.is_none());
            assert_eq!(fiber.state, FiberState::Committed);
        }
    }
}
