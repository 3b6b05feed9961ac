//! Child reconciliation
//!
//! Diffs a parent's new child elements against the child chain of the
//! parent's alternate, position by position. Children are not keyed: a
//! reordered list matches items to whatever previously sat at the same
//! index.

use sprig_core::{EffectTag, Element, FiberId, SprigError, SprigResult};
use tracing::trace;

use crate::{Fiber, FiberTree};

/// Effects emitted while reconciling one parent
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub updates: usize,
    pub placements: usize,
    pub deletions: usize,
}

impl ReconcileOutcome {
    pub fn merge(&mut self, other: &ReconcileOutcome) {
        self.updates += other.updates;
        self.placements += other.placements;
        self.deletions += other.deletions;
    }

    pub fn total(&self) -> usize {
        self.updates + self.placements + self.deletions
    }
}

/// Resolve the previous tree an alternate link points into
///
/// Fails if the work-in-progress tree expects a previous generation that
/// is not the one supplied.
pub fn previous_tree<'a, N>(
    wip: &FiberTree<N>,
    fiber: FiberId,
    current: Option<&'a mut FiberTree<N>>,
) -> SprigResult<Option<&'a mut FiberTree<N>>> {
    let Some(expected) = wip.alternate_generation() else {
        return Ok(None);
    };
    match current {
        Some(tree) if tree.generation() == expected => Ok(Some(tree)),
        other => Err(SprigError::StaleAlternate {
            fiber,
            expected,
            found: other.map(|t| t.generation()),
        }),
    }
}

/// Build `parent`'s new child chain from `elements`
///
/// Old fibers that are not carried over are tagged for deletion in
/// `current` and appended to `deletions`.
pub fn reconcile_children<N: Clone>(
    wip: &mut FiberTree<N>,
    current: Option<&mut FiberTree<N>>,
    parent: FiberId,
    elements: &[Element],
    deletions: &mut Vec<FiberId>,
) -> SprigResult<ReconcileOutcome> {
    let mut outcome = ReconcileOutcome::default();

    let alternate = wip.get(parent)?.alternate;
    let mut current = match alternate {
        Some(_) => previous_tree(wip, parent, current)?,
        None => None,
    };

    let mut old_fiber = match (alternate, current.as_deref()) {
        (Some(alt), Some(tree)) => tree.get(alt)?.child,
        _ => None,
    };

    wip.get_mut(parent)?.child = None;
    let mut prev_sibling: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old_fiber.is_some() {
        let element = elements.get(index);

        let mut next_old = None;
        let mut new_fiber: Option<Fiber<N>> = None;

        match (old_fiber, current.as_deref_mut()) {
            (Some(old_id), Some(tree)) => {
                let old = tree.get(old_id)?;
                next_old = old.sibling;

                let same_type = element.is_some_and(|el| old.ty.matches(el.ty()));
                if same_type {
                    if let Some(el) = element {
                        new_fiber = Some(Fiber::update(el, parent, old_id, old));
                        outcome.updates += 1;
                    }
                } else {
                    if let Some(el) = element {
                        new_fiber = Some(Fiber::placement(el, parent));
                        outcome.placements += 1;
                    }
                    tree.get_mut(old_id)?.effect = EffectTag::Deletion;
                    deletions.push(old_id);
                    outcome.deletions += 1;
                }
            }
            (Some(old_id), None) => return Err(SprigError::DanglingFiber(old_id)),
            (None, _) => {
                if let Some(el) = element {
                    new_fiber = Some(Fiber::placement(el, parent));
                    outcome.placements += 1;
                }
            }
        }

        if let Some(fiber) = new_fiber {
            let id = wip.alloc(fiber);
            match prev_sibling {
                None => wip.get_mut(parent)?.child = Some(id),
                Some(prev) => wip.get_mut(prev)?.sibling = Some(id),
            }
            prev_sibling = Some(id);
        }

        old_fiber = next_old;
        index += 1;
    }

    trace!(
        parent = ?parent,
        updates = outcome.updates,
        placements = outcome.placements,
        deletions = outcome.deletions,
        "children reconciled"
    );
    Ok(outcome)
}
