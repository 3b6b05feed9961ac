//! Commit - apply a finished work-in-progress tree to the host
//!
//! Runs in one uninterrupted pass: deletions first, then a pre-order walk of
//! the new tree applying placements and attribute updates. The caller swaps
//! `current` only once this returns `Ok`.

use std::fmt;

use sprig_core::{EffectTag, FiberId, Generation, HostTree, SprigError, SprigResult};
use tracing::debug;

use crate::{apply_attribute_diff, FiberTree};

/// One effect applied during commit, in commit order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedEffect {
    pub fiber: FiberId,
    pub label: String,
    pub tag: EffectTag,
}

impl fmt::Display for AppliedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.tag, self.label, self.fiber)
    }
}

/// Commit report - what one cycle did to the host
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Generation of the tree that became current
    pub generation: Generation,
    pub placements: usize,
    pub updates: usize,
    pub deletions: usize,
    /// Host calls issued during commit (attribute ops, inserts, removals)
    pub host_mutations: usize,
    /// Per-fiber effect log; empty unless recording was requested
    pub effects: Vec<AppliedEffect>,
}

impl CommitReport {
    /// No structural change: nothing placed, nothing deleted
    pub fn is_structurally_stable(&self) -> bool {
        self.placements == 0 && self.deletions == 0
    }

    pub fn total_effects(&self) -> usize {
        self.placements + self.updates + self.deletions
    }

    fn record(&mut self, enabled: bool, fiber: FiberId, label: String, tag: EffectTag) {
        if enabled {
            self.effects.push(AppliedEffect { fiber, label, tag });
        }
    }
}

/// Resolve the tree `wip`'s alternates index into
fn resolve_previous<'a, N>(
    wip: &FiberTree<N>,
    current: Option<&'a FiberTree<N>>,
) -> SprigResult<Option<&'a FiberTree<N>>> {
    match (wip.alternate_generation(), current) {
        (None, _) => Ok(None),
        (Some(expected), Some(tree)) if tree.generation() == expected => Ok(Some(tree)),
        (Some(expected), other) => Err(SprigError::StaleAlternate {
            fiber: wip.root(),
            expected,
            found: other.map(|t| t.generation()),
        }),
    }
}

/// Remove the host nodes under a deleted fiber
///
/// A fiber without a host node (a component) is transparent: every host
/// node in its child chain is removed from `parent` instead.
fn remove_host_nodes<H: HostTree>(
    host: &mut H,
    tree: &FiberTree<H::Node>,
    id: FiberId,
    parent: &H::Node,
) -> SprigResult<usize> {
    let fiber = tree.get(id)?;
    if let Some(node) = fiber.host.as_ref() {
        host.remove_child(parent, node)?;
        return Ok(1);
    }
    let mut removed = 0;
    for child in tree.children(id) {
        removed += remove_host_nodes(host, tree, child, parent)?;
    }
    Ok(removed)
}

/// Apply every effect of a finished cycle to the host
///
/// `deletions` index into `current`; every other effect lives in `wip`.
pub fn commit_root<H: HostTree>(
    host: &mut H,
    wip: &FiberTree<H::Node>,
    current: Option<&FiberTree<H::Node>>,
    deletions: &[FiberId],
    record_effects: bool,
) -> SprigResult<CommitReport> {
    let previous = resolve_previous(wip, current)?;
    let mut report = CommitReport {
        generation: wip.generation(),
        ..Default::default()
    };

    for &id in deletions {
        let tree = previous.ok_or(SprigError::DanglingFiber(id))?;
        let (_, parent) = tree.host_parent(id)?;
        report.host_mutations += remove_host_nodes(host, tree, id, parent)?;
        report.deletions += 1;
        report.record(record_effects, id, tree.get(id)?.label(), EffectTag::Deletion);
    }

    // The root wraps the container and is never placed itself
    for id in wip.preorder().skip(1) {
        let fiber = wip.get(id)?;
        match fiber.effect {
            EffectTag::Placement => {
                if let Some(node) = fiber.host.as_ref() {
                    let (_, parent) = wip.host_parent(id)?;
                    host.append_child(parent, node)?;
                    report.host_mutations += 1;
                }
                report.placements += 1;
            }
            EffectTag::Update => {
                if let Some(node) = fiber.host.as_ref() {
                    let alternate = fiber.alternate.ok_or(SprigError::DanglingFiber(id))?;
                    let old = previous
                        .ok_or(SprigError::DanglingFiber(alternate))?
                        .get(alternate)?;
                    report.host_mutations +=
                        apply_attribute_diff(host, node, &old.props.attrs, &fiber.props.attrs)?;
                }
                report.updates += 1;
            }
            EffectTag::None | EffectTag::Deletion => continue,
        }
        report.record(record_effects, id, fiber.label(), fiber.effect);
    }

    debug!(
        generation = %report.generation,
        placements = report.placements,
        updates = report.updates,
        deletions = report.deletions,
        host_mutations = report.host_mutations,
        "commit applied"
    );
    Ok(report)
}
