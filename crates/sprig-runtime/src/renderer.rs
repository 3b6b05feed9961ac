//! Sprig Renderer - the render-cycle engine
//!
//! Holds the state of at most one in-flight render cycle: the
//! work-in-progress tree, the next unit of work and the deletion list. The
//! embedding application drives it by calling [`Renderer::work_loop`] from
//! its idle callback until the cycle commits.

use std::time::Instant;

use sprig_core::{Element, FiberId, Generation, HostTree, SprigError, SprigResult};
use sprig_fiber::{commit_root, perform_unit, CommitReport, FiberTree};
use sprig_time::{Deadline, Unbounded};
use tracing::{debug, info, trace, warn};

use crate::{RendererConfig, RuntimeStats, WorkStatus};

/// Sprig Renderer - reconciles element trees into a host tree
pub struct Renderer<H: HostTree> {
    host: H,
    /// Last committed tree
    current: Option<FiberTree<H::Node>>,
    /// Tree being built; `Some` exactly while a cycle is in flight
    wip: Option<FiberTree<H::Node>>,
    next_unit: Option<FiberId>,
    /// Fibers of `current` to remove at commit
    deletions: Vec<FiberId>,
    generation: Generation,
    config: RendererConfig,
    stats: RuntimeStats,
}

impl<H: HostTree> Renderer<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, RendererConfig::default())
    }

    pub fn with_config(host: H, config: RendererConfig) -> Self {
        Renderer {
            host,
            current: None,
            wip: None,
            next_unit: None,
            deletions: Vec::new(),
            generation: Generation::ZERO,
            config,
            stats: RuntimeStats::default(),
        }
    }

    /// Start a render cycle for `element` inside `container`
    ///
    /// The new tree is diffed against the current one. Fails if a cycle is
    /// already in flight or the element tree holds an invalid host tag; in
    /// both cases no state changes.
    pub fn render(&mut self, element: Element, container: H::Node) -> SprigResult<()> {
        if self.wip.is_some() {
            return Err(SprigError::RenderInProgress);
        }
        element.validate_tree()?;

        self.generation = self.generation.next();
        let wip = FiberTree::with_root(self.generation, container, element, self.current.as_ref());
        self.deletions.clear();
        self.next_unit = Some(wip.root());
        self.wip = Some(wip);
        self.stats.cycles_started += 1;

        debug!(
            generation = %self.generation,
            rerender = self.current.is_some(),
            "render cycle started"
        );
        Ok(())
    }

    /// Process exactly one fiber
    ///
    /// Returns the fiber processed, or `None` when no unit is pending. Does
    /// not commit; [`Renderer::work_loop`] does that once the walk is done.
    pub fn perform_next_unit(&mut self) -> SprigResult<Option<FiberId>> {
        let Some(id) = self.next_unit else {
            return Ok(None);
        };

        match self.step(id) {
            Ok(next) => {
                self.next_unit = next;
                self.stats.units_processed += 1;
                Ok(Some(id))
            }
            Err(e) => Err(self.abandon(e)),
        }
    }

    fn step(&mut self, id: FiberId) -> SprigResult<Option<FiberId>> {
        let wip = self.wip.as_mut().ok_or(SprigError::DanglingFiber(id))?;
        let outcome = perform_unit(
            &mut self.host,
            wip,
            self.current.as_mut(),
            id,
            &mut self.deletions,
        )?;
        trace!(
            fiber = ?id,
            updates = outcome.updates,
            placements = outcome.placements,
            deletions = outcome.deletions,
            "performed unit"
        );
        wip.next_unit(id)
    }

    /// Run one slice of work against `deadline`
    ///
    /// At least one fiber is processed per call. After each fiber the
    /// remaining budget is checked; once it drops below the yield threshold
    /// the slice ends. When the last fiber is done the cycle commits within
    /// the same call.
    pub fn work_loop(&mut self, deadline: &dyn Deadline) -> SprigResult<WorkStatus> {
        self.stats.slices += 1;
        let mut units = 0usize;

        while self.next_unit.is_some() {
            self.perform_next_unit()?;
            units += 1;

            if self.next_unit.is_none() {
                break;
            }
            let capped = self
                .config
                .max_units_per_slice
                .is_some_and(|max| units >= max);
            if capped || self.config.budget.should_yield(deadline) {
                self.stats.yields += 1;
                debug!(units, capped, "yielding to host");
                return Ok(WorkStatus::Yielded);
            }
        }

        match self.commit()? {
            Some(report) => Ok(WorkStatus::Committed(report)),
            None => Ok(WorkStatus::Idle),
        }
    }

    /// Run the pending cycle to completion, ignoring time budgets
    pub fn flush(&mut self) -> SprigResult<Option<CommitReport>> {
        loop {
            match self.work_loop(&Unbounded)? {
                WorkStatus::Yielded => continue,
                WorkStatus::Committed(report) => return Ok(Some(report)),
                WorkStatus::Idle => return Ok(None),
            }
        }
    }

    /// Apply the finished tree and make it current
    fn commit(&mut self) -> SprigResult<Option<CommitReport>> {
        let Some(mut wip) = self.wip.take() else {
            return Ok(None);
        };

        let started = Instant::now();
        let result = commit_root(
            &mut self.host,
            &wip,
            self.current.as_ref(),
            &self.deletions,
            self.config.record_effects,
        );

        match result {
            Ok(report) => {
                wip.seal();
                self.current = Some(wip);
                self.deletions.clear();

                self.stats.cycles_committed += 1;
                self.stats.last_commit_duration = started.elapsed();
                self.stats.last_commit = Some(report.clone());

                info!(
                    generation = %report.generation,
                    placements = report.placements,
                    updates = report.updates,
                    deletions = report.deletions,
                    host_mutations = report.host_mutations,
                    "render cycle committed"
                );
                Ok(Some(report))
            }
            Err(e) => Err(self.abandon(e)),
        }
    }

    /// Drop the in-flight cycle; `current` stays the pre-cycle tree
    fn abandon(&mut self, err: SprigError) -> SprigError {
        if let Some(current) = self.current.as_mut() {
            for &id in &self.deletions {
                if let Ok(fiber) = current.get_mut(id) {
                    fiber.effect = sprig_core::EffectTag::None;
                }
            }
        }
        self.wip = None;
        self.next_unit = None;
        self.deletions.clear();
        self.stats.cycles_abandoned += 1;

        warn!(error = %err, generation = %self.generation, "render cycle abandoned");
        err
    }

    /// Is a render cycle in flight?
    pub fn has_pending_work(&self) -> bool {
        self.wip.is_some()
    }

    pub fn next_unit(&self) -> Option<FiberId> {
        self.next_unit
    }

    pub fn current(&self) -> Option<&FiberTree<H::Node>> {
        self.current.as_ref()
    }

    pub fn work_in_progress(&self) -> Option<&FiberTree<H::Node>> {
        self.wip.as_ref()
    }

    pub fn deletions(&self) -> &[FiberId] {
        &self.deletions
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Generation of the most recently started cycle
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sprig_core::{text, Component, ComponentError, EffectTag, EventHandler};
    use sprig_test::{HostOpKind, MemoryHost, NodeRef, TreeFuzzConfig, TreeFuzzer};
    use sprig_time::FixedDeadline;

    fn renderer(config: RendererConfig) -> (Renderer<MemoryHost>, NodeRef) {
        let host = MemoryHost::new();
        let container = host.container();
        (Renderer::with_config(host, config), container)
    }

    fn markup(r: &Renderer<MemoryHost>, container: NodeRef) -> String {
        r.host().inner_markup(container)
    }

    fn page(second: &str) -> Element {
        Element::host("div")
            .child(Element::host("h1").child("Hello"))
            .child(Element::host("h2").child(second))
            .build()
    }

    #[test]
    fn test_render_and_flush() {
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(page("World"), c).unwrap();
        assert!(r.has_pending_work());
        assert!(r.current().is_none());

        let report = r.flush().unwrap().unwrap();
        assert_eq!(report.placements, 5);
        assert!(!r.has_pending_work());
        assert!(r.work_in_progress().is_none());
        assert_eq!(
            markup(&r, c),
            "<div><h1>Hello</h1><h2>World</h2></div>"
        );
        assert_eq!(r.stats().cycles_committed, 1);
    }

    #[test]
    fn test_rerender_updates_text_in_place() {
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(page("World"), c).unwrap();
        r.flush().unwrap();
        let created = r.host().count(HostOpKind::Create);

        r.render(page("Bye"), c).unwrap();
        let report = r.flush().unwrap().unwrap();

        assert_eq!(r.host().count(HostOpKind::Create), created);
        assert_eq!(report.placements, 0);
        assert_eq!(report.deletions, 0);
        assert_eq!(report.host_mutations, 1);
        assert_eq!(markup(&r, c), "<div><h1>Hello</h1><h2>Bye</h2></div>");
    }

    #[test]
    fn test_render_while_in_flight_is_rejected() {
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(page("World"), c).unwrap();
        r.perform_next_unit().unwrap();

        let err = r.render(page("Bye"), c).unwrap_err();
        assert!(matches!(err, SprigError::RenderInProgress));
        // The in-flight cycle is untouched
        assert!(r.has_pending_work());
        r.flush().unwrap();
        assert_eq!(markup(&r, c), "<div><h1>Hello</h1><h2>World</h2></div>");
    }

    #[test]
    fn test_invalid_tag_rejected_up_front() {
        let (mut r, c) = renderer(RendererConfig::default());
        let err = r.render(Element::host("bad tag").build(), c).unwrap_err();
        assert!(err.is_precondition());
        assert!(!r.has_pending_work());
        assert_eq!(r.stats().cycles_started, 0);
    }

    #[test]
    fn test_expired_deadline_yields_after_one_unit() {
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(page("World"), c).unwrap();

        let mut slices = 0;
        loop {
            slices += 1;
            match r.work_loop(&FixedDeadline::EXPIRED).unwrap() {
                WorkStatus::Yielded => {
                    assert!(r.current().is_none());
                }
                WorkStatus::Committed(_) => break,
                WorkStatus::Idle => panic!("cycle lost"),
            }
        }
        // root, div, h1, "Hello", h2, "World"
        assert_eq!(slices, 6);
        assert_eq!(r.stats().yields, 5);
    }

    #[test]
    fn test_slice_cap() {
        let config = RendererConfig {
            max_units_per_slice: Some(2),
            ..Default::default()
        };
        let (mut r, c) = renderer(config);
        r.render(page("World"), c).unwrap();

        assert_eq!(r.work_loop(&Unbounded).unwrap(), WorkStatus::Yielded);
        assert_eq!(r.stats().units_processed, 2);
        assert_eq!(r.work_loop(&Unbounded).unwrap(), WorkStatus::Yielded);
        assert!(matches!(
            r.work_loop(&Unbounded).unwrap(),
            WorkStatus::Committed(_)
        ));
        assert_eq!(r.work_loop(&Unbounded).unwrap(), WorkStatus::Idle);
    }

    #[test]
    fn test_component_error_abandons_cycle() {
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(page("World"), c).unwrap();
        r.flush().unwrap();

        let broken = Component::fallible("Broken", |_| Err(ComponentError::new("no data")));
        let el = Element::host("div").child(Element::component(&broken)).build();
        r.render(el, c).unwrap();

        let err = r.flush().unwrap_err();
        assert!(matches!(err, SprigError::Component { .. }));
        assert!(!r.has_pending_work());
        assert!(r.deletions().is_empty());
        assert_eq!(r.stats().cycles_abandoned, 1);
        // Previous tree still current, with no stale deletion tags
        let current = r.current().unwrap();
        assert!(current.iter().all(|(_, f)| f.effect == EffectTag::None));
        assert_eq!(markup(&r, c), "<div><h1>Hello</h1><h2>World</h2></div>");

        // A new cycle can start afterwards
        r.render(page("Again"), c).unwrap();
        r.flush().unwrap();
        assert_eq!(markup(&r, c), "<div><h1>Hello</h1><h2>Again</h2></div>");
    }

    #[test]
    fn test_host_failure_during_commit_keeps_current() {
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(page("World"), c).unwrap();
        r.host_mut().fail_on(HostOpKind::AppendChild);

        assert!(matches!(r.flush(), Err(SprigError::Host(_))));
        assert!(r.current().is_none());
        assert!(!r.has_pending_work());
    }

    #[test]
    fn test_effect_log_recorded_when_enabled() {
        let (mut r, c) = renderer(RendererConfig::debug());
        r.render(Element::host("p").child(text("x")).build(), c).unwrap();
        let report = r.flush().unwrap().unwrap();

        let labels: Vec<_> = report.effects.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["p", "#text"]);
        assert_eq!(r.stats().last_commit, Some(report));
    }

    #[test]
    fn test_wip_links_alternates_to_current_generation() {
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(page("World"), c).unwrap();
        r.flush().unwrap();
        let committed = r.current().unwrap().generation();

        r.render(page("Bye"), c).unwrap();
        assert_eq!(
            r.work_in_progress().unwrap().alternate_generation(),
            Some(committed)
        );
        r.flush().unwrap();
        assert_eq!(r.current().unwrap().alternate_generation(), None);
    }

    fn badge_page(badge: &Component, on_click: &EventHandler, label: &str) -> Element {
        Element::host("div")
            .child(Element::component(badge).attr("count", 3))
            .child(Element::host("button").on("click", on_click.clone()).child(label))
            .build()
    }

    #[test]
    fn test_reused_component_and_handler_update_in_place() {
        let badge = Component::new("Badge", |_| Element::host("span").child("3").build());
        let on_click = EventHandler::new(|_| {});
        let (mut r, c) = renderer(RendererConfig::default());
        r.render(badge_page(&badge, &on_click, "Go"), c).unwrap();
        r.flush().unwrap();
        r.host_mut().take_log();

        r.render(badge_page(&badge, &on_click, "Stop"), c).unwrap();
        let report = r.flush().unwrap().unwrap();

        assert!(report.is_structurally_stable());
        assert_eq!(report.host_mutations, 1);
        assert_eq!(r.host().count(HostOpKind::AddListener), 0);
        assert_eq!(
            markup(&r, c),
            "<div><span>3</span><button>Stop</button></div>"
        );
    }

    #[test]
    fn test_fresh_component_and_handler_are_replaced() {
        let (mut r, c) = renderer(RendererConfig::default());
        for label in ["Go", "Stop"] {
            let badge = Component::new("Badge", |_| Element::host("span").child("3").build());
            r.render(badge_page(&badge, &EventHandler::new(|_| {}), label), c)
                .unwrap();
            r.host_mut().take_log();
            r.flush().unwrap();
        }

        let report = r.stats().last_commit.clone().unwrap();
        // Badge, its span and the span's text
        assert_eq!(report.deletions, 1);
        assert_eq!(report.placements, 3);
        assert_eq!(r.host().count(HostOpKind::RemoveListener), 1);
        assert_eq!(r.host().count(HostOpKind::AddListener), 1);
    }

    fn list(items: &[u8]) -> Element {
        Element::host("ul")
            .children(items.iter().map(|i| Element::host("li").child(i64::from(*i))))
            .build()
    }

    proptest! {
        #[test]
        fn prop_visit_order_is_preorder(seed in any::<u64>()) {
            let element = TreeFuzzer::new(TreeFuzzConfig::default().with_seed(seed)).generate();
            let (mut r, c) = renderer(RendererConfig::default());
            r.render(element, c).unwrap();

            let mut visited = Vec::new();
            while let Some(id) = r.perform_next_unit().unwrap() {
                visited.push(id);
            }
            let wip = r.work_in_progress().unwrap();
            prop_assert_eq!(visited.len(), wip.len());

            let pos = |f: FiberId| visited.iter().position(|v| *v == f);
            // Every ancestor comes first, and every ancestor's later
            // sibling comes after this fiber's whole subtree
            for &id in &visited {
                let mut ancestor = Some(id);
                while let Some(a) = ancestor {
                    let fiber = wip.get(a).unwrap();
                    if a != id {
                        prop_assert!(pos(a) < pos(id));
                    }
                    if let Some(sibling) = fiber.sibling {
                        prop_assert!(pos(id) < pos(sibling));
                    }
                    ancestor = fiber.parent;
                }
            }
        }

        #[test]
        fn prop_same_tree_twice_has_no_structural_effects(
            items in proptest::collection::vec(0u8..5, 0..10),
        ) {
            let (mut r, c) = renderer(RendererConfig::default());
            r.render(list(&items), c).unwrap();
            r.flush().unwrap();
            let before = markup(&r, c);

            r.render(list(&items), c).unwrap();
            let report = r.flush().unwrap().unwrap();
            prop_assert!(report.is_structurally_stable());
            prop_assert_eq!(report.host_mutations, 0);
            prop_assert_eq!(markup(&r, c), before);
        }
    }
}
