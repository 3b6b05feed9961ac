//! End-to-end scenarios
//!
//! Each scenario drives a renderer over a [`MemoryHost`] through a short
//! sequence of renders and records what the host saw after every commit.
//! A scenario fails with a message per violated expectation.

use sprig_core::{text, Component, Element, SprigResult};
use sprig_fiber::CommitReport;
use sprig_runtime::{Renderer, RendererConfig, SharedRenderer};

use crate::host::{HostOp, HostOpKind, MemoryHost};
use crate::idle_simulator::{IdleSimConfig, SimulatedIdleHost};

// ============================================================================
// SCENARIO RECORDING
// ============================================================================

/// One committed render
#[derive(Clone, Debug)]
pub struct CycleRecord {
    pub report: CommitReport,
    /// Container markup after the commit
    pub markup: String,
    /// Host mutations issued during this cycle
    pub ops: Vec<HostOp>,
}

impl CycleRecord {
    pub fn count(&self, kind: HostOpKind) -> usize {
        self.ops.iter().filter(|op| op.kind() == kind).count()
    }

    pub fn structural_ops(&self) -> usize {
        self.ops.iter().filter(|op| op.is_structural()).count()
    }
}

/// Result of one scenario
#[derive(Clone, Debug)]
pub struct ScenarioResult {
    pub name: &'static str,
    pub cycles: Vec<CycleRecord>,
    pub failures: Vec<String>,
}

impl ScenarioResult {
    fn new(name: &'static str) -> Self {
        ScenarioResult {
            name,
            cycles: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn expect(&mut self, ok: bool, message: impl Into<String>) {
        if !ok {
            self.failures.push(message.into());
        }
    }

    fn expect_eq<T: PartialEq + std::fmt::Debug>(&mut self, actual: T, expected: T, what: &str) {
        if actual != expected {
            self.failures
                .push(format!("{what}: expected {expected:?}, got {actual:?}"));
        }
    }
}

/// Renderer over a fresh memory host, recording every commit
pub struct ScenarioRunner {
    renderer: Renderer<MemoryHost>,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::with_config(RendererConfig::debug())
    }

    pub fn with_config(config: RendererConfig) -> Self {
        ScenarioRunner {
            renderer: Renderer::with_config(MemoryHost::new(), config),
        }
    }

    /// Render and run the cycle to completion
    pub fn render(&mut self, element: Element) -> SprigResult<CycleRecord> {
        let container = self.renderer.host().container();
        self.renderer.host_mut().take_log();
        self.renderer.render(element, container)?;
        let report = self.renderer.flush()?.unwrap_or_default();
        Ok(CycleRecord {
            report,
            markup: self.renderer.host().inner_markup(container),
            ops: self.renderer.host_mut().take_log(),
        })
    }

    pub fn renderer(&self) -> &Renderer<MemoryHost> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<MemoryHost> {
        &mut self.renderer
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn run_sequence(name: &'static str, elements: Vec<Element>) -> ScenarioResult {
    let mut result = ScenarioResult::new(name);
    let mut runner = ScenarioRunner::new();
    for element in elements {
        match runner.render(element) {
            Ok(cycle) => result.cycles.push(cycle),
            Err(e) => {
                result.failures.push(format!("render failed: {e}"));
                break;
            }
        }
    }
    result
}

// ============================================================================
// SCENARIOS
// ============================================================================

fn greeting(second: &str) -> Element {
    Element::host("div")
        .child(Element::host("h1").child("Hello"))
        .child(Element::host("h2").child(second))
        .build()
}

/// `div[h1["Hello"], h2["World"]]`, then the second heading becomes "Bye"
///
/// The second cycle must touch only the text of the second heading.
pub fn hello_world() -> ScenarioResult {
    let mut result = run_sequence("hello_world", vec![greeting("World"), greeting("Bye")]);
    if result.cycles.len() != 2 {
        return result;
    }

    let first = result.cycles[0].clone();
    result.expect_eq(
        first.markup.as_str(),
        "<div><h1>Hello</h1><h2>World</h2></div>",
        "first markup",
    );
    result.expect_eq(first.report.placements, 5, "first placements");

    let second = result.cycles[1].clone();
    result.expect_eq(
        second.markup.as_str(),
        "<div><h1>Hello</h1><h2>Bye</h2></div>",
        "second markup",
    );
    result.expect_eq(second.report.placements, 0, "second placements");
    result.expect_eq(second.report.deletions, 0, "second deletions");
    result.expect_eq(second.structural_ops(), 0, "nodes created or moved");
    result.expect_eq(second.ops.len(), 1, "host mutations");
    result.expect(
        matches!(
            second.ops.first(),
            Some(HostOp::SetAttribute { name, value, .. }) if name == "nodeValue" && value == "Bye"
        ),
        format!("expected a single nodeValue update, got {:?}", second.ops),
    );
    result
}

/// The same tree twice: the second cycle is all updates and no host calls
pub fn noop_rerender() -> ScenarioResult {
    let mut result = run_sequence("noop_rerender", vec![greeting("World"), greeting("World")]);
    if let Some(second) = result.cycles.get(1).cloned() {
        result.expect(
            second.report.is_structurally_stable(),
            "second render placed or deleted",
        );
        result.expect_eq(second.report.updates, 5, "updates");
        result.expect_eq(second.ops.len(), 0, "host mutations");
    }
    result
}

/// `div[A, B]` then `div[B]`: positions are compared, not identities
///
/// Position 0 changes type, so old A is deleted and a new B placed there;
/// old B at position 1 has no counterpart and is deleted as well.
pub fn positional_replacement() -> ScenarioResult {
    let tree = |tags: &[&str]| {
        Element::host("div")
            .children(tags.iter().map(|t| Element::host(*t).child(t.to_uppercase())))
            .build()
    };
    let mut result = run_sequence("positional_replacement", vec![tree(&["a", "b"]), tree(&["b"])]);
    if let Some(second) = result.cycles.get(1).cloned() {
        result.expect_eq(second.report.deletions, 2, "deletions");
        result.expect_eq(second.report.placements, 2, "placements (b and its text)");
        result.expect_eq(second.report.updates, 1, "updates (div)");
        result.expect_eq(second.count(HostOpKind::RemoveChild), 2, "host removals");
        result.expect_eq(second.markup.as_str(), "<div><b>B</b></div>", "markup");
    }
    result
}

/// `[A, C]` then `[A, B]`: update at 0, placement and deletion at 1
pub fn position_type_change() -> ScenarioResult {
    let a = || Element::host("a").attr("id", "a").build();
    let mut result = run_sequence(
        "position_type_change",
        vec![
            Element::host("div").child(a()).child(Element::host("c")).build(),
            Element::host("div").child(a()).child(Element::host("b")).build(),
        ],
    );
    if let Some(second) = result.cycles.get(1).cloned() {
        let effects: Vec<String> = second.report.effects.iter().map(|e| e.to_string()).collect();
        result.expect_eq(second.report.deletions, 1, "deletions");
        result.expect_eq(second.report.placements, 1, "placements");
        result.expect_eq(second.report.updates, 2, "updates (div and a)");
        result.expect(
            effects.first().is_some_and(|e| e.starts_with("deletion c")),
            format!("deletion first, got {effects:?}"),
        );
        result.expect_eq(
            second.markup.as_str(),
            "<div><a id=\"a\"></a><b></b></div>",
            "markup",
        );
    }
    result
}

/// Components never get host nodes; their output attaches to the nearest
/// host ancestor and is removed from it when the component goes away
pub fn component_transparency() -> ScenarioResult {
    let items = Component::fragment("Items", |props| {
        let n = props.get("n").and_then(|v| v.as_text()).map_or(0, |s| s.len());
        (0..n).map(|i| Element::host("li").child(i as i64).build()).collect()
    });
    let list = |n: &str, with_items: bool| {
        let mut ul = Element::host("ul");
        if with_items {
            ul = ul.child(Element::component(&items).attr("n", n));
        }
        ul.build()
    };

    let mut result = run_sequence(
        "component_transparency",
        vec![list("xx", true), list("xxx", true), list("", false)],
    );
    if result.cycles.len() != 3 {
        return result;
    }

    let first = result.cycles[0].clone();
    result.expect_eq(
        first.markup.as_str(),
        "<ul><li>0</li><li>1</li></ul>",
        "component output",
    );
    // ul, two li, two text nodes; the component creates nothing
    result.expect_eq(first.count(HostOpKind::Create), 5, "nodes created");

    let second = result.cycles[1].clone();
    result.expect_eq(
        second.markup.as_str(),
        "<ul><li>0</li><li>1</li><li>2</li></ul>",
        "grown output",
    );

    let third = result.cycles[2].clone();
    result.expect_eq(third.markup.as_str(), "<ul></ul>", "removed component");
    result.expect_eq(third.report.deletions, 1, "one deleted fiber");
    result.expect_eq(third.count(HostOpKind::RemoveChild), 3, "host nodes removed");
    result
}

/// A render driven by a starved idle host yields after every fiber; the
/// host stays untouched until the single commit
pub fn interrupted_render() -> ScenarioResult {
    let mut result = ScenarioResult::new("interrupted_render");
    let shared = SharedRenderer::new(Renderer::new(MemoryHost::new()));
    let container = shared.lock().host().container();
    let mut idle = SimulatedIdleHost::new(IdleSimConfig::starved());

    if let Err(e) = shared.render(greeting("World"), container) {
        result.failures.push(e.to_string());
        return result;
    }
    shared.schedule(&mut idle);

    let mut periods = 0;
    while idle.pending() > 0 && periods < 100 {
        let host_attached = !shared.lock().host().children(container).is_empty();
        result.expect(!host_attached, format!("host mutated before commit (period {periods})"));
        idle.run_period();
        periods += 1;
    }

    if let Some(e) = shared.take_error() {
        result.failures.push(e.to_string());
    }
    let guard = shared.lock();
    // root, div, h1, "Hello", h2, "World"
    result.expect_eq(periods, 6, "idle periods");
    result.expect_eq(guard.stats().yields, 5, "yields");
    result.expect_eq(guard.stats().cycles_committed, 1, "commits");
    result.expect_eq(
        guard.host().inner_markup(container).as_str(),
        "<div><h1>Hello</h1><h2>World</h2></div>",
        "markup",
    );
    drop(guard);
    result
}

/// A failing host leaves `current` at the last committed tree
pub fn host_failure_keeps_current() -> ScenarioResult {
    let mut result = ScenarioResult::new("host_failure_keeps_current");
    let mut runner = ScenarioRunner::new();
    if let Err(e) = runner.render(greeting("World")) {
        result.failures.push(e.to_string());
        return result;
    }
    let before = runner.renderer().current().map(|t| t.generation());

    runner.renderer_mut().host_mut().fail_on(HostOpKind::SetAttribute);
    let outcome = runner.render(greeting("Bye"));
    result.expect(outcome.is_err(), "render against a failing host succeeded");
    result.expect_eq(
        runner.renderer().current().map(|t| t.generation()),
        before,
        "current generation",
    );
    result.expect(!runner.renderer().has_pending_work(), "cycle left in flight");

    runner.renderer_mut().host_mut().clear_failure();
    match runner.render(greeting("Bye")) {
        Ok(cycle) => result.expect_eq(
            cycle.markup.as_str(),
            "<div><h1>Hello</h1><h2>Bye</h2></div>",
            "markup after recovery",
        ),
        Err(e) => result.failures.push(format!("recovery render failed: {e}")),
    }
    result
}

/// Every scenario in this module
pub fn all_scenarios() -> Vec<ScenarioResult> {
    vec![
        hello_world(),
        noop_rerender(),
        positional_replacement(),
        position_type_change(),
        component_transparency(),
        interrupted_render(),
        host_failure_keeps_current(),
        text_children(),
    ]
}

/// Scalar children become text nodes
pub fn text_children() -> ScenarioResult {
    let el = Element::host("p")
        .child("n = ")
        .child(42)
        .child(text("!"))
        .build();
    let mut result = run_sequence("text_children", vec![el]);
    if let Some(cycle) = result.cycles.first().cloned() {
        result.expect_eq(cycle.markup.as_str(), "<p>n = 42!</p>", "markup");
        result.expect_eq(cycle.count(HostOpKind::Create), 4, "nodes created");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_passed(result: ScenarioResult) -> ScenarioResult {
        assert!(result.passed(), "{}: {:?}", result.name, result.failures);
        result
    }

    #[test]
    fn test_hello_world() {
        let result = assert_passed(hello_world());
        assert_eq!(result.cycles.len(), 2);
    }

    #[test]
    fn test_noop_rerender() {
        assert_passed(noop_rerender());
    }

    #[test]
    fn test_positional_replacement() {
        assert_passed(positional_replacement());
    }

    #[test]
    fn test_position_type_change() {
        assert_passed(position_type_change());
    }

    #[test]
    fn test_component_transparency() {
        assert_passed(component_transparency());
    }

    #[test]
    fn test_interrupted_render() {
        assert_passed(interrupted_render());
    }

    #[test]
    fn test_host_failure_keeps_current() {
        assert_passed(host_failure_keeps_current());
    }

    #[test]
    fn test_text_children() {
        assert_passed(text_children());
    }

    #[test]
    fn test_all_scenarios_pass() {
        let results = all_scenarios();
        assert_eq!(results.len(), 8);
        assert!(results.iter().all(ScenarioResult::passed));
    }
}
