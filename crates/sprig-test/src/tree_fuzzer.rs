//! Tree Fuzzer - randomized render sequences checked against the host
//!
//! Tests:
//! - Convergence: after every commit the host content equals the
//!   projection of the element tree just rendered
//! - Order: with a stable shape, sibling order matches too
//! - Interruption: every render is driven through a jittery idle host

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sprig_core::{AttrValue, Component, Element, ElementBuilder, EventHandler};
use sprig_runtime::{Renderer, RendererConfig, SharedRenderer};
use tracing::debug;

use crate::host::{markup_of, HostSnapshot, MemoryHost};
use crate::idle_simulator::{IdleSimConfig, SimulatedIdleHost};

const TAGS: &[&str] = &["div", "p", "span", "ul", "li", "section"];
const ATTRS: &[&str] = &["id", "class", "title"];
const WORDS: &[&str] = &["alpha", "beta", "gamma", "delta", "omega"];

/// Fuzzer configuration
#[derive(Clone, Debug)]
pub struct TreeFuzzConfig {
    /// Number of successive renders
    pub renders: usize,
    pub max_depth: usize,
    pub max_children: usize,
    /// Probability an element child's tag is drawn at random instead of
    /// from its position (0.0 keeps every position's type stable)
    pub type_churn: f64,
    /// Probability a position holds a component instead of a host element
    pub component_prob: f64,
    /// Probability an element gets a click handler
    pub handler_prob: f64,
    pub idle: IdleSimConfig,
    pub seed: u64,
}

impl Default for TreeFuzzConfig {
    fn default() -> Self {
        TreeFuzzConfig {
            renders: 20,
            max_depth: 4,
            max_children: 4,
            type_churn: 0.3,
            component_prob: 0.1,
            handler_prob: 0.2,
            idle: IdleSimConfig::default(),
            seed: 42,
        }
    }
}

impl TreeFuzzConfig {
    /// Light fuzzing for quick tests
    pub fn light() -> Self {
        TreeFuzzConfig {
            renders: 8,
            max_depth: 3,
            max_children: 3,
            ..Default::default()
        }
    }

    /// Heavy fuzzing for thorough testing
    pub fn heavy() -> Self {
        TreeFuzzConfig {
            renders: 100,
            max_depth: 5,
            max_children: 6,
            type_churn: 0.5,
            component_prob: 0.2,
            handler_prob: 0.3,
            idle: IdleSimConfig::default(),
            seed: 42,
        }
    }

    /// Types fixed by position; only attributes, text and list lengths vary
    pub fn stable_shape() -> Self {
        TreeFuzzConfig {
            type_churn: 0.0,
            component_prob: 0.25,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.idle.seed = seed;
        self
    }
}

/// Fuzzing outcome
#[derive(Clone, Debug, Default)]
pub struct FuzzResult {
    pub renders: usize,
    pub commits: usize,
    pub idle_periods: usize,
    pub placements: usize,
    pub updates: usize,
    pub deletions: usize,
    /// Commits whose host content differed from the projection
    pub content_mismatches: usize,
    /// Commits whose host markup (with sibling order) differed
    pub order_mismatches: usize,
    pub errors: Vec<String>,
    /// First differing (expected, actual) markup pair
    pub first_divergence: Option<(String, String)>,
}

impl FuzzResult {
    /// Every commit converged in content and nothing failed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.content_mismatches == 0 && self.commits == self.renders
    }

    /// Valid and sibling order matched on every commit
    pub fn is_exact(&self) -> bool {
        self.is_valid() && self.order_mismatches == 0
    }
}

/// Tree fuzzer
pub struct TreeFuzzer {
    config: TreeFuzzConfig,
    rng: StdRng,
    /// Shared so position-stable trees keep component identity
    components: Vec<Component>,
}

impl TreeFuzzer {
    pub fn new(config: TreeFuzzConfig) -> Self {
        let components = vec![
            Component::new("Label", |props| {
                let value = props.get("value").map(AttrValue::to_host_string).unwrap_or_default();
                Element::host("span").attr("class", "label").child(value).build()
            }),
            Component::new("Card", |props| {
                let title = props.get("title").map(AttrValue::to_host_string).unwrap_or_default();
                Element::host("section")
                    .child(Element::host("h3").child(title))
                    .children(props.children.iter().cloned())
                    .build()
            }),
        ];
        TreeFuzzer {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            components,
        }
    }

    /// Random element tree
    pub fn generate(&mut self) -> Element {
        let mut root = Element::host("main").attr("id", "app");
        let count = self.rng.gen_range(0..=self.config.max_children);
        for i in 0..count {
            root = root.child(self.node(1, i));
        }
        root.build()
    }

    fn node(&mut self, depth: usize, position: usize) -> Element {
        if depth >= self.config.max_depth {
            return sprig_core::text(self.word());
        }

        if self.component_slot(depth, position) {
            let index = (depth + position) % self.components.len();
            let component = self.components[index].clone();
            let word = self.word();
            let mut el = Element::component(&component).attr("value", word).attr("title", word);
            if index == 1 {
                el = self.with_children(el, depth);
            }
            return el.build();
        }

        let tag = if self.rng.gen_bool(self.config.type_churn) {
            TAGS[self.rng.gen_range(0..TAGS.len())]
        } else {
            TAGS[(depth * 7 + position) % TAGS.len()]
        };

        let mut el = Element::host(tag);
        for name in ATTRS {
            if self.rng.gen_bool(0.4) {
                el = el.attr(*name, self.word());
            }
        }
        if self.rng.gen_bool(self.config.handler_prob) {
            el = el.on("click", EventHandler::new(|_| {}));
        }
        self.with_children(el, depth).build()
    }

    fn with_children(&mut self, mut el: ElementBuilder, depth: usize) -> ElementBuilder {
        let count = self.rng.gen_range(0..=self.config.max_children);
        for i in 0..count {
            el = el.child(self.node(depth + 1, i));
        }
        el
    }

    /// Components sit at fixed slots unless types churn
    fn component_slot(&mut self, depth: usize, position: usize) -> bool {
        if self.config.component_prob <= 0.0 {
            return false;
        }
        if self.config.type_churn > 0.0 {
            return self.rng.gen_bool(self.config.component_prob);
        }
        let period = (1.0 / self.config.component_prob).round().max(1.0) as usize;
        (depth + position) % period == period - 1
    }

    fn word(&mut self) -> &'static str {
        WORDS[self.rng.gen_range(0..WORDS.len())]
    }

    /// Render `config.renders` random trees in sequence
    pub fn run(&mut self) -> FuzzResult {
        let mut result = FuzzResult::default();
        let renderer = Renderer::with_config(MemoryHost::new(), RendererConfig::default());
        let shared = SharedRenderer::new(renderer);
        let mut idle = SimulatedIdleHost::new(self.config.idle.clone());
        let container = shared.lock().host().container();

        for _ in 0..self.config.renders {
            let element = self.generate();
            result.renders += 1;

            if let Err(e) = shared.render(element.clone(), container) {
                result.errors.push(e.to_string());
                continue;
            }
            shared.schedule(&mut idle);
            result.idle_periods += idle.run_until_idle(100_000);
            if let Some(e) = shared.take_error() {
                result.errors.push(e.to_string());
                continue;
            }

            let guard = shared.lock();
            let Some(report) = guard.stats().last_commit.clone() else {
                result.errors.push("render finished without a commit".into());
                continue;
            };
            result.commits += 1;
            result.placements += report.placements;
            result.updates += report.updates;
            result.deletions += report.deletions;

            let expected = match HostSnapshot::project(&element) {
                Ok(expected) => expected,
                Err(e) => {
                    result.errors.push(e.to_string());
                    continue;
                }
            };
            let actual = guard.host().child_snapshots(container);
            check(&mut result, &expected, &actual);
        }

        debug!(
            renders = result.renders,
            commits = result.commits,
            content_mismatches = result.content_mismatches,
            order_mismatches = result.order_mismatches,
            "tree fuzzing finished"
        );
        result
    }
}

fn check(result: &mut FuzzResult, expected: &[HostSnapshot], actual: &[HostSnapshot]) {
    if expected == actual {
        return;
    }
    result.order_mismatches += 1;

    let canonical = |nodes: &[HostSnapshot]| {
        let mut out: Vec<_> = nodes.iter().map(HostSnapshot::canonical).collect();
        out.sort();
        out
    };
    if canonical(expected) != canonical(actual) {
        result.content_mismatches += 1;
    }
    if result.first_divergence.is_none() {
        result.first_divergence = Some((markup_of(expected), markup_of(actual)));
    }
}
