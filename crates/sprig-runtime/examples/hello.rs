//! Render a small page, re-render it, and print what the host saw
//!
//! Run with `RUST_LOG=sprig=debug` to watch cycles start, yield and commit.

use sprig_core::{AttrValue, Component, Element, EventHandler, HostError, HostTree, NodeKind};
use sprig_runtime::{init_tracing, LogFormat, Renderer, RendererConfig, SharedRenderer};
use sprig_time::{BudgetConfig, IdleQueue};

/// Host that prints every mutation it receives
#[derive(Default)]
struct PrintHost {
    next: u32,
}

impl HostTree for PrintHost {
    type Node = u32;

    fn create_node(
        &mut self,
        kind: NodeKind<'_>,
        text: Option<&str>,
    ) -> Result<u32, HostError> {
        self.next += 1;
        match kind {
            NodeKind::Element(tag) => println!("create  #{} <{tag}>", self.next),
            NodeKind::Text => println!("create  #{} {:?}", self.next, text.unwrap_or_default()),
        }
        Ok(self.next)
    }

    fn set_attribute(
        &mut self,
        node: &u32,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        println!("set     #{node} {name}={}", value.to_host_string());
        Ok(())
    }

    fn clear_attribute(&mut self, node: &u32, name: &str) -> Result<(), HostError> {
        println!("clear   #{node} {name}");
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: &u32,
        event: &str,
        _: &EventHandler,
    ) -> Result<(), HostError> {
        println!("listen  #{node} {event}");
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: &u32,
        event: &str,
        _: &EventHandler,
    ) -> Result<(), HostError> {
        println!("unlisten #{node} {event}");
        Ok(())
    }

    fn append_child(&mut self, parent: &u32, child: &u32) -> Result<(), HostError> {
        println!("append  #{child} -> #{parent}");
        Ok(())
    }

    fn remove_child(&mut self, parent: &u32, child: &u32) -> Result<(), HostError> {
        println!("remove  #{child} <- #{parent}");
        Ok(())
    }
}

/// Component and handler are built once so re-renders keep their identity
fn greeting(name: &str, badge: &Component, on_click: &EventHandler) -> Element {
    Element::host("div")
        .attr("id", "app")
        .child(Element::host("h1").child("Hello"))
        .child(Element::host("h2").child(name))
        .child(Element::component(badge).attr("count", 3))
        .child(
            Element::host("button")
                .on("click", on_click.clone())
                .child("Go"),
        )
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(LogFormat::Pretty)?;

    let config = RendererConfig {
        record_effects: true,
        ..RendererConfig::default()
    }
    .with_budget(BudgetConfig::interactive());
    let shared = SharedRenderer::new(Renderer::with_config(PrintHost::default(), config));
    let mut idle = IdleQueue::with_config(BudgetConfig::interactive());

    let badge = Component::new("Badge", |props| {
        let count = props
            .get("count")
            .map(|v| v.to_host_string())
            .unwrap_or_default();
        Element::host("span").attr("class", "badge").child(count).build()
    });
    let on_click = EventHandler::new(|event| println!("clicked: {}", event.name));

    for name in ["World", "Bye"] {
        println!("--- render {name}");
        shared.render(greeting(name, &badge, &on_click), 0)?;
        shared.schedule(&mut idle);
        let periods = idle.run_until_idle(1_000);
        if let Some(err) = shared.take_error() {
            return Err(err.into());
        }

        let renderer = shared.lock();
        if let Some(report) = &renderer.stats().last_commit {
            println!(
                "committed in {periods} idle period(s): {} placed, {} updated, {} deleted",
                report.placements, report.updates, report.deletions
            );
            for effect in &report.effects {
                println!("  {effect}");
            }
        }
    }
    Ok(())
}
