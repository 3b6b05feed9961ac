//! Idle-loop driver
//!
//! Hands the renderer to a host's idle-callback scheduler. Each callback
//! locks the renderer for one work-loop slice and asks to be called again
//! while the cycle is still pending.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use sprig_core::{Element, HostTree, SprigError, SprigResult};
use sprig_time::{Deadline, IdleScheduler, IdleStatus};
use tracing::warn;

use crate::Renderer;

/// Shared handle to a renderer driven by idle callbacks
pub struct SharedRenderer<H: HostTree> {
    inner: Arc<Mutex<Renderer<H>>>,
    error: Arc<Mutex<Option<SprigError>>>,
}

impl<H: HostTree> Clone for SharedRenderer<H> {
    fn clone(&self) -> Self {
        SharedRenderer {
            inner: Arc::clone(&self.inner),
            error: Arc::clone(&self.error),
        }
    }
}

impl<H: HostTree> SharedRenderer<H> {
    pub fn new(renderer: Renderer<H>) -> Self {
        SharedRenderer {
            inner: Arc::new(Mutex::new(renderer)),
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Lock the renderer
    pub fn lock(&self) -> MutexGuard<'_, Renderer<H>> {
        self.inner.lock()
    }

    pub fn render(&self, element: Element, container: H::Node) -> SprigResult<()> {
        self.inner.lock().render(element, container)
    }

    /// Run one slice; the status tells the scheduler whether to call again
    pub fn run_slice(&self, deadline: &dyn Deadline) -> IdleStatus {
        let result = self.inner.lock().work_loop(deadline);
        match result {
            Ok(status) if status.is_pending() => IdleStatus::Pending,
            Ok(_) => IdleStatus::Done,
            Err(e) => {
                warn!(error = %e, "idle slice failed");
                *self.error.lock() = Some(e);
                IdleStatus::Done
            }
        }
    }

    /// Error raised by the last failed slice, if any
    pub fn take_error(&self) -> Option<SprigError> {
        self.error.lock().take()
    }
}

impl<H> SharedRenderer<H>
where
    H: HostTree + Send + 'static,
    H::Node: Send,
{
    /// Request an idle callback that works the pending cycle to commit
    pub fn schedule(&self, scheduler: &mut impl IdleScheduler) {
        let renderer = self.clone();
        scheduler.request_idle_callback(Box::new(move |deadline| renderer.run_slice(deadline)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RendererConfig;
    use sprig_core::Component;
    use sprig_test::MemoryHost;
    use sprig_time::{BudgetConfig, IdleQueue};

    fn items(n: usize) -> Element {
        Element::host("ol")
            .children((0..n).map(|i| Element::host("li").child(i as i64)))
            .build()
    }

    #[test]
    fn test_schedule_runs_to_commit() {
        let host = MemoryHost::new();
        let container = host.container();
        let shared = SharedRenderer::new(Renderer::new(host));
        let mut queue = IdleQueue::new();

        shared.render(items(3), container).unwrap();
        shared.schedule(&mut queue);
        queue.run_until_idle(100);

        assert!(queue.is_empty());
        assert!(shared.take_error().is_none());
        let r = shared.lock();
        assert!(!r.has_pending_work());
        assert_eq!(
            r.host().inner_markup(container),
            "<ol><li>0</li><li>1</li><li>2</li></ol>"
        );
    }

    #[test]
    fn test_capped_slices_requeue() {
        let config = RendererConfig {
            max_units_per_slice: Some(1),
            budget: BudgetConfig::batch(),
            ..Default::default()
        };
        let host = MemoryHost::new();
        let container = host.container();
        let shared = SharedRenderer::new(Renderer::with_config(host, config));
        let mut queue = IdleQueue::with_config(BudgetConfig::batch());

        shared.render(items(2), container).unwrap();
        shared.schedule(&mut queue);
        let periods = queue.run_until_idle(100);

        // root, ol, two li and two text fibers, one per period
        assert_eq!(periods, 6);
        assert_eq!(shared.lock().stats().yields, 5);
    }

    #[test]
    fn test_failed_slice_stores_error() {
        let broken = Component::fallible("Broken", |_| {
            Err(sprig_core::ComponentError::new("unavailable"))
        });
        let host = MemoryHost::new();
        let container = host.container();
        let shared = SharedRenderer::new(Renderer::new(host));
        let mut queue = IdleQueue::new();

        shared
            .render(Element::component(&broken).build(), container)
            .unwrap();
        shared.schedule(&mut queue);
        queue.run_until_idle(10);

        assert!(matches!(
            shared.take_error(),
            Some(SprigError::Component { .. })
        ));
        assert!(shared.take_error().is_none());
        assert!(!shared.lock().has_pending_work());
    }
}
