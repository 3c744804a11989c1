// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced wrappers for consistent observability

use crate::source::LifecycleSource;
use async_trait::async_trait;
use lg_core::{CleanupReport, LifecycleEvent, LifecycleHooks};
use std::sync::Arc;

/// Wrapper that logs every event a LifecycleSource yields
pub struct TracedSource<S> {
    name: String,
    inner: S,
    delivered: usize,
}

impl<S> TracedSource<S> {
    pub fn new(name: impl Into<String>, inner: S) -> Self {
        Self {
            name: name.into(),
            inner,
            delivered: 0,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<R, S> LifecycleSource<R> for TracedSource<S>
where
    R: Send + Sync + 'static,
    S: LifecycleSource<R>,
{
    async fn next_event(&mut self) -> Option<LifecycleEvent<R>> {
        let event = self.inner.next_event().await;

        match &event {
            Some(event) => {
                self.delivered += 1;
                tracing::info!(source = %self.name, event = %event.kind(), seq = self.delivered, "lifecycle event");
            }
            None => tracing::info!(source = %self.name, delivered = self.delivered, "lifecycle source ended"),
        }

        event
    }
}

/// Wrapper that adds tracing to any LifecycleHooks
#[derive(Clone)]
pub struct TracedHooks<H> {
    inner: H,
}

impl<H> TracedHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<R, H: LifecycleHooks<R>> LifecycleHooks<R> for TracedHooks<H> {
    fn on_attached(&self, resource: &Arc<R>) {
        let span = tracing::info_span!("hooks.on_attached");
        let _guard = span.enter();

        let start = std::time::Instant::now();
        self.inner.on_attached(resource);
        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "attach hook done");
    }

    fn on_cleanup(&self, report: &CleanupReport) {
        let span = tracing::info_span!("hooks.on_cleanup");
        let _guard = span.enter();

        tracing::info!(
            cancelled_jobs = report.cancelled_jobs.len(),
            released_waits = report.released_waits,
            dangling_sticky = report.dangling_sticky.len(),
            "cleanup"
        );
        if !report.dangling_sticky.is_empty() {
            tracing::warn!(ids = ?report.dangling_sticky, "cleanup found dangling sticky entries");
        }

        self.inner.on_cleanup(report);
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
