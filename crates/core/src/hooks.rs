// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Customization points for coordinator owners

use crate::coordinator::CleanupReport;
use std::sync::Arc;

/// Callbacks invoked by a [`LifecycleCoordinator`](crate::LifecycleCoordinator)
///
/// Hooks run outside the coordinator's state lock, so they may call back
/// into it. `on_attached` runs inside the `attach` event and must not
/// deliver lifecycle events.
pub trait LifecycleHooks<R>: Send + Sync {
    /// A resource instance was attached (before it is active)
    fn on_attached(&self, _resource: &Arc<R>) {}

    /// The coordinator finished its one-time cleanup
    fn on_cleanup(&self, _report: &CleanupReport) {}
}

/// Hooks that do nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl<R> LifecycleHooks<R> for NoopHooks {}
