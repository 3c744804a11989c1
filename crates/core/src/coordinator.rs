// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle coordinator
//!
//! Owns a weak reference to the host's resource and its [`ResourceState`],
//! and gates asynchronous work on the resource being active:
//!
//! - [`resource`](LifecycleCoordinator::resource) returns the active resource
//!   or parks until the next activation
//! - sticky entries replay once per detach/activate cycle until removed
//! - jobs launched through the coordinator are cancelled by
//!   [`cleanup`](LifecycleCoordinator::cleanup)
//!
//! Resource state, parked waits, sticky entries and the replay flag share a
//! single mutex. Sticky blocks and hooks run after it is released, so they
//! may register and remove sticky entries. Lifecycle events are serialized by
//! a second mutex held for the whole event, replay included; blocks and hooks
//! must not deliver lifecycle events to the coordinator that invoked them.

use crate::config::CoordinatorConfig;
use crate::continuation::{ContinuationQueue, DrainReport, WaitId};
use crate::error::CoordinatorError;
use crate::hooks::{LifecycleHooks, NoopHooks};
use crate::id::{IdGen, UuidIdGen};
use crate::jobs::{JobExit, JobHandle, JobId, JobRegistry};
use crate::state::{LifecycleEvent, LifecycleEventKind, ResourceState};
use crate::sticky::{StickyBlock, StickyContinuation, StickyId, StickyRegistry};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::oneshot;

/// What one activation did
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivationReport {
    pub drain: DrainReport,
    /// Sticky entries invoked by this activation, in invocation order
    pub replayed: Vec<StickyId>,
}

/// What cleanup released
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Jobs cancelled, most recently launched first
    pub cancelled_jobs: Vec<JobId>,
    pub released_waits: usize,
    /// Sticky entries that were still registered, sorted by id
    pub dangling_sticky: Vec<StickyId>,
}

struct Inner<R> {
    resource: Option<Weak<R>>,
    state: ResourceState,
    waits: ContinuationQueue<Arc<R>>,
    sticky: StickyRegistry<Arc<R>>,
    must_replay: bool,
    cleaned_up: bool,
}

impl<R> Inner<R> {
    fn live_resource(&self) -> Option<Arc<R>> {
        self.resource.as_ref().and_then(Weak::upgrade)
    }

    fn active_resource(&self) -> Option<Arc<R>> {
        if self.state.is_active() {
            self.live_resource()
        } else {
            None
        }
    }

    /// Whether `resource` is still the attached, active instance
    fn is_active_with(&self, resource: &Arc<R>) -> bool {
        !self.cleaned_up
            && self
                .active_resource()
                .is_some_and(|active| Arc::ptr_eq(&active, resource))
    }

    fn reject_if_cleaned_up(&self, operation: &'static str) -> Result<(), CoordinatorError> {
        if self.cleaned_up {
            Err(CoordinatorError::PostCleanup { operation })
        } else {
            Ok(())
        }
    }
}

struct Shared<R> {
    inner: Mutex<Inner<R>>,
    events: Mutex<()>,
}

impl<R> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Held for the duration of one lifecycle event; taken before `inner`
    fn lock_events(&self) -> MutexGuard<'_, ()> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Gate between asynchronous work and a resource whose availability is
/// controlled by a host
///
/// Cloning is cheap; clones drive the same coordinator, which is how
/// launched jobs reach [`resource`](Self::resource).
pub struct LifecycleCoordinator<R, I: IdGen = UuidIdGen> {
    shared: Arc<Shared<R>>,
    jobs: JobRegistry,
    id_gen: I,
    config: Arc<CoordinatorConfig>,
    hooks: Arc<dyn LifecycleHooks<R>>,
}

impl<R, I: IdGen> Clone for LifecycleCoordinator<R, I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            jobs: self.jobs.clone(),
            id_gen: self.id_gen.clone(),
            config: Arc::clone(&self.config),
            hooks: Arc::clone(&self.hooks),
        }
    }
}

impl<R: Send + Sync + 'static> LifecycleCoordinator<R, UuidIdGen> {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_id_gen(config, UuidIdGen)
    }
}

impl<R, I> LifecycleCoordinator<R, I>
where
    R: Send + Sync + 'static,
    I: IdGen,
{
    pub fn with_id_gen(config: CoordinatorConfig, id_gen: I) -> Self {
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    resource: None,
                    state: ResourceState::Detached,
                    waits: ContinuationQueue::new(),
                    sticky: StickyRegistry::new(),
                    must_replay: false,
                    cleaned_up: false,
                }),
                events: Mutex::new(()),
            }),
            jobs: JobRegistry::new(),
            id_gen,
            config: Arc::new(config),
            hooks: Arc::new(NoopHooks),
        }
    }

    pub fn with_hooks(mut self, hooks: impl LifecycleHooks<R> + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn transition(
        &self,
        inner: &mut Inner<R>,
        event: LifecycleEventKind,
    ) -> Result<ResourceState, CoordinatorError> {
        inner.reject_if_cleaned_up("lifecycle event")?;
        let next = inner.state.apply(event).map_err(|e| {
            tracing::error!(coordinator = %self.config.name, error = %e, "lifecycle precondition violated");
            e
        })?;
        Ok(std::mem::replace(&mut inner.state, next))
    }

    // === Lifecycle events ===

    /// Apply one host lifecycle event
    pub fn handle(&self, event: LifecycleEvent<R>) -> Result<(), CoordinatorError> {
        match event {
            LifecycleEvent::Attached(resource) => self.attach(&resource),
            LifecycleEvent::Activated => self.activate().map(|_| ()),
            LifecycleEvent::Deactivated => self.deactivate(),
            LifecycleEvent::Detached => self.detach(),
        }
    }

    /// A resource instance is available but not yet active
    ///
    /// Only a weak reference is kept; the host keeps ownership.
    pub fn attach(&self, resource: &Arc<R>) -> Result<(), CoordinatorError> {
        let _event = self.shared.lock_events();
        {
            let mut inner = self.shared.lock();
            let previous = self.transition(&mut inner, LifecycleEventKind::Attach)?;
            inner.resource = Some(Arc::downgrade(resource));
            tracing::debug!(coordinator = %self.config.name, from = %previous, "resource attached");
        }
        self.hooks.on_attached(resource);
        Ok(())
    }

    /// The attached resource became eligible for interaction
    ///
    /// Resumes parked waits (oldest first), then replays sticky entries if
    /// the resource was detached since the last replay.
    pub fn activate(&self) -> Result<ActivationReport, CoordinatorError> {
        let _event = self.shared.lock_events();
        let (resource, drain, mut pass) = {
            let mut inner = self.shared.lock();
            self.transition(&mut inner, LifecycleEventKind::Activate)?;

            let Some(resource) = inner.live_resource() else {
                tracing::warn!(
                    coordinator = %self.config.name,
                    pending_waits = inner.waits.len(),
                    "activated but the resource is gone, waits stay parked"
                );
                return Ok(ActivationReport::default());
            };

            let drain = inner.waits.notify_activated(&resource);
            let pass = if inner.must_replay {
                inner.must_replay = false;
                Some(inner.sticky.replay_pass())
            } else {
                None
            };
            (resource, drain, pass)
        };

        if !drain.resumed.is_empty() || !drain.abandoned.is_empty() {
            tracing::debug!(
                coordinator = %self.config.name,
                resumed = drain.resumed.len(),
                abandoned = drain.abandoned.len(),
                "resumed parked waits"
            );
        }
        if self.config.is_slow_wait(drain.longest_wait) {
            tracing::warn!(
                coordinator = %self.config.name,
                waited_ms = drain.longest_wait.as_millis() as u64,
                "waited a long time for the resource"
            );
        }

        let mut replayed = Vec::new();
        while let Some(pass) = pass.as_mut() {
            let next = {
                let inner = self.shared.lock();
                // A block may have cleaned the coordinator up
                if !inner.is_active_with(&resource) {
                    tracing::info!(
                        coordinator = %self.config.name,
                        skipped = pass.remaining(),
                        "sticky replay interrupted"
                    );
                    break;
                }
                pass.next_entry(&inner.sticky)
            };
            let Some((id, block)) = next else {
                break;
            };
            block(&resource, &id);
            replayed.push(id);
        }
        if !replayed.is_empty() {
            tracing::info!(coordinator = %self.config.name, count = replayed.len(), "replayed sticky entries");
        }

        Ok(ActivationReport { drain, replayed })
    }

    /// The resource is still attached but no longer eligible
    pub fn deactivate(&self) -> Result<(), CoordinatorError> {
        let _event = self.shared.lock_events();
        let mut inner = self.shared.lock();
        self.transition(&mut inner, LifecycleEventKind::Deactivate)?;
        tracing::debug!(coordinator = %self.config.name, "resource deactivated");
        Ok(())
    }

    /// The resource instance was destroyed
    ///
    /// Parked waits stay queued for the next activation, whichever instance
    /// it comes from. Sticky entries will replay on that activation.
    pub fn detach(&self) -> Result<(), CoordinatorError> {
        let _event = self.shared.lock_events();
        let mut inner = self.shared.lock();
        let previous = self.transition(&mut inner, LifecycleEventKind::Detach)?;
        inner.resource = None;
        inner.must_replay = true;
        tracing::debug!(
            coordinator = %self.config.name,
            from = %previous,
            pending_waits = inner.waits.len(),
            sticky = inner.sticky.len(),
            "resource detached"
        );
        Ok(())
    }

    // === Waiting for the resource ===

    /// The active resource, waiting for the next activation if there is none
    ///
    /// There is no timeout. Dropping the returned future (for example by
    /// cancelling the job awaiting it) deregisters the wait.
    pub async fn resource(&self) -> Result<Arc<R>, CoordinatorError> {
        let (id, rx) = {
            let mut inner = self.shared.lock();
            inner.reject_if_cleaned_up("resource")?;
            if let Some(resource) = inner.active_resource() {
                return Ok(resource);
            }
            inner.waits.park()
        };

        tracing::debug!(coordinator = %self.config.name, wait_id = %id, "waiting for active resource");
        let _parked = ParkedWait {
            shared: Arc::clone(&self.shared),
            id,
        };
        rx.await.map_err(|_| CoordinatorError::Cancelled)
    }

    /// Like [`resource`](Self::resource), giving up after `timeout`
    pub async fn resource_within(&self, timeout: Duration) -> Result<Arc<R>, CoordinatorError> {
        tokio::time::timeout(timeout, self.resource())
            .await
            .map_err(|_| CoordinatorError::WaitTimedOut(timeout))?
    }

    // === Sticky entries ===

    /// Register a block to replay on every activation that follows a detach
    ///
    /// The block is not invoked now. Returns whether an entry with the same
    /// id was replaced. The block runs while `activate` holds the lifecycle
    /// event lock and must not call `attach`, `activate`, `deactivate` or
    /// `detach` on this coordinator.
    pub fn register_sticky<F>(&self, id: impl Into<StickyId>, block: F) -> Result<bool, CoordinatorError>
    where
        F: Fn(&Arc<R>, &StickyId) + Send + Sync + 'static,
    {
        self.insert_sticky(id.into(), Arc::new(block))
    }

    fn insert_sticky(&self, id: StickyId, block: StickyBlock<Arc<R>>) -> Result<bool, CoordinatorError> {
        let mut inner = self.shared.lock();
        inner.reject_if_cleaned_up("register_sticky")?;
        tracing::debug!(coordinator = %self.config.name, sticky_id = %id, "sticky entry registered");
        Ok(inner.sticky.register(id, block))
    }

    /// Remove a sticky entry; returns whether it was registered
    pub fn remove_sticky(&self, id: &StickyId) -> bool {
        let removed = self.shared.lock().sticky.remove(id);
        if removed {
            tracing::debug!(coordinator = %self.config.name, sticky_id = %id, "sticky entry removed");
        }
        removed
    }

    /// Run `block` against the resource now and again after every
    /// recreation, until the block resumes its continuation
    ///
    /// Resolves with the value passed to [`StickyContinuation::resume`].
    /// Dropping the returned future removes the sticky entry. The same
    /// lifecycle-event restriction as [`register_sticky`](Self::register_sticky)
    /// applies to `block`.
    pub async fn sticky<V, F>(&self, block: F) -> Result<V, CoordinatorError>
    where
        V: Send + 'static,
        F: Fn(&Arc<R>, &StickyContinuation<V>) + Send + Sync + 'static,
    {
        let block = Arc::new(block);
        loop {
            let resource = self.resource().await?;
            // The resource may have gone away again before this task ran
            if let Some((rx, _registered)) = self.show_sticky(&resource, &block)? {
                drop(resource);
                return rx.await.map_err(|_| CoordinatorError::Cancelled);
            }
        }
    }

    /// Register and invoke a sticky operation's block against `resource`,
    /// unless `resource` stopped being the active instance
    fn show_sticky<V, F>(
        &self,
        resource: &Arc<R>,
        block: &Arc<F>,
    ) -> Result<Option<(oneshot::Receiver<V>, RegisteredSticky<R>)>, CoordinatorError>
    where
        V: Send + 'static,
        F: Fn(&Arc<R>, &StickyContinuation<V>) + Send + Sync + 'static,
    {
        let _event = self.shared.lock_events();
        if !self.shared.lock().is_active_with(resource) {
            return Ok(None);
        }

        let id = self.id_gen.next_id();
        let (tx, rx) = oneshot::channel();
        let weak = Arc::downgrade(&self.shared);
        let continuation = StickyContinuation::new(
            id.clone(),
            tx,
            Arc::new(move |id: &StickyId| {
                weak.upgrade()
                    .is_some_and(|shared| shared.lock().sticky.remove(id))
            }),
        );

        let entry: StickyBlock<Arc<R>> = {
            let block = Arc::clone(block);
            let continuation = continuation.clone();
            Arc::new(move |resource: &Arc<R>, _: &StickyId| block(resource, &continuation))
        };
        self.insert_sticky(id.clone(), entry)?;
        let registered = RegisteredSticky {
            shared: Arc::downgrade(&self.shared),
            id,
        };

        block(resource, &continuation);
        Ok(Some((rx, registered)))
    }

    // === Jobs ===

    fn unless_cleaned_up<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce() -> T,
    ) -> Result<T, CoordinatorError> {
        let inner = self.shared.lock();
        inner.reject_if_cleaned_up(operation)?;
        Ok(f())
    }

    /// Launch a tracked job; it is cancelled by [`cleanup`](Self::cleanup)
    pub fn launch<F>(&self, future: F) -> Result<JobHandle<F::Output>, CoordinatorError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.unless_cleaned_up("launch", || self.jobs.launch(future))
    }

    /// Launch a tracked fallible job; an `Err` is logged and handed to `on_error`
    pub fn launch_catching<F, E, H>(&self, future: F, on_error: H) -> Result<JobHandle<()>, CoordinatorError>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
        H: FnOnce(E) + Send + 'static,
    {
        self.unless_cleaned_up("launch", || self.jobs.launch_catching(future, on_error))
    }

    /// Launch a tracked fallible job with both an error handler and a
    /// `finally` hook; see [`JobRegistry::launch_catching_finally`]
    pub fn launch_catching_finally<F, E, H, G>(
        &self,
        future: F,
        on_error: H,
        finally: G,
    ) -> Result<JobHandle<()>, CoordinatorError>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
        H: FnOnce(E) + Send + 'static,
        G: FnOnce(JobExit) + Send + 'static,
    {
        self.unless_cleaned_up("launch", || self.jobs.launch_catching_finally(future, on_error, finally))
    }

    /// Launch a tracked job whose `finally` hook runs however it ends
    pub fn launch_finally<F, G>(&self, future: F, finally: G) -> Result<JobHandle<F::Output>, CoordinatorError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        G: FnOnce(JobExit) + Send + 'static,
    {
        self.unless_cleaned_up("launch", || self.jobs.launch_finally(future, finally))
    }

    // === Teardown ===

    /// Tear the coordinator down
    ///
    /// Cancels every tracked job (most recent first), releases parked waits
    /// as cancelled and drops sticky entries, reporting them as dangling.
    /// Later calls to `launch*`, `resource`, `sticky`, `register_sticky` and
    /// lifecycle events fail with [`CoordinatorError::PostCleanup`]. Calling
    /// it again returns an empty report.
    pub fn cleanup(&self) -> CleanupReport {
        {
            let mut inner = self.shared.lock();
            if inner.cleaned_up {
                return CleanupReport::default();
            }
            inner.cleaned_up = true;
        }

        let cancelled_jobs = self.jobs.cancel_all();

        let (released_waits, mut sticky) = {
            let mut inner = self.shared.lock();
            inner.resource = None;
            inner.state = ResourceState::Detached;
            (inner.waits.release_all(), std::mem::take(&mut inner.sticky))
        };
        // Blocks are dropped here, outside the lock
        let mut dangling_sticky = sticky.drain();
        dangling_sticky.sort();

        if self.config.warn_on_dangling_sticky {
            for id in &dangling_sticky {
                tracing::warn!(coordinator = %self.config.name, sticky_id = %id, "sticky entry was never removed");
            }
        }

        let report = CleanupReport {
            cancelled_jobs,
            released_waits,
            dangling_sticky,
        };
        tracing::info!(
            coordinator = %self.config.name,
            cancelled_jobs = report.cancelled_jobs.len(),
            released_waits = report.released_waits,
            dangling_sticky = report.dangling_sticky.len(),
            "coordinator cleaned up"
        );

        self.hooks.on_cleanup(&report);
        report
    }

    // === Introspection ===

    pub fn state(&self) -> ResourceState {
        self.shared.lock().state
    }

    pub fn pending_waits(&self) -> usize {
        self.shared.lock().waits.len()
    }

    /// Registered sticky ids, sorted
    pub fn sticky_ids(&self) -> Vec<StickyId> {
        let mut ids = self.shared.lock().sticky.ids();
        ids.sort();
        ids
    }

    pub fn must_replay(&self) -> bool {
        self.shared.lock().must_replay
    }

    pub fn tracked_jobs(&self) -> usize {
        self.jobs.len()
    }

    pub fn tracked_job_ids(&self) -> Vec<JobId> {
        self.jobs.ids()
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.shared.lock().cleaned_up
    }
}

impl<R, I: IdGen> fmt::Debug for LifecycleCoordinator<R, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("LifecycleCoordinator")
            .field("name", &self.config.name)
            .field("state", &inner.state)
            .field("pending_waits", &inner.waits.len())
            .field("sticky", &inner.sticky.len())
            .field("must_replay", &inner.must_replay)
            .field("cleaned_up", &inner.cleaned_up)
            .finish()
    }
}

/// Deregisters a parked wait when the waiting future goes away
struct ParkedWait<R> {
    shared: Arc<Shared<R>>,
    id: WaitId,
}

impl<R> Drop for ParkedWait<R> {
    fn drop(&mut self) {
        self.shared.lock().waits.cancel(self.id);
    }
}

/// Removes a sticky entry when its `sticky()` future goes away
struct RegisteredSticky<R> {
    shared: Weak<Shared<R>>,
    id: StickyId,
}

impl<R> Drop for RegisteredSticky<R> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().sticky.remove(&self.id);
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
