// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracked asynchronous jobs
//!
//! Every job launched through a [`JobRegistry`] is recorded until it
//! finishes, panics, or is cancelled, so the owner can cancel everything it
//! started in one call when it is torn down.

use crate::error::JobError;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::oneshot;
use tokio::task::{AbortHandle, JoinError, JoinHandle};

/// Identifier of a launched job, unique within its registry
///
/// Ids increase with launch order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// How a job launched with [`JobRegistry::launch_finally`] ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobExit {
    Completed,
    Cancelled,
    Panicked,
}

struct TrackedJob {
    id: JobId,
    abort: AbortHandle,
}

#[derive(Default)]
struct Tracked {
    next_id: u64,
    jobs: Vec<TrackedJob>,
}

impl Tracked {
    fn allocate(&mut self) -> JobId {
        self.next_id += 1;
        JobId(self.next_id)
    }

    fn remove(&mut self, id: JobId) -> bool {
        match self.jobs.iter().position(|job| job.id == id) {
            Some(pos) => {
                self.jobs.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Registry of running jobs with bulk cancellation
///
/// Cloning is cheap; clones share the same tracked set.
#[derive(Clone, Default)]
pub struct JobRegistry {
    tracked: Arc<Mutex<Tracked>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.tracked.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn `future` on the tokio runtime and track it until it ends
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, like `tokio::spawn`.
    pub fn launch<F>(&self, future: F) -> JobHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let id = self.lock().allocate();
        let untrack = Untrack {
            tracked: Arc::downgrade(&self.tracked),
            id,
        };
        let (recorded_tx, recorded_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let _untrack = untrack;
            // The body must not finish before the job is recorded
            let _ = recorded_rx.await;
            future.await
        });

        {
            let mut tracked = self.lock();
            tracked.jobs.push(TrackedJob {
                id,
                abort: handle.abort_handle(),
            });
            // Dropped unpolled (runtime shutting down): nothing will untrack it
            if handle.is_finished() {
                tracked.remove(id);
            }
        }
        let _ = recorded_tx.send(());

        tracing::debug!(job_id = %id, "job launched");
        JobHandle { id, handle }
    }

    /// Launch a fallible job; an `Err` is logged and handed to `on_error`
    pub fn launch_catching<F, E, H>(&self, future: F, on_error: H) -> JobHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
        H: FnOnce(E) + Send + 'static,
    {
        self.launch(catching(future, on_error))
    }

    /// Launch a fallible job with both an error handler and a `finally` hook
    ///
    /// `on_error` sees only errors the job returned, and runs before
    /// `finally(JobExit::Completed)`. A cancelled or panicking job skips
    /// `on_error`; `finally` tells it apart with [`JobExit::Cancelled`] and
    /// [`JobExit::Panicked`].
    pub fn launch_catching_finally<F, E, H, G>(&self, future: F, on_error: H, finally: G) -> JobHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
        H: FnOnce(E) + Send + 'static,
        G: FnOnce(JobExit) + Send + 'static,
    {
        self.launch_finally(catching(future, on_error), finally)
    }

    /// Launch a job whose `finally` hook runs exactly once however it ends
    ///
    /// The hook also runs when the job is cancelled before it was first polled.
    pub fn launch_finally<F, G>(&self, future: F, finally: G) -> JobHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
        G: FnOnce(JobExit) + Send + 'static,
    {
        let mut guard = Finally {
            hook: Some(finally),
            completed: false,
        };
        self.launch(async move {
            let output = future.await;
            guard.completed = true;
            drop(guard);
            output
        })
    }

    /// Cancel every tracked job, most recently launched first
    ///
    /// Returns the ids in the order they were cancelled. Jobs launched while
    /// this runs are not affected.
    pub fn cancel_all(&self) -> Vec<JobId> {
        let jobs = std::mem::take(&mut self.lock().jobs);
        let mut cancelled = Vec::with_capacity(jobs.len());

        for job in jobs.into_iter().rev() {
            job.abort.abort();
            tracing::debug!(job_id = %job.id, "job cancelled");
            cancelled.push(job.id);
        }

        if !cancelled.is_empty() {
            tracing::info!(count = cancelled.len(), "cancelled tracked jobs");
        }
        cancelled
    }

    /// Number of jobs that have neither finished nor been cancelled
    pub fn len(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().jobs.is_empty()
    }

    /// Tracked job ids in launch order
    pub fn ids(&self) -> Vec<JobId> {
        self.lock().jobs.iter().map(|job| job.id).collect()
    }
}

impl fmt::Debug for JobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRegistry")
            .field("jobs", &self.ids())
            .finish()
    }
}

async fn catching<F, E, H>(future: F, on_error: H)
where
    F: Future<Output = Result<(), E>>,
    E: fmt::Display,
    H: FnOnce(E),
{
    if let Err(e) = future.await {
        tracing::warn!(error = %e, "job failed");
        on_error(e);
    }
}

/// Removes a job from its registry when the job's future is dropped
struct Untrack {
    tracked: Weak<Mutex<Tracked>>,
    id: JobId,
}

impl Drop for Untrack {
    fn drop(&mut self) {
        if let Some(tracked) = self.tracked.upgrade() {
            tracked
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(self.id);
        }
    }
}

struct Finally<G: FnOnce(JobExit)> {
    hook: Option<G>,
    completed: bool,
}

impl<G: FnOnce(JobExit)> Drop for Finally<G> {
    fn drop(&mut self) {
        if let Some(hook) = self.hook.take() {
            let exit = if self.completed {
                JobExit::Completed
            } else if std::thread::panicking() {
                JobExit::Panicked
            } else {
                JobExit::Cancelled
            };
            hook(exit);
        }
    }
}

/// Handle to one launched job
pub struct JobHandle<T> {
    id: JobId,
    handle: JoinHandle<T>,
}

impl<T> JobHandle<T> {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Request cancellation; a no-op if the job already finished
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job's output
    pub async fn join(self) -> Result<T, JobError> {
        let id = self.id;
        self.handle.await.map_err(|e| {
            if e.is_cancelled() {
                JobError::Cancelled(id)
            } else {
                JobError::Panicked {
                    id,
                    message: panic_message(e),
                }
            }
        })
    }
}

impl<T> fmt::Debug for JobHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("finished", &self.is_finished())
            .finish()
    }
}

fn panic_message(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string()),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
