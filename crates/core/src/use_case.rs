// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background work owned by a domain operation
//!
//! A [`UseCase`] spawns deferred work that is independent of any resource
//! lifecycle, and cancels whatever is still running when its owner goes away.

use crate::error::JobError;
use crate::jobs::{JobHandle, JobId, JobRegistry};
use std::future::Future;

#[derive(Clone, Debug)]
pub struct UseCase {
    name: String,
    jobs: JobRegistry,
}

impl UseCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: JobRegistry::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start `future` and return a handle to its deferred result
    pub fn spawn<F>(&self, future: F) -> JobHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let handle = self.jobs.launch(future);
        tracing::trace!(use_case = %self.name, job_id = %handle.id(), "deferred work started");
        handle
    }

    /// Start `future` and wait for it
    ///
    /// Fails with [`JobError::Cancelled`] if [`cancel_all`](Self::cancel_all)
    /// runs first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, JobError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.spawn(future).join().await
    }

    /// Cancel unfinished work, most recently started first
    pub fn cancel_all(&self) -> Vec<JobId> {
        self.jobs.cancel_all()
    }

    pub fn cleanup(&self) -> Vec<JobId> {
        let cancelled = self.cancel_all();
        tracing::debug!(use_case = %self.name, cancelled = cancelled.len(), "use case cleaned up");
        cancelled
    }

    /// Number of deferred results still being computed
    pub fn pending(&self) -> usize {
        self.jobs.len()
    }
}

#[cfg(test)]
#[path = "use_case_tests.rs"]
mod tests;
