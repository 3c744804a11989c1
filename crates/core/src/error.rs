// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the coordinator and its job registry

use crate::jobs::JobId;
use crate::state::{LifecycleEventKind, ResourceState};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`LifecycleCoordinator`](crate::LifecycleCoordinator) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The host delivered a lifecycle event that is not valid in the current state.
    /// This is a programmer error on the host side; the state is left untouched.
    #[error("lifecycle event '{event}' is not valid while the resource is {state}")]
    PreconditionViolation {
        state: ResourceState,
        event: LifecycleEventKind,
    },
    /// The waiting operation was released without a resource
    #[error("operation cancelled")]
    Cancelled,
    /// The coordinator was already cleaned up
    #[error("{operation} called after cleanup")]
    PostCleanup { operation: &'static str },
    /// A bounded wait for the resource expired
    #[error("resource did not become active within {0:?}")]
    WaitTimedOut(Duration),
}

/// Errors observed when joining a launched job
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("job {0} was cancelled")]
    Cancelled(JobId),
    #[error("job {id} panicked: {message}")]
    Panicked { id: JobId, message: String },
}

impl JobError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, JobError::Cancelled(_))
    }
}
