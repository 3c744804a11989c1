// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource state machine
//!
//! The host owns the resource and reports its lifecycle through four events.
//! This module validates those events against the current state; the
//! coordinator applies the side effects.

use crate::error::CoordinatorError;
use std::fmt;
use std::sync::Arc;

/// Availability of the externally-owned resource
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// No resource reference held
    #[default]
    Detached,
    /// Resource held but not eligible for interaction (e.g. backgrounded)
    AttachedInactive,
    /// Resource held and eligible for interaction
    AttachedActive,
}

impl ResourceState {
    pub fn is_attached(&self) -> bool {
        !matches!(self, ResourceState::Detached)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ResourceState::AttachedActive)
    }

    /// Pure transition function
    ///
    /// Returns the next state, or a precondition violation if the host
    /// delivered the event out of order.
    pub fn apply(self, event: LifecycleEventKind) -> Result<ResourceState, CoordinatorError> {
        use LifecycleEventKind::*;
        use ResourceState::*;

        match (self, event) {
            (Detached | AttachedInactive, Attach) => Ok(AttachedInactive),
            (AttachedInactive, Activate) => Ok(AttachedActive),
            (AttachedActive, Deactivate) => Ok(AttachedInactive),
            (_, Detach) => Ok(Detached),
            (state, event) => Err(CoordinatorError::PreconditionViolation { state, event }),
        }
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceState::Detached => "detached",
            ResourceState::AttachedInactive => "attached-inactive",
            ResourceState::AttachedActive => "attached-active",
        };
        f.write_str(name)
    }
}

/// Discriminant of a [`LifecycleEvent`], used in errors and logs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    Attach,
    Activate,
    Deactivate,
    Detach,
}

impl fmt::Display for LifecycleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleEventKind::Attach => "attach",
            LifecycleEventKind::Activate => "activate",
            LifecycleEventKind::Deactivate => "deactivate",
            LifecycleEventKind::Detach => "detach",
        };
        f.write_str(name)
    }
}

/// A lifecycle event delivered by the host
pub enum LifecycleEvent<R> {
    /// A (possibly new) resource instance is available but not yet active
    Attached(Arc<R>),
    Activated,
    Deactivated,
    /// The resource instance was destroyed
    Detached,
}

impl<R> LifecycleEvent<R> {
    pub fn kind(&self) -> LifecycleEventKind {
        match self {
            LifecycleEvent::Attached(_) => LifecycleEventKind::Attach,
            LifecycleEvent::Activated => LifecycleEventKind::Activate,
            LifecycleEvent::Deactivated => LifecycleEventKind::Deactivate,
            LifecycleEvent::Detached => LifecycleEventKind::Detach,
        }
    }
}

impl<R> Clone for LifecycleEvent<R> {
    fn clone(&self) -> Self {
        match self {
            LifecycleEvent::Attached(resource) => LifecycleEvent::Attached(Arc::clone(resource)),
            LifecycleEvent::Activated => LifecycleEvent::Activated,
            LifecycleEvent::Deactivated => LifecycleEvent::Deactivated,
            LifecycleEvent::Detached => LifecycleEvent::Detached,
        }
    }
}

impl<R> fmt::Debug for LifecycleEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LifecycleEvent::{}", self.kind())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
