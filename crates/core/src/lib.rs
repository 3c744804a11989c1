// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lg-core: lifecycle-gated continuations
//!
//! This crate provides:
//! - A pure state machine for a host-owned resource's lifecycle
//! - A coordinator that parks work until the resource is active, replays
//!   sticky work after the resource is recreated, and cancels tracked jobs
//!   on teardown
//! - Job tracking with bulk cancellation, for coordinators and use cases
//! - TOML configuration

pub mod config;
pub mod continuation;
pub mod coordinator;
pub mod error;
pub mod hooks;
pub mod id;
pub mod jobs;
pub mod state;
pub mod sticky;
pub mod use_case;

pub use config::{ConfigError, CoordinatorConfig};
pub use continuation::{ContinuationQueue, DrainReport, WaitId};
pub use coordinator::{ActivationReport, CleanupReport, LifecycleCoordinator};
pub use error::{CoordinatorError, JobError};
pub use hooks::{LifecycleHooks, NoopHooks};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use jobs::{JobExit, JobHandle, JobId, JobRegistry};
pub use state::{LifecycleEvent, LifecycleEventKind, ResourceState};
pub use sticky::{ReplayPass, StickyBlock, StickyContinuation, StickyId, StickyRegistry};
pub use use_case::UseCase;
