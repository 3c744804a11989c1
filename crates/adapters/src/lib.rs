// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters between a host's lifecycle events and a coordinator

pub mod source;
pub mod traced;

pub use source::{
    channel, drive, ChannelSource, DriveError, DriveSummary, HostHandle, LifecycleSource,
    SourceError,
};
pub use traced::{TracedHooks, TracedSource};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use source::{assert_no_dangling_sticky, HookCall, RecordingHooks, ScriptedSource};
