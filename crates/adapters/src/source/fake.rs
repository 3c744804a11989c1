// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted sources and recording hooks for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::LifecycleSource;
use async_trait::async_trait;
use lg_core::{CleanupReport, LifecycleEvent, LifecycleHooks};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Plays a fixed list of events, then ends
pub struct ScriptedSource<R> {
    events: VecDeque<LifecycleEvent<R>>,
}

impl<R> ScriptedSource<R> {
    pub fn new(events: impl IntoIterator<Item = LifecycleEvent<R>>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Events not yet delivered
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl<R: Send + Sync + 'static> LifecycleSource<R> for ScriptedSource<R> {
    async fn next_event(&mut self) -> Option<LifecycleEvent<R>> {
        self.events.pop_front()
    }
}

/// Recorded hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Attached,
    Cleanup(CleanupReport),
}

/// Hooks that record every call; clones share the record
#[derive(Clone, Default)]
pub struct RecordingHooks {
    calls: Arc<Mutex<Vec<HookCall>>>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, call: HookCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

impl<R> LifecycleHooks<R> for RecordingHooks {
    fn on_attached(&self, _resource: &Arc<R>) {
        self.record(HookCall::Attached);
    }

    fn on_cleanup(&self, report: &CleanupReport) {
        self.record(HookCall::Cleanup(report.clone()));
    }
}

/// Fails the test if cleanup found sticky entries that were never removed
#[track_caller]
pub fn assert_no_dangling_sticky(report: &CleanupReport) {
    assert!(
        report.dangling_sticky.is_empty(),
        "sticky entries were never removed: {:?}",
        report.dangling_sticky
    );
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
