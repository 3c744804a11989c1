// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identities for sticky operations started with
//! [`LifecycleCoordinator::sticky`](crate::LifecycleCoordinator::sticky)

use crate::sticky::StickyId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of fresh sticky ids
pub trait IdGen: Clone + Send + Sync + 'static {
    /// An id distinct from every id this generator (or a clone of it) issued before
    fn next_id(&self) -> StickyId;
}

/// Random v4 UUIDs
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next_id(&self) -> StickyId {
        StickyId(uuid::Uuid::new_v4().hyphenated().to_string())
    }
}

/// Deterministic `<prefix>-<n>` ids, starting at 1
///
/// Clones share the counter.
#[derive(Clone, Debug)]
pub struct SequentialIdGen {
    prefix: Arc<str>,
    issued: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<Arc<str>>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// How many ids have been handed out
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("sticky")
    }
}

impl IdGen for SequentialIdGen {
    fn next_id(&self) -> StickyId {
        let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        StickyId(format!("{}-{n}", self.prefix))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
