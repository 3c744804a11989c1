// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sticky continuations
//!
//! A sticky entry is replayed every time the resource comes back after it
//! was destroyed, until whoever registered it removes it. Typical use: a
//! confirmation prompt that must be shown again on every new resource
//! instance until the user answers it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Identity of a sticky entry
///
/// Two registrations with equal ids are the same entry; the later one
/// replaces the earlier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StickyId(pub String);

impl StickyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for StickyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StickyId {
    fn from(s: &str) -> Self {
        StickyId(s.to_string())
    }
}

impl From<String> for StickyId {
    fn from(s: String) -> Self {
        StickyId(s)
    }
}

/// Block invoked with the resource and the entry's own id on every replay
pub type StickyBlock<T> = Arc<dyn Fn(&T, &StickyId) + Send + Sync>;

/// Identity-keyed registry of sticky entries
///
/// Replay order across entries is unspecified.
pub struct StickyRegistry<T> {
    entries: HashMap<StickyId, StickyBlock<T>>,
}

impl<T> Default for StickyRegistry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> StickyRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry without invoking it; returns whether an entry with the
    /// same id was replaced
    pub fn register(&mut self, id: StickyId, block: StickyBlock<T>) -> bool {
        self.entries.insert(id, block).is_some()
    }

    /// Remove an entry; returns whether it was present
    pub fn remove(&mut self, id: &StickyId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn contains(&self, id: &StickyId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &StickyId) -> Option<StickyBlock<T>> {
        self.entries.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<StickyId> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start a replay pass over the entries registered now
    pub fn replay_pass(&self) -> ReplayPass {
        ReplayPass {
            pending: self.ids().into_iter(),
        }
    }

    /// Remove all entries, returning their ids
    pub fn drain(&mut self) -> Vec<StickyId> {
        self.entries.drain().map(|(id, _)| id).collect()
    }
}

/// Cursor over the ids snapshotted by [`StickyRegistry::replay_pass`]
///
/// The registry is not borrowed between steps, so blocks may register and
/// remove entries while the pass is running.
#[derive(Debug)]
pub struct ReplayPass {
    pending: std::vec::IntoIter<StickyId>,
}

impl ReplayPass {
    /// The next snapshotted entry that is still registered in `registry`
    ///
    /// Entries removed since the pass started are skipped. Entries registered
    /// since then wait for the next pass.
    pub fn next_entry<T>(&mut self, registry: &StickyRegistry<T>) -> Option<(StickyId, StickyBlock<T>)> {
        self.pending
            .by_ref()
            .find_map(|id| registry.get(&id).map(|block| (id, block)))
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

type Remover = Arc<dyn Fn(&StickyId) -> bool + Send + Sync>;

/// Completion side of a sticky operation started with
/// [`LifecycleCoordinator::sticky`](crate::LifecycleCoordinator::sticky)
///
/// Every replay of the sticky block receives a clone of the same
/// continuation. The first [`resume`](Self::resume) removes the entry and
/// delivers the value; later calls are ignored.
pub struct StickyContinuation<V> {
    id: StickyId,
    resume: Arc<Mutex<Option<oneshot::Sender<V>>>>,
    remove: Remover,
}

impl<V> Clone for StickyContinuation<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            resume: Arc::clone(&self.resume),
            remove: Arc::clone(&self.remove),
        }
    }
}

impl<V> StickyContinuation<V> {
    pub(crate) fn new(id: StickyId, resume: oneshot::Sender<V>, remove: Remover) -> Self {
        Self {
            id,
            resume: Arc::new(Mutex::new(Some(resume))),
            remove,
        }
    }

    pub fn id(&self) -> &StickyId {
        &self.id
    }

    /// Complete the sticky operation with `value`
    ///
    /// Returns `false` if it was already completed.
    pub fn resume(&self, value: V) -> bool {
        let sender = self.resume.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(sender) = sender else {
            return false;
        };

        (self.remove)(&self.id);
        if sender.send(value).is_err() {
            tracing::debug!(sticky_id = %self.id, "sticky operation resumed after its waiter left");
        }
        true
    }

    pub fn is_resumed(&self) -> bool {
        self.resume
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

impl<V> fmt::Debug for StickyContinuation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StickyContinuation")
            .field("id", &self.id)
            .field("resumed", &self.is_resumed())
            .finish()
    }
}

#[cfg(test)]
#[path = "sticky_tests.rs"]
mod tests;
