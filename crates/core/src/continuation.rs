// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot continuations waiting for the resource
//!
//! A parked wait holds the sending half of a oneshot channel. Resuming it
//! sends the value exactly once; the waiter's own code runs later on its own
//! task, never inside the drain.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// Identifier of a parked wait
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaitId(pub u64);

impl fmt::Display for WaitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wait-{}", self.0)
    }
}

/// A single suspended caller waiting for activation
pub struct PendingWait<T> {
    id: WaitId,
    parked_at: Instant,
    resume: oneshot::Sender<T>,
}

impl<T> PendingWait<T> {
    pub fn id(&self) -> WaitId {
        self.id
    }

    /// How long this wait has been parked
    pub fn waited(&self) -> Duration {
        self.parked_at.elapsed()
    }
}

/// Outcome of one drain pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Waits resumed with the value, in resumption order
    pub resumed: Vec<WaitId>,
    /// Waits whose receiver was already gone
    pub abandoned: Vec<WaitId>,
    /// Longest time any drained wait spent parked
    pub longest_wait: Duration,
}

/// FIFO queue of parked waits
pub struct ContinuationQueue<T> {
    next_id: u64,
    waits: VecDeque<PendingWait<T>>,
}

impl<T> Default for ContinuationQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            waits: VecDeque::new(),
        }
    }
}

impl<T: Clone> ContinuationQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a new wait; the receiver completes when the wait is resumed
    /// and errors if the wait is released or cancelled instead
    pub fn park(&mut self) -> (WaitId, oneshot::Receiver<T>) {
        self.next_id += 1;
        let id = WaitId(self.next_id);
        let (resume, rx) = oneshot::channel();
        self.waits.push_back(PendingWait {
            id,
            parked_at: Instant::now(),
            resume,
        });
        (id, rx)
    }

    /// Deregister a parked wait; returns whether it was still queued
    pub fn cancel(&mut self, id: WaitId) -> bool {
        match self.waits.iter().position(|wait| wait.id == id) {
            Some(pos) => {
                self.waits.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Resume every wait queued at call time, oldest first
    ///
    /// Waits parked after this call starts are left for the next activation.
    pub fn notify_activated(&mut self, value: &T) -> DrainReport {
        let waits = std::mem::take(&mut self.waits);
        let mut report = DrainReport::default();

        for wait in waits {
            report.longest_wait = report.longest_wait.max(wait.waited());
            match wait.resume.send(value.clone()) {
                Ok(()) => report.resumed.push(wait.id),
                Err(_) => report.abandoned.push(wait.id),
            }
        }

        report
    }

    /// Drop every parked wait without resuming it; waiters observe cancellation
    pub fn release_all(&mut self) -> usize {
        let released = self.waits.len();
        self.waits.clear();
        released
    }
}

impl<T> ContinuationQueue<T> {
    pub fn len(&self) -> usize {
        self.waits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waits.is_empty()
    }

    /// Parked wait ids, oldest first
    pub fn ids(&self) -> Vec<WaitId> {
        self.waits.iter().map(|wait| wait.id).collect()
    }
}

#[cfg(test)]
#[path = "continuation_tests.rs"]
mod tests;
