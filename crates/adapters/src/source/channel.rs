// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle events delivered over a bounded tokio channel

use super::{LifecycleSource, SourceError};
use async_trait::async_trait;
use lg_core::LifecycleEvent;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Create a connected host handle and source
///
/// # Panics
///
/// Panics if `capacity` is zero, like [`mpsc::channel`].
pub fn channel<R: Send + Sync + 'static>(capacity: usize) -> (HostHandle<R>, ChannelSource<R>) {
    let (tx, rx) = mpsc::channel(capacity);
    (HostHandle { tx }, ChannelSource { rx })
}

/// The host's side: reports lifecycle changes of its resource
pub struct HostHandle<R> {
    tx: mpsc::Sender<LifecycleEvent<R>>,
}

impl<R> Clone for HostHandle<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<R: Send + Sync + 'static> HostHandle<R> {
    pub async fn send(&self, event: LifecycleEvent<R>) -> Result<(), SourceError> {
        self.tx.send(event).await.map_err(|_| SourceError::Closed)
    }

    pub async fn attach(&self, resource: Arc<R>) -> Result<(), SourceError> {
        self.send(LifecycleEvent::Attached(resource)).await
    }

    pub async fn activate(&self) -> Result<(), SourceError> {
        self.send(LifecycleEvent::Activated).await
    }

    pub async fn deactivate(&self) -> Result<(), SourceError> {
        self.send(LifecycleEvent::Deactivated).await
    }

    pub async fn detach(&self) -> Result<(), SourceError> {
        self.send(LifecycleEvent::Detached).await
    }

    /// Whether the receiving source was dropped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving side; ends once every [`HostHandle`] is dropped
pub struct ChannelSource<R> {
    rx: mpsc::Receiver<LifecycleEvent<R>>,
}

#[async_trait]
impl<R: Send + Sync + 'static> LifecycleSource<R> for ChannelSource<R> {
    async fn next_event(&mut self) -> Option<LifecycleEvent<R>> {
        self.rx.recv().await
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
