// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host lifecycle event sources

mod channel;
mod drive;

pub use channel::{channel, ChannelSource, HostHandle};
pub use drive::{drive, DriveError, DriveSummary};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{assert_no_dangling_sticky, HookCall, RecordingHooks, ScriptedSource};

use async_trait::async_trait;
use lg_core::LifecycleEvent;
use thiserror::Error;

/// Errors from delivering host events
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("lifecycle source closed")]
    Closed,
}

/// Produces the host's lifecycle events, in the order the host observed them
#[async_trait]
pub trait LifecycleSource<R: Send + Sync + 'static>: Send {
    /// The next event, or `None` once the host is gone
    async fn next_event(&mut self) -> Option<LifecycleEvent<R>>;
}

#[async_trait]
impl<R, S> LifecycleSource<R> for &mut S
where
    R: Send + Sync + 'static,
    S: LifecycleSource<R> + ?Sized,
{
    async fn next_event(&mut self) -> Option<LifecycleEvent<R>> {
        (**self).next_event().await
    }
}
