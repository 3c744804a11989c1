// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pump host events into a coordinator

use super::LifecycleSource;
use lg_core::{CoordinatorError, IdGen, LifecycleCoordinator, LifecycleEvent};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriveError {
    #[error("lifecycle event rejected: {0}")]
    Coordinator(#[from] CoordinatorError),
}

/// Totals for one [`drive`] run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub events: usize,
    pub activations: usize,
    pub resumed_waits: usize,
    pub replayed_sticky: usize,
}

/// Apply every event from `source` to `coordinator` until the source ends
///
/// Stops at the first event the coordinator rejects. Events already applied
/// stay applied.
pub async fn drive<R, I, S>(
    mut source: S,
    coordinator: &LifecycleCoordinator<R, I>,
) -> Result<DriveSummary, DriveError>
where
    R: Send + Sync + 'static,
    I: IdGen,
    S: LifecycleSource<R>,
{
    let mut summary = DriveSummary::default();

    while let Some(event) = source.next_event().await {
        let kind = event.kind();
        let applied = match event {
            LifecycleEvent::Activated => coordinator.activate().map(|report| {
                summary.activations += 1;
                summary.resumed_waits += report.drain.resumed.len();
                summary.replayed_sticky += report.replayed.len();
            }),
            other => coordinator.handle(other),
        };
        if let Err(e) = applied {
            tracing::error!(event = %kind, applied = summary.events, error = %e, "stopping lifecycle pump");
            return Err(e.into());
        }
        summary.events += 1;
    }

    tracing::debug!(events = summary.events, "lifecycle source ended");
    Ok(summary)
}

#[cfg(test)]
#[path = "drive_tests.rs"]
mod tests;
