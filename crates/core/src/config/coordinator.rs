// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator configuration
//!
//! Loaded from TOML, e.g.
//!
//! ```toml
//! name = "checkout-screen"
//! slow_wait_threshold = "5s"
//! warn_on_dangling_sticky = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings for one [`LifecycleCoordinator`](crate::LifecycleCoordinator)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Name recorded on every log line from this coordinator
    pub name: String,
    /// Waits parked longer than this are logged when they resume
    #[serde(with = "humantime_serde")]
    pub slow_wait_threshold: Option<Duration>,
    /// Log sticky entries that were never removed when the coordinator is cleaned up
    pub warn_on_dangling_sticky: bool,
}

impl CoordinatorConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slow_wait_threshold: None,
            warn_on_dangling_sticky: true,
        }
    }

    pub fn with_slow_wait_threshold(mut self, threshold: Duration) -> Self {
        self.slow_wait_threshold = Some(threshold);
        self
    }

    pub fn with_dangling_sticky_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_dangling_sticky = enabled;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Whether a wait of `waited` should be reported as slow
    pub fn is_slow_wait(&self, waited: Duration) -> bool {
        self.slow_wait_threshold
            .is_some_and(|threshold| waited > threshold)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self::new("coordinator")
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
