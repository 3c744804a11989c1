//! Shared fixtures for the behavioral specs

#![allow(dead_code, unused_imports)]

pub use lg_adapters::{
    assert_no_dangling_sticky, channel, drive, DriveError, HookCall, RecordingHooks,
    ScriptedSource,
};
pub use lg_core::{
    ActivationReport, CleanupReport, CoordinatorConfig, CoordinatorError, JobError, JobExit, LifecycleCoordinator,
    LifecycleEvent, ResourceState, SequentialIdGen, StickyContinuation, StickyId, UseCase,
};
pub use std::sync::{Arc, Mutex};

/// The resource a host hands to the coordinator
#[derive(Debug, PartialEq, Eq)]
pub struct Screen(pub String);

pub type Coordinator = LifecycleCoordinator<Screen, SequentialIdGen>;

/// Ordered record of what scheduled work observed
#[derive(Clone, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A host that owns one screen at a time and reports its lifecycle
pub struct Host {
    pub coordinator: Coordinator,
    screen: Option<Arc<Screen>>,
    hooks: RecordingHooks,
}

impl Host {
    pub fn new() -> Self {
        Self::with_config(CoordinatorConfig::new("spec"))
    }

    pub fn with_config(config: CoordinatorConfig) -> Self {
        let hooks = RecordingHooks::new();
        let coordinator =
            LifecycleCoordinator::with_id_gen(config, SequentialIdGen::default()).with_hooks(hooks.clone());
        Self {
            coordinator,
            screen: None,
            hooks,
        }
    }

    /// Create a screen named `name`, attach it and bring it to the front
    pub fn show(&mut self, name: &str) -> ActivationReport {
        let screen = Arc::new(Screen(name.to_string()));
        self.coordinator.attach(&screen).unwrap();
        self.screen = Some(screen);
        self.coordinator.activate().unwrap()
    }

    /// Move the current screen to the background
    pub fn hide(&self) {
        self.coordinator.deactivate().unwrap();
    }

    /// Bring the current screen back to the front
    pub fn resume(&self) -> ActivationReport {
        self.coordinator.activate().unwrap()
    }

    /// Destroy the current screen
    pub fn destroy(&mut self) {
        if self.coordinator.state().is_active() {
            self.hide();
        }
        self.coordinator.detach().unwrap();
        self.screen = None;
    }

    /// Destroy the current screen and show a new one
    pub fn recreate(&mut self, name: &str) -> ActivationReport {
        self.destroy();
        self.show(name)
    }

    pub fn screen(&self) -> Option<Arc<Screen>> {
        self.screen.clone()
    }

    pub fn hook_calls(&self) -> Vec<HookCall> {
        self.hooks.calls()
    }

    /// Yield until `count` waits are parked on the coordinator
    pub async fn until_parked(&self, count: usize) {
        while self.coordinator.pending_waits() < count {
            tokio::task::yield_now().await;
        }
    }
}
