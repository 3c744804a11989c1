//! Host driving specs
//!
//! Verify that a host reporting lifecycle events over a channel drives the
//! coordinator, and that out-of-order events stop the pump.

use crate::prelude::*;

#[tokio::test]
async fn a_live_host_resumes_waiting_work() {
    let host = Host::new();
    let (handle, source) = channel::<Screen>(8);
    let pump = {
        let coordinator = host.coordinator.clone();
        tokio::spawn(async move { drive(source, &coordinator).await })
    };

    let waiter = {
        let coordinator = host.coordinator.clone();
        tokio::spawn(async move { coordinator.resource().await.map(|s| s.0.clone()) })
    };
    host.until_parked(1).await;

    let screen = Arc::new(Screen("home".to_string()));
    handle.attach(Arc::clone(&screen)).await.unwrap();
    handle.activate().await.unwrap();

    assert_eq!(waiter.await.unwrap(), Ok("home".to_string()));

    drop(handle);
    let summary = pump.await.unwrap().unwrap();
    assert_eq!(summary.events, 2);
    assert_eq!(summary.resumed_waits, 1);
}

#[tokio::test]
async fn scripted_recreation_replays_sticky_work() {
    let host = Host::new();
    let log = Log::default();
    {
        let log = log.clone();
        host.coordinator
            .register_sticky("toast", move |screen: &Arc<Screen>, _: &StickyId| {
                log.push(screen.0.clone())
            })
            .unwrap();
    }
    let first = Arc::new(Screen("first".to_string()));
    let second = Arc::new(Screen("second".to_string()));

    let summary = drive(
        ScriptedSource::new([
            LifecycleEvent::Attached(Arc::clone(&first)),
            LifecycleEvent::Activated,
            LifecycleEvent::Deactivated,
            LifecycleEvent::Detached,
            LifecycleEvent::Attached(Arc::clone(&second)),
            LifecycleEvent::Activated,
        ]),
        &host.coordinator,
    )
    .await
    .unwrap();

    assert_eq!(summary.activations, 2);
    assert_eq!(summary.replayed_sticky, 1);
    assert_eq!(log.entries(), vec!["second"]);
}

#[tokio::test]
async fn out_of_order_events_stop_the_pump() {
    let host = Host::new();
    let screen = Arc::new(Screen("main".to_string()));
    let mut source = ScriptedSource::new([
        LifecycleEvent::Attached(Arc::clone(&screen)),
        LifecycleEvent::Deactivated,
        LifecycleEvent::Activated,
    ]);

    let err = drive(&mut source, &host.coordinator).await.unwrap_err();

    assert!(matches!(
        err,
        DriveError::Coordinator(CoordinatorError::PreconditionViolation { .. })
    ));
    assert_eq!(source.remaining(), 1);
    assert_eq!(host.coordinator.state(), ResourceState::AttachedInactive);
}

#[tokio::test]
async fn hooks_see_every_attached_screen() {
    let mut host = Host::new();

    host.show("one");
    host.recreate("two");

    assert_eq!(host.hook_calls(), vec![HookCall::Attached, HookCall::Attached]);
}
