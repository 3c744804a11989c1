//! Wait ordering specs
//!
//! Verify that work waiting for the resource resumes once, in the order it
//! started waiting, and only when the resource is active.

use crate::prelude::*;

#[tokio::test]
async fn waits_started_before_the_screen_exists_resume_in_order() {
    let mut host = Host::new();
    let log = Log::default();

    let mut waiters = Vec::new();
    for (parked, label) in ["A", "B"].into_iter().enumerate() {
        let coordinator = host.coordinator.clone();
        let log = log.clone();
        waiters.push(tokio::spawn(async move {
            let screen = coordinator.resource().await.unwrap();
            log.push(format!("{label} saw {}", screen.0));
        }));
        host.until_parked(parked + 1).await;
    }

    host.show("R");
    for waiter in waiters {
        waiter.await.unwrap();
    }

    assert_eq!(log.entries(), vec!["A saw R", "B saw R"]);
    assert_eq!(host.coordinator.pending_waits(), 0);
}

#[tokio::test]
async fn waits_started_in_the_background_resume_when_the_screen_returns() {
    let mut host = Host::new();
    host.show("main");
    host.hide();

    let coordinator = host.coordinator.clone();
    let waiter = tokio::spawn(async move { coordinator.resource().await.map(|s| s.0.clone()) });
    host.until_parked(1).await;
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    let report = host.resume();

    assert_eq!(report.drain.resumed.len(), 1);
    assert_eq!(waiter.await.unwrap(), Ok("main".to_string()));
}

#[tokio::test]
async fn a_wait_is_not_resumed_twice() {
    let mut host = Host::new();
    let coordinator = host.coordinator.clone();
    let waiter = tokio::spawn(async move { coordinator.resource().await });
    host.until_parked(1).await;

    let first = host.show("one");
    host.hide();
    let second = host.resume();

    assert_eq!(first.drain.resumed.len(), 1);
    assert!(second.drain.resumed.is_empty());
    assert!(waiter.await.unwrap().is_ok());
}

#[tokio::test]
async fn abandoned_waits_do_not_block_the_rest() {
    let mut host = Host::new();

    let abandoned = {
        let coordinator = host.coordinator.clone();
        tokio::spawn(async move { coordinator.resource().await })
    };
    host.until_parked(1).await;
    let kept = {
        let coordinator = host.coordinator.clone();
        tokio::spawn(async move { coordinator.resource().await })
    };
    host.until_parked(2).await;

    abandoned.abort();
    let _ = abandoned.await;
    assert_eq!(host.coordinator.pending_waits(), 1);

    host.show("R");
    assert_eq!(kept.await.unwrap().unwrap().0, "R");
}

#[tokio::test]
async fn bounded_waits_give_up() {
    let host = Host::new();

    let result = host
        .coordinator
        .resource_within(std::time::Duration::from_millis(10))
        .await;

    assert!(matches!(result, Err(CoordinatorError::WaitTimedOut(_))));
    assert_eq!(host.coordinator.pending_waits(), 0);
}
