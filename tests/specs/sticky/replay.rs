//! Sticky replay specs
//!
//! Verify that sticky work survives the screen being destroyed and
//! recreated, replaying once per recreation until it is removed.

use crate::prelude::*;
use similar_asserts::assert_eq;

fn record_shown(log: &Log) -> impl Fn(&Arc<Screen>, &StickyId) + Send + Sync + 'static {
    let log = log.clone();
    move |screen: &Arc<Screen>, _: &StickyId| log.push(format!("shown on {}", screen.0))
}

#[test]
fn sticky_work_replays_once_after_recreation() {
    let mut host = Host::new();
    let log = Log::default();
    host.coordinator.register_sticky("1", record_shown(&log)).unwrap();

    host.destroy();
    let report = host.show("R");
    assert_eq!(report.replayed, vec![StickyId::new("1")]);
    assert_eq!(log.entries(), vec!["shown on R".to_string()]);

    host.hide();
    let report = host.resume();
    assert_eq!(report.replayed, Vec::<StickyId>::new());
    assert_eq!(log.entries(), vec!["shown on R".to_string()]);
}

#[test]
fn sticky_work_follows_every_new_screen_until_removed() {
    let mut host = Host::new();
    let log = Log::default();
    host.show("first");
    host.coordinator.register_sticky("dialog", record_shown(&log)).unwrap();

    host.recreate("second");
    host.recreate("third");
    assert!(host.coordinator.remove_sticky(&StickyId::new("dialog")));
    host.recreate("fourth");

    assert_eq!(
        log.entries(),
        vec!["shown on second".to_string(), "shown on third".to_string()]
    );
}

#[test]
fn registering_the_same_id_replaces_the_entry() {
    let mut host = Host::new();
    let old = Log::default();
    let new = Log::default();

    assert!(!host.coordinator.register_sticky("banner", record_shown(&old)).unwrap());
    assert!(host.coordinator.register_sticky("banner", record_shown(&new)).unwrap());
    host.recreate("R");

    assert!(old.entries().is_empty());
    assert_eq!(new.entries(), vec!["shown on R".to_string()]);
}

#[tokio::test]
async fn sticky_operation_resolves_on_the_screen_that_answers() {
    let mut host = Host::new();
    host.show("first");
    let shown = Log::default();
    let answer: Arc<Mutex<Option<StickyContinuation<String>>>> = Arc::default();

    let job = {
        let coordinator = host.coordinator.clone();
        let (shown, answer) = (shown.clone(), Arc::clone(&answer));
        host.coordinator
            .launch(async move {
                coordinator
                    .sticky(move |screen: &Arc<Screen>, continuation: &StickyContinuation<String>| {
                        shown.push(screen.0.clone());
                        *answer.lock().unwrap() = Some(continuation.clone());
                    })
                    .await
            })
            .unwrap()
    };
    while shown.entries().is_empty() {
        tokio::task::yield_now().await;
    }

    host.recreate("second");
    let continuation = answer.lock().unwrap().take().unwrap();
    assert!(continuation.resume("accepted on second".to_string()));
    assert!(!continuation.resume("too late".to_string()));

    assert_eq!(job.join().await.unwrap(), Ok("accepted on second".to_string()));
    assert_eq!(shown.entries(), vec!["first".to_string(), "second".to_string()]);
    assert_eq!(host.coordinator.sticky_ids(), Vec::<StickyId>::new());
}

#[test]
fn sticky_entries_left_behind_are_reported_at_teardown() {
    let host = Host::new();
    host.coordinator
        .register_sticky("forgotten", |_: &Arc<Screen>, _: &StickyId| {})
        .unwrap();

    let report = host.coordinator.cleanup();

    assert_eq!(report.dangling_sticky, vec![StickyId::new("forgotten")]);
}
