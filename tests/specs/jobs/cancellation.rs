//! Job cancellation specs
//!
//! Verify that work launched through a coordinator or a use case is
//! tracked while it runs and cancelled, newest first, on teardown.

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn teardown_cancels_jobs_newest_first() {
    let host = Host::new();
    let jobs: Vec<_> = (0..3)
        .map(|_| host.coordinator.launch(std::future::pending::<()>()).unwrap())
        .collect();
    let newest_first: Vec<_> = jobs.iter().rev().map(|job| job.id()).collect();

    let report = host.coordinator.cleanup();

    assert_eq!(report.cancelled_jobs, newest_first);
    for job in jobs {
        let id = job.id();
        assert_eq!(job.join().await, Err(JobError::Cancelled(id)));
    }
}

#[tokio::test]
async fn finished_jobs_are_no_longer_tracked() {
    let host = Host::new();

    let job = host.coordinator.launch(async { 7 }).unwrap();
    assert_eq!(job.join().await, Ok(7));

    assert_eq!(host.coordinator.tracked_jobs(), 0);
    assert_eq!(host.coordinator.cleanup().cancelled_jobs, Vec::new());
}

#[tokio::test]
async fn a_job_waiting_for_the_screen_is_cancelled_cleanly() {
    let host = Host::new();
    let exits = Arc::new(Mutex::new(Vec::new()));

    let job = {
        let coordinator = host.coordinator.clone();
        let exits = Arc::clone(&exits);
        host.coordinator
            .launch_finally(
                async move { coordinator.resource().await.map(|_| ()) },
                move |exit| exits.lock().unwrap().push(exit),
            )
            .unwrap()
    };
    host.until_parked(1).await;

    host.coordinator.cleanup();
    assert!(job.join().await.unwrap_err().is_cancelled());

    assert_eq!(*exits.lock().unwrap(), vec![JobExit::Cancelled]);
    assert_eq!(host.coordinator.pending_waits(), 0);
}

#[tokio::test]
async fn failures_are_handed_to_the_error_handler() {
    let host = Host::new();
    let errors = Log::default();

    let job = {
        let errors = errors.clone();
        host.coordinator
            .launch_catching(async { Err::<(), _>("network unreachable") }, move |e| errors.push(e))
            .unwrap()
    };
    job.join().await.unwrap();

    assert_eq!(errors.entries(), vec!["network unreachable".to_string()]);
}

#[tokio::test]
async fn use_case_work_is_independent_of_the_screen() {
    let use_case = UseCase::new("load-profile");

    assert_eq!(use_case.run(async { "profile" }).await, Ok("profile"));

    let pending = use_case.spawn(std::future::pending::<()>());
    assert_eq!(use_case.pending(), 1);
    assert_eq!(use_case.cleanup(), vec![pending.id()]);
    assert!(pending.join().await.unwrap_err().is_cancelled());
}
