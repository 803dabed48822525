//! Bounded-retry health checks: attempt budget, early success, and
//! shutdown cancellation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use grid::testing::MockTransport;
use grid::{HealthPolicy, HealthStatus, UNRESPONSIVE_STATUS, WorkerProxy};
use grid_protocol::WorkerResponse;

fn probe_target() -> (Arc<MockTransport>, WorkerProxy) {
    let transport = Arc::new(MockTransport::new());
    let proxy = WorkerProxy::new("rc1", 5555, "firefox", transport.clone()).unwrap();
    (transport, proxy)
}

fn fast_policy(attempts: u32) -> HealthPolicy {
    HealthPolicy::new(attempts, Duration::from_millis(1))
}

#[tokio::test]
async fn check_returns_healthy_on_first_success() {
    let (transport, proxy) = probe_target();
    transport.respond_with(WorkerResponse::new(200, "OK"));

    let status = fast_policy(3).check(&proxy).await;

    assert_eq!(status, HealthStatus::Healthy { status: 200 });
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn check_recovers_from_transient_failures() {
    let (transport, proxy) = probe_target();
    transport.fail_with("connection refused");
    transport.fail_with("connection refused");
    transport.respond_with(WorkerResponse::new(200, "OK"));

    let status = fast_policy(3).check(&proxy).await;

    assert_eq!(status, HealthStatus::Healthy { status: 200 });
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn check_exhausts_budget_and_reports_last_outcome() {
    let (transport, proxy) = probe_target();
    transport.fail_with("connection refused");
    transport.fail_with("connection refused");
    transport.respond_with(WorkerResponse::new(404, "gone"));

    let status = fast_policy(3).check(&proxy).await;

    assert_eq!(status, HealthStatus::Unresponsive { status: 404 });
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn check_transport_failures_report_the_sentinel() {
    let (transport, proxy) = probe_target();
    transport.fail_with("connection refused");
    transport.fail_with("connection refused");

    let status = fast_policy(2).check(&proxy).await;

    assert_eq!(
        status,
        HealthStatus::Unresponsive {
            status: UNRESPONSIVE_STATUS
        }
    );
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn check_with_shutdown_aborts_before_first_probe() {
    let (transport, proxy) = probe_target();
    let (tx, mut rx) = watch::channel(false);
    tx.send(true).unwrap();

    let outcome = fast_policy(3).check_with_shutdown(&proxy, &mut rx).await;

    assert_eq!(outcome, None);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn check_with_shutdown_stops_between_attempts() {
    let (transport, proxy) = probe_target();
    transport.fail_with("connection refused");

    // A long inter-attempt delay; the shutdown signal must cut it short.
    let policy = HealthPolicy::new(3, Duration::from_secs(3600));
    let (tx, mut rx) = watch::channel(false);

    let check = policy.check_with_shutdown(&proxy, &mut rx);
    tokio::pin!(check);

    // Let the first probe run, then signal shutdown during the sleep.
    tokio::select! {
        _ = &mut check => panic!("check finished before shutdown"),
        _ = tokio::time::sleep(Duration::from_millis(50)) => {}
    }
    tx.send(true).unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), check)
        .await
        .expect("shutdown must unblock the check");

    assert_eq!(outcome, None);
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn check_with_shutdown_completes_when_signal_stays_low() {
    let (transport, proxy) = probe_target();
    transport.respond_with(WorkerResponse::new(200, "OK"));
    let (_tx, mut rx) = watch::channel(false);

    let outcome = fast_policy(3).check_with_shutdown(&proxy, &mut rx).await;

    assert_eq!(outcome, Some(HealthStatus::Healthy { status: 200 }));
    assert_eq!(transport.request_count(), 1);
}
