//! Contract Test: Post-Create Confirmation
//!
//! The provider may not list a record right after creating it. Create keeps
//! polling the zone listing with backoff until the record shows up, for at
//! most the confirmation timeout (30 seconds by default).
//!
//! Constraints verified:
//! - A record that appears late is still confirmed
//! - A record that never appears fails with `ConfirmationTimeout` at ~30s
//! - Cancellation mid-poll stops polling and is reported distinctly
//! - A failing listing during the poll is not retried

mod common;

use common::*;
use cloudns_core::{Error, Record, RecordType};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_test::{assert_err, assert_ok};
use tokio_util::sync::CancellationToken;

fn www_record() -> Record {
    Record::new("example.com", "www", RecordType::A, "1.2.3.4", 600)
}

#[tokio::test(start_paused = true)]
async fn record_visible_on_third_poll_is_confirmed() {
    let api = Arc::new(FakeZoneApi::new().with_visibility(Visibility::AfterListings(2)));
    let reconciler = reconciler(&api);
    let start = Instant::now();

    let created = assert_ok!(reconciler.create(&www_record()).await);

    assert_eq!(created.id.as_deref(), Some("42"));
    assert_eq!(api.create_calls(), 1);
    assert_eq!(api.list_calls(), 3);
    assert!(start.elapsed() < Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn record_never_listed_times_out_after_thirty_seconds() {
    let api = Arc::new(FakeZoneApi::new().with_visibility(Visibility::Never));
    let reconciler = reconciler(&api);
    let start = Instant::now();

    let err = assert_err!(reconciler.create(&www_record()).await);

    match err {
        Error::ConfirmationTimeout { zone, id, timeout } => {
            assert_eq!(zone, "example.com");
            assert_eq!(id, "42");
            assert_eq!(timeout, Duration::from_secs(30));
        }
        other => panic!("expected ConfirmationTimeout, got {other:?}"),
    }

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(30), "gave up early: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(31), "overran the deadline: {elapsed:?}");

    // create is never repeated while polling
    assert_eq!(api.create_calls(), 1);
    assert!(api.list_calls() > 1);
}

#[tokio::test(start_paused = true)]
async fn polls_back_off_between_misses() {
    let api = Arc::new(FakeZoneApi::new().with_visibility(Visibility::AfterListings(4)));
    let reconciler = reconciler(&api);

    assert_ok!(reconciler.create(&www_record()).await);

    // call_times[0] is the create, the rest are listings
    let times = api.call_times();
    let gaps: Vec<Duration> = times[1..].windows(2).map(|w| w[1] - w[0]).collect();
    assert_eq!(gaps.len(), 4);
    for pair in gaps.windows(2) {
        assert!(pair[1] > pair[0], "delays should grow: {gaps:?}");
    }
}

#[tokio::test(start_paused = true)]
async fn cancellation_mid_poll_is_not_a_timeout() {
    let api = Arc::new(FakeZoneApi::new().with_visibility(Visibility::Never));
    let cancel = CancellationToken::new();
    let reconciler = reconciler(&api).with_cancellation(cancel.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        cancel.cancel();
    });

    let start = Instant::now();
    let err = assert_err!(reconciler.create(&www_record()).await);
    canceller.await.unwrap();

    match err {
        Error::Cancelled { operation, record_id } => {
            assert_eq!(operation, "create");
            assert_eq!(record_id.as_deref(), Some("42"));
        }
        other => panic!("expected Cancelled, got {other:?}"),
    }
    assert!(start.elapsed() < Duration::from_secs(30));

    // The created record is left in place for the caller to resolve
    assert_eq!(api.stored("example.com").len(), 1);
    assert_eq!(api.destroy_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn listing_failure_during_poll_stops_confirmation() {
    let api = Arc::new(FakeZoneApi::new().with_visibility(Visibility::Never));
    api.fail_list(true);
    let reconciler = reconciler(&api);

    let err = assert_err!(reconciler.create(&www_record()).await);
    assert!(matches!(err, Error::ReadFailed { .. }), "got {err:?}");
    assert_eq!(api.list_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn confirmation_timeout_is_configurable() {
    let api = Arc::new(FakeZoneApi::new().with_visibility(Visibility::Never));
    let config = test_config().with_confirmation_timeout(Duration::from_secs(5));
    let api_dyn: Arc<dyn cloudns_core::ZoneApi> = api.clone();
    let reconciler = cloudns_core::Reconciler::new(api_dyn, &config).unwrap();
    let start = Instant::now();

    let err = assert_err!(reconciler.create(&www_record()).await);
    assert!(matches!(err, Error::ConfirmationTimeout { timeout, .. } if timeout == Duration::from_secs(5)));
    assert!(start.elapsed() < Duration::from_secs(6));
}
