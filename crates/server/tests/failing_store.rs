//! Store failures surface to the caller of the processor and the daemon.

use async_trait::async_trait;
use mockall::mock;
use skillmatch_matching::{RequestRecord, RequestStatus, RequestUpdate, UserRecord};
use skillmatch_server::{watch, ReprocessScope, RequestProcessor};
use skillmatch_store::{ChangeEvent, ChangeSubscription, DocumentStore, StoreError};
use skillmatch_test_utils::{pending, user};
use std::sync::Arc;
use tokio::sync::mpsc;

mock! {
    pub Store {}

    #[async_trait]
    impl DocumentStore for Store {
        fn name(&self) -> &str;
        async fn list_users(&self) -> skillmatch_store::Result<Vec<UserRecord>>;
        async fn list_requests(&self) -> skillmatch_store::Result<Vec<RequestRecord>>;
        async fn update_request(&self, id: &str, update: &RequestUpdate) -> skillmatch_store::Result<()>;
        async fn subscribe_request_changes(&self) -> skillmatch_store::Result<ChangeSubscription>;
    }
}

fn unavailable() -> StoreError {
    StoreError::Status {
        status: 503,
        body: "unavailable".into(),
    }
}

fn named_mock() -> MockStore {
    let mut store = MockStore::new();
    store.expect_name().return_const("mock".to_string());
    store
}

#[tokio::test]
async fn listing_failure_propagates_with_context() {
    let mut store = named_mock();
    store.expect_list_users().returning(|| Err(unavailable()));
    store.expect_update_request().never();

    let err = RequestProcessor::new(Arc::new(store))
        .process_pending()
        .await
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("failed to list users from mock store"));
    assert!(message.contains("503"));
}

#[tokio::test]
async fn update_failure_names_the_request() {
    let mut store = named_mock();
    store
        .expect_list_users()
        .returning(|| Ok(vec![user("u1", &[("go", "expert")])]));
    store
        .expect_list_requests()
        .returning(|| Ok(vec![pending("r1", "u2", &[("go", "expert")])]));
    store
        .expect_update_request()
        .times(1)
        .returning(|id, _| Err(StoreError::NotFound(id.to_string())));

    let err = RequestProcessor::new(Arc::new(store))
        .process_pending()
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("failed to update request r1"));
}

#[tokio::test]
async fn failed_subscription_stops_the_daemon_before_processing() {
    let mut store = named_mock();
    store
        .expect_subscribe_request_changes()
        .returning(|| Err(unavailable()));
    store.expect_list_users().never();

    let err = watch(Arc::new(store), ReprocessScope::All, std::future::pending())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("subscribe"));
}

#[tokio::test]
async fn given_failing_batch_when_watching_then_daemon_keeps_going() {
    let (tx, rx) = mpsc::channel(8);
    let mut store = named_mock();
    store
        .expect_subscribe_request_changes()
        .return_once(move || Ok(ChangeSubscription::new(rx)));

    // Initial pass succeeds, the first batch fails, the second succeeds.
    let mut calls = 0;
    store.expect_list_users().times(3).returning(move || {
        calls += 1;
        if calls == 2 {
            Err(unavailable())
        } else {
            Ok(vec![user("u1", &[("go", "expert")])])
        }
    });
    store
        .expect_list_requests()
        .times(2)
        .returning(|| Ok(vec![pending("r1", "u2", &[("go", "expert")])]));
    store
        .expect_update_request()
        .times(2)
        .returning(|id, update| {
            assert_eq!(id, "r1");
            assert_eq!(update.status, RequestStatus::Processed);
            Ok(())
        });

    tx.send(vec![ChangeEvent::added("r1")]).await.unwrap();
    tx.send(vec![ChangeEvent::modified("r1")]).await.unwrap();
    drop(tx);

    let summary = watch(Arc::new(store), ReprocessScope::All, std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.initial, 1);
    assert_eq!(summary.batches, 2);
    assert_eq!(summary.runs, 1);
    assert_eq!(summary.failures, 1);
    assert!(summary.feed_closed);
}
