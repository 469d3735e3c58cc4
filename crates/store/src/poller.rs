//! Change detection by periodic listing, for stores without push notifications.

use crate::change::{ChangeEvent, ChangeSubscription, CHANNEL_CAPACITY};
use crate::DocumentStore;
use indexmap::IndexMap;
use skillmatch_matching::RequestRecord;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

type Snapshot = IndexMap<String, RequestRecord>;

/// Poll `store` every `interval` and emit a batch whenever requests change.
///
/// The first listing is the baseline and emits nothing. A failed listing is
/// logged and retried on the next tick. The task stops when the returned
/// subscription is dropped.
pub fn spawn_request_poller<S>(store: S, interval: Duration) -> ChangeSubscription
where
    S: DocumentStore + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut baseline: Option<Snapshot> = None;

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                break;
            }

            let current: Snapshot = match store.list_requests().await {
                Ok(records) => records.into_iter().map(|r| (r.id.clone(), r)).collect(),
                Err(err) => {
                    tracing::warn!(
                        target: "skillmatch::store",
                        store = store.name(),
                        error = %err,
                        "Polling requests failed"
                    );
                    continue;
                }
            };

            if let Some(previous) = &baseline {
                let batch = diff_requests(previous, &current);
                if !batch.is_empty() {
                    tracing::debug!(
                        target: "skillmatch::store",
                        store = store.name(),
                        changes = batch.len(),
                        "Detected request changes"
                    );
                    if tx.send(batch).await.is_err() {
                        break;
                    }
                }
            }
            baseline = Some(current);
        }
    });
    ChangeSubscription::with_task(rx, task)
}

/// Changes between two request snapshots: added and modified in `current`
/// order, then removed in `previous` order.
pub fn diff_requests(previous: &Snapshot, current: &Snapshot) -> Vec<ChangeEvent> {
    let mut events = Vec::new();
    for (id, record) in current {
        match previous.get(id) {
            None => events.push(ChangeEvent::added(id.clone())),
            Some(old) if old != record => events.push(ChangeEvent::modified(id.clone())),
            Some(_) => {}
        }
    }
    for id in previous.keys() {
        if !current.contains_key(id) {
            events.push(ChangeEvent::removed(id.clone()));
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use skillmatch_matching::RequestUpdate;

    fn snapshot(records: Vec<RequestRecord>) -> Snapshot {
        records.into_iter().map(|r| (r.id.clone(), r)).collect()
    }

    #[test]
    fn diff_reports_added_modified_and_removed() {
        let previous = snapshot(vec![
            RequestRecord::pending("keep", "u1", &[("go", "expert")]),
            RequestRecord::pending("edit", "u1", &[("go", "expert")]),
            RequestRecord::pending("gone", "u1", &[("go", "expert")]),
        ]);
        let mut edited = RequestRecord::pending("edit", "u1", &[("go", "expert")]);
        edited.apply(&RequestUpdate::no_match());
        let current = snapshot(vec![
            RequestRecord::pending("keep", "u1", &[("go", "expert")]),
            edited,
            RequestRecord::pending("new", "u2", &[("rust", "beginner")]),
        ]);

        assert_eq!(
            diff_requests(&previous, &current),
            vec![
                ChangeEvent::modified("edit"),
                ChangeEvent::added("new"),
                ChangeEvent::removed("gone"),
            ]
        );
    }

    #[test]
    fn diff_of_identical_snapshots_is_empty() {
        let records = snapshot(vec![RequestRecord::pending("r1", "u1", &[("go", "expert")])]);
        assert!(diff_requests(&records, &records.clone()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn poller_emits_changes_after_baseline() {
        let store = MemoryStore::with_records(
            vec![],
            vec![RequestRecord::pending("r1", "u1", &[("go", "expert")])],
        );
        let mut changes = spawn_request_poller(store.clone(), Duration::from_millis(50));

        // Let the baseline poll run before mutating.
        tokio::time::sleep(Duration::from_millis(10)).await;
        store
            .insert_request(RequestRecord::pending("r2", "u1", &[("go", "expert")]))
            .await;

        let batch = changes.next_batch().await.unwrap();
        assert_eq!(batch, vec![ChangeEvent::added("r2")]);
    }
}
