//! The long-running watch daemon.
//!
//! Subscribes to request changes, runs one full pass over pending requests,
//! then hands every change batch to the [`ChangeTrigger`] until shutdown is
//! requested or the change feed closes. Batches are handled one at a time.

use crate::processor::RequestProcessor;
use crate::trigger::{ChangeTrigger, ReprocessScope};
use anyhow::{Context, Result};
use serde::Serialize;
use skillmatch_store::DocumentStore;
use std::future::Future;
use std::sync::Arc;

/// Why the daemon stopped and what it did meanwhile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WatchSummary {
    /// Requests handled by the initial pass.
    pub initial: usize,
    /// Batches received from the change feed.
    pub batches: usize,
    /// Batches that led to a processing run.
    pub runs: usize,
    /// Batches whose processing failed.
    pub failures: usize,
    /// Whether the change feed closed on its own.
    pub feed_closed: bool,
}

/// Run the daemon until `shutdown` resolves or the change feed ends.
///
/// Fails only if the subscription or the initial pass fails; errors while
/// handling a batch are logged and the daemon keeps going.
pub async fn watch<F>(
    store: Arc<dyn DocumentStore>,
    scope: ReprocessScope,
    shutdown: F,
) -> Result<WatchSummary>
where
    F: Future<Output = ()>,
{
    let backend = store.name().to_string();
    // Subscribe before the first pass so no change slips in between.
    let mut subscription = store
        .subscribe_request_changes()
        .await
        .with_context(|| format!("failed to subscribe to {backend} request changes"))?;

    let processor = RequestProcessor::new(store);
    let initial = processor
        .process_pending()
        .await
        .context("initial processing pass failed")?;
    tracing::info!(
        target: "skillmatch::watch",
        store = %backend,
        requests = initial.total(),
        processed = initial.processed,
        no_match = initial.no_match,
        "Initial pass complete; watching for request changes"
    );

    let trigger = ChangeTrigger::new(processor, scope);
    let mut summary = WatchSummary {
        initial: initial.total(),
        ..WatchSummary::default()
    };

    tokio::pin!(shutdown);
    loop {
        let batch = tokio::select! {
            _ = &mut shutdown => {
                tracing::info!(target: "skillmatch::watch", "Shutdown requested");
                break;
            }
            batch = subscription.next_batch() => batch,
        };
        let Some(events) = batch else {
            tracing::warn!(target: "skillmatch::watch", "Change feed closed");
            summary.feed_closed = true;
            break;
        };

        summary.batches += 1;
        match trigger.on_changes(&events).await {
            Ok(Some(report)) => {
                summary.runs += 1;
                tracing::info!(
                    target: "skillmatch::watch",
                    events = events.len(),
                    requests = report.total(),
                    processed = report.processed,
                    no_match = report.no_match,
                    "Reprocessed pending requests"
                );
            }
            Ok(None) => {}
            Err(err) => {
                summary.failures += 1;
                tracing::error!(
                    target: "skillmatch::watch",
                    events = events.len(),
                    error = ?err,
                    "Failed to process change batch"
                );
            }
        }
    }

    Ok(summary)
}
