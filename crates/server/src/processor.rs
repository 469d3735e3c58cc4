//! Processing of pending requests: score, rank, write back.

use anyhow::{Context, Result};
use serde::Serialize;
use skillmatch_matching::{
    build_request_index, build_user_index, rank, score, MatchError, PendingRequest,
    RequestStatus, RequestUpdate, UserIndex,
};
use skillmatch_store::DocumentStore;
use std::collections::HashSet;
use std::sync::Arc;
use time::OffsetDateTime;

/// Decide the write for one pending request.
///
/// A request naming no required skills has no candidates and is written as
/// `no match found`.
pub fn evaluate(request: &PendingRequest, users: &UserIndex) -> RequestUpdate {
    match score(request, users) {
        Ok(results) => match rank(&results) {
            Some(ranked) => RequestUpdate::processed(ranked),
            None => RequestUpdate::no_match(),
        },
        Err(MatchError::NoRequiredSkills) => {
            tracing::debug!(
                target: "skillmatch::processor",
                "Request names no required skills"
            );
            RequestUpdate::no_match()
        }
    }
}

/// Result for one request in a processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    pub request_id: String,
    pub status: RequestStatus,
    pub returned_users: Vec<String>,
}

/// Summary of one processing run.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Whether results were written back to the store.
    pub written: bool,
    pub users: usize,
    pub processed: usize,
    pub no_match: usize,
    pub outcomes: Vec<RequestOutcome>,
}

impl ProcessReport {
    fn new(written: bool, users: usize) -> Self {
        Self {
            started_at: OffsetDateTime::now_utc(),
            written,
            users,
            processed: 0,
            no_match: 0,
            outcomes: Vec::new(),
        }
    }

    fn record(&mut self, request_id: &str, update: RequestUpdate) {
        match update.status {
            RequestStatus::Processed => self.processed += 1,
            RequestStatus::NoMatchFound => self.no_match += 1,
            _ => {}
        }
        self.outcomes.push(RequestOutcome {
            request_id: request_id.to_string(),
            status: update.status,
            returned_users: update.returned_users,
        });
    }

    /// Number of requests handled in this run.
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// One-line summary for terminal output.
    pub fn summary(&self) -> String {
        format!(
            "{} request(s): {} processed, {} no match ({} users)",
            self.total(),
            self.processed,
            self.no_match,
            self.users
        )
    }
}

/// Runs matching over a store's pending requests.
#[derive(Clone)]
pub struct RequestProcessor {
    store: Arc<dyn DocumentStore>,
}

impl RequestProcessor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Process every pending request and write each result.
    pub async fn process_pending(&self) -> Result<ProcessReport> {
        self.run(None, true).await
    }

    /// Process only the pending requests named in `ids`.
    pub async fn process_selected(&self, ids: &HashSet<String>) -> Result<ProcessReport> {
        self.run(Some(ids), true).await
    }

    /// Compute results for every pending request without writing.
    pub async fn preview(&self) -> Result<ProcessReport> {
        self.run(None, false).await
    }

    async fn run(&self, only: Option<&HashSet<String>>, write: bool) -> Result<ProcessReport> {
        let store = self.store.name();
        let users = self
            .store
            .list_users()
            .await
            .with_context(|| format!("failed to list users from {store} store"))?;
        let pending = self
            .store
            .list_pending_requests()
            .await
            .with_context(|| format!("failed to list pending requests from {store} store"))?;

        // Users and requests are a fixed snapshot for the whole run.
        let users = build_user_index(&users);
        let requests = build_request_index(&pending);
        let mut report = ProcessReport::new(write, users.len());

        for (request_id, request) in &requests {
            if only.is_some_and(|ids| !ids.contains(request_id)) {
                continue;
            }

            let update = evaluate(request, &users);
            if write {
                self.store
                    .update_request(request_id, &update)
                    .await
                    .with_context(|| format!("failed to update request {request_id}"))?;
            }
            tracing::info!(
                target: "skillmatch::processor",
                request_id = %request_id,
                status = %update.status,
                candidates = update.returned_users.len(),
                written = write,
                "Processed request"
            );
            report.record(request_id, update);
        }

        tracing::debug!(
            target: "skillmatch::processor",
            store,
            users = report.users,
            requests = report.total(),
            "Processing run finished"
        );
        Ok(report)
    }
}
