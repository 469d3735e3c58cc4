//! Reaction to batches of request change events.

use crate::processor::{ProcessReport, RequestProcessor};
use anyhow::Result;
use clap::ValueEnum;
use serde::Deserialize;
use skillmatch_store::{ChangeEvent, ChangeKind};
use std::collections::HashSet;

/// Which pending requests a relevant change batch reprocesses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReprocessScope {
    /// Every pending request in the store.
    #[default]
    All,
    /// Only the pending requests named in the batch.
    Changed,
}

/// Turns change batches into processing runs.
#[derive(Clone)]
pub struct ChangeTrigger {
    processor: RequestProcessor,
    scope: ReprocessScope,
}

impl ChangeTrigger {
    pub fn new(processor: RequestProcessor, scope: ReprocessScope) -> Self {
        Self { processor, scope }
    }

    /// Handle one batch. Returns `None` when nothing in it was relevant.
    pub async fn on_changes(&self, events: &[ChangeEvent]) -> Result<Option<ProcessReport>> {
        let relevant: HashSet<String> = events
            .iter()
            .filter(|event| matches!(event.kind, ChangeKind::Added | ChangeKind::Modified))
            .map(|event| event.request_id.clone())
            .collect();

        if relevant.is_empty() {
            tracing::trace!(
                target: "skillmatch::trigger",
                events = events.len(),
                "Ignoring batch without added or modified requests"
            );
            return Ok(None);
        }

        tracing::debug!(
            target: "skillmatch::trigger",
            changed = relevant.len(),
            scope = ?self.scope,
            "Reprocessing after request changes"
        );
        let report = match self.scope {
            ReprocessScope::All => self.processor.process_pending().await?,
            ReprocessScope::Changed => self.processor.process_selected(&relevant).await?,
        };
        Ok(Some(report))
    }
}
