//! Triage runner — one pass over the inbox.

use tracing::info;

use crate::error::PipelineError;
use crate::pipeline::TriageDeps;
use crate::pipeline::fetcher::fetch_inbox_items;
use crate::pipeline::types::RunSummary;

/// Runs a single triage batch.
pub struct InboxTriage {
    deps: TriageDeps,
}

impl InboxTriage {
    pub fn new(deps: TriageDeps) -> Self {
        Self { deps }
    }

    /// Fetch the inbox and process every item in order.
    ///
    /// Stops at the first failing item; items after it are not touched and
    /// stay in the inbox.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let items = fetch_inbox_items(&self.deps).await?;

        let mut summary = RunSummary {
            fetched: items.len(),
            ..RunSummary::default()
        };
        for item in &items {
            let outcome = item.process().await?;
            summary.record(&outcome);
        }

        info!(
            fetched = summary.fetched,
            filed = summary.filed,
            deferred = summary.deferred,
            skipped = summary.skipped,
            ignored = summary.ignored,
            "Triage run complete"
        );
        Ok(summary)
    }
}
