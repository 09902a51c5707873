//! Inbox triage pipeline.
//!
//! Every run flows through:
//! 1. `fetch_inbox_items()` — query the source database for status "Inbox"
//! 2. `InboxItem::new()` — classify each record by its title tag, once
//! 3. `InboxItem::process()` — run the type's handler against the store
//!
//! Items are processed strictly one after another. The first store or LLM
//! transport error ends the run.

pub mod enrichment;
pub mod fetcher;
pub mod item;
pub mod processor;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::config::TriageConfig;
use crate::store::RecordStore;

pub use enrichment::{BookDetails, BookEnricher, BookLookup};
pub use fetcher::fetch_inbox_items;
pub use item::InboxItem;
pub use processor::InboxTriage;
pub use types::{Classification, ItemOutcome, ItemType, RunSummary};

/// Shared handles every inbox item works with.
///
/// All items in a batch share the same store, enricher and configuration.
#[derive(Clone)]
pub struct TriageDeps {
    pub store: Arc<dyn RecordStore>,
    pub enricher: Arc<BookEnricher>,
    pub config: Arc<TriageConfig>,
}
