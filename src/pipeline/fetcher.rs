//! Inbox fetcher — loads every record waiting in the inbox.

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::TriageDeps;
use crate::pipeline::item::InboxItem;
use crate::pipeline::types::{STATUS_INBOX, STATUS_PROPERTY};
use crate::store::RecordFilter;

/// Query the source database for records with status "Inbox" and classify
/// each one, preserving the store's order.
///
/// Only the first page of results is used. When the store reports more pages
/// the remainder is left in the inbox for a later run.
pub async fn fetch_inbox_items(deps: &TriageDeps) -> Result<Vec<InboxItem>, PipelineError> {
    let filter = RecordFilter::StatusEquals {
        property: STATUS_PROPERTY.to_string(),
        value: STATUS_INBOX.to_string(),
    };
    let page = deps
        .store
        .query(&deps.config.source_database_id, &filter)
        .await?;

    if page.has_more {
        warn!(
            fetched = page.results.len(),
            next_cursor = page.next_cursor.as_deref().unwrap_or("none"),
            "Inbox has more results than one page; remaining items are left for the next run"
        );
    }

    let items: Vec<InboxItem> = page
        .results
        .into_iter()
        .map(|record| InboxItem::new(record, deps))
        .collect();
    info!(count = items.len(), "Fetched inbox items");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::pipeline::test_support::{MockLlm, MockStore, StoreCall, deps_with, raw_record};
    use crate::pipeline::types::ItemType;

    #[tokio::test]
    async fn queries_source_with_inbox_filter() {
        let store = Arc::new(MockStore::default());
        let deps = deps_with(store.clone(), Arc::new(MockLlm::replying("{}")));

        let items = fetch_inbox_items(&deps).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(
            store.calls(),
            vec![StoreCall::Query {
                database_id: "source_db".into(),
                filter: RecordFilter::StatusEquals {
                    property: "Status".into(),
                    value: "Inbox".into(),
                },
            }]
        );
    }

    #[tokio::test]
    async fn wraps_results_in_store_order() {
        let store = Arc::new(MockStore::with_inbox(
            vec![
                raw_record("1", "t: Sample Task"),
                raw_record("2", "q: Stay curious"),
                raw_record("3", "Sample Task"),
            ],
            false,
        ));
        let deps = deps_with(store.clone(), Arc::new(MockLlm::replying("{}")));

        let items = fetch_inbox_items(&deps).await.unwrap();
        let summary: Vec<(&str, ItemType, &str)> = items
            .iter()
            .map(|i| (i.id(), i.item_type(), i.title()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1", ItemType::Task, "Sample Task"),
                ("2", ItemType::Quote, "Stay curious"),
                ("3", ItemType::Unregistered, "Sample Task"),
            ]
        );
        // Fetching alone never writes.
        assert_eq!(store.calls().len(), 1);
    }

    #[tokio::test]
    async fn only_first_page_is_used() {
        let store = Arc::new(MockStore::with_inbox(
            vec![raw_record("1", "q: a"), raw_record("2", "q: b")],
            true,
        ));
        let deps = deps_with(store.clone(), Arc::new(MockLlm::replying("{}")));

        let items = fetch_inbox_items(&deps).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(store.calls().len(), 1);
    }
}
