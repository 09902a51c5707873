//! Inbox item — one classified inbox record and the handler for its type.
//!
//! Classification runs exactly once, in [`InboxItem::new`]. Handlers:
//!
//! | Type | Store effect |
//! |---|---|
//! | Principle, Quote | create in life lessons, then complete |
//! | Journal | create in journal, then complete |
//! | Task | retitle source, status "In progress" (no completion) |
//! | Book | enrich, copy template icon, create in reading, then complete |
//! | Unregistered | none |
//!
//! Completion (status "Done") only ever follows a successful create.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::TriageConfig;
use crate::error::PipelineError;
use crate::pipeline::TriageDeps;
use crate::pipeline::enrichment::{BookEnricher, BookLookup};
use crate::pipeline::types::{
    AUTHOR_PROPERTY, Classification, INBOX_TITLE_PROPERTY, ItemOutcome, ItemType, NAME_PROPERTY,
    READING_STATUS_NOT_READ, READING_STATUS_PROPERTY, STATUS_DONE, STATUS_IN_PROGRESS,
    STATUS_PROPERTY, TYPE_PROPERTY,
};
use crate::store::{Properties, PropertyValue, RawRecord, RecordStore};

/// A classified inbox record bound to the shared store, enricher and config.
pub struct InboxItem {
    id: String,
    title: String,
    item_type: ItemType,
    store: Arc<dyn RecordStore>,
    enricher: Arc<BookEnricher>,
    config: Arc<TriageConfig>,
}

impl InboxItem {
    /// Wrap and classify a raw record.
    pub fn new(record: RawRecord, deps: &TriageDeps) -> Self {
        let Classification { item_type, title } =
            Classification::parse(&record.title_text(INBOX_TITLE_PROPERTY));
        debug!(id = %record.id, item_type = %item_type, title = %title, "Classified inbox item");

        Self {
            id: record.id,
            title,
            item_type,
            store: Arc::clone(&deps.store),
            enricher: Arc::clone(&deps.enricher),
            config: Arc::clone(&deps.config),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// Run the handler bound to this item's type.
    pub async fn process(&self) -> Result<ItemOutcome, PipelineError> {
        info!(id = %self.id, item_type = %self.item_type, title = %self.title, "Processing inbox item");

        let outcome = match self.item_type {
            ItemType::Principle => {
                let db = &self.config.life_lessons_database_id;
                self.file_typed(db, "Principle").await?
            }
            ItemType::Quote => {
                let db = &self.config.life_lessons_database_id;
                self.file_typed(db, "Quote").await?
            }
            ItemType::Journal => {
                let db = &self.config.journal_database_id;
                self.file_typed(db, "Prompt").await?
            }
            ItemType::Task => self.handle_task().await?,
            ItemType::Book => self.handle_book().await?,
            ItemType::Unregistered => self.handle_unregistered(),
        };

        info!(id = %self.id, outcome = outcome.label(), "Finished inbox item");
        Ok(outcome)
    }

    // ── Handlers ────────────────────────────────────────────────────

    /// Principle, quote and journal: a titled record with a `Type` select.
    async fn file_typed(
        &self,
        database_id: &str,
        type_name: &str,
    ) -> Result<ItemOutcome, PipelineError> {
        let properties = Properties::from([
            (
                NAME_PROPERTY.to_string(),
                PropertyValue::Title(self.title.clone()),
            ),
            (
                TYPE_PROPERTY.to_string(),
                PropertyValue::Select(type_name.to_string()),
            ),
        ]);
        self.create_record(database_id, &properties, None).await?;
        self.complete().await?;
        Ok(ItemOutcome::Filed {
            destination: database_id.to_string(),
        })
    }

    /// Defer the task for review: clean up its title and move it out of the inbox.
    async fn handle_task(&self) -> Result<ItemOutcome, PipelineError> {
        let properties = Properties::from([
            (
                INBOX_TITLE_PROPERTY.to_string(),
                PropertyValue::Title(self.title.clone()),
            ),
            (
                STATUS_PROPERTY.to_string(),
                PropertyValue::Status(STATUS_IN_PROGRESS.to_string()),
            ),
        ]);
        self.store.update_record(&self.id, &properties).await?;
        info!(id = %self.id, status = STATUS_IN_PROGRESS, "Updated task status");
        Ok(ItemOutcome::Deferred)
    }

    async fn handle_book(&self) -> Result<ItemOutcome, PipelineError> {
        let details = match self.enricher.resolve_book_details(&self.title).await? {
            BookLookup::Found(details) => details,
            BookLookup::Unidentified { reason } => {
                error!(id = %self.id, title = %self.title, reason = %reason, "Could not identify book");
                return Ok(ItemOutcome::Skipped { reason });
            }
        };

        let template = self
            .store
            .retrieve_record(&self.config.book_template_id)
            .await?;
        let author = details.primary_author().to_string();
        info!(id = %self.id, title = %details.title, author = %author, "Handling book");

        let properties = Properties::from([
            (
                NAME_PROPERTY.to_string(),
                PropertyValue::Title(details.title.clone()),
            ),
            (
                AUTHOR_PROPERTY.to_string(),
                PropertyValue::MultiSelect(vec![author]),
            ),
            (
                READING_STATUS_PROPERTY.to_string(),
                PropertyValue::Select(READING_STATUS_NOT_READ.to_string()),
            ),
        ]);
        let database_id = &self.config.reading_database_id;
        self.create_record(database_id, &properties, template.icon())
            .await?;
        self.complete().await?;
        Ok(ItemOutcome::Filed {
            destination: database_id.to_string(),
        })
    }

    fn handle_unregistered(&self) -> ItemOutcome {
        debug!(id = %self.id, title = %self.title, "Unregistered type, leaving item alone");
        ItemOutcome::Ignored
    }

    // ── Store helpers ───────────────────────────────────────────────

    async fn create_record(
        &self,
        database_id: &str,
        properties: &Properties,
        icon: Option<&Value>,
    ) -> Result<(), PipelineError> {
        let created = self
            .store
            .create_record(database_id, properties, icon)
            .await?;
        info!(id = %self.id, created = %created.id, database_id, "Created record for item");
        Ok(())
    }

    /// Mark the source record as fully processed.
    async fn complete(&self) -> Result<(), PipelineError> {
        let properties = Properties::from([(
            STATUS_PROPERTY.to_string(),
            PropertyValue::Status(STATUS_DONE.to_string()),
        )]);
        self.store.update_record(&self.id, &properties).await?;
        info!(id = %self.id, status = STATUS_DONE, "Completed item");
        Ok(())
    }
}
