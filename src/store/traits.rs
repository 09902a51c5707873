//! `RecordStore` trait — async interface over the workspace page/database API.
//!
//! The triage pipeline only ever talks to the store through this trait, so the
//! Notion client and the test doubles are interchangeable.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::StoreError;

/// Property map written on create/update, keyed by property name.
pub type Properties = BTreeMap<String, PropertyValue>;

/// A record (page) as returned by the store.
///
/// Properties and icon are kept as opaque JSON; callers pull out the few
/// fields they need.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
    #[serde(default)]
    pub icon: Option<Value>,
}

impl RawRecord {
    /// Plain text of the first rich-text segment of a title property.
    ///
    /// Returns an empty string when the property is missing or has no segments.
    pub fn title_text(&self, property: &str) -> String {
        self.properties
            .get(property)
            .and_then(|p| p.get("title"))
            .and_then(|t| t.get(0))
            .and_then(|seg| seg.get("plain_text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Name of the current option of a status property, if any.
    pub fn status_name(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)?
            .get("status")?
            .get("name")?
            .as_str()
    }

    /// The record's icon, ignoring an explicit `null`.
    pub fn icon(&self) -> Option<&Value> {
        self.icon.as_ref().filter(|icon| !icon.is_null())
    }
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Title property with a single text segment.
    Title(String),
    /// Single-select option by name.
    Select(String),
    /// Multi-select options by name.
    MultiSelect(Vec<String>),
    /// Status option by name.
    Status(String),
}

impl PropertyValue {
    /// Render in the store's property JSON shape.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Title(text) => json!({ "title": [{ "text": { "content": text } }] }),
            Self::Select(name) => json!({ "select": { "name": name } }),
            Self::MultiSelect(names) => {
                let options: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
                json!({ "multi_select": options })
            }
            Self::Status(name) => json!({ "status": { "name": name } }),
        }
    }
}

/// Render a full property map as a JSON object.
pub fn properties_to_json(properties: &Properties) -> Value {
    let map: serde_json::Map<String, Value> = properties
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    Value::Object(map)
}

/// Structural predicate for database queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// A status property equals the given option name.
    StatusEquals { property: String, value: String },
}

impl RecordFilter {
    pub fn to_json(&self) -> Value {
        match self {
            Self::StatusEquals { property, value } => json!({
                "property": property,
                "status": { "equals": value }
            }),
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryPage {
    #[serde(default)]
    pub results: Vec<RawRecord>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Backend-agnostic record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Query a database. Only the first page of results is returned.
    async fn query(&self, database_id: &str, filter: &RecordFilter)
    -> Result<QueryPage, StoreError>;

    /// Create a record in a database, optionally with an icon.
    async fn create_record(
        &self,
        database_id: &str,
        properties: &Properties,
        icon: Option<&Value>,
    ) -> Result<RawRecord, StoreError>;

    /// Update properties of an existing record.
    async fn update_record(
        &self,
        record_id: &str,
        properties: &Properties,
    ) -> Result<RawRecord, StoreError>;

    /// Fetch a single record by id.
    async fn retrieve_record(&self, record_id: &str) -> Result<RawRecord, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn title_text_reads_first_segment() {
        let rec = record(json!({
            "id": "page-1",
            "properties": {
                "Task name": { "title": [
                    { "plain_text": "q: first" },
                    { "plain_text": " second" }
                ]}
            }
        }));
        assert_eq!(rec.title_text("Task name"), "q: first");
    }

    #[test]
    fn title_text_empty_when_no_segments() {
        let rec = record(json!({
            "id": "page-1",
            "properties": { "Task name": { "title": [] } }
        }));
        assert_eq!(rec.title_text("Task name"), "");
        assert_eq!(rec.title_text("Missing"), "");
    }

    #[test]
    fn status_name_reads_status_option() {
        let rec = record(json!({
            "id": "page-1",
            "properties": { "Status": { "status": { "name": "Inbox" } } }
        }));
        assert_eq!(rec.status_name("Status"), Some("Inbox"));
        assert_eq!(rec.status_name("Other"), None);
    }

    #[test]
    fn null_icon_is_treated_as_absent() {
        let rec = record(json!({ "id": "page-1", "icon": null }));
        assert!(rec.icon().is_none());

        let rec = record(json!({ "id": "page-1", "icon": { "type": "emoji", "emoji": "📚" } }));
        assert_eq!(rec.icon().unwrap()["emoji"], "📚");
    }

    #[test]
    fn property_values_render_store_shapes() {
        assert_eq!(
            PropertyValue::Title("Stay curious".into()).to_json(),
            json!({ "title": [{ "text": { "content": "Stay curious" } }] })
        );
        assert_eq!(
            PropertyValue::Select("Quote".into()).to_json(),
            json!({ "select": { "name": "Quote" } })
        );
        assert_eq!(
            PropertyValue::MultiSelect(vec!["James Clear".into()]).to_json(),
            json!({ "multi_select": [{ "name": "James Clear" }] })
        );
        assert_eq!(
            PropertyValue::Status("Done".into()).to_json(),
            json!({ "status": { "name": "Done" } })
        );
    }

    #[test]
    fn status_filter_renders_equals_predicate() {
        let filter = RecordFilter::StatusEquals {
            property: "Status".into(),
            value: "Inbox".into(),
        };
        assert_eq!(
            filter.to_json(),
            json!({ "property": "Status", "status": { "equals": "Inbox" } })
        );
    }

    #[test]
    fn query_page_defaults_when_fields_missing() {
        let page: QueryPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.results.is_empty());
        assert!(!page.has_more);
        assert!(page.next_cursor.is_none());
    }
}
