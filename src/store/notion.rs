//! Notion record store — thin reqwest client over the public REST API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::StoreError;
use crate::store::traits::{
    Properties, QueryPage, RawRecord, RecordFilter, RecordStore, properties_to_json,
};

/// Public API endpoint.
const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// API version pinned for every request.
const NOTION_VERSION: &str = "2022-06-28";

/// Notion-backed [`RecordStore`].
pub struct NotionClient {
    token: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl NotionClient {
    pub fn new(token: SecretString) -> Self {
        Self {
            token,
            base_url: NOTION_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different API root (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<T, StoreError> {
        let resp = request
            .bearer_auth(self.token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| StoreError::RequestFailed {
            endpoint: endpoint.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| StoreError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn query(
        &self,
        database_id: &str,
        filter: &RecordFilter,
    ) -> Result<QueryPage, StoreError> {
        let endpoint = format!("databases/{database_id}/query");
        let request = self
            .client
            .post(self.api_url(&endpoint))
            .json(&query_body(filter));
        let page: QueryPage = self.send(request, &endpoint).await?;
        tracing::debug!(
            database_id,
            results = page.results.len(),
            has_more = page.has_more,
            "Queried database"
        );
        Ok(page)
    }

    async fn create_record(
        &self,
        database_id: &str,
        properties: &Properties,
        icon: Option<&Value>,
    ) -> Result<RawRecord, StoreError> {
        let request = self
            .client
            .post(self.api_url("pages"))
            .json(&create_body(database_id, properties, icon));
        self.send(request, "pages").await
    }

    async fn update_record(
        &self,
        record_id: &str,
        properties: &Properties,
    ) -> Result<RawRecord, StoreError> {
        let endpoint = format!("pages/{record_id}");
        let request = self
            .client
            .patch(self.api_url(&endpoint))
            .json(&update_body(properties));
        self.send(request, &endpoint).await
    }

    async fn retrieve_record(&self, record_id: &str) -> Result<RawRecord, StoreError> {
        let endpoint = format!("pages/{record_id}");
        let request = self.client.get(self.api_url(&endpoint));
        self.send(request, &endpoint).await
    }
}

// ── Request bodies ──────────────────────────────────────────────────

fn query_body(filter: &RecordFilter) -> Value {
    json!({ "filter": filter.to_json() })
}

fn create_body(database_id: &str, properties: &Properties, icon: Option<&Value>) -> Value {
    let mut body = json!({
        "parent": { "database_id": database_id },
        "properties": properties_to_json(properties),
    });
    if let Some(icon) = icon {
        body["icon"] = icon.clone();
    }
    body
}

fn update_body(properties: &Properties) -> Value {
    json!({ "properties": properties_to_json(properties) })
}

// ── Error decoding ──────────────────────────────────────────────────

/// Error object returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

fn api_error(status: u16, body: &str) -> StoreError {
    match serde_json::from_str::<NotionErrorBody>(body) {
        Ok(err) => StoreError::Api {
            status,
            code: if err.code.is_empty() {
                "unknown".into()
            } else {
                err.code
            },
            message: err.message,
        },
        Err(_) => StoreError::Api {
            status,
            code: "unknown".into(),
            message: body.chars().take(200).collect(),
        },
    }
}
