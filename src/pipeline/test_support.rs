//! Recording test doubles for the store and the LLM.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Value, json};

use crate::config::TriageConfig;
use crate::error::{LlmError, StoreError};
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, Role};
use crate::pipeline::TriageDeps;
use crate::pipeline::enrichment::BookEnricher;
use crate::store::{Properties, QueryPage, RawRecord, RecordFilter, RecordStore};

/// One call made against the mock store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Query {
        database_id: String,
        filter: RecordFilter,
    },
    Create {
        database_id: String,
        properties: Properties,
        icon: Option<Value>,
    },
    Update {
        record_id: String,
        properties: Properties,
    },
    Retrieve {
        record_id: String,
    },
}

/// Store that records every call and answers from canned data.
#[derive(Default)]
pub struct MockStore {
    calls: Mutex<Vec<StoreCall>>,
    inbox: Vec<RawRecord>,
    has_more: bool,
    template_icon: Option<Value>,
    fail_creates: bool,
}

impl MockStore {
    pub fn with_inbox(inbox: Vec<RawRecord>, has_more: bool) -> Self {
        Self {
            inbox,
            has_more,
            ..Self::default()
        }
    }

    pub fn with_template_icon(icon: Value) -> Self {
        Self {
            template_icon: Some(icon),
            ..Self::default()
        }
    }

    pub fn failing_creates() -> Self {
        Self {
            fail_creates: true,
            ..Self::default()
        }
    }

    /// Inbox whose items can be fetched but never filed.
    pub fn failing_with_inbox(inbox: Vec<RawRecord>) -> Self {
        Self {
            inbox,
            fail_creates: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RecordStore for MockStore {
    async fn query(
        &self,
        database_id: &str,
        filter: &RecordFilter,
    ) -> Result<QueryPage, StoreError> {
        self.push(StoreCall::Query {
            database_id: database_id.to_string(),
            filter: filter.clone(),
        });
        Ok(QueryPage {
            results: self.inbox.clone(),
            has_more: self.has_more,
            next_cursor: self.has_more.then(|| "cursor-2".to_string()),
        })
    }

    async fn create_record(
        &self,
        database_id: &str,
        properties: &Properties,
        icon: Option<&Value>,
    ) -> Result<RawRecord, StoreError> {
        self.push(StoreCall::Create {
            database_id: database_id.to_string(),
            properties: properties.clone(),
            icon: icon.cloned(),
        });
        if self.fail_creates {
            return Err(StoreError::Api {
                status: 400,
                code: "validation_error".into(),
                message: "Type is not a property that exists".into(),
            });
        }
        Ok(RawRecord {
            id: "created_id".into(),
            ..RawRecord::default()
        })
    }

    async fn update_record(
        &self,
        record_id: &str,
        properties: &Properties,
    ) -> Result<RawRecord, StoreError> {
        self.push(StoreCall::Update {
            record_id: record_id.to_string(),
            properties: properties.clone(),
        });
        Ok(RawRecord {
            id: record_id.to_string(),
            ..RawRecord::default()
        })
    }

    async fn retrieve_record(&self, record_id: &str) -> Result<RawRecord, StoreError> {
        self.push(StoreCall::Retrieve {
            record_id: record_id.to_string(),
        });
        Ok(RawRecord {
            id: record_id.to_string(),
            icon: self.template_icon.clone(),
            ..RawRecord::default()
        })
    }
}

/// LLM that returns a fixed reply and records the user prompts it saw.
pub struct MockLlm {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    pub fn replying(response: &str) -> Self {
        Self {
            response: response.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    fn model_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = request
            .messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);
        Ok(CompletionResponse {
            content: self.response.clone(),
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}

pub fn test_config() -> TriageConfig {
    TriageConfig {
        notion_api_key: SecretString::from("notion_key"),
        openai_api_key: SecretString::from("openai_key"),
        source_database_id: "source_db".into(),
        life_lessons_database_id: "life_lessons_db".into(),
        journal_database_id: "journal_db".into(),
        reading_database_id: "reading_db".into(),
        book_template_id: "book_template_id".into(),
        enrichment_model: "mock".into(),
    }
}

pub fn deps_with(store: Arc<MockStore>, llm: Arc<MockLlm>) -> TriageDeps {
    TriageDeps {
        store,
        enricher: Arc::new(BookEnricher::new(llm)),
        config: Arc::new(test_config()),
    }
}

/// Inbox record with the given id and title.
pub fn raw_record(id: &str, title: &str) -> RawRecord {
    serde_json::from_value(json!({
        "id": id,
        "properties": {
            "Task name": { "title": [{ "plain_text": title }] },
            "Status": { "status": { "name": "Inbox" } }
        }
    }))
    .unwrap()
}
