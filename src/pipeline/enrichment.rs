//! Book enrichment — asks the LLM for the full title and author of a book
//! from a rough title fragment.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, LlmProvider};

/// Enrichment answers should be as repeatable as possible.
const ENRICHMENT_TEMPERATURE: f32 = 0.0;

/// Title + author fit comfortably in this budget.
const ENRICHMENT_MAX_TOKENS: u32 = 256;

/// Resolved book details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
}

impl BookDetails {
    /// First entry of a comma-separated author list.
    pub fn primary_author(&self) -> &str {
        self.author.split(',').next().unwrap_or_default().trim()
    }
}

/// Result of a book lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookLookup {
    Found(BookDetails),
    /// The service could not confidently identify a book.
    Unidentified { reason: String },
}

/// Resolves book details through an LLM provider.
pub struct BookEnricher {
    llm: Arc<dyn LlmProvider>,
}

impl BookEnricher {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Ask for the full title and author of the book closest to `fragment`.
    ///
    /// A reply carrying an `error` key, lacking title/author, or not parseable
    /// as a JSON object is an `Unidentified` lookup, not an error. Only
    /// provider failures are errors.
    pub async fn resolve_book_details(&self, fragment: &str) -> Result<BookLookup, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(build_enrichment_system_prompt()),
            ChatMessage::user(build_enrichment_user_prompt(fragment)),
        ])
        .with_temperature(ENRICHMENT_TEMPERATURE)
        .with_max_tokens(ENRICHMENT_MAX_TOKENS)
        .with_json_response();

        let response = self.llm.complete(request).await?;
        debug!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Book enrichment response received"
        );

        match parse_book_response(&response.content) {
            Ok(lookup) => Ok(lookup),
            Err(reason) => {
                warn!(
                    model = self.llm.model_name(),
                    raw_response = %response.content,
                    error = %reason,
                    "Unparseable book enrichment response"
                );
                Ok(BookLookup::Unidentified {
                    reason: format!("unparseable response: {reason}"),
                })
            }
        }
    }
}

// ── Prompt construction ─────────────────────────────────────────────

fn build_enrichment_system_prompt() -> String {
    "You are a helpful assistant that provides book details in JSON format.\n\
     Respond with ONLY a JSON object, no prose and no markdown.\n\
     When you can identify the book: {\"title\": \"<full title>\", \"author\": \"<author(s), comma separated>\"}\n\
     When no book plausibly matches: {\"error\": \"<short reason>\"}"
        .to_string()
}

fn build_enrichment_user_prompt(fragment: &str) -> String {
    format!(
        "Give me the full title and author of this book as JSON with keys \"title\" and \"author\". \
         If it doesn't seem a title exists, respond with a JSON key \"error\". \
         The book title is close to: {fragment}"
    )
}

// ── Response parsing ────────────────────────────────────────────────

/// Parse the LLM reply into a `BookLookup`.
fn parse_book_response(raw: &str) -> Result<BookLookup, String> {
    let json_str = extract_json_object(raw);
    let value: Value =
        serde_json::from_str(&json_str).map_err(|e| format!("JSON parse error: {e}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| "expected a JSON object".to_string())?;

    if let Some(error) = object.get("error") {
        let reason = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Ok(BookLookup::Unidentified { reason });
    }

    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    match (field("title"), field("author")) {
        (Some(title), Some(author)) => Ok(BookLookup::Found(BookDetails { title, author })),
        _ => Ok(BookLookup::Unidentified {
            reason: "response is missing title or author".to_string(),
        }),
    }
}

/// Extract a JSON object from LLM output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}
