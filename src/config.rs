//! Configuration types.
//!
//! Every identifier the triage run needs is read once at startup into an
//! immutable [`TriageConfig`] that is shared by reference with every item.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default model used for book enrichment.
pub const DEFAULT_ENRICHMENT_MODEL: &str = "gpt-4o-mini";

pub const NOTION_API_KEY: &str = "NOTION_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const SOURCE_DATABASE_ID: &str = "SOURCE_DATABASE_ID";
pub const LIFE_LESSONS_DATABASE_ID: &str = "LIFE_LESSONS_DATABASE_ID";
pub const JOURNAL_DATABASE_ID: &str = "JOURNAL_DATABASE_ID";
pub const READING_DATABASE_ID: &str = "READING_DATABASE_ID";
pub const NEW_BOOK_TEMPLATE_ID: &str = "NEW_BOOK_TEMPLATE_ID";
pub const ENRICHMENT_MODEL: &str = "INBOX_TRIAGE_MODEL";

/// Required variables, in the order they are reported when missing.
const REQUIRED_VARS: [&str; 7] = [
    NOTION_API_KEY,
    OPENAI_API_KEY,
    SOURCE_DATABASE_ID,
    LIFE_LESSONS_DATABASE_ID,
    JOURNAL_DATABASE_ID,
    READING_DATABASE_ID,
    NEW_BOOK_TEMPLATE_ID,
];

/// Triage run configuration.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// Notion integration token.
    pub notion_api_key: SecretString,
    /// API key for the enrichment (text-completion) service.
    pub openai_api_key: SecretString,
    /// Database holding the inbox items.
    pub source_database_id: String,
    /// Destination for principles and quotes.
    pub life_lessons_database_id: String,
    /// Destination for journal prompts.
    pub journal_database_id: String,
    /// Destination for books.
    pub reading_database_id: String,
    /// Page whose icon is copied onto new book records.
    pub book_template_id: String,
    /// Model used to resolve book details.
    pub enrichment_model: String,
}

impl TriageConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values count as missing. When anything is missing the error names
    /// every absent variable, not just the first one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .into_iter()
            .filter(|key| get(*key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnvVars(missing));
        }

        let required = |key: &str| {
            get(key).ok_or_else(|| ConfigError::MissingEnvVars(vec![key.to_string()]))
        };

        Ok(Self {
            notion_api_key: SecretString::from(required(NOTION_API_KEY)?),
            openai_api_key: SecretString::from(required(OPENAI_API_KEY)?),
            source_database_id: required(SOURCE_DATABASE_ID)?,
            life_lessons_database_id: required(LIFE_LESSONS_DATABASE_ID)?,
            journal_database_id: required(JOURNAL_DATABASE_ID)?,
            reading_database_id: required(READING_DATABASE_ID)?,
            book_template_id: required(NEW_BOOK_TEMPLATE_ID)?,
            enrichment_model: get(ENRICHMENT_MODEL)
                .unwrap_or_else(|| DEFAULT_ENRICHMENT_MODEL.to_string()),
        })
    }
}
