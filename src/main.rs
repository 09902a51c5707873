use std::sync::Arc;

use anyhow::Context;

use inbox_triage::config::TriageConfig;
use inbox_triage::error::Result;
use inbox_triage::llm::{LlmBackend, LlmConfig, create_provider};
use inbox_triage::pipeline::{BookEnricher, InboxTriage, RunSummary, TriageDeps};
use inbox_triage::store::{NotionClient, RecordStore};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Warning: rustls crypto provider was already installed");
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let summary = run().await.context("inbox triage failed")?;

    eprintln!(
        "   Done: {} fetched, {} filed, {} deferred, {} skipped, {} ignored",
        summary.fetched, summary.filed, summary.deferred, summary.skipped, summary.ignored
    );

    Ok(())
}

/// Validate configuration, build the clients and process one batch.
async fn run() -> Result<RunSummary> {
    // All settings are validated before the store is touched.
    let config = Arc::new(TriageConfig::from_env()?);

    eprintln!("📥 Inbox triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Source: {}", config.source_database_id);
    eprintln!("   Model: {}\n", config.enrichment_model);

    let llm_config = LlmConfig {
        backend: LlmBackend::for_model(&config.enrichment_model),
        api_key: config.openai_api_key.clone(),
        model: config.enrichment_model.clone(),
    };
    let llm = create_provider(&llm_config)?;

    let store: Arc<dyn RecordStore> = Arc::new(NotionClient::new(config.notion_api_key.clone()));

    let deps = TriageDeps {
        store,
        enricher: Arc::new(BookEnricher::new(llm)),
        config,
    };

    Ok(InboxTriage::new(deps).run().await?)
}
