//! One-shot ingestion: embed the review CSV and upsert it into the collection.
//!
//! Usage: `ingest [CSV_PATH]`. The path defaults to `ingest.csv_path`.

use std::path::PathBuf;

use anyhow::Context;

use review_rag::core::config::settings::VectorBackend;
use review_rag::core::config::ConfigService;
use review_rag::core::logging;
use review_rag::documents::{load_reviews, ColumnNames};
use review_rag::ingest::VectorIngestor;
use review_rag::state::Services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigService::load().context("Failed to load configuration")?;
    logging::init(&config.settings.logging);

    let ingest = &config.settings.ingest;
    let csv_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| ingest.csv_path.clone());

    let documents = load_reviews(&csv_path, &ColumnNames::from(ingest))
        .with_context(|| format!("Failed to load reviews from {}", csv_path.display()))?;

    if config.settings.vector_store.backend == VectorBackend::Memory {
        tracing::warn!("vector_store.backend is memory; ingested documents are dropped on exit");
    }

    let services = Services::connect(&config)?;
    let ingestor = VectorIngestor::new(
        services.embedder.clone(),
        services.store.clone(),
        ingest.batch_size,
    );
    let handle = ingestor
        .ingest(documents, false)
        .await
        .context("Ingestion failed")?;

    let total = services
        .store
        .count()
        .await
        .context("Failed to count collection")?;
    tracing::info!(
        "Upserted {} documents into {} ({} stored)",
        handle.upserted,
        handle.name,
        total
    );

    Ok(())
}
