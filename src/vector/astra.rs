//! Astra DB vector store.
//!
//! Talks to the Astra DB Data API (JSON over HTTPS). Entries are stored as
//! `{_id, content, metadata, $vector}` in a collection with cosine metric.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::store::{ScoredDocument, VectorStore};
use crate::core::config::settings::VectorStoreSettings;
use crate::core::config::Credentials;
use crate::core::errors::UpstreamServiceError;
use crate::documents::{Document, DocumentMetadata};

const API_PATH: &str = "api/json/v1";
const TOKEN_HEADER: &str = "Token";

#[derive(Clone)]
pub struct AstraDbStore {
    keyspace_url: String,
    collection_url: String,
    collection: String,
    token: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct DataApiResponse {
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<DataApiError>,
}

#[derive(Debug, Deserialize)]
struct DataApiError {
    message: String,
    #[serde(rename = "errorCode", default)]
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoredEntry {
    #[serde(rename = "_id")]
    id: Value,
    #[serde(default)]
    content: String,
    #[serde(default)]
    metadata: Option<DocumentMetadata>,
    #[serde(rename = "$similarity", default)]
    similarity: Option<f32>,
}

impl AstraDbStore {
    pub fn new(
        settings: &VectorStoreSettings,
        credentials: &Credentials,
    ) -> Result<Self, UpstreamServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| UpstreamServiceError::VectorStore(e.to_string()))?;

        let keyspace_url = format!(
            "{}/{}/{}",
            credentials.astra_db_endpoint.trim_end_matches('/'),
            API_PATH,
            credentials.astra_db_keyspace
        );
        let collection_url = format!("{}/{}", keyspace_url, settings.collection);

        Ok(Self {
            keyspace_url,
            collection_url,
            collection: settings.collection.clone(),
            token: credentials.astra_db_token.clone(),
            client,
        })
    }

    async fn command(&self, url: &str, body: Value) -> Result<DataApiResponse, UpstreamServiceError> {
        let res = self
            .client
            .post(url)
            .header(TOKEN_HEADER, &self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| UpstreamServiceError::VectorStore(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(UpstreamServiceError::VectorStore(format!(
                "HTTP {}: {}",
                status, text
            )));
        }

        let payload: DataApiResponse = res
            .json()
            .await
            .map_err(|e| UpstreamServiceError::VectorStore(format!("malformed response: {}", e)))?;

        // The Data API reports command failures inside a 200 response.
        if let Some(first) = payload.errors.first() {
            let code = first.error_code.as_deref().unwrap_or("UNKNOWN");
            return Err(UpstreamServiceError::VectorStore(format!(
                "{}: {}",
                code, first.message
            )));
        }

        Ok(payload)
    }
}

#[async_trait]
impl VectorStore for AstraDbStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn ensure_collection(&self, dimension: usize) -> Result<(), UpstreamServiceError> {
        let body = json!({
            "createCollection": {
                "name": self.collection,
                "options": {
                    "vector": { "dimension": dimension, "metric": "cosine" }
                }
            }
        });
        self.command(&self.keyspace_url, body).await?;
        tracing::info!(
            "Collection {} ready (dimension {})",
            self.collection,
            dimension
        );
        Ok(())
    }

    async fn upsert(&self, document: &Document, embedding: &[f32]) -> Result<(), UpstreamServiceError> {
        let body = json!({
            "findOneAndReplace": {
                "filter": { "_id": document.id },
                "replacement": {
                    "_id": document.id,
                    "content": document.content,
                    "metadata": document.metadata,
                    "$vector": embedding,
                },
                "options": { "upsert": true }
            }
        });
        self.command(&self.collection_url, body).await?;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ScoredDocument>, UpstreamServiceError> {
        let body = json!({
            "find": {
                "sort": { "$vector": query_embedding },
                "projection": { "$vector": 0 },
                "options": { "limit": limit, "includeSimilarity": true }
            }
        });
        let payload = self.command(&self.collection_url, body).await?;

        let documents = payload
            .data
            .as_ref()
            .and_then(|data| data.get("documents"))
            .cloned()
            .unwrap_or(Value::Array(Vec::new()));
        let entries: Vec<StoredEntry> = serde_json::from_value(documents)
            .map_err(|e| UpstreamServiceError::VectorStore(format!("malformed documents: {}", e)))?;

        Ok(entries.into_iter().map(into_scored).collect())
    }

    async fn count(&self) -> Result<usize, UpstreamServiceError> {
        let payload = self
            .command(&self.collection_url, json!({ "countDocuments": {} }))
            .await?;
        payload
            .status
            .as_ref()
            .and_then(|status| status.get("count"))
            .and_then(Value::as_u64)
            .map(|count| count as usize)
            .ok_or_else(|| UpstreamServiceError::VectorStore("count missing from response".to_string()))
    }
}

fn into_scored(entry: StoredEntry) -> ScoredDocument {
    let id = match entry.id {
        Value::String(id) => id,
        other => other.to_string(),
    };
    ScoredDocument {
        document: Document {
            id,
            content: entry.content,
            metadata: entry.metadata.unwrap_or(DocumentMetadata {
                product_title: String::new(),
            }),
        },
        score: entry.similarity.unwrap_or_default(),
    }
}
