use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults::*;

const REDACT_PLACEHOLDER: &str = "****";

/// Fully resolved configuration: secrets from the environment, tunables from YAML.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub settings: Settings,
}

/// Tokens and endpoints for the hosted services.
#[derive(Clone)]
pub struct Credentials {
    pub groq_api_key: String,
    pub astra_db_token: String,
    pub astra_db_keyspace: String,
    pub astra_db_endpoint: String,
    pub hf_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("groq_api_key", &REDACT_PLACEHOLDER)
            .field("astra_db_token", &REDACT_PLACEHOLDER)
            .field("astra_db_keyspace", &self.astra_db_keyspace)
            .field("astra_db_endpoint", &self.astra_db_endpoint)
            .field("hf_token", &REDACT_PLACEHOLDER)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub ingest: IngestSettings,
    pub rag: RagSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_message_chars: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
        }
    }
}

impl ServerSettings {
    /// `host:port`, with IPv6 literals bracketed.
    pub fn bind_addr(&self) -> String {
        match self.host.parse::<std::net::Ipv6Addr>() {
            Ok(_) => format!("[{}]:{}", self.host, self.port),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_LLM_TEMPERATURE,
            max_tokens: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EMBEDDING_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    pub backend: VectorBackend,
    pub collection: String,
    pub timeout_secs: u64,
}

/// Where the review collection lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorBackend {
    /// Astra DB Data API.
    #[default]
    Astra,
    /// Process memory; empty until ingested at startup.
    Memory,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            backend: VectorBackend::default(),
            collection: DEFAULT_COLLECTION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub csv_path: PathBuf,
    pub title_column: String,
    pub review_column: String,
    pub batch_size: usize,
    /// Rebuild the collection from `csv_path` when the server starts instead of
    /// attaching to the existing one.
    pub on_startup: bool,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            title_column: DEFAULT_TITLE_COLUMN.to_string(),
            review_column: DEFAULT_REVIEW_COLUMN.to_string(),
            batch_size: DEFAULT_INGEST_BATCH_SIZE,
            on_startup: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub top_k: usize,
    /// Number of most recent turns fed to the prompts; 0 keeps every turn.
    pub history_window: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            history_window: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_LOG_FILE.to_string(),
        }
    }
}
