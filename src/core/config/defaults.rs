pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 4_000;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.5;

pub const DEFAULT_EMBEDDING_BASE_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_EMBEDDING_MODEL: &str = "BAAI/bge-base-en-v1.5";
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 768;

pub const DEFAULT_COLLECTION: &str = "flipkart";

pub const DEFAULT_CSV_PATH: &str = "data/flipkart_product_review.csv";
pub const DEFAULT_TITLE_COLUMN: &str = "product_title";
pub const DEFAULT_REVIEW_COLUMN: &str = "review";
pub const DEFAULT_INGEST_BATCH_SIZE: usize = 32;

pub const DEFAULT_TOP_K: usize = 3;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "server.log";
