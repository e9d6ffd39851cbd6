//! Conversational question answering over product reviews.
//!
//! Reviews are loaded from CSV, embedded, and stored in a vector collection.
//! Each chat message is rewritten into a standalone question against the
//! session history, the nearest reviews are retrieved, and the hosted LLM
//! answers from them.

pub mod core;
pub mod documents;
pub mod embedding;
pub mod history;
pub mod ingest;
pub mod llm;
pub mod metrics;
pub mod rag;
pub mod server;
pub mod state;
pub mod vector;
pub mod vector_math;
