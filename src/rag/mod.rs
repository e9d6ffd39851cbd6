//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `ConversationalChain`: history-aware reformulate → retrieve → answer flow
//! - `ChainStages`: the stage interface, implemented by `RetrievalStages`
//! - prompt templates and context formatting for the two LLM calls

mod chain;
mod context_builder;
pub mod prompts;

pub use chain::{ChainOptions, ChainResponse, ChainStages, ConversationalChain, RetrievalStages};
pub use context_builder::{format_context, source_titles};
