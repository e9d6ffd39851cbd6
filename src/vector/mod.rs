//! Vector collection backends.
//!
//! - `AstraDbStore`: the hosted collection used in production
//! - `InMemoryVectorStore`: brute-force cosine search for local runs and tests

mod astra;
mod memory;
mod store;

pub use astra::AstraDbStore;
pub use memory::InMemoryVectorStore;
pub use store::{ScoredDocument, VectorStore};
