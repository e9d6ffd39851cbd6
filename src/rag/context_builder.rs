//! Formats retrieved reviews into the `{context}` block of the QA prompt.

use crate::vector::ScoredDocument;

/// Shown in place of context when retrieval found nothing.
pub const EMPTY_CONTEXT: &str = "(no matching reviews)";

pub fn format_context(documents: &[ScoredDocument]) -> String {
    if documents.is_empty() {
        return EMPTY_CONTEXT.to_string();
    }

    documents
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            format!(
                "[{}] Product: {}\nReview: {}",
                i + 1,
                scored.document.metadata.product_title,
                scored.document.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Distinct product titles in retrieval order.
pub fn source_titles(documents: &[ScoredDocument]) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for scored in documents {
        let title = &scored.document.metadata.product_title;
        if !title.is_empty() && !titles.contains(title) {
            titles.push(title.clone());
        }
    }
    titles
}
