//! Instruction templates for the two LLM calls of the chain.

/// Rewrites the latest question so it stands alone without the chat history.
pub const CONTEXTUALIZE_SYSTEM_PROMPT: &str = "Given a chat history and the latest user question \
which might reference context in the chat history, formulate a standalone question which can be \
understood without the chat history. Do NOT answer the question, just reformulate it if needed \
and otherwise return it as is.";

const QA_SYSTEM_TEMPLATE: &str = "You're an e-commerce bot answering product-related queries \
based on reviews and titles. Stick to the context. Be concise and helpful. Name the products \
you refer to. If the context does not cover the question, say so.

CONTEXT:
{context}";

/// QA instruction with `{context}` filled in.
pub fn qa_system_prompt(context: &str) -> String {
    QA_SYSTEM_TEMPLATE.replace("{context}", context)
}
