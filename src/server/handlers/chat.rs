use std::sync::Arc;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::core::errors::ApiError;
use crate::server::session::SessionId;
use crate::state::AppState;

const CHAT_PAGE: &str = include_str!("../../../static/chat.html");

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub msg: String,
}

pub async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// Answers one chat message as plain text.
pub async fn get_answer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let msg = form.msg.trim();
    if msg.is_empty() {
        return Err(ApiError::BadRequest("msg must not be empty".to_string()));
    }
    let max_chars = state.server.max_message_chars;
    if msg.chars().count() > max_chars {
        return Err(ApiError::BadRequest(format!(
            "msg must be at most {} characters",
            max_chars
        )));
    }

    let session = SessionId::from_headers(&headers);
    let response = match state.chain.invoke(session.as_str(), msg).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("Chat failed for session {}: {}", session.as_str(), err);
            state.metrics.record_upstream_error(err.service());
            return Err(err.into());
        }
    };
    tracing::debug!(
        "Session {} answered from {:?}",
        session.as_str(),
        response.sources
    );

    let mut res = (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        response.answer,
    )
        .into_response();
    if let Some((name, value)) = session.set_cookie() {
        res.headers_mut().insert(name, value);
    }
    Ok(res)
}
