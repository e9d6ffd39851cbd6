//! Chat session identity carried in a cookie.

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    id: String,
    issued: bool,
}

impl SessionId {
    /// Reads the session cookie, issuing a fresh id when it is missing or malformed.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers, SESSION_COOKIE).and_then(|raw| Uuid::parse_str(raw).ok()) {
            Some(id) => Self {
                id: id.to_string(),
                issued: false,
            },
            None => Self {
                id: Uuid::new_v4().to_string(),
                issued: true,
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }

    /// `Set-Cookie` value for a newly issued id.
    pub fn set_cookie(&self) -> Option<(axum::http::HeaderName, HeaderValue)> {
        if !self.issued {
            return None;
        }
        let value = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE, self.id
        );
        HeaderValue::from_str(&value).ok().map(|v| (SET_COOKIE, v))
    }
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}
