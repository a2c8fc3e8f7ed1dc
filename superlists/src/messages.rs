//! One-shot flash messages carried across a redirect in a cookie.
//!
//! A handler that redirects attaches [`set_cookie`]; the page rendered next reads the messages
//! with [`IncomingMessages`] and clears the cookie in the same response.

use axum::{extract::FromRequestParts, http::request::Parts};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::trace;

use crate::auth::utils::cookie_values;

pub const COOKIE_NAME: &str = "superlists_messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub message: String,
}

impl Message {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

fn encode(messages: &[Message]) -> String {
    // Serializing plain strings and enums cannot fail
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode(value: &str) -> Option<Vec<Message>> {
    let json = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&json).ok()
}

/// `Set-Cookie` value storing `messages` for the next page.
pub fn set_cookie(messages: &[Message]) -> String {
    format!("{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax", encode(messages))
}

/// `Set-Cookie` value removing the messages cookie.
pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Messages left by the previous response. Unreadable cookies count as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingMessages(pub Vec<Message>);

impl<S: Send + Sync> FromRequestParts<S> for IncomingMessages {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let messages: Vec<Message> = cookie_values(&parts.headers, COOKIE_NAME)
            .filter(|value| !value.is_empty())
            .filter_map(|value| {
                let decoded = decode(value);
                if decoded.is_none() {
                    trace!("Ignoring unreadable messages cookie");
                }
                decoded
            })
            .flatten()
            .collect();

        Ok(IncomingMessages(messages))
    }
}
