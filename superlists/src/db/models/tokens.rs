//! Database models for login tokens.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::TokenUid;

/// Database entity model
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    pub uid: TokenUid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Token {
    /// Whether the token is older than `lifetime`. Tokens without a lifetime never expire.
    pub fn is_expired(&self, lifetime: Option<std::time::Duration>, now: DateTime<Utc>) -> bool {
        match lifetime.and_then(|l| chrono::Duration::from_std(l).ok()) {
            Some(lifetime) => self.created_at + lifetime < now,
            None => false,
        }
    }
}

/// Request for creating a login token. The uid is generated on insert.
#[derive(Debug, Clone)]
pub struct TokenCreateDBRequest {
    pub email: String,
}

pub type TokenDBResponse = Token;

/// Filter for login tokens
#[derive(Debug, Clone, Default)]
pub struct TokenFilter {
    pub email: Option<String>,
}
