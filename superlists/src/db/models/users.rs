//! Database models for users.
//!
//! Users have no password: they are created the first time a login token for
//! their email address is redeemed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database entity model
#[derive(Debug, Clone, FromRow, Serialize, PartialEq, Eq)]
pub struct User {
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub email: String,
}

pub type UserDBResponse = User;

/// Filter for listing users
#[derive(Debug, Clone)]
pub struct UserFilter {
    pub skip: i64,
    pub limit: i64,
}

impl Default for UserFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}
