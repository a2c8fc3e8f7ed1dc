//! Database models for to-do lists.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::ListId;

/// Database entity model
#[derive(Debug, Clone, FromRow)]
pub struct List {
    pub id: ListId,
    pub created_at: DateTime<Utc>,
}

/// Lists carry no user data of their own; everything lives on their items.
#[derive(Debug, Clone, Default)]
pub struct ListCreateDBRequest;

pub type ListDBResponse = List;

/// Filter for listing lists
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub skip: i64,
    pub limit: i64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}
