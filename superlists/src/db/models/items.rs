//! Database models for list items.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::types::{ItemId, ListId};

/// Database entity model
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub list_id: ListId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Request for adding an item to a list. `text` must already be validated.
#[derive(Debug, Clone)]
pub struct ItemCreateDBRequest {
    pub list_id: ListId,
    pub text: String,
}

pub type ItemDBResponse = Item;

/// Filter for listing items
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub list_id: Option<ListId>,
}

impl ItemFilter {
    pub fn for_list(list_id: ListId) -> Self {
        Self { list_id: Some(list_id) }
    }
}
