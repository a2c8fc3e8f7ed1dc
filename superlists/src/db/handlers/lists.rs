//! Database repository for to-do lists.

use sqlx::SqliteConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::lists::{List, ListCreateDBRequest, ListDBResponse, ListFilter},
    },
    types::ListId,
};

pub struct Lists<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Lists<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Lists<'c> {
    type CreateRequest = ListCreateDBRequest;
    type Response = ListDBResponse;
    type Id = ListId;
    type Filter = ListFilter;

    #[instrument(skip(self, _request), err)]
    async fn create(&mut self, _request: &Self::CreateRequest) -> Result<Self::Response> {
        let list = sqlx::query_as::<_, List>("INSERT INTO lists DEFAULT VALUES RETURNING id, created_at")
            .fetch_one(&mut *self.db)
            .await?;

        Ok(list)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let list = sqlx::query_as::<_, List>("SELECT id, created_at FROM lists WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(list)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let lists = sqlx::query_as::<_, List>("SELECT id, created_at FROM lists ORDER BY id LIMIT ? OFFSET ?")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(lists)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lists WHERE id = ?").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}
