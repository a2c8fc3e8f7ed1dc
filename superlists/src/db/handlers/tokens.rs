//! Database repository for login tokens.

use sqlx::SqliteConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::tokens::{Token, TokenCreateDBRequest, TokenDBResponse, TokenFilter},
    },
    types::{TokenUid, abbrev_uid},
};

pub struct Tokens<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Tokens<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Tokens<'c> {
    type CreateRequest = TokenCreateDBRequest;
    type Response = TokenDBResponse;
    type Id = TokenUid;
    type Filter = TokenFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let uid = Uuid::new_v4().to_string();

        let token = sqlx::query_as::<_, Token>("INSERT INTO tokens (uid, email) VALUES (?, ?) RETURNING uid, email, created_at")
            .bind(&uid)
            .bind(&request.email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(token)
    }

    #[instrument(skip(self, id), fields(uid = %abbrev_uid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let token = sqlx::query_as::<_, Token>("SELECT uid, email, created_at FROM tokens WHERE uid = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(token)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let tokens = match &filter.email {
            Some(email) => {
                sqlx::query_as::<_, Token>("SELECT uid, email, created_at FROM tokens WHERE email = ? ORDER BY created_at")
                    .bind(email)
                    .fetch_all(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Token>("SELECT uid, email, created_at FROM tokens ORDER BY created_at")
                    .fetch_all(&mut *self.db)
                    .await?
            }
        };

        Ok(tokens)
    }

    #[instrument(skip(self, id), fields(uid = %abbrev_uid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tokens WHERE uid = ?").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}
