//! Database repository for users.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::instrument;

use crate::db::{
    errors::Result,
    handlers::repository::Repository,
    models::users::{User, UserCreateDBRequest, UserDBResponse, UserFilter},
};

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Fetch the user for `email`, creating it if this is its first login.
    #[instrument(skip(self), err)]
    pub async fn get_or_create(&mut self, email: &str) -> Result<UserDBResponse> {
        sqlx::query("INSERT INTO users (email) VALUES (?) ON CONFLICT (email) DO NOTHING")
            .bind(email)
            .execute(&mut *self.db)
            .await?;

        let user = sqlx::query_as::<_, User>("SELECT email, created_at, last_login FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn record_login(&mut self, email: &str, at: DateTime<Utc>) -> Result<UserDBResponse> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login = ? WHERE email = ? RETURNING email, created_at, last_login",
        )
        .bind(at)
        .bind(email)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = String;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, User>("INSERT INTO users (email) VALUES (?) RETURNING email, created_at, last_login")
            .bind(&request.email)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, User>("SELECT email, created_at, last_login FROM users WHERE email = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, User>("SELECT email, created_at, last_login FROM users ORDER BY created_at, email LIMIT ? OFFSET ?")
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE email = ?").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_user_is_valid_with_email_only(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo
            .create(&UserCreateDBRequest {
                email: "a@b.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "a@b.com");
        assert!(user.last_login.is_none());

        let found = repo.get_by_id("a@b.com".to_string()).await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_email_is_primary_key(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let request = UserCreateDBRequest {
            email: "a@b.com".to_string(),
        };
        repo.create(&request).await.unwrap();
        let err = repo.create(&request).await.unwrap_err();
        assert!(err.is_unique_violation_on("users"), "unexpected error: {err:?}");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_or_create_is_idempotent(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let first = repo.get_or_create("edith@example.com").await.unwrap();
        let second = repo.get_or_create("edith@example.com").await.unwrap();
        assert_eq!(first, second);

        let all = repo.list(&UserFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_record_login(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        repo.get_or_create("edith@example.com").await.unwrap();
        let user = repo.record_login("edith@example.com", Utc::now()).await.unwrap();
        assert!(user.last_login.is_some());

        assert!(repo.delete("edith@example.com".to_string()).await.unwrap());
        assert!(repo.get_by_id("edith@example.com".to_string()).await.unwrap().is_none());
    }
}
