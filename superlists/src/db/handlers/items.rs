//! Database repository for list items.

use sqlx::SqliteConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::items::{Item, ItemCreateDBRequest, ItemDBResponse, ItemFilter},
    },
    types::{ItemId, ListId},
};

pub struct Items<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Items<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Whether `list_id` already holds an item with exactly this text.
    #[instrument(skip(self, text), err)]
    pub async fn exists_in_list(&mut self, list_id: ListId, text: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE list_id = ? AND text = ?)")
            .bind(list_id)
            .bind(text)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(exists)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Items<'c> {
    type CreateRequest = ItemCreateDBRequest;
    type Response = ItemDBResponse;
    type Id = ItemId;
    type Filter = ItemFilter;

    #[instrument(skip(self, request), fields(list_id = request.list_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (list_id, text)
            VALUES (?, ?)
            RETURNING id, list_id, text, created_at
            "#,
        )
        .bind(request.list_id)
        .bind(&request.text)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(item)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let item = sqlx::query_as::<_, Item>("SELECT id, list_id, text, created_at FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(item)
    }

    /// Items come back in insertion order, which is the order they are displayed in.
    #[instrument(skip(self, filter), fields(list_id = filter.list_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let items = match filter.list_id {
            Some(list_id) => {
                sqlx::query_as::<_, Item>("SELECT id, list_id, text, created_at FROM items WHERE list_id = ? ORDER BY id")
                    .bind(list_id)
                    .fetch_all(&mut *self.db)
                    .await?
            }
            None => {
                sqlx::query_as::<_, Item>("SELECT id, list_id, text, created_at FROM items ORDER BY id")
                    .fetch_all(&mut *self.db)
                    .await?
            }
        };

        Ok(items)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{
        errors::DbError,
        handlers::Lists,
        models::lists::ListCreateDBRequest,
    };
    use sqlx::SqlitePool;

    async fn new_list(conn: &mut SqliteConnection) -> ListId {
        Lists::new(conn).create(&ListCreateDBRequest).await.unwrap().id
    }

    fn item(list_id: ListId, text: &str) -> ItemCreateDBRequest {
        ItemCreateDBRequest {
            list_id,
            text: text.to_string(),
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_items_are_listed_in_insertion_order(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let list_id = new_list(&mut conn).await;
        let mut repo = Items::new(&mut conn);

        repo.create(&item(list_id, "item 1")).await.unwrap();
        repo.create(&item(list_id, "i")).await.unwrap();
        repo.create(&item(list_id, "3")).await.unwrap();

        let texts: Vec<String> = repo
            .list(&ItemFilter::for_list(list_id))
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.text)
            .collect();
        assert_eq!(texts, vec!["item 1", "i", "3"]);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_items_are_scoped_to_their_list(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let first = new_list(&mut conn).await;
        let second = new_list(&mut conn).await;
        let mut repo = Items::new(&mut conn);

        repo.create(&item(first, "itemey 1")).await.unwrap();
        repo.create(&item(second, "other list item")).await.unwrap();

        let items = repo.list(&ItemFilter::for_list(first)).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].text, "itemey 1");
        assert_eq!(items[0].list_id, first);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_items_are_rejected(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let list_id = new_list(&mut conn).await;
        let mut repo = Items::new(&mut conn);

        repo.create(&item(list_id, "bla")).await.unwrap();
        assert!(repo.exists_in_list(list_id, "bla").await.unwrap());

        let err = repo.create(&item(list_id, "bla")).await.unwrap_err();
        assert!(err.is_unique_violation_on("items"), "unexpected error: {err:?}");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_same_text_allowed_in_different_lists(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let first = new_list(&mut conn).await;
        let second = new_list(&mut conn).await;
        let mut repo = Items::new(&mut conn);

        repo.create(&item(first, "bla")).await.unwrap();
        repo.create(&item(second, "bla")).await.unwrap();
        assert!(!repo.exists_in_list(second, "other").await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_blank_items_are_rejected_by_the_database(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let list_id = new_list(&mut conn).await;
        let mut repo = Items::new(&mut conn);

        let err = repo.create(&item(list_id, "   ")).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }), "unexpected error: {err:?}");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_items_need_an_existing_list(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Items::new(&mut conn);

        let err = repo.create(&item(4242, "orphan")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "unexpected error: {err:?}");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_and_delete_item(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let list_id = new_list(&mut conn).await;
        let mut repo = Items::new(&mut conn);

        let created = repo.create(&item(list_id, "first")).await.unwrap();
        let found = repo.get_by_id(created.id).await.unwrap().expect("item should exist");
        assert_eq!(found.text, "first");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
