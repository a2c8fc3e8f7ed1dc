//! Repository implementations for database access.
//!
//! Each repository wraps a borrowed `SqliteConnection` (a pooled connection or an
//! open transaction) and implements the [`Repository`] trait for one table.
//!
//! # Available Repositories
//!
//! - [`Lists`]: to-do lists
//! - [`Items`]: the items on a list, plus the duplicate check used by the list views
//! - [`Users`]: passwordless user accounts keyed by email
//! - [`Tokens`]: login link tokens sent by email
//!
//! # Common Pattern
//!
//! ```ignore
//! use superlists::db::handlers::{Lists, Items, Repository};
//!
//! let mut tx = pool.begin().await?;
//! let list = Lists::new(&mut tx).create(&ListCreateDBRequest).await?;
//! Items::new(&mut tx).create(&ItemCreateDBRequest { list_id: list.id, text }).await?;
//! tx.commit().await?;
//! ```

pub mod items;
pub mod lists;
pub mod repository;
pub mod tokens;
pub mod users;

pub use items::Items;
pub use lists::Lists;
pub use repository::Repository;
pub use tokens::Tokens;
pub use users::Users;
