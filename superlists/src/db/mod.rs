//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Transactions
//!
//! Writes that touch more than one table (creating a list together with its first
//! item, redeeming a login token) run inside a single transaction:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let mut repo = Lists::new(&mut tx);
//! // ... operations ...
//! tx.commit().await?;
//! ```
//!
//! Read-only lookups may use a pooled connection directly.
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/` directory.
//! The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! superlists::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
