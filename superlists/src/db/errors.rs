use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
        /// Columns named by SQLite in the error message, e.g. `items.list_id, items.text`
        columns: Option<String>,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbError {
    /// True when this is a unique violation raised by `table`.
    pub fn is_unique_violation_on(&self, table: &str) -> bool {
        matches!(self, DbError::UniqueViolation { table: Some(t), .. } if t == table)
    }
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                // SQLite doesn't report table/constraint separately, so fall back to parsing the message
                let columns = constrained_columns(db_err.message());
                let table = db_err
                    .table()
                    .map(|s| s.to_string())
                    .or_else(|| columns.as_deref().and_then(table_from_columns));

                if db_err.is_unique_violation() {
                    DbError::UniqueViolation {
                        constraint: db_err.constraint().map(|s| s.to_string()),
                        table,
                        message: db_err.message().to_string(),
                        columns,
                    }
                } else if db_err.is_foreign_key_violation() {
                    DbError::ForeignKeyViolation {
                        constraint: db_err.constraint().map(|s| s.to_string()),
                        table,
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_check_violation() {
                    DbError::CheckViolation {
                        constraint: db_err.constraint().map(|s| s.to_string()),
                        table,
                        message: db_err.message().to_string(),
                    }
                } else {
                    // All other database errors are non-recoverable - convert to anyhow
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Extract the column list from an SQLite constraint message.
///
/// SQLite reports e.g. `UNIQUE constraint failed: items.list_id, items.text`
/// or `CHECK constraint failed: trim(text) <> ''`.
fn constrained_columns(message: &str) -> Option<String> {
    let (_, rest) = message.split_once("constraint failed: ")?;
    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn table_from_columns(columns: &str) -> Option<String> {
    let first = columns.split(',').next()?.trim();
    let (table, column) = first.split_once('.')?;
    (!column.is_empty() && table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')).then(|| table.to_string())
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constrained_columns_from_unique_message() {
        let columns = constrained_columns("UNIQUE constraint failed: items.list_id, items.text");
        assert_eq!(columns.as_deref(), Some("items.list_id, items.text"));
        assert_eq!(table_from_columns("items.list_id, items.text").as_deref(), Some("items"));
    }

    #[test]
    fn test_check_message_has_no_table() {
        let columns = constrained_columns("CHECK constraint failed: trim(text) <> ''");
        assert_eq!(columns.as_deref(), Some("trim(text) <> ''"));
        assert_eq!(table_from_columns("trim(text) <> ''"), None);
    }

    #[test]
    fn test_unrelated_message() {
        assert_eq!(constrained_columns("database is locked"), None);
    }

    #[test]
    fn test_is_unique_violation_on() {
        let err = DbError::UniqueViolation {
            constraint: None,
            table: Some("items".to_string()),
            message: "UNIQUE constraint failed: items.list_id, items.text".to_string(),
            columns: Some("items.list_id, items.text".to_string()),
        };
        assert!(err.is_unique_violation_on("items"));
        assert!(!err.is_unique_violation_on("tokens"));
        assert!(!DbError::NotFound.is_unique_violation_on("items"));
    }
}
