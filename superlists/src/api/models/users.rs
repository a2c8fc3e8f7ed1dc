//! API models for users.

use serde::Serialize;

use crate::db::models::users::UserDBResponse;

/// The logged-in user, as seen by handlers and templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub email: String,
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self { email: db.email }
    }
}
