//! Passwordless authentication backend.
//!
//! A user proves they own an email address by presenting the uid of a [`Token`] that was mailed
//! to it. There are no passwords; the user row is created the first time a token is redeemed.
//!
//! [`Token`]: crate::db::models::tokens::Token

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, instrument};

use crate::{
    config::LoginTokenConfig,
    db::{
        errors::Result,
        handlers::{Repository, Tokens, Users},
        models::users::UserDBResponse,
    },
    types::abbrev_uid,
};

/// Exchange a login token uid for its user.
///
/// Returns `None` for unknown uids and, when a lifetime is configured, for expired tokens.
/// Otherwise the user for the token's email is fetched or created.
#[instrument(skip(db, uid, config), fields(uid = %abbrev_uid(uid)), err)]
pub async fn authenticate(db: &mut SqliteConnection, uid: &str, config: &LoginTokenConfig) -> Result<Option<UserDBResponse>> {
    let Some(token) = Tokens::new(db).get_by_id(uid.to_string()).await? else {
        debug!("No token found for uid");
        return Ok(None);
    };

    if token.is_expired(config.lifetime, Utc::now()) {
        debug!("Token has expired");
        return Ok(None);
    }

    let user = Users::new(db).get_or_create(&token.email).await?;
    Ok(Some(user))
}

/// Look a user up by primary key (their email).
#[instrument(skip(db), err)]
pub async fn get_user(db: &mut SqliteConnection, email: &str) -> Result<Option<UserDBResponse>> {
    Users::new(db).get_by_id(email.to_string()).await
}
