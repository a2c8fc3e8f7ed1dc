use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::{passwordless, session, utils::cookie_values},
    config::Config,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract the session claims from the JWT session cookie if present and valid.
/// Invalid or expired cookies are skipped; they are expected once a session times out.
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &Config) -> Option<CurrentUser> {
    cookie_values(&parts.headers, &config.auth.session.cookie_name).find_map(|value| {
        session::verify_session_token(value, config)
            .inspect_err(|e| trace!("Ignoring session cookie: {e}"))
            .ok()
    })
}

/// The user behind the request's session cookie, if any.
///
/// The cookie only names an email; the user is re-read through [`passwordless::get_user`] so a
/// deleted account stops being logged in straight away.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(claimed) = try_jwt_session_auth(parts, &state.config) else {
            trace!("No valid session cookie");
            return Ok(MaybeUser(None));
        };

        let mut conn = state.db.acquire().await.map_err(crate::db::errors::DbError::from)?;
        let user = passwordless::get_user(&mut conn, &claimed.email).await?;
        if user.is_none() {
            debug!("Session cookie names an unknown user");
        }

        Ok(MaybeUser(user.map(CurrentUser::from)))
    }
}
