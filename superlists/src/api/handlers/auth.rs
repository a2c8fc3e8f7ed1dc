use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, Uri, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::{debug, info};
use url::Url;

use crate::{
    AppState,
    api::models::{
        auth::{INVALID_EMAIL, LOGIN_EMAIL_SENT, LoginQuery, SendLoginEmailForm},
        users::CurrentUser,
    },
    auth::{passwordless, session},
    db::{
        errors::DbError,
        handlers::{Repository, Tokens, Users},
        models::tokens::TokenCreateDBRequest,
    },
    email::OutboundEmail,
    errors::Error,
    messages::{self, Message},
    types::abbrev_uid,
};

/// Redirect home, leaving a flash message for the next page.
fn redirect_home_with(message: Message) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, messages::set_cookie(&[message]))]),
        Redirect::to("/"),
    )
        .into_response()
}

/// Base URL for links in emails: the configured site URL, else whatever host the browser used.
fn site_url(state: &AppState, headers: &HeaderMap, uri: &Uri) -> Result<Url, Error> {
    if let Some(url) = &state.config.site_url {
        return Ok(url.clone());
    }

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .ok_or_else(|| Error::BadRequest {
            message: "Missing Host header".to_string(),
        })?;
    let scheme = if state.config.auth.session.cookie_secure { "https" } else { "http" };

    Url::parse(&format!("{scheme}://{host}")).map_err(|e| Error::BadRequest {
        message: format!("Invalid Host header: {e}"),
    })
}

/// The link a user follows to log in with token `uid`. A path on `base` is kept as a prefix.
fn login_url(base: &Url, uid: &str) -> Result<Url, Error> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let mut url = base.join("accounts/login").map_err(|e| Error::Internal {
        operation: format!("build login url: {e}"),
    })?;
    url.query_pairs_mut().clear().append_pair("token", uid);
    Ok(url)
}

/// Email a login link to the submitted address.
#[tracing::instrument(skip_all)]
pub async fn send_login_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Form(form): Form<SendLoginEmailForm>,
) -> Result<Response, Error> {
    let Some(address) = form.address() else {
        debug!("Rejected login request for an invalid email address");
        return Ok(redirect_home_with(Message::error(INVALID_EMAIL)));
    };
    let email = address.to_string();
    let base = site_url(&state, &headers, &uri)?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let token = Tokens::new(&mut conn).create(&TokenCreateDBRequest { email: email.clone() }).await?;
    let url = login_url(&base, &token.uid)?;

    state
        .mailer
        .send_mail(&OutboundEmail::login_link(&state.config.email.from_email, &email, &url))
        .await?;

    info!(uid = %abbrev_uid(&token.uid), "Sent login email");
    Ok(redirect_home_with(Message::success(LOGIN_EMAIL_SENT)))
}

/// Redeem a login link. Unknown or expired tokens just land on the home page, still anonymous.
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Query(query): Query<LoginQuery>) -> Result<Response, Error> {
    let Some(uid) = query.token.filter(|t| !t.is_empty()) else {
        return Ok(Redirect::to("/").into_response());
    };

    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    let Some(user) = passwordless::authenticate(&mut tx, &uid, &state.config.auth.login_token).await? else {
        debug!(uid = %abbrev_uid(&uid), "Login with unknown token");
        return Ok(Redirect::to("/").into_response());
    };
    let user = Users::new(&mut tx).record_login(&user.email, Utc::now()).await?;
    tx.commit().await.map_err(DbError::from)?;

    let token = session::create_session_token(&CurrentUser::from(user), &state.config)?;
    info!(uid = %abbrev_uid(&uid), "User logged in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, session::session_cookie(&token, &state.config))]),
        Redirect::to("/"),
    )
        .into_response())
}

/// End the session, whether or not there was one.
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, session::expired_session_cookie(&state.config))]),
        Redirect::to("/"),
    )
        .into_response()
}
