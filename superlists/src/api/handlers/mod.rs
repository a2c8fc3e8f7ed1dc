//! HTTP request handlers.
//!
//! # Handler Modules
//!
//! - [`lists`]: home page, list pages and the new-item forms
//! - [`auth`]: passwordless login (send link, redeem link) and logout
//! - [`static_assets`]: embedded CSS and JavaScript
//!
//! Pages are server-rendered HTML. Every page shows the navbar for the current user and any
//! flash messages left by the previous redirect, so rendering goes through [`render_page`].

pub mod auth;
pub mod lists;
pub mod static_assets;

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use minijinja::{Value, context};

use crate::{
    AppState,
    auth::current_user::MaybeUser,
    errors::Error,
    messages::{self, IncomingMessages},
};

/// Render `template` with the navbar user and pending flash messages merged into `page`.
///
/// Shown messages are cleared from the browser by this response.
pub(crate) fn render_page(
    state: &AppState,
    template: &str,
    user: &MaybeUser,
    incoming: &IncomingMessages,
    page: Value,
) -> Result<Response, Error> {
    let html = state.templates.render(
        template,
        context! {
            user => user.0,
            messages => incoming.0,
            ..page
        },
    )?;

    let mut response = html.into_response();
    if !incoming.0.is_empty() {
        let clear = HeaderValue::from_str(&messages::clear_cookie()).map_err(|e| Error::Internal {
            operation: format!("build messages cookie: {e}"),
        })?;
        response.headers_mut().append(header::SET_COOKIE, clear);
    }

    Ok(response)
}
