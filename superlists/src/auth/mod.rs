//! Passwordless authentication.
//!
//! Nobody has a password. A visitor submits an email address and is mailed a link carrying a
//! one-off token; following the link logs them in, creating the user on first use.
//!
//! # Flow
//!
//! 1. `POST /accounts/send_login_email` stores a token for the address and mails
//!    `/accounts/login?token=<uid>`.
//! 2. `GET /accounts/login?token=<uid>` calls [`passwordless::authenticate`]. A known token yields
//!    the user, and the response sets a signed session cookie (see [`session`]).
//! 3. Every page resolves the cookie back to a user through the [`current_user::MaybeUser`]
//!    extractor. Anonymous visitors are fine; nothing in the app requires login.
//! 4. `GET /accounts/logout` expires the cookie.
//!
//! Tokens never expire unless `auth.login_token.lifetime` is set, and are not consumed on use.
//!
//! # Modules
//!
//! - [`current_user`]: the optional-user extractor used by page handlers
//! - [`middleware`]: `allowed_hosts` enforcement
//! - [`passwordless`]: token lookup and user resolution
//! - [`session`]: JWT session cookies
//! - [`utils`]: cookie and host header helpers

pub mod current_user;
pub mod middleware;
pub mod passwordless;
pub mod session;
pub mod utils;
