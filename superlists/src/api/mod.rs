//! HTTP layer: page handlers and the form/query types they accept.
//!
//! - **[`handlers`]**: axum handlers, grouped by area
//! - **[`models`]**: form bodies, query strings and the user shown in the navbar
//!
//! # Routes
//!
//! - `GET /`: home page with the new list form
//! - `POST /lists/new`: start a list with its first item
//! - `GET /lists/{id}/`, `POST /lists/{id}/`: view a list, add an item to it
//! - `POST /accounts/send_login_email`, `GET /accounts/login`, `GET /accounts/logout`
//! - `GET /static/{*path}`: embedded CSS and JavaScript
//!
//! Form handlers answer with a `303 See Other` on success, so a refresh never resubmits.

pub mod handlers;
pub mod models;
