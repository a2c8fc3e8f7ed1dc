//! Request models deserialized at the HTTP boundary, plus the user model shared with templates.

pub mod auth;
pub mod lists;
pub mod users;
