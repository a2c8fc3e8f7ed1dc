//! Database record structures matching table schemas.

pub mod items;
pub mod lists;
pub mod tokens;
pub mod users;
