//! Identifier types shared across the database and API layers.

/// Primary key of a to-do list.
pub type ListId = i64;

/// Primary key of a list item.
pub type ItemId = i64;

/// Login tokens are identified by a UUIDv4 rendered as a string.
pub type TokenUid = String;

/// Shorten a token uid for logging so full login secrets never reach the logs.
pub fn abbrev_uid(uid: &str) -> String {
    uid.chars().take(8).collect()
}
