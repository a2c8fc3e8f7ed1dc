//! Request models for the passwordless login endpoints.

use lettre::Address;
use serde::Deserialize;

pub const LOGIN_EMAIL_SENT: &str = "Check your email, we've sent you a link you can use to log in.";
pub const INVALID_EMAIL: &str = "That doesn't look like a valid email address.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendLoginEmailForm {
    #[serde(default)]
    pub email: String,
}

impl SendLoginEmailForm {
    /// The submitted address, if it parses as a single email address.
    pub fn address(&self) -> Option<Address> {
        self.email.trim().parse::<Address>().ok()
    }
}

/// Query string of the link in the login email.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    pub token: Option<String>,
}
