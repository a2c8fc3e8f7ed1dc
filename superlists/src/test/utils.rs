//! Test utilities for integration testing
use std::{collections::BTreeMap, sync::Arc};

use axum::http::{HeaderValue, header};
use axum_test::{TestResponse, TestServer};
use sqlx::SqlitePool;
use url::Url;

use crate::{
    AppState,
    config::{Config, EmailTransportConfig},
    email::{Mailer, Outbox},
    templates::Templates,
};

pub fn create_test_config() -> Config {
    let mut config = Config {
        port: 0,
        site_url: Some(Url::parse("http://testserver").expect("valid test url")),
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        allowed_hosts: vec!["*".to_string()],
        ..Default::default()
    };
    config.email.transport = EmailTransportConfig::Memory;
    config
}

/// App state on `pool` whose mail lands in the returned [`Outbox`].
pub fn create_test_state(pool: SqlitePool) -> (AppState, Arc<Outbox>) {
    create_test_state_with_config(pool, create_test_config())
}

pub fn create_test_state_with_config(pool: SqlitePool, config: Config) -> (AppState, Arc<Outbox>) {
    let outbox = Arc::new(Outbox::default());
    let mailer: Arc<dyn Mailer> = outbox.clone();

    let state = AppState::builder()
        .db(pool)
        .config(config)
        .mailer(mailer)
        .templates(Templates::new().expect("Failed to build templates"))
        .build();

    (state, outbox)
}

/// The full router on `pool`, plus the outbox it sends mail to.
pub fn create_test_server(pool: SqlitePool) -> (TestServer, Arc<Outbox>) {
    let (state, outbox) = create_test_state(pool);
    let server = TestServer::new(crate::build_router(state)).expect("Failed to create test server");
    (server, outbox)
}

/// Every `Set-Cookie` header on a response.
pub fn set_cookies(response: &TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// A `Cookie` header sending back the live cookies from `set_cookies`.
pub fn cookie_header(set_cookies: &[String]) -> HeaderValue {
    let mut jar = CookieJar::default();
    jar.store(set_cookies);
    jar.header()
}

/// Keeps cookies between requests the way a browser would: later `Set-Cookie` values replace
/// earlier ones and `Max-Age=0` deletes.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn update(&mut self, response: &TestResponse) {
        self.store(&set_cookies(response));
    }

    fn store(&mut self, set_cookies: &[String]) {
        for set_cookie in set_cookies {
            let mut attributes = set_cookie.split(';').map(str::trim);
            let Some((name, value)) = attributes.next().and_then(|pair| pair.split_once('=')) else {
                continue;
            };

            if attributes.any(|attribute| attribute.eq_ignore_ascii_case("Max-Age=0")) {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn header(&self) -> HeaderValue {
        let cookie = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&cookie).expect("cookie header should be valid")
    }
}

/// Pull the login link out of the most recent email in `outbox`.
pub async fn last_login_link(outbox: &Outbox) -> Url {
    let messages = outbox.messages().await;
    let email = messages.last().expect("an email should have been sent");
    let link = email
        .body
        .split_whitespace()
        .find(|word| word.starts_with("http"))
        .expect("email body should contain a link");
    Url::parse(link).expect("login link should be a valid url")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_jar_replaces_and_expires() {
        let mut jar = CookieJar::default();
        jar.store(&[
            "superlists_session=abc; Path=/; HttpOnly; Max-Age=60".to_string(),
            "superlists_messages=xyz; Path=/".to_string(),
        ]);
        assert_eq!(jar.get("superlists_session"), Some("abc"));
        assert_eq!(jar.header(), "superlists_messages=xyz; superlists_session=abc");

        jar.store(&["superlists_messages=; Path=/; Max-Age=0".to_string()]);
        assert_eq!(jar.get("superlists_messages"), None);
        assert_eq!(jar.header(), "superlists_session=abc");
    }
}
