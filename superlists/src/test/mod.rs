pub mod utils;

use axum::http::{HeaderValue, StatusCode, header};
use sqlx::SqlitePool;
use utils::{CookieJar, create_test_server, create_test_state_with_config, create_test_config, last_login_link};

fn location(response: &axum_test::TestResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("response should redirect")
        .to_string()
}

/// End-to-end: two visitors each start a list and only ever see their own items.
#[sqlx::test]
#[test_log::test]
async fn test_multiple_users_can_start_lists_at_different_urls(pool: SqlitePool) {
    let (server, _) = create_test_server(pool);

    // Edith starts a list
    let response = server.post("/lists/new").form(&[("text", "Buy peacock feathers")]).await;
    response.assert_status(StatusCode::SEE_OTHER);
    let edith_list = location(&response);
    assert!(edith_list.starts_with("/lists/") && edith_list.ends_with('/'));

    let response = server
        .post(&edith_list)
        .form(&[("text", "Use peacock feathers to make a fly")])
        .await;
    assert_eq!(location(&response), edith_list);

    let page = server.get(&edith_list).await.text();
    assert!(page.contains("1: Buy peacock feathers"));
    assert!(page.contains("2: Use peacock feathers to make a fly"));

    // Francis comes along on a fresh home page: nothing of Edith's is there
    let home = server.get("/").await.text();
    assert!(!home.contains("Buy peacock feathers"));
    assert!(!home.contains("make a fly"));

    let response = server.post("/lists/new").form(&[("text", "Buy milk")]).await;
    let francis_list = location(&response);
    assert_ne!(francis_list, edith_list);

    let page = server.get(&francis_list).await.text();
    assert!(page.contains("1: Buy milk"));
    assert!(!page.contains("peacock feathers"));
}

/// End-to-end: empty and duplicate items are refused with a message, and the list recovers.
#[sqlx::test]
#[test_log::test]
async fn test_item_validation_flow(pool: SqlitePool) {
    let (server, _) = create_test_server(pool);

    // Empty item on the home page
    let response = server.post("/lists/new").form(&[("text", "   ")]).await;
    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("You can&#x27;t have an empty list item"));

    // Then a real one
    let response = server.post("/lists/new").form(&[("text", "Buy milk")]).await;
    let list_url = location(&response);

    // Empty item on the list page
    let response = server.post(&list_url).form(&[("text", "")]).await;
    response.assert_status(StatusCode::OK);
    let html = response.text();
    assert!(html.contains("You can&#x27;t have an empty list item"));
    assert!(html.contains("1: Buy milk"));

    // Duplicate item
    let response = server.post(&list_url).form(&[("text", "Buy milk")]).await;
    response.assert_status(StatusCode::OK);
    let html = response.text();
    assert!(html.contains("You&#x27;ve already got this in your list"));
    assert!(!html.contains("2: Buy milk"));

    // A different item is fine
    let response = server.post(&list_url).form(&[("text", "Make tea")]).await;
    response.assert_status(StatusCode::SEE_OTHER);
    let html = server.get(&list_url).await.text();
    assert!(html.contains("1: Buy milk"));
    assert!(html.contains("2: Make tea"));
}

/// End-to-end: request a login link, follow it, see the navbar change, log out.
#[sqlx::test]
#[test_log::test]
async fn test_login_with_email_link_and_logout(pool: SqlitePool) {
    let (server, outbox) = create_test_server(pool);
    let mut browser = CookieJar::default();

    let home = server.get("/").await.text();
    assert!(home.contains(r#"name="email""#));
    assert!(!home.contains("Logged in as"));

    let response = server
        .post("/accounts/send_login_email")
        .form(&[("email", "edith@example.com")])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    browser.update(&response);

    // The confirmation shows once
    let response = server.get("/").add_header(header::COOKIE, browser.header()).await;
    assert!(response.text().contains("Check your email"));
    browser.update(&response);
    let response = server.get("/").add_header(header::COOKIE, browser.header()).await;
    assert!(!response.text().contains("Check your email"));

    let messages = outbox.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].to, vec!["edith@example.com".to_string()]);
    let link = last_login_link(&outbox).await;
    assert_eq!(link.host_str(), Some("testserver"));
    assert_eq!(link.path(), "/accounts/login");

    let response = server
        .get(&format!("{}?{}", link.path(), link.query().unwrap_or_default()))
        .add_header(header::COOKIE, browser.header())
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    browser.update(&response);
    assert!(browser.get("superlists_session").is_some());

    let html = server.get("/").add_header(header::COOKIE, browser.header()).await.text();
    assert!(html.contains("Logged in as edith@example.com"));
    assert!(html.contains("Log out"));
    assert!(!html.contains(r#"name="email""#));

    // Lists still work while logged in
    let response = server
        .post("/lists/new")
        .add_header(header::COOKIE, browser.header())
        .form(&[("text", "Buy peacock feathers")])
        .await;
    let list_url = location(&response);
    let html = server.get(&list_url).add_header(header::COOKIE, browser.header()).await.text();
    assert!(html.contains("Logged in as edith@example.com"));
    assert!(html.contains("1: Buy peacock feathers"));

    let response = server
        .get("/accounts/logout")
        .add_header(header::COOKIE, browser.header())
        .await;
    assert_eq!(location(&response), "/");
    browser.update(&response);
    assert!(browser.get("superlists_session").is_none());

    let html = server.get("/").add_header(header::COOKIE, browser.header()).await.text();
    assert!(!html.contains("Logged in as"));
    assert!(html.contains(r#"name="email""#));
}

/// A link for a token that was never issued logs nobody in.
#[sqlx::test]
#[test_log::test]
async fn test_forged_login_link_stays_anonymous(pool: SqlitePool) {
    let (server, _) = create_test_server(pool);
    let mut browser = CookieJar::default();

    let response = server.get("/accounts/login?token=made-up").await;
    browser.update(&response);
    assert!(browser.get("superlists_session").is_none());

    let html = server.get("/").add_header(header::COOKIE, browser.header()).await.text();
    assert!(!html.contains("Logged in as"));
}

/// A tampered session cookie is treated as no session at all.
#[sqlx::test]
#[test_log::test]
async fn test_tampered_session_cookie_is_ignored(pool: SqlitePool) {
    let (server, _) = create_test_server(pool);

    let response = server
        .get("/")
        .add_header(header::COOKIE, HeaderValue::from_static("superlists_session=eyJhbGciOiJIUzI1NiJ9.e30.bad"))
        .await;
    response.assert_status(StatusCode::OK);
    assert!(!response.text().contains("Logged in as"));
}

#[sqlx::test]
#[test_log::test]
async fn test_layout_and_static_assets(pool: SqlitePool) {
    let (server, _) = create_test_server(pool);

    let html = server.get("/").await.text();
    assert!(html.contains(r#"href="/static/base.css""#));
    assert!(html.contains(r#"id="id_text""#));

    let css = server.get("/static/base.css").await;
    css.assert_status(StatusCode::OK);
    assert!(
        css.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/css"))
    );

    server.get("/static/list.js").await.assert_status(StatusCode::OK);
    server.get("/static/missing.css").await.assert_status(StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[test_log::test]
async fn test_requests_for_unknown_hosts_are_rejected(pool: SqlitePool) {
    let mut config = create_test_config();
    config.allowed_hosts = vec!["superlists.example.com".to_string()];
    let (state, _) = create_test_state_with_config(pool, config);
    let server = axum_test::TestServer::new(crate::build_router(state)).unwrap();

    let response = server
        .get("/")
        .add_header(header::HOST, HeaderValue::from_static("superlists.example.com"))
        .await;
    response.assert_status(StatusCode::OK);

    let response = server
        .get("/")
        .add_header(header::HOST, HeaderValue::from_static("attacker.example.net"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
