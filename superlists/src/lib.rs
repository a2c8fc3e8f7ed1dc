//! # superlists: To-Do lists with passwordless login
//!
//! `superlists` is a small server-rendered web app. Anyone can start a to-do list from the home
//! page and keep adding items to it; every list has its own URL. Visitors can also log in
//! without a password by asking for a login link by email.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum), pages are [minijinja] templates
//! compiled into the binary, and everything is persisted in SQLite through `sqlx`.
//!
//! ### Request Flow
//!
//! Requests first pass the `allowed_hosts` check ([`auth::middleware`]). Page handlers
//! ([`api::handlers`]) resolve the optional logged-in user from the session cookie, talk to the
//! database through the repositories in [`db::handlers`], and either render a page or redirect
//! with `303 See Other`. Flash messages ([`messages`]) ride a cookie across those redirects.
//!
//! Login links go out through the [`email::Mailer`] held in [`AppState`]. Tests swap in an
//! in-memory outbox so they can read what was sent.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use superlists::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = superlists::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     superlists::telemetry::init_telemetry(config.enable_otel_export, config.default_log_filter())?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
mod messages;
mod static_assets;
pub mod telemetry;
pub mod templates;
pub mod types;

#[cfg(test)]
mod test;

use crate::{
    api::handlers::{auth as auth_handlers, lists, static_assets::serve_static},
    auth::middleware::allowed_hosts_middleware,
    config::PoolSettings,
    email::Mailer,
    templates::Templates,
};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument};

pub use types::{ItemId, ListId};

/// Application state shared across all request handlers.
///
/// - `db`: SQLite connection pool
/// - `config`: configuration loaded from file and environment
/// - `mailer`: where login emails go
/// - `templates`: the compiled page templates
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .mailer(mailer)
///     .templates(Templates::new()?)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub templates: Templates,
}

/// Get the superlists database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

fn pool_options(settings: &PoolSettings) -> SqlitePoolOptions {
    let seconds = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(seconds(settings.idle_timeout_secs))
        .max_lifetime(seconds(settings.max_lifetime_secs))
}

/// Open the configured SQLite database, creating the file if needed, and migrate it.
#[instrument(skip_all)]
pub async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = pool_options(&config.database.pool).connect_with(options).await?;
    info!("Connected to database");

    migrator().run(&pool).await?;
    debug!("Migrations applied");

    Ok(pool)
}

/// Build the application router: pages, login endpoints, static assets, and the layers around them.
pub fn build_router(state: AppState) -> Router {
    let enable_metrics = state.config.enable_metrics;

    let mut router = Router::new()
        .route("/", get(lists::home_page))
        .route("/lists/new", post(lists::new_list))
        .route("/lists/{id}/", get(lists::view_list).post(lists::add_item))
        .route("/accounts/send_login_email", post(auth_handlers::send_login_email))
        .route("/accounts/login", get(auth_handlers::login))
        .route("/accounts/logout", get(auth_handlers::logout))
        .route("/static/{*path}", get(serve_static))
        .layer(from_fn_with_state(state.clone(), allowed_hosts_middleware))
        // Outside the host check: load balancers probe by IP
        .route("/healthz", get(|| async { "OK" }))
        .with_state(state);

    if enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    )
}

/// Main application struct that owns the router, the pool and the configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens and migrates the database and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests finish, then the pool
///    is closed and pending traces are flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application on an existing pool (tests), or open the configured database.
    pub async fn new_with_pool(config: Config, pool: Option<SqlitePool>) -> anyhow::Result<Self> {
        debug!(bind = %config.bind_address(), debug = config.debug, "Starting superlists");

        let pool = match pool {
            Some(pool) => pool,
            None => setup_database(&config).await?,
        };

        let state = AppState::builder()
            .db(pool.clone())
            .config(config.clone())
            .mailer(email::build_mailer(&config.email)?)
            .templates(Templates::new()?)
            .build();

        Ok(Self {
            router: build_router(state),
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Superlists listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
