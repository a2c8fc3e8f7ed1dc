//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `SUPERLISTS_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **`secret_key.yaml`** - Optional file next to the config file holding only `secret_key`.
//!    The deploy task generates it once per host so the key survives redeploys.
//! 3. **Environment variables** - Variables prefixed with `SUPERLISTS_` override YAML values
//! 4. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `SUPERLISTS_AUTH__SESSION__TIMEOUT=2h` sets the `auth.session.timeout` field.
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use superlists::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Server will bind to {}:{}", config.host, config.port);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variable Examples
//!
//! ```bash
//! # Override server port
//! SUPERLISTS_PORT=8080
//!
//! # Set database connection (preferred method)
//! DATABASE_URL="sqlite:///home/elspeth/sites/superlists.example.com/database/db.sqlite3?mode=rwc"
//!
//! # Override nested values
//! SUPERLISTS_EMAIL__TYPE=smtp
//! SUPERLISTS_ENABLE_METRICS=true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use url::Url;

use crate::errors::Error;

/// Bounds for `auth.session.timeout`.
const MIN_SESSION_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const MAX_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SUPERLISTS_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,

    /// Apply database migrations and exit without starting the server.
    #[arg(long)]
    pub migrate: bool,
}

/// Main application configuration.
///
/// All fields have defaults suitable for local development, except `secret_key`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Public base URL used to build login links (e.g. "https://superlists.example.com").
    /// When unset, links are built from the request's `Host` header, which requires explicit
    /// `allowed_hosts` unless `debug` is on. A path is kept as a prefix of the login link.
    pub site_url: Option<Url>,
    /// Development mode: more verbose logging
    pub debug: bool,
    /// Host names this server answers for. `"*"` matches any host.
    pub allowed_hosts: Vec<String>,
    /// Set from the `DATABASE_URL` environment variable; folded into `database.url` on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    pub database: DatabaseConfig,
    /// Secret key for signing session cookies (required)
    pub secret_key: Option<String>,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    /// Enable Prometheus metrics endpoint at `/internal/metrics`
    pub enable_metrics: bool,
    /// Export traces over OTLP (configured through the standard `OTEL_*` variables)
    pub enable_otel_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            site_url: None,
            debug: false,
            allowed_hosts: vec!["*".to_string()],
            database_url: None,
            database: DatabaseConfig::default(),
            secret_key: None,
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            enable_metrics: false,
            enable_otel_export: false,
        }
    }
}

/// SQLite database location and pool tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLx connection URL, e.g. `sqlite://db.sqlite3?mode=rwc`
    pub url: String,
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://db.sqlite3?mode=rwc".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Individual pool configuration with all SQLx parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,  // 10 minutes
            max_lifetime_secs: 1800, // 30 minutes
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub session: SessionConfig,
    pub login_token: LoginTokenConfig,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Session timeout duration
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Cookie name for session token
    pub cookie_name: String,
    /// Set Secure flag on cookies (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(14 * 24 * 60 * 60),
            cookie_name: "superlists_session".to_string(),
            cookie_secure: false,
            cookie_same_site: "lax".to_string(),
        }
    }
}

/// Login link tokens.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginTokenConfig {
    /// How long an emailed link stays valid. Unset means links never expire.
    #[serde(with = "humantime_serde")]
    pub lifetime: Option<Duration>,
}

/// Email configuration for login links.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
// Note: Cannot use deny_unknown_fields here due to #[serde(flatten)] on transport
pub struct EmailConfig {
    /// Email transport method
    #[serde(flatten)]
    pub transport: EmailTransportConfig,
    /// Sender email address
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            transport: EmailTransportConfig::default(),
            from_email: "noreply@superlists.xyz".to_string(),
            from_name: "Superlists".to_string(),
        }
    }
}

/// Email transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EmailTransportConfig {
    /// Send emails via SMTP server
    Smtp {
        /// SMTP server hostname
        host: String,
        /// SMTP server port
        port: u16,
        /// SMTP authentication username
        username: String,
        /// SMTP authentication password
        password: String,
        /// Use TLS encryption
        use_tls: bool,
    },
    /// Write emails to files (for development)
    File {
        /// Directory path where email files will be written
        path: String,
    },
    /// Keep sent emails in memory (for tests)
    Memory,
}

impl Default for EmailTransportConfig {
    fn default() -> Self {
        Self::File {
            path: "./emails".to_string(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let mut config: Self = Self::figment(args).extract()?;

        if let Some(url) = config.database_url.take() {
            config.database.url = url;
        }

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::Internal {
                operation: "Config validation: secret_key is not configured. \
                     Please set SUPERLISTS_SECRET_KEY or create secret_key.yaml next to the config file."
                    .to_string(),
            });
        }

        let timeout = self.auth.session.timeout;
        if !(MIN_SESSION_TIMEOUT..=MAX_SESSION_TIMEOUT).contains(&timeout) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: auth.session.timeout ({}s) must be between 5 minutes and 30 days",
                    timeout.as_secs()
                ),
            });
        }

        if !["strict", "lax", "none"].contains(&self.auth.session.cookie_same_site.to_lowercase().as_str()) {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: auth.session.cookie_same_site must be one of strict, lax or none (got '{}')",
                    self.auth.session.cookie_same_site
                ),
            });
        }

        if self.allowed_hosts.is_empty() {
            return Err(Error::Internal {
                operation: "Config validation: allowed_hosts cannot be empty (use \"*\" to allow any host)".to_string(),
            });
        }

        match &self.email.transport {
            EmailTransportConfig::Smtp { host, .. } if host.trim().is_empty() => {
                return Err(Error::Internal {
                    operation: "Config validation: email.host is required for the smtp transport".to_string(),
                });
            }
            EmailTransportConfig::File { path } if path.trim().is_empty() => {
                return Err(Error::Internal {
                    operation: "Config validation: email.path is required for the file transport".to_string(),
                });
            }
            _ => {}
        }

        if !self.debug && self.site_url.is_none() && self.allowed_hosts.iter().any(|h| h == "*") {
            return Err(Error::Internal {
                operation: "Config validation: set site_url or list explicit allowed_hosts when debug is off, \
                     otherwise login links follow whatever Host header a request sends"
                    .to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        let secret_key_file = Path::new(&args.config).with_file_name("secret_key.yaml");

        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Per-host secret written once by the deploy task
            .merge(Yaml::file(secret_key_file))
            // Environment variables can still override specific values
            .merge(Env::prefixed("SUPERLISTS_").split("__"))
            .merge(Env::raw().only(&["DATABASE_URL"]))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}
