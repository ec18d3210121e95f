//! Configuration management for the fossfund server
//!
//! This module handles loading and accessing application configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use config::{Config, Environment};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use fossfund_auth::service::oauth::{OAuthConfig, OAuthProviderConfig};
use fossfund_common::FossfundError;

use crate::startup::LoggingConfig;

use super::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_FORWARDED_ALLOW_IPS, DEFAULT_KEEP_ALIVE_SECS,
    DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_CONNECTIONS, DEFAULT_MAX_LOGO_SIZE, DEFAULT_PER_PAGE,
    DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT, DEFAULT_STATIC_DIR, ENV_PREFIX,
};

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command(name = "fossfund-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
    /// Configuration file, without or with extension
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: String,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Drop and recreate the database schema
    Setup,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

/// `FOSSFUND_*` environment variables, `__` separating key segments
///
/// `FOSSFUND_APP__SESSION_SECRET` sets `app.session_secret`. Keys are
/// lowercased, so every configuration key is snake_case.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    /// Load configuration for the given command line
    ///
    /// Sources, lowest priority first: the configuration file, `FOSSFUND_*`
    /// environment variables, command line overrides.
    pub fn new(args: &Cli) -> anyhow::Result<Self> {
        let mut config_builder = Config::builder()
            .add_source(config::File::with_name(&args.config_file).required(false))
            .add_source(environment());

        if let Some(v) = &args.database_url {
            config_builder = config_builder.set_override("db.url", v.as_str())?;
        }
        if let Some(v) = args.port {
            config_builder = config_builder.set_override("server.port", v as i64)?;
        }

        let app_config = config_builder.build().map_err(|e| {
            FossfundError::ConfigError(format!(
                "failed to build configuration from {}: {}",
                args.config_file, e
            ))
        })?;

        Ok(Configuration { config: app_config })
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Server Configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Number of HTTP workers, one per CPU unless configured
    pub fn server_workers(&self) -> usize {
        self.config
            .get_int("server.workers")
            .ok()
            .and_then(|v| usize::try_from(v).ok())
            .filter(|v| *v > 0)
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(
            self.config
                .get_int("server.keep_alive_secs")
                .unwrap_or(DEFAULT_KEEP_ALIVE_SECS) as u64,
        )
    }

    pub fn max_connections(&self) -> usize {
        self.config
            .get_int("server.max_connections")
            .unwrap_or(DEFAULT_MAX_CONNECTIONS) as usize
    }

    pub fn max_body_size(&self) -> usize {
        self.config
            .get_int("server.max_body_size")
            .unwrap_or(DEFAULT_MAX_BODY_SIZE) as usize
    }

    /// Peer addresses whose forwarded headers are trusted
    ///
    /// Accepts a list or a comma separated string.
    pub fn forwarded_allow_ips(&self) -> Vec<String> {
        if let Ok(ips) = self.config.get::<Vec<String>>("server.forwarded_allow_ips") {
            return ips;
        }

        match self.config.get_string("server.forwarded_allow_ips") {
            Ok(ips) => ips
                .split(',')
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
                .map(str::to_string)
                .collect(),
            Err(_) => DEFAULT_FORWARDED_ALLOW_IPS
                .iter()
                .map(|ip| ip.to_string())
                .collect(),
        }
    }

    // ========================================================================
    // Application Configuration
    // ========================================================================

    /// Public host name used to build OAuth redirect URIs
    pub fn app_host(&self) -> String {
        self.config
            .get_string("app.host")
            .unwrap_or_else(|_| format!("{}:{}", self.server_address(), self.server_port()))
    }

    /// URL-safe base64 encoded 32-byte key sealing session cookies
    pub fn session_secret(&self) -> Option<String> {
        self.config
            .get_string("app.session_secret")
            .ok()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn projects_per_page(&self) -> u64 {
        self.config
            .get_int("app.projects_per_page")
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_PER_PAGE) as u64
    }

    pub fn organisations_per_page(&self) -> u64 {
        self.config
            .get_int("app.organisations_per_page")
            .ok()
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_PER_PAGE) as u64
    }

    pub fn max_logo_size(&self) -> usize {
        self.config
            .get_int("app.max_logo_size")
            .unwrap_or(DEFAULT_MAX_LOGO_SIZE) as usize
    }

    pub fn static_dir(&self) -> PathBuf {
        PathBuf::from(
            self.config
                .get_string("app.static_dir")
                .unwrap_or(DEFAULT_STATIC_DIR.to_string()),
        )
    }

    // ========================================================================
    // OAuth Configuration
    // ========================================================================

    pub fn oauth_config(&self) -> OAuthConfig {
        let mut config = OAuthConfig::default();

        if let Ok(providers) = self.config.get_table("oauth.providers") {
            for (name, value) in providers {
                match value.try_deserialize::<OAuthProviderConfig>() {
                    Ok(provider) => {
                        config.providers.insert(name, provider);
                    }
                    Err(e) => {
                        tracing::warn!(provider = %name, "Ignoring OAuth provider: {}", e);
                    }
                }
            }
        }

        config
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string("logs.path").ok(),
            self.config.get_bool("logs.console").unwrap_or(true),
            self.config.get_bool("logs.file").unwrap_or(true),
            self.config
                .get_string("logs.level")
                .unwrap_or("info".to_string()),
            self.config.get_string("logs.rotation").ok(),
        )
    }

    // ========================================================================
    // Database Configuration
    // ========================================================================

    pub fn database_url(&self) -> Option<String> {
        self.config.get_string("db.url").ok()
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let max_connections = self
            .config
            .get_int("db.pool.config.maximum_pool_size")
            .unwrap_or(20) as u32;
        let min_connections = self
            .config
            .get_int("db.pool.config.minimum_pool_size")
            .unwrap_or(1) as u32;
        let connect_timeout = self
            .config
            .get_int("db.pool.config.connection_timeout")
            .unwrap_or(30) as u64;
        let acquire_timeout = self
            .config
            .get_int("db.pool.config.initialization_fail_timeout")
            .unwrap_or(8) as u64;
        let idle_timeout = self
            .config
            .get_int("db.pool.config.idle_timeout")
            .unwrap_or(10) as u64;
        let max_lifetime = self
            .config
            .get_int("db.pool.config.max_lifetime")
            .unwrap_or(1800) as u64;
        let sqlx_logging = self
            .config
            .get_bool("db.pool.config.sqlx_logging")
            .unwrap_or(false);

        let url = self
            .database_url()
            .ok_or_else(|| FossfundError::ConfigError("db.url is not set".to_string()))?;

        let mut opt = ConnectOptions::new(url);

        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(connect_timeout))
            .acquire_timeout(Duration::from_secs(acquire_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .sqlx_logging(sqlx_logging)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        tracing::info!(
            max_connections = max_connections,
            min_connections = min_connections,
            connect_timeout = connect_timeout,
            idle_timeout = idle_timeout,
            max_lifetime = max_lifetime,
            sqlx_logging = sqlx_logging,
            "Database connection pool configured"
        );

        let database_connection: DatabaseConnection = Database::connect(opt).await?;

        Ok(database_connection)
    }
}
