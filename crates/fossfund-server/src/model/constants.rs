// Server-wide constants and configuration defaults

pub const ENV_PREFIX: &str = "FOSSFUND";
pub const DEFAULT_CONFIG_FILE: &str = "conf/application.yml";

pub const DEFAULT_SERVER_ADDRESS: &str = "localhost";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_KEEP_ALIVE_SECS: i64 = 5;
pub const DEFAULT_MAX_CONNECTIONS: i64 = 1024;
pub const DEFAULT_MAX_BODY_SIZE: i64 = 4 * 1024 * 1024 * 1024;
pub const DEFAULT_FORWARDED_ALLOW_IPS: &[&str] = &["127.0.0.1", "::1", "localhost"];

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const DEFAULT_MAX_LOGO_SIZE: i64 = 256 * 1024;
pub const DEFAULT_STATIC_DIR: &str = "static";

pub const STATIC_PATH: &str = "/static";

/// Access log line in the combined log format
///
/// `%{client}xi` is the client address, resolved from forwarded headers for
/// trusted proxies only.
pub const ACCESS_LOG_FORMAT: &str =
    r#"%{client}xi - - %t "%r" %s %b "%{Referer}i" "%{User-Agent}i""#;

/// Log target of the access logger
pub const ACCESS_LOG_TARGET: &str = "fossfund_server::access";

pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
pub const X_FORWARDED_HOST: &str = "X-Forwarded-Host";
pub const X_FORWARDED_PROTO: &str = "X-Forwarded-Proto";
