use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub app: AppConfig,
    pub migration: MigrationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub version: String,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

// Default value functions
fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_user() -> String {
    "root".to_string()
}

fn default_db_name() -> String {
    "crud_app".to_string()
}

fn default_db_port() -> u16 {
    3306
}

fn default_pool_size() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    5
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/logs/crud")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_max_retries() -> u32 {
    30
}

fn default_retry_delay() -> u64 {
    2
}

/// Parse an optional variable, falling back to `default` when unset or empty.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .context(format!("Invalid value '{}' for {}", raw, key)),
        None => Ok(default),
    }
}

fn string_or<F>(lookup: &F, key: &str, default: String) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.is_empty()).unwrap_or(default)
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// A `.env` file in the working directory, if present, is read first.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            server: ServerConfig {
                port: parse_or(&lookup, "PORT", default_port())?,
                request_timeout_secs: parse_or(
                    &lookup,
                    "REQUEST_TIMEOUT_SECS",
                    default_request_timeout(),
                )?,
            },
            database: DatabaseConfig {
                host: string_or(&lookup, "DB_HOST", default_db_host()),
                port: parse_or(&lookup, "DB_PORT", default_db_port())?,
                user: string_or(&lookup, "DB_USER", default_db_user()),
                // An empty password is a legitimate value
                password: lookup("DB_PASSWORD").unwrap_or_default(),
                name: string_or(&lookup, "DB_NAME", default_db_name()),
                pool_size: parse_or(&lookup, "DB_POOL_SIZE", default_pool_size())?,
                acquire_timeout_secs: parse_or(
                    &lookup,
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    default_acquire_timeout(),
                )?,
            },
            logging: LoggingConfig {
                level: string_or(&lookup, "LOG_LEVEL", default_log_level()).to_lowercase(),
                format: string_or(&lookup, "LOG_FORMAT", default_log_format()).to_lowercase(),
                dir: lookup("LOG_DIR")
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(default_log_dir),
            },
            app: AppConfig {
                version: string_or(&lookup, "APP_VERSION", default_version()),
                environment: lookup("APP_ENV")
                    .or_else(|| lookup("NODE_ENV"))
                    .filter(|v| !v.is_empty())
                    .unwrap_or_else(default_environment),
            },
            migration: MigrationConfig {
                max_retries: parse_or(&lookup, "MIGRATE_MAX_RETRIES", default_max_retries())?,
                retry_delay_secs: parse_or(
                    &lookup,
                    "MIGRATE_RETRY_DELAY_SECS",
                    default_retry_delay(),
                )?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("PORT must be greater than 0");
        }

        if self.server.request_timeout_secs == 0 {
            bail!("REQUEST_TIMEOUT_SECS must be greater than 0");
        }

        if self.database.port == 0 {
            bail!("DB_PORT must be greater than 0");
        }

        if self.database.pool_size == 0 {
            bail!("DB_POOL_SIZE must be greater than 0");
        }

        if self.database.acquire_timeout_secs == 0 {
            bail!("DB_ACQUIRE_TIMEOUT_SECS must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        if self.migration.max_retries == 0 {
            bail!("MIGRATE_MAX_RETRIES must be greater than 0");
        }

        Ok(())
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl MigrationConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

// Keep the password out of logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("pool_size", &self.pool_size)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}
