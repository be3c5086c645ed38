/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, BLUEPRINT_DB_* の DB 接続情報, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Connection settings for the Postgres-backed database service.
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub schema: String,
    pub max_connections: u32,
}

// password は出さない
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("schema", &self.schema)
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,

    pub db: DbConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = Duration::from_secs(
            lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        let request_body_limit_bytes = lookup("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let db = DbConfig {
            host: lookup("BLUEPRINT_DB_HOST")
                .ok_or(ConfigError::Missing("BLUEPRINT_DB_HOST"))?,
            port: match lookup("BLUEPRINT_DB_PORT") {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| ConfigError::Invalid("BLUEPRINT_DB_PORT"))?,
                None => 5432,
            },
            database: lookup("BLUEPRINT_DB_DATABASE")
                .ok_or(ConfigError::Missing("BLUEPRINT_DB_DATABASE"))?,
            username: lookup("BLUEPRINT_DB_USERNAME")
                .ok_or(ConfigError::Missing("BLUEPRINT_DB_USERNAME"))?,
            password: lookup("BLUEPRINT_DB_PASSWORD")
                .ok_or(ConfigError::Missing("BLUEPRINT_DB_PASSWORD"))?,
            schema: lookup("BLUEPRINT_DB_SCHEMA")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "public".to_string()),
            max_connections: lookup("BLUEPRINT_DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_timeout,
            request_body_limit_bytes,
            db,
        })
    }
}
