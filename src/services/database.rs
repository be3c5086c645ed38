//! Database service interface used by the tenant middleware and the health handler.
use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;

use crate::config::DbConfig;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(1);

/// Capability the HTTP layer needs from the database.
///
/// Implementations are shared by every in-flight request (`Arc<dyn DatabaseService>`),
/// so they must not keep per-request state. The tenant of a request travels with the
/// request itself (`TenantCtx` in extensions); `set_tenant` is only a notification.
#[async_trait]
pub trait DatabaseService: Send + Sync + 'static {
    // Called once per request, after the tenant middleware resolved the subdomain.
    fn set_tenant(&self, tenant_id: &str);

    // Ping the backend and report pool statistics. Never fails; errors become `Down`.
    async fn health(&self) -> HealthReport;

    // Close the underlying connections. Called on shutdown.
    async fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    pub open_connections: u32,
    pub idle: u32,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub open_connections: u32,
    pub idle: u32,
    pub in_use: u32,
    pub max_connections: u32,
}

impl HealthReport {
    pub fn up(stats: PoolStats) -> Self {
        let in_use = stats.open_connections.saturating_sub(stats.idle);
        let message = if stats.max_connections > 0 && in_use >= stats.max_connections {
            "The database is at its connection limit."
        } else {
            "It's healthy"
        };

        Self {
            status: HealthStatus::Up,
            message: message.to_string(),
            error: None,
            open_connections: stats.open_connections,
            idle: stats.idle,
            in_use,
            max_connections: stats.max_connections,
        }
    }

    pub fn down(stats: PoolStats, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            status: HealthStatus::Down,
            message: "The database is down.".to_string(),
            error: Some(error),
            open_connections: stats.open_connections,
            idle: stats.idle,
            in_use: stats.open_connections.saturating_sub(stats.idle),
            max_connections: stats.max_connections,
        }
    }
}

/// Postgres-backed database service.
///
/// The pool connects lazily, so the server starts (and rejects tenant-less
/// requests) even when Postgres is not reachable yet.
#[derive(Clone, Debug)]
pub struct PgDatabase {
    pool: PgPool,
    max_connections: u32,
}

impl PgDatabase {
    pub fn connect_lazy(config: &DbConfig) -> Self {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database)
            .options([("search_path", config.schema.as_str())]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect_lazy_with(options);

        Self {
            pool,
            max_connections: config.max_connections,
        }
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            open_connections: self.pool.size(),
            idle: u32::try_from(self.pool.num_idle()).unwrap_or(u32::MAX),
            max_connections: self.max_connections,
        }
    }
}

#[async_trait]
impl DatabaseService for PgDatabase {
    fn set_tenant(&self, tenant_id: &str) {
        // pool は全リクエストで共有なので、ここでは状態を持たない
        tracing::debug!(tenant_id, "tenant bound to request");
    }

    async fn health(&self) -> HealthReport {
        let ping = tokio::time::timeout(
            HEALTH_CHECK_TIMEOUT,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await;

        match ping {
            Ok(Ok(_)) => HealthReport::up(self.stats()),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "database health check failed");
                HealthReport::down(self.stats(), err.to_string())
            }
            Err(_) => {
                tracing::warn!("database health check timed out");
                HealthReport::down(self.stats(), "health check timed out")
            }
        }
    }

    async fn close(&self) {
        tracing::info!("closing database pool");
        self.pool.close().await;
    }
}
