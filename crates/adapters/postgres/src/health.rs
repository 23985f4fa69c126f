//! PostgreSQL 健康检查模块

use async_trait::async_trait;
use ryze_common::HealthCheck;
use sqlx::PgPool;
use tracing::debug;

/// 连接池健康状态
#[derive(Debug, Clone, Copy)]
pub struct PoolHealthStatus {
    /// 连接池大小
    pub size: u32,
    /// 空闲连接数
    pub idle: u32,
    /// 活跃连接数
    pub active: u32,
}

/// PostgreSQL 就绪检查
#[derive(Clone)]
pub struct PostgresHealthCheck {
    pool: PgPool,
}

impl PostgresHealthCheck {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 获取连接池状态
    pub fn pool_status(&self) -> PoolHealthStatus {
        let size = self.pool.size();
        let idle = self.pool.num_idle() as u32;
        PoolHealthStatus {
            size,
            idle,
            active: size.saturating_sub(idle),
        }
    }
}

#[async_trait]
impl HealthCheck for PostgresHealthCheck {
    fn component_name(&self) -> &'static str {
        "postgres"
    }

    async fn probe(&self) -> Result<(), String> {
        let status = self.pool_status();
        debug!(
            size = status.size,
            idle = status.idle,
            active = status.active,
            "Probing PostgreSQL"
        );
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
