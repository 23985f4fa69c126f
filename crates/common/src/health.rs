//! 通用健康检查模块
//!
//! 就绪探针（`/ready`）通过 [`HealthCheck`] trait 聚合各依赖组件的状态

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 单个组件的健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// 组件名称
    pub name: String,
    /// 是否健康
    pub healthy: bool,
    /// 延迟（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            name: name.into(),
            healthy: true,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    pub fn unhealthy(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            healthy: false,
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    pub fn timeout(name: impl Into<String>) -> Self {
        Self::unhealthy(name, "Health check timed out")
    }
}

/// 健康检查 trait
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// 组件名称
    fn component_name(&self) -> &'static str;

    /// 执行一次检查，返回错误描述
    async fn probe(&self) -> Result<(), String>;

    /// 带超时与计时的检查
    async fn check(&self, timeout: Duration) -> ComponentHealth {
        let started = Instant::now();
        match tokio::time::timeout(timeout, self.probe()).await {
            Ok(Ok(())) => {
                ComponentHealth::healthy(self.component_name(), started.elapsed().as_millis() as u64)
            }
            Ok(Err(e)) => ComponentHealth::unhealthy(self.component_name(), e),
            Err(_) => ComponentHealth::timeout(self.component_name()),
        }
    }
}

/// 聚合健康状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub ready: bool,
    pub checks: Vec<ComponentHealth>,
}

impl HealthReport {
    pub fn from_checks(checks: Vec<ComponentHealth>) -> Self {
        let ready = checks.iter().all(|c| c.healthy);
        Self { ready, checks }
    }
}
