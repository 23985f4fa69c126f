//! ryze-config - 配置加载库
//!
//! 加载顺序：`default.toml` → `{APP_ENV}.toml` → `RYZE_` 前缀环境变量（`__` 分隔层级）

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// JWT 配置
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default = "default_refresh_expires_in")]
    pub refresh_expires_in: i64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_expires_in() -> i64 {
    1800
}

fn default_refresh_expires_in() -> i64 {
    604800
}

fn default_issuer() -> String {
    "ryze".to_string()
}

fn default_audience() -> String {
    "ryze-api".to_string()
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 请求体大小上限（字节）
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// 运维手册执行配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookConfig {
    /// 是否允许真实执行（dry run 始终允许）
    pub execution_enabled: bool,
    pub command_timeout_secs: u64,
    pub max_commands: usize,
    pub max_output_bytes: usize,
    pub shell: String,
}

impl Default for RunbookConfig {
    fn default() -> Self {
        Self {
            execution_enabled: false,
            command_timeout_secs: 30,
            max_commands: 50,
            max_output_bytes: 64 * 1024,
            shell: "sh".to_string(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub runbooks: RunbookConfig,
}

/// 未在文件中出现时使用的顶层默认值
#[derive(Serialize)]
struct TopLevelDefaults {
    app_name: &'static str,
    app_env: String,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Serialized::defaults(TopLevelDefaults {
                app_name: "ryze-api",
                app_env: env.clone(),
            }))
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("RYZE_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// 校验安全关键配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.expose_secret().len() < 32 {
            return Err(ConfigError::Invalid(
                "jwt.secret must be at least 32 characters long".to_string(),
            ));
        }
        if self.jwt.expires_in <= 0 || self.jwt.refresh_expires_in <= 0 {
            return Err(ConfigError::Invalid(
                "jwt token lifetimes must be positive".to_string(),
            ));
        }
        if self.runbooks.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "runbooks.command_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.runbooks.max_commands == 0 {
            return Err(ConfigError::Invalid(
                "runbooks.max_commands must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}

#[cfg(test)]
mod tests;
