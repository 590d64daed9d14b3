//! 配置管理模块
//!
//! 支持配置文件加载、环境变量覆盖和命令行参数，提供类型安全的配置访问。
//!
//! 加载顺序（后加载的覆盖先加载的同名配置项）：
//! 1. 内置默认值
//! 2. `config/default.toml`（可选）
//! 3. 环境变量（`RUN_ADDRESS`、`DATABASE_URI`、`ACCRUAL_SYSTEM_ADDRESS`、`AUTH_SECRET`）
//! 4. 命令行参数（`-a`、`-d`、`-r`）

use std::path::Path;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 命令行参数
///
/// 与环境变量等价的快捷开关，命令行优先级最高。
#[derive(Parser, Debug, Default)]
#[command(name = "loyalty-service")]
#[command(about = "积分账户服务")]
pub struct Cli {
    /// 服务监听地址（等价于 RUN_ADDRESS）
    #[arg(short = 'a', long = "run-address")]
    pub run_address: Option<String>,

    /// PostgreSQL DSN（等价于 DATABASE_URI）
    #[arg(short = 'd', long = "database-uri")]
    pub database_uri: Option<String>,

    /// 积分计算服务基础 URL（等价于 ACCRUAL_SYSTEM_ADDRESS）
    #[arg(short = 'r', long = "accrual-address")]
    pub accrual_address: Option<String>,
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        }
    }
}

/// 积分计算服务（上游）配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccrualConfig {
    /// 上游基础 URL，如 http://localhost:8081
    pub address: String,
    /// 单次请求超时（秒）
    pub request_timeout_seconds: u64,
    /// Worker 轮询间隔（秒）
    pub poll_interval_seconds: u64,
    /// Worker 每批拉取的订单数
    pub batch_size: i64,
    /// Worker 单次数据库调用超时（秒）
    pub db_timeout_seconds: u64,
}

impl Default for AccrualConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            request_timeout_seconds: 5,
            poll_interval_seconds: 5,
            batch_size: 10,
            db_timeout_seconds: 2,
        }
    }
}

/// 认证配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer Token 签名密钥
    pub secret: String,
    /// Token 过期时间（秒）
    pub token_ttl_seconds: i64,
}

/// 仅供开发环境使用的默认签名密钥，生产环境必须显式注入
pub const DEV_AUTH_SECRET: &str = "loyalty-dev-secret-change-in-production";

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: DEV_AUTH_SECRET.to_string(),
            token_ttl_seconds: 86400,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub environment: String,
    pub run_address: String,
    pub database: DatabaseConfig,
    pub accrual: AccrualConfig,
    pub auth: AuthConfig,
    pub observability: crate::observability::ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件、环境变量和命令行参数加载配置
    ///
    /// `DATABASE_URI` 与 `ACCRUAL_SYSTEM_ADDRESS` 为必填项，缺失时返回错误。
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        // .env 不存在时静默跳过
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let config: Self = Config::builder()
            .set_default("environment", env)?
            .set_default("run_address", "localhost:8080")?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            // LOYALTY_DATABASE__MAX_CONNECTIONS -> database.max_connections 等细粒度覆盖
            .add_source(
                Environment::with_prefix("LOYALTY")
                    .separator("__")
                    .try_parsing(true),
            )
            // 约定的四个顶级环境变量
            .set_override_option("run_address", std::env::var("RUN_ADDRESS").ok())?
            .set_override_option("database.uri", std::env::var("DATABASE_URI").ok())?
            .set_override_option(
                "accrual.address",
                std::env::var("ACCRUAL_SYSTEM_ADDRESS").ok(),
            )?
            .set_override_option("auth.secret", std::env::var("AUTH_SECRET").ok())?
            // 命令行参数最后生效
            .set_override_option("run_address", cli.run_address.clone())?
            .set_override_option("database.uri", cli.database_uri.clone())?
            .set_override_option("accrual.address", cli.accrual_address.clone())?
            .build()?
            .try_deserialize()?;

        if config.database.uri.is_empty() {
            return Err(ConfigError::Message(
                "DATABASE_URI is required (set via -d flag or DATABASE_URI env)".to_string(),
            ));
        }
        if config.accrual.address.is_empty() {
            return Err(ConfigError::Message(
                "ACCRUAL_SYSTEM_ADDRESS is required (set via -r flag or ACCRUAL_SYSTEM_ADDRESS env)"
                    .to_string(),
            ));
        }

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否仍在使用开发默认密钥
    pub fn uses_dev_secret(&self) -> bool {
        self.auth.secret == DEV_AUTH_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.accrual.poll_interval_seconds, 5);
        assert_eq!(config.accrual.batch_size, 10);
        assert_eq!(config.auth.token_ttl_seconds, 86400);
    }

    #[test]
    fn test_cli_overrides_env() {
        let cli = Cli {
            run_address: Some("127.0.0.1:9999".to_string()),
            database_uri: Some("postgres://cli/db".to_string()),
            accrual_address: Some("http://cli-accrual".to_string()),
        };

        let config = AppConfig::load(&cli).expect("config should load");
        assert_eq!(config.run_address, "127.0.0.1:9999");
        assert_eq!(config.database.uri, "postgres://cli/db");
        assert_eq!(config.accrual.address, "http://cli-accrual");
    }

    #[test]
    fn test_missing_database_uri_is_an_error() {
        // 仅提供 accrual 地址，数据库 DSN 既不在环境也不在命令行
        if std::env::var("DATABASE_URI").is_ok() {
            return; // 外部环境已注入时跳过
        }
        let cli = Cli {
            accrual_address: Some("http://accrual".to_string()),
            ..Cli::default()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_dev_secret_detection() {
        let config = AppConfig::default();
        assert!(config.uses_dev_secret());
        assert!(!config.is_production());
    }
}
