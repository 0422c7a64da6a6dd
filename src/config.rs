use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub billing: BillingConfig,
    pub business: BusinessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// 启动时执行 migrations/ 下的建表脚本
    pub run_migrations: bool,
}

/// 开单规则
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    /// 单据最少明细行数 (删除行与保存校验共用)
    pub min_items: usize,
    pub default_unit: String,
}

/// 打印抬头
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConfig {
    pub name: String,
    pub tagline: String,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            min_items: 1,
            default_unit: "pcs".to_string(),
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: "ELECTRICAL & PIPELINE SERVICES".to_string(),
            tagline: "Professional Billing Invoice".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/bill_desk".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 10,
                run_migrations: false,
            },
            billing: BillingConfig::default(),
            business: BusinessConfig::default(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> config/billdesk.toml -> BILLDESK__* 环境变量 -> DATABASE_URL 等旧变量
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config/billdesk")
    }

    pub fn load_from(file: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("database.url", defaults.database.url)?
            .set_default("database.max_connections", defaults.database.max_connections as i64)?
            .set_default("database.acquire_timeout_secs", defaults.database.acquire_timeout_secs as i64)?
            .set_default("database.run_migrations", defaults.database.run_migrations)?
            .set_default("billing.min_items", defaults.billing.min_items as i64)?
            .set_default("billing.default_unit", defaults.billing.default_unit)?
            .set_default("business.name", defaults.business.name)?
            .set_default("business.tagline", defaults.business.tagline)?
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("BILLDESK").separator("__"))
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option(
                "server.port",
                std::env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse::<i64>().ok()),
            )?
            .build()?
            .try_deserialize()
    }
}
