use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::checkout::PricingPolicy;

/// 服务器配置 - 店面后端的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/store | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | TRUST_CLIENT_PRICES | true | 显式结算项是否信任客户端价格 |
/// | JWT_SECRET | - | JWT 密钥 |
/// | JWT_EXPIRATION_MINUTES | 1440 | 令牌过期时间 |
/// | ADMIN_EMAIL / ADMIN_PASSWORD | - | 启动时种子管理员账号 (可选) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/store HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 显式结算项定价策略 (见 checkout::PricingPolicy)
    pub pricing_policy: PricingPolicy,
    /// 启动时种子管理员账号 (可选)
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let trust_client_prices = std::env::var("TRUST_CLIENT_PRICES")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            pricing_policy: if trust_client_prices {
                PricingPolicy::TrustClient
            } else {
                PricingPolicy::CatalogOnly
            },
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|v| !v.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }

    /// 数据库目录 (work_dir/database)
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录 (work_dir/logs)
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}

/// 设置进程环境: dotenv + 日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    crate::utils::logger::init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}
