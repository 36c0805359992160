use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::checkout::CheckoutService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::models::{Role, UserCreate};
use crate::db::repository::{RepoError, UserRepository};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是后端的核心数据结构。使用 Arc/浅拷贝共享，
/// 每个请求处理函数都能以极低成本克隆。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            db,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/store.db)
    /// 3. JWT 服务
    /// 4. 种子管理员账号 (可选)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("store.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        // 2. Initialize services
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        let state = Self::new(config.clone(), db, jwt_service);

        // 3. Seed the admin account when configured and absent
        if let Err(e) = state.seed_admin().await {
            tracing::warn!(error = %e, "Admin account seeding failed");
        }

        state
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 构造结算服务 (注入共享数据库句柄和定价策略)
    pub fn checkout_service(&self) -> CheckoutService {
        CheckoutService::with_db(self.db.clone(), self.config.pricing_policy)
    }

    /// 创建 ADMIN_EMAIL/ADMIN_PASSWORD 指定的管理员账号 (幂等)
    async fn seed_admin(&self) -> Result<(), RepoError> {
        let (Some(email), Some(password)) =
            (&self.config.admin_email, &self.config.admin_password)
        else {
            return Ok(());
        };

        let repo = UserRepository::new(self.db.clone());
        if repo.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        repo.create(
            UserCreate {
                name: "Administrator".to_string(),
                email: email.clone(),
                password: password.clone(),
            },
            Role::Admin,
        )
        .await?;

        tracing::info!(email = %email, "Seeded admin account");
        Ok(())
    }
}
