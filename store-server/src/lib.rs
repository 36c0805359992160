//! Store Server - 电商店面后端
//!
//! # 架构概述
//!
//! 本模块是店面后端的主入口，提供以下核心功能：
//!
//! - **结算** (`checkout`): 订单编排: 库存校验、原子预留、订单提交、购物车对账
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (商品 / 购物车 / 订单 / 用户 / 评论)
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **目录** (`catalog`): 商品列表: 过滤、模糊搜索、排序、分页
//! - **HTTP API** (`api`): RESTful API 接口
//! - **GraphQL** (`graphql`): 购物车 / 订单的查询与变更端点
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证
//! ├── db/            # 数据库层 (models + repositories)
//! ├── checkout/      # 结算编排器
//! ├── catalog/       # 商品列表管线
//! ├── api/           # HTTP 路由和处理器
//! ├── graphql/       # GraphQL schema 和 resolvers
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod core;
pub mod db;
pub mod graphql;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use checkout::{CheckoutError, CheckoutService, PricingPolicy};
pub use core::{Config, Server, ServerState, setup_environment};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
