//! Auth API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/auth/register | POST | 注册 | 无 |
//! | /api/auth/login | POST | 登录 | 无 |
//! | /api/auth/forgot-password | POST | 重置密码 | 无 |
//! | /api/auth/account | GET | 当前账号信息 | 是 |
//! | /api/auth/users | GET | 账号列表 | Staff/Admin |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", auth_routes())
}

fn auth_routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/forgot-password", post(handler::forgot_password))
        .route("/account", get(handler::account))
        .route("/users", get(handler::list_users))
}
