//! Order API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 结算 (显式条目或购物车勾选行) |
//! | /api/orders | GET | 当前用户订单，最新在前 |
//!
//! 订单账本只增不改；状态流转是未来扩展点。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new().route("/", get(handler::list_my_orders).post(handler::checkout))
}
