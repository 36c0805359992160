//! Cart API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/cart | GET | 获取购物车 (缺失返回空购物车) |
//! | /api/cart | DELETE | 清空购物车 |
//! | /api/cart/items | POST | 加入商品 (同商品合并数量) |
//! | /api/cart/items/{product_id} | PUT | 覆盖数量 (<=0 移除) |
//! | /api/cart/items/{product_id} | DELETE | 移除商品 |
//! | /api/cart/select | POST | 批量切换勾选标记 |
//!
//! REST 与 GraphQL 入口走同一个 CartRepository，两侧语义一致。

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/cart", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::get_cart).delete(handler::clear_cart))
        .route("/items", post(handler::add_item))
        .route(
            "/items/{product_id}",
            put(handler::set_quantity).delete(handler::remove_item),
        )
        .route("/select", post(handler::set_selected))
}
