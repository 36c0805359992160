//! Product API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/products | GET | 商品列表 (过滤/搜索/排序/分页) | 是 |
//! | /api/products | POST | 创建商品 | Staff/Admin |
//! | /api/products/favorites | GET | 当前用户收藏列表 | 是 |
//! | /api/products/by-category/{category} | GET | 按分类取商品 | 是 |
//! | /api/products/{id} | GET/PUT/DELETE | 单个商品 | 读:是 写:Staff/Admin |
//! | /api/products/{id}/favorite | POST | 切换收藏 | 是 |
//! | /api/products/{id}/comment | POST | 发表评论 | 是 |
//! | /api/products/{id}/comments | GET | 评论列表 | 是 |
//! | /api/products/{id}/counts | GET | 买家数 / 评论者数 | 是 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    // Static routes registered before dynamic {id} routes
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/favorites", get(handler::list_favorites))
        .route("/by-category/{category}", get(handler::list_by_category))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/favorite", post(handler::toggle_favorite))
        .route("/{id}/comment", post(handler::post_comment))
        .route("/{id}/comments", get(handler::list_comments))
        .route("/{id}/counts", get(handler::get_counts))
}
