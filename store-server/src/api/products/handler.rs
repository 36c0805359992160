//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::catalog::{self, ProductPage, ProductQuery};
use crate::core::ServerState;
use crate::db::models::{CommentWithAuthor, Product, ProductCreate, ProductUpdate};
use crate::db::repository::{
    CommentRepository, OrderRepository, ProductRepository, UserRepository,
};
use crate::utils::validation::{
    MAX_TEXT_LEN, MAX_URL_LEN, validate_optional_text, validate_product_name,
};
use crate::utils::{AppError, AppResponse, AppResult, ok};

// =============================================================================
// Catalog CRUD
// =============================================================================

/// GET /api/products - 商品列表 (过滤 + 模糊搜索 + 排序 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ProductPage>> {
    let repo = ProductRepository::new(state.db.clone());

    // Category narrows at the store; the rest of the pipeline runs in process
    let products = match query.category.as_deref() {
        Some(category) => repo.find_by_category(category).await?,
        None => repo.find_all().await?,
    };

    Ok(Json(catalog::filter_sort_paginate(products, &query)))
}

/// GET /api/products/by-category/{category} - 按分类取商品
#[derive(Debug, Deserialize)]
pub struct ByCategoryQuery {
    pub limit: Option<usize>,
}

pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(category): Path<String>,
    Query(query): Query<ByCategoryQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let mut products = repo.find_by_category(&category).await?;
    products.truncate(query.limit.unwrap_or(5));
    Ok(Json(products))
}

/// GET /api/products/{id} - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (Staff/Admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    user.require_staff()?;
    validate_product_name(&payload.name)?;
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;

    tracing::info!(product = ?product.id, name = %product.name, "Product created");
    Ok(Json(product))
}

/// PUT /api/products/{id} - 更新商品 (Staff/Admin)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    user.require_staff()?;
    if let Some(name) = &payload.name {
        validate_product_name(name)?;
    }
    validate_optional_text(&payload.description, "description", MAX_TEXT_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 删除商品 (Staff/Admin)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    user.require_staff()?;

    let repo = ProductRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;
    if !deleted {
        return Err(AppError::not_found(format!("Product {} not found", id)));
    }

    tracing::info!(product = %id, "Product deleted");
    Ok(Json(true))
}

// =============================================================================
// Favorites
// =============================================================================

/// POST /api/products/{id}/favorite - 切换收藏
///
/// Returns the updated favorites list (product id strings).
pub async fn toggle_favorite(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Vec<String>>>> {
    let product_id = ProductRepository::record_id(&id)?;

    let users = UserRepository::new(state.db.clone());
    let account = users
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let user_rid = account
        .id
        .clone()
        .ok_or_else(|| AppError::internal("User record has no id"))?;

    let mut favorites = account.favorites;
    match favorites.iter().position(|f| f == &product_id) {
        Some(idx) => {
            favorites.remove(idx);
        }
        None => favorites.push(product_id),
    }

    let favorites = users.set_favorites(&user_rid, favorites).await?;
    Ok(ok(favorites.iter().map(|f| f.to_string()).collect()))
}

/// GET /api/products/favorites - 当前用户收藏的商品
///
/// Vanished products are skipped, not errors.
pub async fn list_favorites(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let users = UserRepository::new(state.db.clone());
    let products = ProductRepository::new(state.db.clone());

    let account = users
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let mut favorites = Vec::with_capacity(account.favorites.len());
    for rid in &account.favorites {
        if let Some(product) = products.find_by_record(rid).await? {
            favorites.push(product);
        }
    }
    Ok(Json(favorites))
}

// =============================================================================
// Comments & counts
// =============================================================================

/// Comment payload
#[derive(Debug, Deserialize)]
pub struct CommentPayload {
    #[serde(default)]
    pub content: String,
}

/// POST /api/products/{id}/comment - 发表评论
pub async fn post_comment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<CommentPayload>,
) -> AppResult<Json<crate::db::models::Comment>> {
    if payload.content.len() > MAX_TEXT_LEN {
        return Err(AppError::validation(format!(
            "content is too long (max {MAX_TEXT_LEN} chars)"
        )));
    }

    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    let product_rid = product
        .id
        .ok_or_else(|| AppError::internal("Product record has no id"))?;

    let user_rid = UserRepository::record_id(&user.id)?;

    let comments = CommentRepository::new(state.db.clone());
    let comment = comments
        .create(user_rid, product_rid, payload.content)
        .await?;
    Ok(Json(comment))
}

/// GET /api/products/{id}/comments - 评论列表 (最新在前，含作者信息)
pub async fn list_comments(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CommentWithAuthor>>> {
    let product_rid = ProductRepository::record_id(&id)?;
    let comments = CommentRepository::new(state.db.clone());
    Ok(Json(comments.find_by_product(&product_rid).await?))
}

/// Buyer / commenter counts for a product detail page
#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub buyers_count: usize,
    pub comments_count: usize,
}

/// GET /api/products/{id}/counts - 买家数与评论者数 (去重)
pub async fn get_counts(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CountsResponse>> {
    let product_rid = ProductRepository::record_id(&id)?;

    let orders = OrderRepository::new(state.db.clone());
    let comments = CommentRepository::new(state.db.clone());

    let buyers_count = orders.count_distinct_buyers(&product_rid).await?;
    let comments_count = comments.count_distinct_commenters(&product_rid).await?;

    Ok(Json(CountsResponse {
        buyers_count,
        comments_count,
    }))
}
