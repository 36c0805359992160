//! Cart API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::CartView;
use crate::db::repository::{CartRepository, ProductRepository, UserRepository};
use crate::utils::{AppError, AppResult};

/// Add-item payload
#[derive(Debug, Deserialize)]
pub struct AddItemPayload {
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Set-quantity payload
#[derive(Debug, Deserialize)]
pub struct SetQuantityPayload {
    pub quantity: i64,
}

/// Select payload: flip `selected` on the given products
#[derive(Debug, Deserialize)]
pub struct SelectPayload {
    pub product_ids: Vec<String>,
    pub selected: bool,
}

/// GET /api/cart - 获取当前用户的购物车
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartView>> {
    let user_rid = UserRepository::record_id(&user.id)?;
    let repo = CartRepository::new(state.db.clone());
    let lines = repo.get(&user_rid).await?;
    Ok(Json(CartView::from_lines(&user_rid, lines)))
}

/// POST /api/cart/items - 加入商品
///
/// The product must exist; quantities merge into an existing line.
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AddItemPayload>,
) -> AppResult<Json<CartView>> {
    let user_rid = UserRepository::record_id(&user.id)?;

    let products = ProductRepository::new(state.db.clone());
    let product = products
        .find_by_id(&payload.product_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Product {} not found", payload.product_id))
        })?;
    let product_rid = product
        .id
        .ok_or_else(|| AppError::internal("Product record has no id"))?;

    let repo = CartRepository::new(state.db.clone());
    repo.add_item(&user_rid, &product_rid, payload.quantity)
        .await?;

    let lines = repo.get(&user_rid).await?;
    Ok(Json(CartView::from_lines(&user_rid, lines)))
}

/// PUT /api/cart/items/{product_id} - 覆盖数量 (<=0 移除该行)
pub async fn set_quantity(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
    Json(payload): Json<SetQuantityPayload>,
) -> AppResult<Json<CartView>> {
    let user_rid = UserRepository::record_id(&user.id)?;
    let product_rid = ProductRepository::record_id(&product_id)?;

    let repo = CartRepository::new(state.db.clone());
    repo.set_quantity(&user_rid, &product_rid, payload.quantity)
        .await?;

    let lines = repo.get(&user_rid).await?;
    Ok(Json(CartView::from_lines(&user_rid, lines)))
}

/// DELETE /api/cart/items/{product_id} - 移除商品
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<CartView>> {
    let user_rid = UserRepository::record_id(&user.id)?;
    let product_rid = ProductRepository::record_id(&product_id)?;

    let repo = CartRepository::new(state.db.clone());
    repo.remove_item(&user_rid, &product_rid).await?;

    let lines = repo.get(&user_rid).await?;
    Ok(Json(CartView::from_lines(&user_rid, lines)))
}

/// POST /api/cart/select - 批量切换勾选标记
pub async fn set_selected(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SelectPayload>,
) -> AppResult<Json<CartView>> {
    let user_rid = UserRepository::record_id(&user.id)?;

    let mut product_rids = Vec::with_capacity(payload.product_ids.len());
    for id in &payload.product_ids {
        product_rids.push(ProductRepository::record_id(id)?);
    }

    let repo = CartRepository::new(state.db.clone());
    repo.set_selected(&user_rid, &product_rids, payload.selected)
        .await?;

    let lines = repo.get(&user_rid).await?;
    Ok(Json(CartView::from_lines(&user_rid, lines)))
}

/// DELETE /api/cart - 清空购物车
pub async fn clear_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartView>> {
    let user_rid = UserRepository::record_id(&user.id)?;

    let repo = CartRepository::new(state.db.clone());
    repo.clear(&user_rid).await?;

    Ok(Json(CartView::from_lines(&user_rid, Vec::new())))
}
