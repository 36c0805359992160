//! Order API Handlers
//!
//! The checkout handler is the REST face of the orchestrator: it maps the
//! tagged [`CheckoutError`] onto the `{code, message, order?}` envelope and
//! a transport status (success 2xx, business failures 4xx, storage 5xx).

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::checkout::{CheckoutError, CheckoutItemInput};
use crate::core::ServerState;
use crate::db::models::Order;
use crate::db::repository::{OrderRepository, UserRepository};
use crate::utils::AppResult;

/// Checkout payload: explicit items are optional; absent (or empty) means
/// "use my selected cart lines"
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Option<Vec<CheckoutItemInput>>,
}

/// Checkout envelope: stable result code, human message, order on success
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

fn status_for(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::MissingUser | CheckoutError::MissingProductReference => {
            StatusCode::BAD_REQUEST
        }
        CheckoutError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::EmptySelection
        | CheckoutError::NoResolvableItems
        | CheckoutError::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CheckoutError::System(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/orders - 结算
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CheckoutRequest>,
) -> (StatusCode, Json<CheckoutResponse>) {
    let service = state.checkout_service();

    match service.create_order(&user.id, payload.items).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(CheckoutResponse {
                code: "OK".to_string(),
                message: "Checkout accepted".to_string(),
                order: Some(order),
            }),
        ),
        Err(err) => (
            status_for(&err),
            Json(CheckoutResponse {
                code: err.code().to_string(),
                message: err.to_string(),
                order: None,
            }),
        ),
    }
}

/// GET /api/orders - 当前用户订单 (最新在前)
pub async fn list_my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let user_rid = UserRepository::record_id(&user.id)?;
    let repo = OrderRepository::new(state.db.clone());
    Ok(Json(repo.find_by_user(&user_rid).await?))
}
