//! Authentication Handlers
//!
//! Handles registration, login, password reset and account queries

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Role, UserCreate, UserPublic};
use crate::db::repository::UserRepository;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// Login payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: access token plus public user info
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserPublic,
}

/// Password reset payload (tokenless reset, as the storefront has no mailer)
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub new_password: String,
}

/// POST /api/auth/register - 注册账号
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserPublic>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo.create(payload, Role::User).await?;

    tracing::info!(email = %user.email, "Account registered");
    Ok(Json(user.into()))
}

/// POST /api/auth/login - 登录
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let repo = UserRepository::new(state.db.clone());

    // Unified error message to prevent email enumeration
    let user = repo
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(AppError::invalid_credentials)?;

    let password_valid = user
        .verify_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

    if !password_valid {
        tracing::warn!(target: "security", email = %payload.email, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let user_id = user.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
    let access_token = state
        .get_jwt_service()
        .generate_token(&user_id, &user.name, &user.email, user.role)
        .map_err(|e| AppError::internal(format!("Token generation failed: {e}")))?;

    Ok(Json(LoginResponse {
        access_token,
        user: user.into(),
    }))
}

/// POST /api/auth/forgot-password - 重置密码
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<AppResponse<UserPublic>>> {
    validate_email(&payload.email)?;
    validate_password(&payload.new_password)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .reset_password(&payload.email, &payload.new_password)
        .await?;

    tracing::info!(target: "security", email = %user.email, "Password reset");
    Ok(ok_with_message(user.into(), "Password reset successful"))
}

/// GET /api/auth/account - 当前账号信息
pub async fn account(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}

/// GET /api/auth/users - 账号列表 (Staff/Admin)
pub async fn list_users(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<UserPublic>>> {
    user.require_staff()?;

    let repo = UserRepository::new(state.db.clone());
    let users = repo.find_all().await?;
    Ok(Json(users.into_iter().map(UserPublic::from).collect()))
}
