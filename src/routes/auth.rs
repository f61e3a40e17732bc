use crate::{
    error::{AppError, Result},
    models::user::{LoginRequest, RegisterRequest, ResetPasswordRequest, SetPasswordRequest},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/reset-password/request", post(reset_password_request))
        .route("/reset-password/:token", post(reset_password))
}

/// 注册新用户
/// POST /api/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>> {
    if !state.is_feature_enabled("registrations") {
        return Err(AppError::Authorization("Registrations are disabled".to_string()));
    }

    req.validate()?;

    let password_hash = state.auth_service.hash_password(&req.password)?;
    let user = state
        .user_service
        .create_user(&req.username, &req.email, &password_hash)
        .await?;

    // 欢迎邮件为尽力投递，失败不影响注册
    if state.is_feature_enabled("email_notifications") {
        state.mail_service.send_welcome_email(&user);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Congratulations, you are now a registered user!",
        "data": user.to_response()
    })))
}

/// 登录，返回会话令牌
/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let user = state.user_service.get_by_username(&req.username).await?;

    // 用户不存在与密码错误返回同一个错误
    let user = match user {
        Some(user) if state.auth_service.verify_password(&req.password, &user.password_hash) => user,
        _ => {
            debug!("Failed login attempt for username '{}'", req.username);
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }
    };

    let token = state.auth_service.issue_token(&user.id)?;
    info!("User {} logged in", user.id);

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "user": user.to_response()
        }
    })))
}

/// 请求密码重置邮件。无论邮箱是否存在都返回成功，避免泄露账户
/// POST /api/auth/reset-password/request
async fn reset_password_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>> {
    if let Some(user) = state.user_service.get_by_email(&req.email).await? {
        let token = state.auth_service.generate_reset_token(&user.id)?;
        state.mail_service.send_password_reset_email(&user, &token);
    }

    Ok(Json(json!({
        "success": true,
        "message": "Check your email for the instructions to reset your password"
    })))
}

/// 用重置令牌设置新密码。令牌无效或过期时给出统一错误
/// POST /api/auth/reset-password/:token
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(req): Json<SetPasswordRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let user_id = state
        .auth_service
        .verify_reset_token(&token)
        .ok_or_else(|| AppError::bad_request("Invalid or expired reset token"))?;

    let user = state
        .user_service
        .get_by_id(&user_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid or expired reset token"))?;

    let password_hash = state.auth_service.hash_password(&req.password)?;
    state
        .user_service
        .set_password_hash(&user.id, &password_hash)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Your password has been reset."
    })))
}
