use crate::{
    error::Result,
    models::user::UpdateProfileRequest,
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(current_user).put(update_profile))
        .route("/:username", get(profile))
}

/// 当前登录用户
/// GET /api/users/me
async fn current_user(
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    Ok(Json(json!({
        "success": true,
        "data": user.to_response()
    })))
}

/// 编辑个人资料
/// PUT /api/users/me
async fn update_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let updated = state.user_service.update_profile(&user, &req).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Your changes have been saved.",
        "data": updated.to_response()
    })))
}

/// 用户主页：资料加关注统计
/// GET /api/users/:username
async fn profile(
    State(state): State<Arc<AppState>>,
    AuthUser(current): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} viewing profile of '{}'", current.id, username);

    let user = state.user_service.require_by_username(&username).await?;
    let stats = state
        .follow_service
        .follow_stats(&user.id, Some(&current.id))
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "user": user.to_response(),
            "stats": stats
        }
    })))
}
