use crate::{
    error::Result,
    models::user::UserResponse,
    routes::PageQuery,
    services::auth::{AuthUser, OptionalAuthUser},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/:username/follow", post(follow_user).delete(unfollow_user))
        .route("/user/:username/followers", get(get_followers))
        .route("/user/:username/following", get(get_following))
        .route("/user/:username/stats", get(get_follow_stats))
        .route("/user/:username/is-following", get(check_following))
}

/// 关注用户
/// POST /api/follows/user/:username/follow
async fn follow_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} following '{}'", user.id, username);

    let target = state.user_service.require_by_username(&username).await?;
    state.follow_service.follow(&user.id, &target.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("You are following {}!", target.username)
    })))
}

/// 取消关注用户
/// DELETE /api/follows/user/:username/follow
async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    debug!("User {} unfollowing '{}'", user.id, username);

    let target = state.user_service.require_by_username(&username).await?;
    state.follow_service.unfollow(&user.id, &target.id).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("You are not following {}.", target.username)
    })))
}

/// 获取用户的关注者列表
/// GET /api/follows/user/:username/followers
async fn get_followers(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let user = state.user_service.require_by_username(&username).await?;
    let limit = state.page_limit(query.limit);

    let followers: Vec<UserResponse> = state
        .follow_service
        .followers(&user.id, query.page(), limit)
        .await?
        .iter()
        .map(|u| u.to_response())
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": followers
    })))
}

/// 获取用户关注的人列表
/// GET /api/follows/user/:username/following
async fn get_following(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let user = state.user_service.require_by_username(&username).await?;
    let limit = state.page_limit(query.limit);

    let following: Vec<UserResponse> = state
        .follow_service
        .following(&user.id, query.page(), limit)
        .await?
        .iter()
        .map(|u| u.to_response())
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": following
    })))
}

/// 获取用户的关注统计
/// GET /api/follows/user/:username/stats
async fn get_follow_stats(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    OptionalAuthUser(current): OptionalAuthUser,
) -> Result<Json<Value>> {
    let user = state.user_service.require_by_username(&username).await?;
    let current_user_id = current.as_ref().map(|u| u.id.as_str());

    let stats = state
        .follow_service
        .follow_stats(&user.id, current_user_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": stats
    })))
}

/// 检查是否关注某用户
/// GET /api/follows/user/:username/is-following
async fn check_following(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Value>> {
    let target = state.user_service.require_by_username(&username).await?;
    let is_following = state.follow_service.is_following(&user.id, &target.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "is_following": is_following
        }
    })))
}
