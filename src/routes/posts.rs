use crate::{
    error::Result,
    models::post::CreatePostRequest,
    routes::PageQuery,
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(feed).post(create_post))
        .route("/explore", get(explore))
        .route("/user/:username", get(user_posts))
        .route("/search", get(search))
}

/// 关注流：自己和关注对象的帖子
/// GET /api/posts
async fn feed(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let limit = state.page_limit(query.limit);
    let posts = state
        .post_service
        .followed_posts(&user.id, query.page(), limit)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": posts
    })))
}

/// 发布帖子
/// POST /api/posts
async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let post = state.post_service.create_post(&user.id, &req.body).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Your post is now live!",
        "data": post
    })))
}

/// 所有用户的帖子
/// GET /api/posts/explore
async fn explore(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    debug!("User {} browsing explore", user.id);

    let limit = state.page_limit(query.limit);
    let posts = state.post_service.explore(query.page(), limit).await?;

    Ok(Json(json!({
        "success": true,
        "data": posts
    })))
}

/// 某用户的个人时间线
/// GET /api/posts/user/:username
async fn user_posts(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let author = state.user_service.require_by_username(&username).await?;
    let limit = state.page_limit(query.limit);

    let posts = state
        .post_service
        .user_posts(&author.id, query.page(), limit)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": posts
    })))
}

/// 帖子全文搜索
/// GET /api/posts/search?q=...
async fn search(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    debug!("User {} searching for '{}'", user.id, query.q);

    let page = query.page.unwrap_or(1).max(1);
    let limit = state.page_limit(query.limit);
    let posts = state.search_service.search(&query.q, page, limit).await?;

    Ok(Json(json!({
        "success": true,
        "data": posts
    })))
}
