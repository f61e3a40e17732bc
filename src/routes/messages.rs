use crate::{
    error::Result,
    models::message::SendMessageRequest,
    routes::PageQuery,
    services::auth::AuthUser,
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
use validator::Validate;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(inbox))
        .route("/user/:username", post(send_message))
}

/// 发送私信
/// POST /api/messages/user/:username
async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(sender): AuthUser,
    Path(username): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Value>> {
    req.validate()?;

    let recipient = state.user_service.require_by_username(&username).await?;
    let message = state
        .message_service
        .send_message(&sender, &recipient, &req.body)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Your message has been sent.",
        "data": message
    })))
}

/// 收件箱，读取即推进未读水位
/// GET /api/messages
async fn inbox(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let limit = state.page_limit(query.limit);
    let messages = state
        .message_service
        .read_inbox(&user, query.page(), limit)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": messages
    })))
}
