use crate::{
    error::Result,
    models::notification::NotificationResponse,
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub since: Option<f64>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(poll_notifications))
}

/// 轮询通知：返回 since 之后的通知，按时间升序。
/// 客户端自己记录最后看到的 timestamp
/// GET /api/notifications?since=0.0
async fn poll_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<Value>> {
    let since = query.since.unwrap_or(0.0);

    let notifications: Vec<NotificationResponse> = state
        .notification_service
        .notifications_since(&user.id, since)
        .await?
        .iter()
        .map(|n| n.to_response())
        .collect();

    Ok(Json(json!({
        "success": true,
        "data": notifications
    })))
}
