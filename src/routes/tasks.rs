use crate::{
    error::Result,
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks))
        .route("/export-posts", post(export_posts))
}

/// 启动帖子导出任务。同名任务同一时间最多一个在途
/// POST /api/tasks/export-posts
async fn export_posts(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let task = state
        .task_service
        .launch_task(&user.id, "export_posts", "Exporting posts...")
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": task
    })))
}

/// 当前用户的任务记录
/// GET /api/tasks
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<Value>> {
    let tasks = state.task_service.tasks_for_user(&user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": tasks
    })))
}
