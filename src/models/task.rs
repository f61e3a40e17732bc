use serde::{Deserialize, Serialize};

/// 后台任务记录：id 为任务队列返回的 job id，complete 由 worker 置位
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub complete: bool,
}
