pub mod auth;
pub mod users;
pub mod follows;
pub mod posts;
pub mod messages;
pub mod notifications;
pub mod tasks;

use serde::Deserialize;

/// 通用分页查询参数
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }
}
