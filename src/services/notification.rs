use crate::{
    error::Result,
    models::notification::Notification,
    services::Database,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct NotificationService {
    db: Arc<Database>,
}

impl NotificationService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 写入通知：同名旧通知先删除，last-write-wins
    pub async fn add_notification(
        &self,
        user_id: &str,
        name: &str,
        data: serde_json::Value,
    ) -> Result<Notification> {
        sqlx::query("DELETE FROM notification WHERE user_id = ? AND name = ?")
            .bind(user_id)
            .bind(name)
            .execute(self.db.pool())
            .await?;

        let notification = Notification::new(user_id.to_string(), name.to_string(), &data);

        sqlx::query(
            "INSERT INTO notification (id, user_id, name, timestamp, payload_json) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&notification.id)
        .bind(&notification.user_id)
        .bind(&notification.name)
        .bind(notification.timestamp)
        .bind(&notification.payload_json)
        .execute(self.db.pool())
        .await?;

        debug!("Notification '{}' written for user {}", name, user_id);
        Ok(notification)
    }

    /// 轮询接口：严格大于 since 的通知，按时间升序。
    /// 去重只靠 strictly-greater-than，时间完全相同的边界情况由客户端承担
    pub async fn notifications_since(
        &self,
        user_id: &str,
        since: f64,
    ) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notification
            WHERE user_id = ? AND timestamp > ?
            ORDER BY timestamp ASC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(self.db.pool())
        .await?;

        Ok(notifications)
    }
}
