use crate::{
    error::{AppError, Result},
    models::message::Message,
    models::user::User,
    services::{Database, NotificationService, PaginatedResult, UserService},
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct MessageService {
    db: Arc<Database>,
    user_service: UserService,
    notification_service: NotificationService,
}

impl MessageService {
    pub async fn new(
        db: Arc<Database>,
        user_service: UserService,
        notification_service: NotificationService,
    ) -> Result<Self> {
        Ok(Self {
            db,
            user_service,
            notification_service,
        })
    }

    /// 发送私信并覆盖写入收件人的未读计数通知
    pub async fn send_message(&self, sender: &User, recipient: &User, body: &str) -> Result<Message> {
        let body = body.trim();
        if body.is_empty() || body.chars().count() > self.db.config.max_message_length {
            return Err(AppError::Validation(format!(
                "Message body must be between 1 and {} characters",
                self.db.config.max_message_length
            )));
        }

        let message = Message::new(sender.id.clone(), recipient.id.clone(), body.to_string());

        sqlx::query(
            "INSERT INTO message (id, sender_id, recipient_id, body, timestamp) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.sender_id)
        .bind(&message.recipient_id)
        .bind(&message.body)
        .bind(message.timestamp)
        .execute(self.db.pool())
        .await?;

        let unread = self.new_messages(recipient).await?;
        self.notification_service
            .add_notification(&recipient.id, "unread_message_count", json!(unread))
            .await?;

        info!("User {} sent message to user {}", sender.id, recipient.id);
        Ok(message)
    }

    /// 收到的、晚于 last_message_read_time 的私信数
    pub async fn new_messages(&self, user: &User) -> Result<i64> {
        let since = user
            .last_message_read_time
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM message WHERE recipient_id = ? AND timestamp > ?",
        )
        .bind(&user.id)
        .bind(since)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count)
    }

    /// 收件箱。读取的同时把未读水位推到现在并清零未读通知
    pub async fn read_inbox(
        &self,
        user: &User,
        page: i64,
        limit: i64,
    ) -> Result<PaginatedResult<Message>> {
        debug!("User {} reading inbox", user.id);

        self.user_service.mark_messages_read(&user.id).await?;
        self.notification_service
            .add_notification(&user.id, "unread_message_count", json!(0))
            .await?;

        let offset = (page - 1) * limit;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM message WHERE recipient_id = ?")
            .bind(&user.id)
            .fetch_one(self.db.pool())
            .await?;

        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT * FROM message
            WHERE recipient_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(&user.id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        Ok(PaginatedResult::new(messages, total, page, limit))
    }
}
