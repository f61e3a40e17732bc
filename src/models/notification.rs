use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 通知按 (user_id, name) 覆盖写入，timestamp 为 unix 秒，
/// 客户端轮询时用 strictly-greater-than 过滤
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub timestamp: f64,
    pub payload_json: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub name: String,
    pub data: serde_json::Value,
    pub timestamp: f64,
}

impl Notification {
    pub fn new(user_id: String, name: String, payload: &serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            name,
            timestamp: chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0,
            payload_json: payload.to_string(),
        }
    }

    pub fn get_data(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload_json).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_response(&self) -> NotificationResponse {
        NotificationResponse {
            name: self.name.clone(),
            data: self.get_data(),
            timestamp: self.timestamp,
        }
    }
}
