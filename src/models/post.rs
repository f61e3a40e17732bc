use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 帖子创建后不可修改，也没有删除路径
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: String,
    pub body: String,
    pub author_id: String,
    pub timestamp: DateTime<Utc>,
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 140))]
    pub body: String,
}

impl Post {
    pub fn new(author_id: String, body: String, language: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            body,
            author_id,
            timestamp: Utc::now(),
            language,
        }
    }
}
