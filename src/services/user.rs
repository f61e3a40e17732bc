use crate::{
    error::{AppError, Result},
    models::user::{UpdateProfileRequest, User},
    services::Database,
    utils::validation::{validate_email_format, validate_username},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 创建用户。用户名/邮箱唯一性在这里显式检查，
    /// 不让存储层的唯一约束错误泄漏给调用方
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User> {
        validate_username(username)?;
        validate_email_format(email)?;

        if self.get_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if self.get_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let user = User::new(
            username.to_string(),
            email.to_string(),
            password_hash.to_string(),
        );

        sqlx::query(
            r#"
            INSERT INTO user (id, username, email, password_hash, about_me, last_seen, last_message_read_time, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.about_me)
        .bind(user.last_seen)
        .bind(user.last_message_read_time)
        .bind(user.created_at)
        .execute(self.db.pool())
        .await?;

        info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM user WHERE id = ?")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM user WHERE username = ?")
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM user WHERE email = ?")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(user)
    }

    /// 按用户名查找，不存在时返回 NotFound
    pub async fn require_by_username(&self, username: &str) -> Result<User> {
        self.get_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// 更新个人资料（用户名 + about_me）
    pub async fn update_profile(&self, user: &User, req: &UpdateProfileRequest) -> Result<User> {
        let mut username = user.username.clone();
        if let Some(new_username) = &req.username {
            if new_username != &user.username {
                validate_username(new_username)?;
                if self.get_by_username(new_username).await?.is_some() {
                    return Err(AppError::Conflict("Username already taken".to_string()));
                }
                username = new_username.clone();
            }
        }

        // 空串表示清除简介，None 表示保持不变
        let about_me = match &req.about_me {
            Some(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    if text.chars().count() > self.db.config.max_about_me_length {
                        return Err(AppError::Validation(format!(
                            "About me must be at most {} characters",
                            self.db.config.max_about_me_length
                        )));
                    }
                    Some(text.to_string())
                }
            }
            None => user.about_me.clone(),
        };

        sqlx::query("UPDATE user SET username = ?, about_me = ? WHERE id = ?")
            .bind(&username)
            .bind(&about_me)
            .bind(&user.id)
            .execute(self.db.pool())
            .await?;

        debug!("Updated profile for user {}", user.id);

        self.get_by_id(&user.id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// 刷新最后活跃时间，由认证提取器在每个请求上调用
    pub async fn touch_last_seen(&self, user_id: &str) -> Result<()> {
        sqlx::query("UPDATE user SET last_seen = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    pub async fn set_password_hash(&self, user_id: &str, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE user SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        info!("Password updated for user {}", user_id);
        Ok(())
    }

    /// 标记私信读到现在
    pub async fn mark_messages_read(&self, user_id: &str) -> Result<()> {
        sqlx::query("UPDATE user SET last_message_read_time = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
