use crate::{
    error::{AppError, Result},
    models::follow::FollowStats,
    models::user::User,
    services::Database,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct FollowService {
    db: Arc<Database>,
}

impl FollowService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// 创建关注边。自关注在这里集中拒绝，重复关注是无副作用的幂等操作
    pub async fn follow(&self, follower_id: &str, followed_id: &str) -> Result<()> {
        if follower_id == followed_id {
            return Err(AppError::validation("Cannot follow yourself"));
        }

        sqlx::query(
            r#"
            INSERT INTO follow (follower_id, followed_id, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .bind(Utc::now())
        .execute(self.db.pool())
        .await?;

        info!("User {} followed user {}", follower_id, followed_id);
        Ok(())
    }

    /// 删除关注边，边不存在时为 no-op
    pub async fn unfollow(&self, follower_id: &str, followed_id: &str) -> Result<()> {
        if follower_id == followed_id {
            return Err(AppError::validation("Cannot unfollow yourself"));
        }

        sqlx::query("DELETE FROM follow WHERE follower_id = ? AND followed_id = ?")
            .bind(follower_id)
            .bind(followed_id)
            .execute(self.db.pool())
            .await?;

        info!("User {} unfollowed user {}", follower_id, followed_id);
        Ok(())
    }

    pub async fn is_following(&self, follower_id: &str, followed_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM follow WHERE follower_id = ? AND followed_id = ?",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count > 0)
    }

    /// 关注某用户的人（入边）
    pub async fn followers(&self, user_id: &str, page: i64, limit: i64) -> Result<Vec<User>> {
        debug!("Getting followers for user: {}", user_id);
        let offset = (page - 1) * limit;

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.*
            FROM follow f
            JOIN user u ON f.follower_id = u.id
            WHERE f.followed_id = ?
            ORDER BY f.created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        Ok(users)
    }

    /// 某用户关注的人（出边）
    pub async fn following(&self, user_id: &str, page: i64, limit: i64) -> Result<Vec<User>> {
        debug!("Getting following for user: {}", user_id);
        let offset = (page - 1) * limit;

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.*
            FROM follow f
            JOIN user u ON f.followed_id = u.id
            WHERE f.follower_id = ?
            ORDER BY f.created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.db.pool())
        .await?;

        Ok(users)
    }

    pub async fn follower_count(&self, user_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follow WHERE followed_id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    pub async fn following_count(&self, user_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follow WHERE follower_id = ?")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    pub async fn follow_stats(
        &self,
        user_id: &str,
        current_user_id: Option<&str>,
    ) -> Result<FollowStats> {
        let mut stats = FollowStats {
            followers_count: self.follower_count(user_id).await?,
            following_count: self.following_count(user_id).await?,
            is_following: false,
            is_followed_by: false,
        };

        if let Some(current) = current_user_id {
            if current != user_id {
                stats.is_following = self.is_following(current, user_id).await?;
                stats.is_followed_by = self.is_following(user_id, current).await?;
            }
        }

        Ok(stats)
    }
}
